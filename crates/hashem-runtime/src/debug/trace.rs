//! Debug trace helpers.

use std::sync::OnceLock;

use crate::config::EngineConfig;

fn env_trace_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var_os("HASHEM_DEBUG_TRACE").is_some())
}

pub(crate) fn trace_enabled(config: &EngineConfig) -> bool {
    config.debug_trace || env_trace_enabled()
}

pub(crate) fn trace_debug(message: &str) {
    eprintln!("[hashem-runtime][debug] {message}");
}
