//! Engine configuration loading.
//!
//! ```toml
//! [engine]
//! language = "hashemi"
//! max_call_depth = 512
//! debug_trace = false
//! ```

use std::path::Path;

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::RuntimeError;

pub const DEFAULT_LANGUAGE: &str = "hashemi";
pub const DEFAULT_MAX_CALL_DEPTH: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Language id accepted by [`crate::Context::eval`].
    pub language: SmolStr,
    /// Nested calls beyond this depth fail with a stack overflow.
    pub max_call_depth: u32,
    /// Print debugger state transitions to stderr.
    pub debug_trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: SmolStr::new_inline(DEFAULT_LANGUAGE),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            debug_trace: false,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            RuntimeError::InvalidConfig(format!("{}: {err}", path.display()).into())
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, RuntimeError> {
        let raw: EngineToml = toml::from_str(text)
            .map_err(|err| RuntimeError::InvalidConfig(format!("engine config: {err}").into()))?;
        raw.into_config()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineToml {
    engine: Option<EngineSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineSection {
    language: Option<String>,
    max_call_depth: Option<u32>,
    debug_trace: Option<bool>,
}

impl EngineToml {
    fn into_config(self) -> Result<EngineConfig, RuntimeError> {
        let Some(section) = self.engine else {
            return Ok(EngineConfig::default());
        };
        let max_call_depth = section.max_call_depth.unwrap_or(DEFAULT_MAX_CALL_DEPTH);
        if max_call_depth == 0 {
            return Err(RuntimeError::InvalidConfig(
                "engine.max_call_depth must be at least 1".into(),
            ));
        }
        let language = section
            .language
            .map_or_else(|| SmolStr::new_inline(DEFAULT_LANGUAGE), SmolStr::new);
        if language.trim().is_empty() {
            return Err(RuntimeError::InvalidConfig(
                "engine.language must not be empty".into(),
            ));
        }
        Ok(EngineConfig {
            language,
            max_call_depth,
            debug_trace: section.debug_trace.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn engine_section_overrides_defaults() {
        let config = EngineConfig::from_toml_str(
            "[engine]\nmax_call_depth = 16\ndebug_trace = true\n",
        )
        .unwrap();
        assert_eq!(config.max_call_depth, 16);
        assert!(config.debug_trace);
        assert_eq!(config.language, "hashemi");
    }

    #[test]
    fn rejects_zero_depth_and_unknown_keys() {
        let err = EngineConfig::from_toml_str("[engine]\nmax_call_depth = 0\n").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig(_)));
        let err = EngineConfig::from_toml_str("[engine]\nstack = 3\n").unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{err}");
    }
}
