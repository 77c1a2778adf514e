//! Line breakpoint resolution.

use hashem_syntax::SourceSection;

use crate::engine::LoadedSource;

/// Resolve a 1-based `line` to the first statement that starts on it.
#[must_use]
pub fn resolve_line(loaded: &LoadedSource, line: u32) -> Option<SourceSection> {
    loaded
        .statements()
        .iter()
        .filter(|section| section.start_line() == line)
        .min_by_key(|section| section.start_offset())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Context, Engine};
    use hashem_syntax::Source;

    fn loaded(text: &str) -> std::sync::Arc<LoadedSource> {
        let engine = Engine::builder().out(Vec::new()).build();
        let mut context = Context::new(&engine);
        context
            .eval(&Source::new("hashemi", text, "t.hashem"))
            .unwrap();
        engine.loaded_sources().remove(0)
    }

    #[test]
    fn binds_first_statement_on_line() {
        let loaded = loaded("bebin main() {\n  a = 1; b = 2;\n  age (a < b) bood {\n    bede a;\n  }\n}\n");
        assert_eq!(resolve_line(&loaded, 2).unwrap().characters(), "a = 1");
        assert_eq!(resolve_line(&loaded, 3).unwrap().characters(), "a < b");
        assert_eq!(resolve_line(&loaded, 4).unwrap().characters(), "bede a");
    }

    #[test]
    fn lines_without_statements_do_not_resolve() {
        let loaded = loaded("bebin main() {\n  bede 1;\n}\n");
        assert!(resolve_line(&loaded, 1).is_none());
        assert!(resolve_line(&loaded, 3).is_none());
        assert!(resolve_line(&loaded, 40).is_none());
    }
}
