//! `hashem-syntax` - Source model, lexer, parser and scoped AST for Hashem.
//!
//! This crate turns program text into executable function declarations:
//!
//! - **Source**: immutable program text with line tables and located sections
//! - **Lexer**: tokenizes source text with `logos`
//! - **Parser**: recursive descent parser producing a typed AST
//! - **Scopes**: block scopes in a per-function arena, with every local bound to a frame slot
//!
//! Every node carries its [`SourceSection`] and the [`NodeTags`] the
//! runtime uses to decide which nodes are observable.
//!
//! # Example
//!
//! ```
//! use hashem_syntax::{parse, Source};
//!
//! let source = Source::new("hashemi", "bebin main() {\n  bede 1 + 2;\n}", "main.hashem");
//! let program = parse(&source).unwrap();
//!
//! assert_eq!(program.functions[0].name, "main");
//! let sections = program.statement_sections();
//! assert_eq!(sections[0].characters(), "bede 1 + 2");
//! assert_eq!(sections[0].start_line(), 2);
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod ast;
pub mod lexer;
pub mod parser;
mod resolve;
pub mod scope;
pub mod source;
pub mod stack;

pub use ast::{NodeTags, Program};
pub use lexer::{lex, Lexer, Token, TokenKind};
pub use parser::{parse, ParseError};
pub use scope::{ScopeId, ScopeTree, SlotId};
pub use source::{Source, SourceSection};
pub use stack::ensure_sufficient_stack;
