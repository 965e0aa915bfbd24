//! Parameter template engine.
//!
//! Binding parameters may embed `${...}` expressions that are resolved
//! against live event data at dispatch time. The grammar is deliberately not
//! Turing-complete: dotted attribute paths rooted at a context key, an
//! allow-list of pure functions, literals, and a single comparison operator
//! for guard conditions. Template strings originate from user-authored
//! configuration files, so nothing here ever evaluates arbitrary code.

pub(crate) mod ast;
pub(crate) mod error;
pub(crate) mod lexer;
pub(crate) mod parser;

pub mod engine;
