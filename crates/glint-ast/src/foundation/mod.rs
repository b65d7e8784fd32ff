//! Foundation types shared by the parser boundary and the compiler.

mod span;

pub use span::{SourceFile, SourceMap, Span};
