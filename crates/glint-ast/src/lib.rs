//! # glint AST and effect data model
//!
//! Leaf crate for the glint effect compiler. It holds everything the
//! compiler crate consumes or produces that has no behavior of its own:
//!
//! - [`foundation`] — source spans and the source map used for diagnostics
//! - [`ast`] — the abstract syntax tree the external effect parser produces
//! - [`effect`] — the compiled, engine-consumable effect description
//!
//! The compiler proper lives in `glint-compiler`; this crate deliberately
//! carries no compilation logic so that engines embedding only the *runtime*
//! side of effects can depend on the data model alone.

pub mod ast;
pub mod effect;
pub mod foundation;

pub use foundation::{SourceFile, SourceMap, Span};
