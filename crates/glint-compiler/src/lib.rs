//! # glint effect compiler
//!
//! Compiles a declarative shading-effect DSL — techniques containing passes
//! containing shader-stage assignments and render-state attributes — into a
//! serialized, versioned [`EffectDescription`](glint_ast::effect::EffectDescription)
//! a rendering engine consumes at draw time.
//!
//! ## Architecture
//!
//! ```text
//! source text
//!     ↓  EffectFrontend (external lexer/parser/preprocessor)
//! glint_ast::ast::Shader + dependency list
//!     ↓  EffectBuilder (statement walk, build state, dedup)
//!     ↓  ShaderBackend (one blocking compile per stage)
//!     ↓  reflect (constant buffers, resource reassembly)
//! EffectDescription + Diagnostics + dependency sidecar
//! ```
//!
//! The whole compile is synchronous and single-threaded: build state is
//! sequential and statement order is semantically significant. Callers
//! needing parallel throughput run independent
//! [`EffectCompiler::compile`] invocations, each owning its own state.
//!
//! ## Backends
//!
//! The default build carries only the [`ShaderBackend`] trait and the
//! deterministic [`backend::mock::MockBackend`]. Enable the
//! `native-backend` feature for the shaderc-backed production backend.

pub mod backend;
pub mod builder;
pub mod compile;
pub mod deps;
pub mod error;
pub mod reflect;

pub use backend::{ShaderBackend, ShaderReflection, StageOutput, StageRequest};
pub use builder::{EffectBuilder, PrecompiledShader};
pub use compile::{
    deserialize_effect, format_diagnostics, serialize_effect, ArchiveError, CompileFlags,
    CompileOptions, CompileOutput, EffectCompiler, EffectFrontend,
};
pub use deps::{DependencyError, DependencyRecord, DependencyTracker};
pub use error::{Diagnostic, DiagnosticFormatter, DiagnosticKind, Diagnostics, Severity};

/// Compiler version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
