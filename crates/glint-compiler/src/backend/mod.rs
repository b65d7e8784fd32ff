//! The shader backend boundary.
//!
//! The effect builder never talks to a native shader compiler directly; it
//! goes through [`ShaderBackend`], a narrow trait with one blocking compile
//! call per declared shader stage. The production implementation
//! ([`shaderc::ShadercBackend`], feature `native-backend`) wraps the shaderc
//! toolchain; [`mock::MockBackend`] is a deterministic in-memory stand-in
//! for tests and dry runs.
//!
//! Reflection crosses this boundary as a backend-neutral
//! [`ShaderReflection`] value so the core never holds native handles; each
//! implementation releases its compiler/reflection state before returning,
//! on success and failure alike.

pub mod mock;
#[cfg(feature = "native-backend")]
pub mod shaderc;

use glint_ast::effect::{ParameterClass, ShaderMacro, ShaderStage, ValueType};
use serde::{Deserialize, Serialize};

/// One stage-compile request.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRequest<'a> {
    pub stage: ShaderStage,
    /// Entry-point function name inside `source`.
    pub entry_point: &'a str,
    /// Full source text (pending preprocessor block + parser body).
    pub source: &'a str,
    /// Numeric profile in tenths (`Profile = 5.0` → 50).
    pub profile: u32,
    pub macros: &'a [ShaderMacro],
}

/// Result of one stage compile.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    /// Compiled binary; None on failure.
    pub bytecode: Option<Vec<u8>>,
    /// Raw backend diagnostic text: errors on failure, warnings (possibly
    /// empty) on success.
    pub diagnostics: String,
    /// Reflection for the compiled binary; None on failure.
    pub reflection: Option<ShaderReflection>,
}

impl StageOutput {
    /// True when the backend produced usable bytecode.
    pub fn succeeded(&self) -> bool {
        self.bytecode.as_ref().is_some_and(|b| !b.is_empty())
    }
}

/// Wraps one blocking call into an external shading-language compiler.
pub trait ShaderBackend {
    /// Compile one shader stage. Blocking, no retries.
    fn compile_stage(&self, request: &StageRequest<'_>) -> StageOutput;

    /// Strip debug/reflection info from compiled bytecode.
    ///
    /// Returns None when the backend has nothing to strip; the caller keeps
    /// the original bytecode in that case.
    fn strip_debug_info(&self, _bytecode: &[u8]) -> Option<Vec<u8>> {
        None
    }
}

/// Backend-reported metadata for one compiled shader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShaderReflection {
    pub constant_buffers: Vec<ReflectedConstantBuffer>,
    pub resources: Vec<ReflectedResource>,
}

/// A uniform/constant buffer as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedConstantBuffer {
    pub name: String,
    /// Total byte size.
    pub size: u32,
    pub members: Vec<ReflectedMember>,
}

/// One member variable inside a reflected buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedMember {
    pub name: String,
    pub offset: u32,
    pub size: u32,
    /// Array element count; 1 for non-arrays.
    pub count: u32,
    pub class: ParameterClass,
    pub ty: ValueType,
    /// Matrix row count; 0 for non-matrices.
    pub row_count: u8,
}

/// A bound resource as the backend reports it.
///
/// `name` may carry a trailing `[index]` when the compiler split an
/// indexable resource array into per-index bindings; the reflection
/// extractor reassembles those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedResource {
    pub name: String,
    pub kind: ReflectedResourceKind,
    /// Backing register/binding slot.
    pub slot: u32,
    /// Element count of this binding; 1 for non-arrays.
    pub count: u32,
}

/// Backend resource classification: descriptor kind plus dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReflectedResourceKind {
    UniformBuffer,
    /// Read-only sampled texture of some dimension.
    SampledTexture(TextureDimension),
    /// Read-write storage texture of some dimension.
    StorageTexture(TextureDimension),
    StorageBuffer,
    Sampler,
}

/// Texture dimensionality, including the texel-buffer case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureDimension {
    Buffer,
    D1,
    D2,
    D3,
    Cube,
}
