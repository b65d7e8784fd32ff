//! High-level compile API.
//!
//! Two entry paths produce the same artifact:
//!
//! - the DSL path ([`EffectCompiler::compile`]) hands the source to the
//!   external parser behind [`EffectFrontend`], then walks the resulting AST
//! - the headless path ([`EffectCompiler::build`]) synthesizes a single
//!   technique/pass around already-compiled shader results
//!
//! Downstream consumers cannot distinguish the two origins.
//!
//! Side effects are success-only: the dependency sidecar is written and
//! [`CompilerArguments`] are recorded onto the effect only when the compile
//! finished without errors.

use crate::backend::ShaderBackend;
use crate::builder::{self, EffectBuilder, PrecompiledShader};
use crate::deps::{DependencyRecord, DependencyTracker};
use crate::error::{DiagnosticFormatter, DiagnosticKind, Diagnostics};
use glint_ast::ast;
use glint_ast::effect::{
    CompilerArguments, EffectDescription, ShaderMacro, EFFECT_FORMAT_VERSION, EFFECT_MAGIC,
};
use glint_ast::SourceMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compile behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileFlags {
    /// Keep debug/reflection info in the compiled bytecode instead of
    /// stripping it after compilation.
    pub keep_debug_info: bool,
}

/// Parameters of one compile invocation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub flags: CompileFlags,
    pub macros: Vec<ShaderMacro>,
    pub include_dirs: Vec<PathBuf>,
    /// Record [`CompilerArguments`] onto the effect for later from-scratch
    /// recompilation.
    pub allow_dynamic_compiling: bool,
    /// Where to persist the dependency sidecar; None skips it.
    pub dependency_file_path: Option<PathBuf>,
}

/// The external lexer/parser/preprocessor boundary.
///
/// Implementations tokenize and parse effect source into the AST contract,
/// resolving includes against `include_dirs` and recording every opened file
/// into the dependency tracker. A fatal syntax failure returns None with the
/// diagnostics already logged; that is the only condition that stops the
/// compile before the AST walk.
pub trait EffectFrontend {
    fn parse(
        &self,
        source: &str,
        file_path: &Path,
        macros: &[ShaderMacro],
        include_dirs: &[PathBuf],
        deps: &mut DependencyTracker,
        diags: &mut Diagnostics,
    ) -> Option<ast::Shader>;
}

/// Everything one compile invocation produced.
#[derive(Debug)]
pub struct CompileOutput {
    /// The compiled effect; None when the parser failed, possibly
    /// structurally incomplete when diagnostics contain errors.
    pub effect: Option<EffectDescription>,
    pub diagnostics: Diagnostics,
    /// Sources registered for diagnostic rendering.
    pub sources: SourceMap,
    /// Files visited during parsing, in record order.
    pub dependencies: Vec<DependencyRecord>,
}

impl CompileOutput {
    /// Callers must check this before trusting [`CompileOutput::effect`].
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Drives effect compilation against one shader backend.
///
/// The compiler is synchronous and owns no shared mutable state; callers
/// needing parallel throughput run independent compile invocations.
pub struct EffectCompiler<'b> {
    backend: &'b dyn ShaderBackend,
}

impl<'b> EffectCompiler<'b> {
    pub fn new(backend: &'b dyn ShaderBackend) -> Self {
        Self { backend }
    }

    /// Compile effect source text (the DSL path).
    pub fn compile(
        &self,
        frontend: &dyn EffectFrontend,
        source: &str,
        file_path: &Path,
        options: &CompileOptions,
    ) -> CompileOutput {
        let mut diags = Diagnostics::new();
        let mut tracker = DependencyTracker::new();
        let mut sources = SourceMap::new();
        sources.add_file(file_path.to_path_buf(), source.to_string());
        tracker.record(file_path);

        debug!(file = %file_path.display(), "compiling effect");
        let Some(node) = frontend.parse(
            source,
            file_path,
            &options.macros,
            &options.include_dirs,
            &mut tracker,
            &mut diags,
        ) else {
            return CompileOutput {
                effect: None,
                diagnostics: diags,
                sources,
                dependencies: tracker.records().to_vec(),
            };
        };

        let effect_name = file_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let builder = EffectBuilder::new(
            self.backend,
            &options.macros,
            options.flags.keep_debug_info,
            effect_name,
        );
        let mut effect = builder.build_from_ast(&node, &mut diags);

        if !diags.has_errors() {
            if options.allow_dynamic_compiling {
                effect.arguments = Some(CompilerArguments {
                    file_path: file_path.to_path_buf(),
                    dependency_file_path: options.dependency_file_path.clone(),
                    macros: options.macros.clone(),
                    include_dirs: options.include_dirs.clone(),
                });
            }
            if let Some(dependency_path) = &options.dependency_file_path {
                if let Err(err) = tracker.save(dependency_path) {
                    diags.error(DiagnosticKind::Io, None, err.to_string());
                }
            }
        }

        CompileOutput {
            effect: Some(effect),
            diagnostics: diags,
            sources,
            dependencies: tracker.records().to_vec(),
        }
    }

    /// Read an effect source file and compile it.
    pub fn compile_file(
        &self,
        frontend: &dyn EffectFrontend,
        file_path: &Path,
        options: &CompileOptions,
    ) -> CompileOutput {
        match std::fs::read_to_string(file_path) {
            Ok(source) => self.compile(frontend, &source, file_path, options),
            Err(err) => {
                let mut diags = Diagnostics::new();
                diags.error(
                    DiagnosticKind::Io,
                    None,
                    format!("cannot read effect source {}: {}", file_path.display(), err),
                );
                CompileOutput {
                    effect: None,
                    diagnostics: diags,
                    sources: SourceMap::new(),
                    dependencies: Vec::new(),
                }
            }
        }
    }

    /// Headless path: build an effect from already-compiled shader results,
    /// skipping the DSL entirely. Diagnostics (reflection extraction can
    /// still raise them) accumulate in `diags`.
    ///
    /// # Panics
    /// Panics if `results` is empty (programmer contract, not a diagnostic).
    pub fn build(
        &self,
        results: &[PrecompiledShader],
        diags: &mut Diagnostics,
    ) -> EffectDescription {
        builder::build(results, diags)
    }
}

/// Errors framing or unframing an effect archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to encode effect archive: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode effect archive: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("not an effect archive (bad magic)")]
    BadMagic,
    #[error("unsupported effect archive version {0} (expected {EFFECT_FORMAT_VERSION})")]
    UnsupportedVersion(u32),
}

#[derive(Serialize)]
struct ArchiveRef<'a> {
    magic: u32,
    version: u32,
    effect: &'a EffectDescription,
}

#[derive(Deserialize)]
struct ArchiveOwned {
    magic: u32,
    version: u32,
    effect: EffectDescription,
}

/// Serialize an effect into the versioned MessagePack archive format.
pub fn serialize_effect(effect: &EffectDescription) -> Result<Vec<u8>, ArchiveError> {
    Ok(rmp_serde::to_vec_named(&ArchiveRef {
        magic: EFFECT_MAGIC,
        version: EFFECT_FORMAT_VERSION,
        effect,
    })?)
}

/// Deserialize an effect archive, rejecting foreign or mismatched data.
pub fn deserialize_effect(bytes: &[u8]) -> Result<EffectDescription, ArchiveError> {
    let archive: ArchiveOwned = rmp_serde::from_slice(bytes)?;
    if archive.magic != EFFECT_MAGIC {
        return Err(ArchiveError::BadMagic);
    }
    if archive.version != EFFECT_FORMAT_VERSION {
        return Err(ArchiveError::UnsupportedVersion(archive.version));
    }
    Ok(archive.effect)
}

/// Render diagnostics with source context.
pub fn format_diagnostics(diagnostics: &Diagnostics, sources: &SourceMap) -> String {
    DiagnosticFormatter::new(sources).format_all(diagnostics)
}
