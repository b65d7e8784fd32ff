//! Deterministic in-memory shader backend.
//!
//! Compiles nothing: bytecode is a stable function of the request, and
//! reflection is whatever the test (or dry-run embedder) scripted per entry
//! point. Identical requests always produce identical output, which makes
//! structural dedup and determinism testable without a native toolchain.

use super::{ShaderBackend, ShaderReflection, StageOutput, StageRequest};
use std::cell::RefCell;
use std::collections::HashMap;

/// Scripted, deterministic [`ShaderBackend`].
#[derive(Debug, Default)]
pub struct MockBackend {
    reflections: HashMap<String, ShaderReflection>,
    warnings: HashMap<String, String>,
    failures: HashMap<String, String>,
    compiled: RefCell<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reflection returned for an entry point.
    pub fn with_reflection(mut self, entry_point: &str, reflection: ShaderReflection) -> Self {
        self.reflections.insert(entry_point.to_string(), reflection);
        self
    }

    /// Script warning text for an entry point (compile still succeeds).
    pub fn with_warning(mut self, entry_point: &str, text: &str) -> Self {
        self.warnings.insert(entry_point.to_string(), text.to_string());
        self
    }

    /// Script a failure for an entry point, with backend diagnostic text.
    pub fn with_failure(mut self, entry_point: &str, text: &str) -> Self {
        self.failures.insert(entry_point.to_string(), text.to_string());
        self
    }

    /// Entry points compiled so far, in call order.
    pub fn compiled_entry_points(&self) -> Vec<String> {
        self.compiled.borrow().clone()
    }
}

impl ShaderBackend for MockBackend {
    fn compile_stage(&self, request: &StageRequest<'_>) -> StageOutput {
        self.compiled
            .borrow_mut()
            .push(request.entry_point.to_string());

        if let Some(text) = self.failures.get(request.entry_point) {
            return StageOutput {
                bytecode: None,
                diagnostics: text.clone(),
                reflection: None,
            };
        }

        let mut blob = format!(
            "mock:{}:{}:{}",
            request.stage.name(),
            request.entry_point,
            request.profile
        );
        for m in request.macros {
            blob.push(':');
            blob.push_str(&m.name);
            if let Some(value) = &m.value {
                blob.push('=');
                blob.push_str(value);
            }
        }
        blob.push(':');
        blob.push_str(&checksum(request.source));

        StageOutput {
            bytecode: Some(blob.into_bytes()),
            diagnostics: self
                .warnings
                .get(request.entry_point)
                .cloned()
                .unwrap_or_default(),
            reflection: Some(
                self.reflections
                    .get(request.entry_point)
                    .cloned()
                    .unwrap_or_default(),
            ),
        }
    }
}

/// Stable FNV-1a checksum of the source text.
fn checksum(source: &str) -> String {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in source.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{hash:016x}")
}
