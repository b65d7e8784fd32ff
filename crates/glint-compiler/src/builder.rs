//! The effect builder.
//!
//! Walks the Technique → Pass → Statement tree the external parser produced
//! and assembles an [`EffectDescription`]: per shader-stage assignment it
//! extracts an entry point, drives the shader backend, runs reflection
//! extraction, deduplicates the compiled shader against everything built so
//! far, and records the resulting index into the pass's stage slot.
//!
//! Build state is one explicit value — current technique/pass (the tail of
//! the effect under construction), active numeric profile, the per-pass
//! export set, the pending sub-pass count, and the persistent inline
//! preprocessor text. Statement order is semantically significant (`Profile`
//! must precede any shader assignment), so the walk is strictly sequential.
//! The one exception is `Export`: a pass's export statements are collected
//! up front so an export tags its shader regardless of where in the pass it
//! appears.
//!
//! Every user-facing problem is logged and the walk continues with best
//! effort; nothing here unwinds.

use crate::backend::{ShaderBackend, ShaderReflection, StageRequest};
use crate::error::{DiagnosticKind, Diagnostics};
use crate::reflect;
use glint_ast::ast;
use glint_ast::effect::{
    EffectDescription, Pass, PropertyValue, Shader, ShaderLink, ShaderMacro, ShaderStage,
    Technique,
};
use glint_ast::Span;
use indexmap::IndexSet;
use tracing::{debug, trace};

/// One already-compiled shader handed to the headless [`build`] path.
#[derive(Debug, Clone)]
pub struct PrecompiledShader {
    pub stage: ShaderStage,
    /// Public name recorded onto the shader.
    pub name: String,
    pub bytecode: Vec<u8>,
    pub reflection: Option<ShaderReflection>,
}

/// Reserved assignment keys, resolved through a static table; anything not
/// listed falls through to the pass properties bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKey {
    Export,
    BlendState,
    BlendColor,
    BlendSampleMask,
    DepthStencilState,
    DepthStencilReference,
    RasterizerState,
    ShareConstantBuffers,
    EffectName,
    SubPassCount,
    Preprocessor,
    Language,
    Profile,
    StreamOutputRasterizedStream,
    Stage(ShaderStage),
}

const STATEMENT_KEYS: &[(&str, StatementKey)] = &[
    ("Export", StatementKey::Export),
    ("BlendState", StatementKey::BlendState),
    ("BlendColor", StatementKey::BlendColor),
    ("BlendSampleMask", StatementKey::BlendSampleMask),
    ("DepthStencilState", StatementKey::DepthStencilState),
    ("DepthStencilReference", StatementKey::DepthStencilReference),
    ("RasterizerState", StatementKey::RasterizerState),
    ("ShareConstantBuffers", StatementKey::ShareConstantBuffers),
    ("EffectName", StatementKey::EffectName),
    ("SubPassCount", StatementKey::SubPassCount),
    ("Preprocessor", StatementKey::Preprocessor),
    ("Language", StatementKey::Language),
    ("Profile", StatementKey::Profile),
    (
        "StreamOutputRasterizedStream",
        StatementKey::StreamOutputRasterizedStream,
    ),
    ("VertexShader", StatementKey::Stage(ShaderStage::Vertex)),
    ("HullShader", StatementKey::Stage(ShaderStage::Hull)),
    ("DomainShader", StatementKey::Stage(ShaderStage::Domain)),
    ("GeometryShader", StatementKey::Stage(ShaderStage::Geometry)),
    ("FragmentShader", StatementKey::Stage(ShaderStage::Fragment)),
    ("ComputeShader", StatementKey::Stage(ShaderStage::Compute)),
];

/// Method-call statement forms of the per-stage assignments.
const STAGE_METHODS: &[(&str, ShaderStage)] = &[
    ("SetVertexShader", ShaderStage::Vertex),
    ("SetHullShader", ShaderStage::Hull),
    ("SetDomainShader", ShaderStage::Domain),
    ("SetGeometryShader", ShaderStage::Geometry),
    ("SetFragmentShader", ShaderStage::Fragment),
    ("SetComputeShader", ShaderStage::Compute),
];

/// Closed registry of builtin value constructors usable in attribute values.
struct BuiltinCtor {
    name: &'static str,
    arity: usize,
    build: fn(&[f64]) -> PropertyValue,
}

fn vector_value(args: &[f64]) -> PropertyValue {
    PropertyValue::Vector(args.to_vec())
}

const BUILTIN_CTORS: &[BuiltinCtor] = &[
    BuiltinCtor {
        name: "float2",
        arity: 2,
        build: vector_value,
    },
    BuiltinCtor {
        name: "float3",
        arity: 3,
        build: vector_value,
    },
    BuiltinCtor {
        name: "float4",
        arity: 4,
        build: vector_value,
    },
];

fn statement_key(name: &str) -> Option<StatementKey> {
    STATEMENT_KEYS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

fn stage_method(name: &str) -> Option<ShaderStage> {
    STAGE_METHODS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, stage)| *stage)
}

/// An extracted entry-point request.
#[derive(Debug, Clone, PartialEq)]
enum EntryPoint {
    /// Explicit "no shader" marker.
    Null,
    Named(String),
}

/// Builds one [`EffectDescription`] from a parsed effect AST.
pub struct EffectBuilder<'a> {
    backend: &'a dyn ShaderBackend,
    macros: &'a [ShaderMacro],
    keep_debug_info: bool,
    effect: EffectDescription,
    /// Preprocessed shading-language body of the source file.
    shader_body: String,
    /// Numeric profile in tenths; None until `Profile` is assigned.
    profile: Option<u32>,
    /// Entry points exported by the current pass.
    exports: IndexSet<String>,
    /// Passes still to be marked as sub-passes.
    pending_sub_passes: u32,
    /// Inline preprocessor text prepended to every stage compile; persists
    /// across pass boundaries until reassigned.
    preprocessor: String,
}

impl<'a> EffectBuilder<'a> {
    pub fn new(
        backend: &'a dyn ShaderBackend,
        macros: &'a [ShaderMacro],
        keep_debug_info: bool,
        effect_name: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            macros,
            keep_debug_info,
            effect: EffectDescription::new(effect_name),
            shader_body: String::new(),
            profile: None,
            exports: IndexSet::new(),
            pending_sub_passes: 0,
            preprocessor: String::new(),
        }
    }

    /// Walk the AST and assemble the effect. Diagnostics accumulate in
    /// `diags`; the returned description may be structurally incomplete if
    /// errors were logged.
    pub fn build_from_ast(
        mut self,
        node: &ast::Shader,
        diags: &mut Diagnostics,
    ) -> EffectDescription {
        self.shader_body = node.body.clone();
        for technique in &node.techniques {
            self.begin_technique(technique, diags);
            for pass in &technique.passes {
                self.begin_pass(pass, diags);
                for statement in &pass.statements {
                    self.handle_statement(statement, diags);
                }
                if let Some(current) = self.current_pass_mut() {
                    check_pass(current, Some(pass.span), diags);
                }
            }
        }
        self.effect
    }

    fn begin_technique(&mut self, technique: &ast::Technique, diags: &mut Diagnostics) {
        debug!(technique = %technique.name.name, "building technique");
        if self
            .effect
            .techniques
            .iter()
            .any(|t| t.name == technique.name.name)
        {
            diags.error(
                DiagnosticKind::DuplicateName,
                Some(technique.name.span),
                format!("technique '{}' is already defined", technique.name.name),
            );
        }
        self.effect
            .techniques
            .push(Technique::new(&technique.name.name));
    }

    fn begin_pass(&mut self, pass: &ast::Pass, diags: &mut Diagnostics) {
        debug!(pass = %pass.name.name, "building pass");
        let is_sub_pass = if self.pending_sub_passes > 0 {
            self.pending_sub_passes -= 1;
            true
        } else {
            false
        };

        // Exports tag shaders anywhere in the same pass, so collect them
        // before the statement walk. Invalid values are diagnosed when the
        // walk reaches them.
        self.exports.clear();
        for statement in &pass.statements {
            if let ast::Statement::Assignment { name, value, .. } = statement {
                if name.name == "Export" {
                    if let Some(names) = export_names(value) {
                        self.exports.extend(names);
                    }
                }
            }
        }

        let technique = self
            .effect
            .techniques
            .last_mut()
            .expect("pass outside a technique");
        if technique.passes.iter().any(|p| p.name == pass.name.name) {
            diags.error(
                DiagnosticKind::DuplicateName,
                Some(pass.name.span),
                format!(
                    "pass '{}' is already defined in technique '{}'",
                    pass.name.name, technique.name
                ),
            );
        }
        let mut new_pass = Pass::new(&pass.name.name);
        new_pass.is_sub_pass = is_sub_pass;
        technique.passes.push(new_pass);
    }

    fn current_pass_mut(&mut self) -> Option<&mut Pass> {
        self.effect.techniques.last_mut()?.passes.last_mut()
    }

    fn handle_statement(&mut self, statement: &ast::Statement, diags: &mut Diagnostics) {
        match statement {
            ast::Statement::Assignment { name, value, span } => {
                self.handle_assignment(name, value, *span, diags)
            }
            ast::Statement::Call(call) => self.handle_call(call, diags),
        }
    }

    /// Bare method-call statements are a secondary form of the per-stage
    /// assignments (`SetVertexShader(...)` etc.).
    fn handle_call(&mut self, call: &ast::MethodCall, diags: &mut Diagnostics) {
        let Some(stage) = stage_method(&call.name.name) else {
            diags.error(
                DiagnosticKind::Syntax,
                Some(call.span),
                format!("unsupported method call statement '{}'", call.name.name),
            );
            return;
        };
        if call.args.len() != 1 {
            diags.error(
                DiagnosticKind::Syntax,
                Some(call.span),
                format!(
                    "'{}' expects exactly one argument, got {}",
                    call.name.name,
                    call.args.len()
                ),
            );
            return;
        }
        self.handle_stage_assignment(stage, &call.args[0], diags);
    }

    fn handle_assignment(
        &mut self,
        name: &ast::Ident,
        value: &ast::Expression,
        span: Span,
        diags: &mut Diagnostics,
    ) {
        let Some(key) = statement_key(&name.name) else {
            // Open extension point: renderer states unknown to the compiler
            // are stored verbatim for the engine to interpret.
            self.set_property(&name.name, value, diags);
            return;
        };

        match key {
            StatementKey::Export => self.handle_export(value, span, diags),
            StatementKey::BlendState
            | StatementKey::DepthStencilState
            | StatementKey::RasterizerState => match eval_reference(value) {
                Some(reference) => self.insert_property(&name.name, PropertyValue::String(reference)),
                None => diags.error(
                    DiagnosticKind::Type,
                    Some(span),
                    format!("'{}' expects a state-object reference", name.name),
                ),
            },
            StatementKey::BlendColor => match self.eval_value(value) {
                Ok(PropertyValue::Vector(components)) if components.len() == 4 => {
                    self.insert_property(&name.name, PropertyValue::Vector(components))
                }
                _ => diags.error(
                    DiagnosticKind::Type,
                    Some(span),
                    "'BlendColor' expects a four-component value",
                ),
            },
            StatementKey::BlendSampleMask | StatementKey::DepthStencilReference => {
                match eval_number(value).and_then(coerce_u32) {
                    Some(mask) => self.insert_property(&name.name, PropertyValue::UInt(mask)),
                    None => diags.error(
                        DiagnosticKind::Type,
                        Some(span),
                        format!("'{}' expects an unsigned integer value", name.name),
                    ),
                }
            }
            StatementKey::ShareConstantBuffers => match eval_bool(value) {
                Some(share) => self.effect.share_constant_buffers = share,
                None => diags.error(
                    DiagnosticKind::Type,
                    Some(span),
                    "'ShareConstantBuffers' expects a boolean",
                ),
            },
            StatementKey::EffectName => match eval_string(value) {
                Some(effect_name) => self.effect.name = effect_name,
                None => diags.error(
                    DiagnosticKind::Type,
                    Some(span),
                    "'EffectName' expects a string",
                ),
            },
            StatementKey::SubPassCount => match eval_number(value).and_then(coerce_u32) {
                Some(count) => self.pending_sub_passes = count,
                None => diags.error(
                    DiagnosticKind::Type,
                    Some(span),
                    "'SubPassCount' expects a non-negative integer",
                ),
            },
            StatementKey::Preprocessor => match eval_text_block(value) {
                Some(text) => self.preprocessor = text,
                None => diags.error(
                    DiagnosticKind::Type,
                    Some(span),
                    "'Preprocessor' expects a string or an array of strings",
                ),
            },
            StatementKey::Language => {
                // Reserved keyword: the value is parsed with the profile rule
                // and discarded.
                if parse_profile_value(value).is_none() {
                    diags.error(
                        DiagnosticKind::Type,
                        Some(span),
                        "'Language' expects a version-like value",
                    );
                }
            }
            StatementKey::Profile => match parse_profile_value(value) {
                Some(profile) => {
                    trace!(profile, "profile set");
                    self.profile = Some(profile);
                }
                None => diags.error(
                    DiagnosticKind::Type,
                    Some(span),
                    "'Profile' expects a version-like value (e.g. 5.0 or fx_5_0)",
                ),
            },
            StatementKey::StreamOutputRasterizedStream => {
                match eval_number(value).filter(|n| n.fract() == 0.0) {
                    Some(stream) => self.set_rasterized_stream(stream as i32, span, diags),
                    None => diags.error(
                        DiagnosticKind::Type,
                        Some(span),
                        "'StreamOutputRasterizedStream' expects an integer",
                    ),
                }
            }
            StatementKey::Stage(stage) => self.handle_stage_assignment(stage, value, diags),
        }
    }

    fn handle_export(&mut self, value: &ast::Expression, span: Span, diags: &mut Diagnostics) {
        match export_names(value) {
            Some(names) => self.exports.extend(names),
            None => diags.error(
                DiagnosticKind::Type,
                Some(span),
                "'Export' expects a string or an array of strings",
            ),
        }
    }

    /// `StreamOutputRasterizedStream` requires a geometry link, creating a
    /// null one when the pass has none yet.
    fn set_rasterized_stream(&mut self, stream: i32, span: Span, diags: &mut Diagnostics) {
        let Some(pass) = self.current_pass_mut() else {
            diags.error(
                DiagnosticKind::Internal,
                Some(span),
                "statement outside a pass",
            );
            return;
        };
        if pass.pipeline.get(ShaderStage::Geometry).is_none() {
            pass.pipeline.set(ShaderStage::Geometry, ShaderLink::null());
        }
        pass.pipeline
            .get_mut(ShaderStage::Geometry)
            .expect("geometry link just installed")
            .stream_output_rasterized_stream = stream;
    }

    fn set_property(&mut self, name: &str, value: &ast::Expression, diags: &mut Diagnostics) {
        let span = value.span();
        match self.eval_value(value) {
            Ok(property) => self.insert_property(name, property),
            Err(message) => diags.error(DiagnosticKind::Type, Some(span), message),
        }
    }

    fn insert_property(&mut self, name: &str, value: PropertyValue) {
        if let Some(pass) = self.current_pass_mut() {
            pass.properties.insert(name.to_string(), value);
        }
    }

    /// Compile one shader-stage assignment and link the result.
    fn handle_stage_assignment(
        &mut self,
        stage: ShaderStage,
        expr: &ast::Expression,
        diags: &mut Diagnostics,
    ) {
        let span = expr.span();
        if self.current_pass_mut().is_none() {
            diags.error(
                DiagnosticKind::Internal,
                Some(span),
                "shader assignment outside a pass",
            );
            return;
        }

        let entry = match extract_entry_point(expr) {
            Ok(entry) => entry,
            Err((kind, err_span, message)) => {
                diags.error(kind, Some(err_span), message);
                return;
            }
        };

        let entry = match entry {
            EntryPoint::Null => {
                let pass = self.current_pass_mut().expect("checked above");
                let stream = pass
                    .pipeline
                    .get(stage)
                    .map(|link| link.stream_output_rasterized_stream)
                    .unwrap_or(-1);
                let mut link = ShaderLink::null();
                link.stream_output_rasterized_stream = stream;
                pass.pipeline.set(stage, link);
                return;
            }
            EntryPoint::Named(entry) => entry,
        };

        let Some(profile) = self.profile else {
            diags.error(
                DiagnosticKind::MissingProfile,
                Some(span),
                format!(
                    "cannot compile '{}': 'Profile' must be set before any shader assignment",
                    entry
                ),
            );
            return;
        };

        let source = if self.preprocessor.is_empty() {
            self.shader_body.clone()
        } else {
            format!("{}\n{}", self.preprocessor, self.shader_body)
        };
        trace!(stage = stage.name(), entry = %entry, profile, "compiling shader stage");
        let output = self.backend.compile_stage(&StageRequest {
            stage,
            entry_point: &entry,
            source: &source,
            profile,
            macros: self.macros,
        });

        if !output.succeeded() {
            diags.error(DiagnosticKind::BackendCompile, Some(span), output.diagnostics);
            return;
        }
        if !output.diagnostics.trim().is_empty() {
            diags.warning(
                DiagnosticKind::BackendCompile,
                Some(span),
                output.diagnostics.clone(),
            );
        }

        let mut bytecode = output.bytecode.expect("succeeded output has bytecode");
        if !self.keep_debug_info {
            if let Some(stripped) = self.backend.strip_debug_info(&bytecode) {
                bytecode = stripped;
            }
        }

        let name = if self.exports.contains(&entry) {
            Some(format!("{}::{}", self.effect.name, entry))
        } else {
            None
        };
        let mut shader = Shader {
            name,
            stage,
            bytecode,
            constant_buffers: Vec::new(),
            resources: Vec::new(),
        };
        if let Some(reflection) = &output.reflection {
            reflect::extract_parameters(&mut shader, reflection, diags);
        }

        let index = push_deduped(&mut self.effect.shaders, shader);
        let pass = self.current_pass_mut().expect("checked above");
        let stream = pass
            .pipeline
            .get(stage)
            .map(|link| link.stream_output_rasterized_stream)
            .unwrap_or(-1);
        pass.pipeline.set(
            stage,
            ShaderLink {
                shader_index: Some(index),
                import_name: None,
                stream_output_rasterized_stream: stream,
            },
        );
    }

    /// Evaluate an attribute value expression.
    fn eval_value(&self, expr: &ast::Expression) -> Result<PropertyValue, String> {
        match expr {
            ast::Expression::Literal(ast::Literal::Number(n), _) => Ok(PropertyValue::Number(*n)),
            ast::Expression::Literal(ast::Literal::String(s), _) => {
                Ok(PropertyValue::String(s.clone()))
            }
            ast::Expression::Literal(ast::Literal::Bool(b), _) => Ok(PropertyValue::Bool(*b)),
            ast::Expression::Literal(ast::Literal::Null, _) => {
                Err("null is not a valid attribute value".to_string())
            }
            ast::Expression::Identifier(ident) => Ok(PropertyValue::String(ident.name.clone())),
            ast::Expression::ArrayInitializer(items, _) => {
                let numbers: Option<Vec<f64>> = items.iter().map(eval_number).collect();
                if let Some(numbers) = numbers {
                    return Ok(PropertyValue::Vector(numbers));
                }
                let strings: Option<Vec<String>> = items.iter().map(eval_string).collect();
                match strings {
                    Some(strings) => Ok(PropertyValue::Strings(strings)),
                    None => Err("array values must be all numbers or all strings".to_string()),
                }
            }
            ast::Expression::MethodCall(call) => {
                let Some(ctor) = BUILTIN_CTORS.iter().find(|c| c.name == call.name.name) else {
                    return Err(format!("unknown value constructor '{}'", call.name.name));
                };
                if call.args.len() != ctor.arity {
                    return Err(format!(
                        "'{}' expects {} arguments, got {}",
                        ctor.name,
                        ctor.arity,
                        call.args.len()
                    ));
                }
                let args: Option<Vec<f64>> = call.args.iter().map(eval_number).collect();
                match args {
                    Some(args) => Ok((ctor.build)(&args)),
                    None => Err(format!("'{}' expects numeric arguments", ctor.name)),
                }
            }
            ast::Expression::Compile(_) => {
                Err("compile expression is not a valid attribute value".to_string())
            }
        }
    }
}

/// Headless path: synthesize an effect from already-compiled shaders,
/// skipping the DSL entirely. The produced description is indistinguishable
/// from one built by the DSL path.
///
/// # Panics
/// Panics if `results` is empty (programmer contract, not a diagnostic).
pub fn build(results: &[PrecompiledShader], diags: &mut Diagnostics) -> EffectDescription {
    assert!(
        !results.is_empty(),
        "build requires at least one precompiled shader result"
    );

    let mut effect = EffectDescription::new("");
    let mut technique = Technique::new("");
    let mut pass = Pass::new("");

    for result in results {
        let mut shader = Shader {
            name: Some(result.name.clone()),
            stage: result.stage,
            bytecode: result.bytecode.clone(),
            constant_buffers: Vec::new(),
            resources: Vec::new(),
        };
        if let Some(reflection) = &result.reflection {
            reflect::extract_parameters(&mut shader, reflection, diags);
        }
        let index = push_deduped(&mut effect.shaders, shader);
        pass.pipeline.set(result.stage, ShaderLink::to_shader(index));
    }

    check_pass(&mut pass, None, diags);
    technique.passes.push(pass);
    effect.techniques.push(technique);
    effect
}

/// Append a shader unless a structurally identical one exists; returns the
/// index of the surviving entry. Dedup is mandatory: the shaders collection
/// never holds two shape-identical entries.
fn push_deduped(shaders: &mut Vec<Shader>, shader: Shader) -> usize {
    if let Some(index) = shaders.iter().position(|existing| *existing == shader) {
        trace!(index, "reusing structurally identical shader");
        return index;
    }
    shaders.push(shader);
    shaders.len() - 1
}

/// End-of-pass consistency check.
///
/// A null geometry link with a non-negative rasterized stream needs a usable
/// vertex shader to pass through; the geometry slot then copies the vertex
/// slot's index and import name.
fn check_pass(pass: &mut Pass, span: Option<Span>, diags: &mut Diagnostics) {
    let Some(geometry) = pass.pipeline.get(ShaderStage::Geometry) else {
        return;
    };
    if !geometry.is_null() || geometry.stream_output_rasterized_stream < 0 {
        return;
    }
    let stream = geometry.stream_output_rasterized_stream;

    match pass.pipeline.get(ShaderStage::Vertex) {
        Some(vertex) if !vertex.is_null() => {
            let link = ShaderLink {
                shader_index: vertex.shader_index,
                import_name: vertex.import_name.clone(),
                stream_output_rasterized_stream: stream,
            };
            pass.pipeline.set(ShaderStage::Geometry, link);
        }
        _ => diags.error(
            DiagnosticKind::Consistency,
            span,
            format!(
                "pass '{}' uses geometry stream output without a vertex shader to pass through",
                pass.name
            ),
        ),
    }
}

/// Extract an entry point from a shader-stage assignment value.
///
/// Accepted forms: a bare identifier; a null/zero literal (null-shader
/// marker); `Compile(profile, Entry())`; `CompileShader(profile, Entry())`.
/// The inner entry-point call must take zero arguments.
fn extract_entry_point(
    expr: &ast::Expression,
) -> Result<EntryPoint, (DiagnosticKind, Span, String)> {
    match expr {
        ast::Expression::Identifier(ident) => Ok(EntryPoint::Named(ident.name.clone())),
        ast::Expression::Literal(ast::Literal::Null, _) => Ok(EntryPoint::Null),
        ast::Expression::Literal(ast::Literal::Number(n), _) if *n == 0.0 => Ok(EntryPoint::Null),
        ast::Expression::Compile(compile) => entry_from_call(&compile.entry),
        ast::Expression::MethodCall(call)
            if call.name.name == "Compile" || call.name.name == "CompileShader" =>
        {
            if call.args.len() != 2 {
                return Err((
                    DiagnosticKind::Syntax,
                    call.span,
                    format!(
                        "'{}' expects a profile and an entry-point call",
                        call.name.name
                    ),
                ));
            }
            if !matches!(call.args[0], ast::Expression::Identifier(_)) {
                return Err((
                    DiagnosticKind::Syntax,
                    call.args[0].span(),
                    format!("'{}' expects a profile identifier first", call.name.name),
                ));
            }
            match &call.args[1] {
                ast::Expression::MethodCall(entry) => entry_from_call(entry),
                other => Err((
                    DiagnosticKind::Syntax,
                    other.span(),
                    "expected an entry-point call".to_string(),
                )),
            }
        }
        other => Err((
            DiagnosticKind::Syntax,
            other.span(),
            "unsupported shader assignment expression".to_string(),
        )),
    }
}

fn entry_from_call(call: &ast::MethodCall) -> Result<EntryPoint, (DiagnosticKind, Span, String)> {
    if !call.args.is_empty() {
        return Err((
            DiagnosticKind::Syntax,
            call.span,
            format!(
                "entry point '{}' must not take default arguments",
                call.name.name
            ),
        ));
    }
    Ok(EntryPoint::Named(call.name.name.clone()))
}

/// Names listed by an `Export` statement.
fn export_names(expr: &ast::Expression) -> Option<Vec<String>> {
    match expr {
        ast::Expression::Literal(ast::Literal::String(s), _) => Some(vec![s.clone()]),
        ast::Expression::Identifier(ident) => Some(vec![ident.name.clone()]),
        ast::Expression::ArrayInitializer(items, _) => items.iter().map(eval_string).collect(),
        _ => None,
    }
}

fn eval_number(expr: &ast::Expression) -> Option<f64> {
    match expr {
        ast::Expression::Literal(ast::Literal::Number(n), _) => Some(*n),
        _ => None,
    }
}

fn eval_bool(expr: &ast::Expression) -> Option<bool> {
    match expr {
        ast::Expression::Literal(ast::Literal::Bool(b), _) => Some(*b),
        _ => None,
    }
}

fn eval_string(expr: &ast::Expression) -> Option<String> {
    match expr {
        ast::Expression::Literal(ast::Literal::String(s), _) => Some(s.clone()),
        ast::Expression::Identifier(ident) => Some(ident.name.clone()),
        _ => None,
    }
}

/// State-object references are identifiers or strings.
fn eval_reference(expr: &ast::Expression) -> Option<String> {
    eval_string(expr)
}

/// `Preprocessor` accepts a string or an array of strings joined by
/// newlines.
fn eval_text_block(expr: &ast::Expression) -> Option<String> {
    match expr {
        ast::Expression::Literal(ast::Literal::String(s), _) => Some(s.clone()),
        ast::Expression::ArrayInitializer(items, _) => {
            let lines: Option<Vec<String>> = items.iter().map(eval_string).collect();
            lines.map(|lines| lines.join("\n"))
        }
        _ => None,
    }
}

/// Coerce a numeric attribute value to u32, wrapping negative 32-bit values
/// (`-1` → `0xFFFFFFFF`). Fractional or out-of-range values fail.
fn coerce_u32(n: f64) -> Option<u32> {
    if n.fract() != 0.0 {
        return None;
    }
    if n < i32::MIN as f64 || n > u32::MAX as f64 {
        return None;
    }
    Some((n as i64) as u32)
}

/// Parse a `Profile`/`Language` value as `round(float × 10)`.
///
/// Identifiers use their numeric tail: `fx_5_0` → 5.0 → 50.
fn parse_profile_value(expr: &ast::Expression) -> Option<u32> {
    let value = match expr {
        ast::Expression::Literal(ast::Literal::Number(n), _) => *n,
        ast::Expression::Literal(ast::Literal::String(s), _) => s.parse::<f64>().ok()?,
        ast::Expression::Identifier(ident) => {
            let segments: Vec<&str> = ident.name.split('_').collect();
            if segments.len() < 2 {
                return None;
            }
            let major: u32 = segments[segments.len() - 2].parse().ok()?;
            let minor: u32 = segments[segments.len() - 1].parse().ok()?;
            major as f64 + minor as f64 / 10.0
        }
        _ => return None,
    };
    if !(0.0..=6553.5).contains(&value) {
        return None;
    }
    Some((value * 10.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use glint_ast::ast::{
        CompileExpr, Expression, Ident, Literal, MethodCall, Pass as AstPass, Statement,
        Technique as AstTechnique,
    };

    fn sp() -> Span {
        Span::new(0, 0, 0, 1)
    }

    fn ident(name: &str) -> Ident {
        Ident::new(name, sp())
    }

    fn assign(name: &str, value: Expression) -> Statement {
        Statement::Assignment {
            name: ident(name),
            value,
            span: sp(),
        }
    }

    fn number(n: f64) -> Expression {
        Expression::Literal(Literal::Number(n), sp())
    }

    fn string(s: &str) -> Expression {
        Expression::Literal(Literal::String(s.to_string()), sp())
    }

    fn compile_shader(profile: &str, entry: &str) -> Expression {
        Expression::MethodCall(MethodCall {
            name: ident("CompileShader"),
            args: vec![
                Expression::Identifier(ident(profile)),
                Expression::MethodCall(MethodCall {
                    name: ident(entry),
                    args: vec![],
                    span: sp(),
                }),
            ],
            span: sp(),
        })
    }

    fn shader_node(techniques: Vec<AstTechnique>) -> ast::Shader {
        ast::Shader {
            body: "float4 VSMain() { return 0; }".to_string(),
            techniques,
            span: sp(),
        }
    }

    fn technique(name: &str, passes: Vec<AstPass>) -> AstTechnique {
        AstTechnique {
            name: ident(name),
            passes,
            span: sp(),
        }
    }

    fn pass(name: &str, statements: Vec<Statement>) -> AstPass {
        AstPass {
            name: ident(name),
            statements,
            span: sp(),
        }
    }

    fn build_effect(
        backend: &MockBackend,
        node: &ast::Shader,
    ) -> (EffectDescription, Diagnostics) {
        let mut diags = Diagnostics::new();
        let builder = EffectBuilder::new(backend, &[], true, "Test");
        let effect = builder.build_from_ast(node, &mut diags);
        (effect, diags)
    }

    #[test]
    fn test_statement_key_table() {
        assert_eq!(statement_key("Profile"), Some(StatementKey::Profile));
        assert_eq!(
            statement_key("VertexShader"),
            Some(StatementKey::Stage(ShaderStage::Vertex))
        );
        assert_eq!(statement_key("MyCustomState"), None);
        assert_eq!(stage_method("SetComputeShader"), Some(ShaderStage::Compute));
        assert_eq!(stage_method("SetBlendState"), None);
    }

    #[test]
    fn test_coerce_u32_wraps_signed() {
        assert_eq!(coerce_u32(-1.0), Some(0xFFFF_FFFF));
        assert_eq!(coerce_u32(15.0), Some(15));
        assert_eq!(coerce_u32(1.5), None);
        assert_eq!(coerce_u32(u32::MAX as f64 + 1.0), None);
    }

    #[test]
    fn test_parse_profile_value_forms() {
        assert_eq!(parse_profile_value(&number(5.0)), Some(50));
        assert_eq!(parse_profile_value(&number(4.1)), Some(41));
        assert_eq!(parse_profile_value(&string("5.0")), Some(50));
        assert_eq!(
            parse_profile_value(&Expression::Identifier(ident("fx_5_0"))),
            Some(50)
        );
        assert_eq!(
            parse_profile_value(&Expression::Identifier(ident("vs_4_1"))),
            Some(41)
        );
        assert_eq!(
            parse_profile_value(&Expression::Identifier(ident("whatever"))),
            None
        );
    }

    #[test]
    fn test_extract_entry_point_forms() {
        assert_eq!(
            extract_entry_point(&Expression::Identifier(ident("VSMain"))),
            Ok(EntryPoint::Named("VSMain".to_string()))
        );
        assert_eq!(
            extract_entry_point(&number(0.0)),
            Ok(EntryPoint::Null)
        );
        assert_eq!(
            extract_entry_point(&Expression::Literal(Literal::Null, sp())),
            Ok(EntryPoint::Null)
        );
        assert_eq!(
            extract_entry_point(&compile_shader("vs_5_0", "VSMain")),
            Ok(EntryPoint::Named("VSMain".to_string()))
        );

        let compile_expr = Expression::Compile(CompileExpr {
            profile: ident("vs_5_0"),
            entry: MethodCall {
                name: ident("VSMain"),
                args: vec![],
                span: sp(),
            },
            span: sp(),
        });
        assert_eq!(
            extract_entry_point(&compile_expr),
            Ok(EntryPoint::Named("VSMain".to_string()))
        );
    }

    #[test]
    fn test_entry_point_default_arguments_rejected() {
        let with_args = Expression::MethodCall(MethodCall {
            name: ident("CompileShader"),
            args: vec![
                Expression::Identifier(ident("vs_5_0")),
                Expression::MethodCall(MethodCall {
                    name: ident("VSMain"),
                    args: vec![number(1.0)],
                    span: sp(),
                }),
            ],
            span: sp(),
        });
        let err = extract_entry_point(&with_args).unwrap_err();
        assert_eq!(err.0, DiagnosticKind::Syntax);
        assert!(err.2.contains("default arguments"));
    }

    #[test]
    fn test_missing_profile_skips_assignment() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass("P", vec![assign("VertexShader", compile_shader("vs_5_0", "VSMain"))])],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(diags.has_errors());
        assert_eq!(
            diags.messages()[0].kind,
            DiagnosticKind::MissingProfile
        );
        assert!(effect.shaders.is_empty());
        assert!(backend.compiled_entry_points().is_empty());
        let built_pass = &effect.techniques[0].passes[0];
        assert!(built_pass.pipeline.get(ShaderStage::Vertex).is_none());
    }

    #[test]
    fn test_null_shader_makes_no_backend_call() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("Profile", number(5.0)),
                    assign("GeometryShader", number(0.0)),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        assert!(backend.compiled_entry_points().is_empty());
        let link = effect.techniques[0].passes[0]
            .pipeline
            .get(ShaderStage::Geometry)
            .unwrap();
        assert!(link.is_null());
    }

    #[test]
    fn test_export_names_shader() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("EffectName", string("Foo")),
                    assign("Profile", Expression::Identifier(ident("fx_5_0"))),
                    assign("Export", string("VSMain")),
                    assign("VertexShader", compile_shader("vs_5_0", "VSMain")),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        assert_eq!(effect.shaders[0].name.as_deref(), Some("Foo::VSMain"));
    }

    #[test]
    fn test_unexported_shader_has_no_name() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("Profile", number(5.0)),
                    assign("VertexShader", compile_shader("vs_5_0", "VSMain")),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        assert_eq!(effect.shaders[0].name, None);
    }

    #[test]
    fn test_export_set_resets_per_pass() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![
                pass(
                    "P0",
                    vec![
                        assign("Profile", number(5.0)),
                        assign("Export", string("VSMain")),
                        assign("VertexShader", compile_shader("vs_5_0", "VSMain")),
                    ],
                ),
                pass(
                    "P1",
                    vec![assign("FragmentShader", compile_shader("ps_5_0", "VSMain"))],
                ),
            ],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        // Same entry point, different stage: second compile is not exported.
        assert_eq!(effect.shaders.len(), 2);
        assert!(effect.shaders[0].name.is_some());
        assert_eq!(effect.shaders[1].name, None);
    }

    #[test]
    fn test_dedup_across_passes() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![
                pass(
                    "P0",
                    vec![
                        assign("Profile", number(5.0)),
                        assign("VertexShader", compile_shader("vs_5_0", "VSMain")),
                    ],
                ),
                pass(
                    "P1",
                    vec![assign("VertexShader", compile_shader("vs_5_0", "VSMain"))],
                ),
            ],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        assert_eq!(effect.shaders.len(), 1);
        let p0 = &effect.techniques[0].passes[0];
        let p1 = &effect.techniques[0].passes[1];
        assert_eq!(
            p0.pipeline.get(ShaderStage::Vertex).unwrap().shader_index,
            Some(0)
        );
        assert_eq!(
            p1.pipeline.get(ShaderStage::Vertex).unwrap().shader_index,
            Some(0)
        );
    }

    #[test]
    fn test_preprocessor_changes_compiled_source() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![
                pass(
                    "P0",
                    vec![
                        assign("Profile", number(5.0)),
                        assign("VertexShader", compile_shader("vs_5_0", "VSMain")),
                    ],
                ),
                pass(
                    "P1",
                    vec![
                        assign("Preprocessor", string("#define FAST 1")),
                        assign("VertexShader", compile_shader("vs_5_0", "VSMain")),
                    ],
                ),
                // Preprocessor text persists into this pass.
                pass(
                    "P2",
                    vec![assign("VertexShader", compile_shader("vs_5_0", "VSMain"))],
                ),
            ],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        // P0 compiles plain; P1 and P2 share the preprocessor-prefixed blob.
        assert_eq!(effect.shaders.len(), 2);
        let p1 = &effect.techniques[0].passes[1];
        let p2 = &effect.techniques[0].passes[2];
        assert_eq!(
            p1.pipeline.get(ShaderStage::Vertex).unwrap().shader_index,
            p2.pipeline.get(ShaderStage::Vertex).unwrap().shader_index
        );
    }

    #[test]
    fn test_backend_failure_logged_with_backend_text() {
        let backend = MockBackend::new().with_failure("Broken", "error X1234: kaboom");
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("Profile", number(5.0)),
                    assign("VertexShader", compile_shader("vs_5_0", "Broken")),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(diags.has_errors());
        let diag = &diags.messages()[0];
        assert_eq!(diag.kind, DiagnosticKind::BackendCompile);
        assert!(diag.message.contains("error X1234: kaboom"));
        assert!(effect.shaders.is_empty());
    }

    #[test]
    fn test_backend_warning_logged() {
        let backend = MockBackend::new().with_warning("VSMain", "warning X4000: truncation");
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("Profile", number(5.0)),
                    assign("VertexShader", compile_shader("vs_5_0", "VSMain")),
                ],
            )],
        )]);
        let (_, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        assert_eq!(diags.len(), 1);
        assert!(diags.messages()[0].message.contains("X4000"));
    }

    #[test]
    fn test_duplicate_technique_appends_and_logs() {
        let backend = MockBackend::new();
        let node = shader_node(vec![
            technique("T", vec![pass("P", vec![])]),
            technique("T", vec![pass("P", vec![])]),
        ]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(diags.has_errors());
        let duplicates = diags
            .iter()
            .filter(|d| d.kind == DiagnosticKind::DuplicateName)
            .count();
        assert_eq!(duplicates, 1);
        assert_eq!(effect.techniques.len(), 2);
    }

    #[test]
    fn test_duplicate_pass_appends_and_logs() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass("P", vec![]), pass("P", vec![]), pass("Q", vec![])],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(diags.has_errors());
        assert_eq!(
            diags
                .iter()
                .filter(|d| d.kind == DiagnosticKind::DuplicateName)
                .count(),
            1
        );
        assert_eq!(effect.techniques[0].passes.len(), 3);
    }

    #[test]
    fn test_null_geometry_passthrough_copies_vertex() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("Profile", number(5.0)),
                    assign("VertexShader", compile_shader("vs_5_0", "VSMain")),
                    assign("GeometryShader", number(0.0)),
                    assign("StreamOutputRasterizedStream", number(0.0)),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        let built = &effect.techniques[0].passes[0];
        let vertex = built.pipeline.get(ShaderStage::Vertex).unwrap();
        let geometry = built.pipeline.get(ShaderStage::Geometry).unwrap();
        assert_eq!(geometry.shader_index, vertex.shader_index);
        assert_eq!(geometry.stream_output_rasterized_stream, 0);
    }

    #[test]
    fn test_null_geometry_without_vertex_is_consistency_error() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("Profile", number(5.0)),
                    assign("GeometryShader", number(0.0)),
                    assign("StreamOutputRasterizedStream", number(0.0)),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(diags.has_errors());
        assert_eq!(diags.messages()[0].kind, DiagnosticKind::Consistency);
        let geometry = effect.techniques[0].passes[0]
            .pipeline
            .get(ShaderStage::Geometry)
            .unwrap();
        assert!(geometry.is_null());
    }

    #[test]
    fn test_rasterized_stream_creates_geometry_link() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("Profile", number(5.0)),
                    assign("VertexShader", compile_shader("vs_5_0", "VSMain")),
                    assign("StreamOutputRasterizedStream", number(2.0)),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        let geometry = effect.techniques[0].passes[0]
            .pipeline
            .get(ShaderStage::Geometry)
            .unwrap();
        // Lazily created null link became a pass-through of the vertex slot.
        assert_eq!(geometry.stream_output_rasterized_stream, 2);
        assert_eq!(geometry.shader_index, Some(0));
    }

    #[test]
    fn test_unknown_key_lands_in_properties() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("MyEngineState", string("Additive")),
                    assign("Brightness", number(0.5)),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        let properties = &effect.techniques[0].passes[0].properties;
        assert_eq!(
            properties.get("MyEngineState"),
            Some(&PropertyValue::String("Additive".to_string()))
        );
        assert_eq!(
            properties.get("Brightness"),
            Some(&PropertyValue::Number(0.5))
        );
    }

    #[test]
    fn test_render_state_attributes() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("BlendState", Expression::Identifier(ident("AlphaBlend"))),
                    assign(
                        "BlendColor",
                        Expression::MethodCall(MethodCall {
                            name: ident("float4"),
                            args: vec![number(0.0), number(0.0), number(0.0), number(1.0)],
                            span: sp(),
                        }),
                    ),
                    assign("BlendSampleMask", number(-1.0)),
                    assign("DepthStencilReference", number(3.0)),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        let properties = &effect.techniques[0].passes[0].properties;
        assert_eq!(
            properties.get("BlendState"),
            Some(&PropertyValue::String("AlphaBlend".to_string()))
        );
        assert_eq!(
            properties.get("BlendColor"),
            Some(&PropertyValue::Vector(vec![0.0, 0.0, 0.0, 1.0]))
        );
        assert_eq!(
            properties.get("BlendSampleMask"),
            Some(&PropertyValue::UInt(0xFFFF_FFFF))
        );
        assert_eq!(
            properties.get("DepthStencilReference"),
            Some(&PropertyValue::UInt(3))
        );
    }

    #[test]
    fn test_blend_color_wrong_arity_is_type_error() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![assign(
                    "BlendColor",
                    Expression::MethodCall(MethodCall {
                        name: ident("float3"),
                        args: vec![number(0.0), number(0.0), number(0.0)],
                        span: sp(),
                    }),
                )],
            )],
        )]);
        let (_, diags) = build_effect(&backend, &node);

        assert!(diags.has_errors());
        assert_eq!(diags.messages()[0].kind, DiagnosticKind::Type);
    }

    #[test]
    fn test_sub_pass_count_marks_following_passes() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![
                pass("Main", vec![assign("SubPassCount", number(2.0))]),
                pass("Sub0", vec![]),
                pass("Sub1", vec![]),
                pass("Next", vec![]),
            ],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        let flags: Vec<bool> = effect.techniques[0]
            .passes
            .iter()
            .map(|p| p.is_sub_pass)
            .collect();
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn test_share_constant_buffers_and_language() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign(
                        "ShareConstantBuffers",
                        Expression::Literal(Literal::Bool(true), sp()),
                    ),
                    assign("Language", Expression::Identifier(ident("hlsl_5_0"))),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        assert!(effect.share_constant_buffers);
        // Language is parsed but intentionally unused.
        assert!(effect.techniques[0].passes[0].properties.is_empty());
    }

    #[test]
    fn test_set_vertex_shader_method_call_form() {
        let backend = MockBackend::new();
        let node = shader_node(vec![technique(
            "T",
            vec![pass(
                "P",
                vec![
                    assign("Profile", number(5.0)),
                    Statement::Call(MethodCall {
                        name: ident("SetVertexShader"),
                        args: vec![compile_shader("vs_5_0", "VSMain")],
                        span: sp(),
                    }),
                ],
            )],
        )]);
        let (effect, diags) = build_effect(&backend, &node);

        assert!(!diags.has_errors());
        assert_eq!(effect.shaders.len(), 1);
        assert_eq!(effect.shaders[0].stage, ShaderStage::Vertex);
    }

    #[test]
    fn test_headless_build_synthesizes_one_pass() {
        let mut diags = Diagnostics::new();
        let effect = build(
            &[
                PrecompiledShader {
                    stage: ShaderStage::Vertex,
                    name: "VS".to_string(),
                    bytecode: vec![1, 2, 3],
                    reflection: None,
                },
                PrecompiledShader {
                    stage: ShaderStage::Fragment,
                    name: "PS".to_string(),
                    bytecode: vec![4, 5, 6],
                    reflection: None,
                },
            ],
            &mut diags,
        );

        assert!(!diags.has_errors());
        assert_eq!(effect.techniques.len(), 1);
        assert_eq!(effect.techniques[0].passes.len(), 1);
        assert_eq!(effect.shaders.len(), 2);
        let built = &effect.techniques[0].passes[0];
        assert_eq!(
            built.pipeline.get(ShaderStage::Vertex).unwrap().shader_index,
            Some(0)
        );
        assert_eq!(
            built
                .pipeline
                .get(ShaderStage::Fragment)
                .unwrap()
                .shader_index,
            Some(1)
        );
        assert_eq!(effect.shaders[0].name.as_deref(), Some("VS"));
    }

    #[test]
    #[should_panic(expected = "at least one precompiled shader")]
    fn test_headless_build_rejects_empty_input() {
        let mut diags = Diagnostics::new();
        let _ = build(&[], &mut diags);
    }
}
