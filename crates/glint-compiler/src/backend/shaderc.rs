//! Production backend: shaderc compilation + spirq reflection.
//!
//! One blocking `compile_into_spirv` call per stage, with the fixed option
//! set the effect DSL assumes: HLSL source language, extended HLSL
//! functionality, legacy-style I/O and register-offset mapping, automatic
//! uniform binding, and the effect-level numeric profile forced onto the
//! compile. Option objects and reflection state are scoped to the call and
//! released before it returns, on every path.

use super::{
    ReflectedConstantBuffer, ReflectedMember, ReflectedResource, ReflectedResourceKind,
    ShaderBackend, ShaderReflection, StageOutput, StageRequest, TextureDimension,
};
use glint_ast::effect::{ParameterClass, ShaderStage, ValueType};
use shaderc::{CompileOptions, Compiler, GlslProfile, ShaderKind, SourceLanguage};

/// SPIR-V opcodes of debug-class instructions removed by stripping.
const DEBUG_OPCODES: &[u32] = &[
    2,   // OpSourceContinued
    3,   // OpSource
    4,   // OpSourceExtension
    5,   // OpName
    6,   // OpMemberName
    7,   // OpString
    8,   // OpLine
    317, // OpNoLine
    330, // OpModuleProcessed
];

/// Errors constructing the backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendInitError {
    #[error("failed to initialize the shaderc compiler")]
    CompilerUnavailable,
}

/// shaderc-backed [`ShaderBackend`].
pub struct ShadercBackend {
    compiler: Compiler,
}

impl ShadercBackend {
    pub fn new() -> Result<Self, BackendInitError> {
        let compiler = Compiler::new().ok_or(BackendInitError::CompilerUnavailable)?;
        Ok(Self { compiler })
    }

    fn stage_kind(stage: ShaderStage) -> ShaderKind {
        match stage {
            ShaderStage::Vertex => ShaderKind::Vertex,
            ShaderStage::Hull => ShaderKind::TessControl,
            ShaderStage::Domain => ShaderKind::TessEvaluation,
            ShaderStage::Geometry => ShaderKind::Geometry,
            ShaderStage::Fragment => ShaderKind::Fragment,
            ShaderStage::Compute => ShaderKind::Compute,
        }
    }
}

impl ShaderBackend for ShadercBackend {
    fn compile_stage(&self, request: &StageRequest<'_>) -> StageOutput {
        let Some(mut options) = CompileOptions::new() else {
            return StageOutput {
                bytecode: None,
                diagnostics: "failed to allocate shaderc compile options".to_string(),
                reflection: None,
            };
        };
        options.set_source_language(SourceLanguage::HLSL);
        options.set_hlsl_functionality1(true);
        options.set_hlsl_io_mapping(true);
        options.set_hlsl_offsets(true);
        options.set_auto_bind_uniforms(true);
        options.set_forced_version_profile(request.profile * 10, GlslProfile::None);
        for m in request.macros {
            options.add_macro_definition(&m.name, m.value.as_deref());
        }

        let artifact = self.compiler.compile_into_spirv(
            request.source,
            Self::stage_kind(request.stage),
            "glint-effect",
            request.entry_point,
            Some(&options),
        );

        match artifact {
            Ok(artifact) => {
                let reflection = reflect_spirv(artifact.as_binary(), request.entry_point);
                StageOutput {
                    bytecode: Some(artifact.as_binary_u8().to_vec()),
                    diagnostics: artifact.get_warning_messages(),
                    reflection: Some(reflection),
                }
            }
            Err(err) => StageOutput {
                bytecode: None,
                diagnostics: err.to_string(),
                reflection: None,
            },
        }
    }

    fn strip_debug_info(&self, bytecode: &[u8]) -> Option<Vec<u8>> {
        strip_spirv_debug(bytecode)
    }
}

/// Build the neutral reflection object from SPIR-V words.
fn reflect_spirv(words: &[u32], entry_point: &str) -> ShaderReflection {
    let mut reflection = ShaderReflection::default();

    let entry_points = match spirq::ReflectConfig::new()
        .spv(words)
        .ref_all_rscs(true)
        .reflect()
    {
        Ok(entry_points) => entry_points,
        Err(_) => return reflection,
    };

    for entry in &entry_points {
        if entry.name != entry_point {
            continue;
        }
        for var in entry.vars.iter() {
            let spirq::var::Variable::Descriptor {
                name,
                desc_bind,
                desc_ty,
                ty,
                nbind,
            } = var
            else {
                continue;
            };
            let name = name.clone().unwrap_or_default();
            let slot = desc_bind.bind();
            let count = (*nbind).max(1);

            let kind = match desc_ty {
                spirq::ty::DescriptorType::UniformBuffer() => {
                    reflection.constant_buffers.push(reflect_buffer(&name, ty));
                    ReflectedResourceKind::UniformBuffer
                }
                spirq::ty::DescriptorType::StorageBuffer(_) => ReflectedResourceKind::StorageBuffer,
                spirq::ty::DescriptorType::SampledImage()
                | spirq::ty::DescriptorType::CombinedImageSampler() => {
                    ReflectedResourceKind::SampledTexture(image_dimension(ty))
                }
                spirq::ty::DescriptorType::StorageImage(_) => {
                    ReflectedResourceKind::StorageTexture(image_dimension(ty))
                }
                spirq::ty::DescriptorType::UniformTexelBuffer() => {
                    ReflectedResourceKind::SampledTexture(TextureDimension::Buffer)
                }
                spirq::ty::DescriptorType::StorageTexelBuffer(_) => {
                    ReflectedResourceKind::StorageTexture(TextureDimension::Buffer)
                }
                spirq::ty::DescriptorType::Sampler() => ReflectedResourceKind::Sampler,
                _ => continue,
            };

            reflection.resources.push(ReflectedResource {
                name,
                kind,
                slot,
                count,
            });
        }
    }

    reflection
}

/// Convert a reflected buffer struct into the neutral constant-buffer shape.
fn reflect_buffer(name: &str, ty: &spirq::ty::Type) -> ReflectedConstantBuffer {
    let mut members = Vec::new();
    if let spirq::ty::Type::Struct(st) = ty {
        for member in &st.members {
            let (class, value_ty, row_count, count) = member_shape(&member.ty);
            members.push(ReflectedMember {
                name: member.name.clone().unwrap_or_default(),
                offset: member.offset.unwrap_or(0) as u32,
                size: member.ty.nbyte().unwrap_or(0) as u32,
                count,
                class,
                ty: value_ty,
                row_count,
            });
        }
    }
    ReflectedConstantBuffer {
        name: name.to_string(),
        size: ty.nbyte().unwrap_or(0) as u32,
        members,
    }
}

/// Classify a member type into (class, element type, matrix rows, count).
fn member_shape(ty: &spirq::ty::Type) -> (ParameterClass, ValueType, u8, u32) {
    use spirq::ty::Type;
    match ty {
        Type::Scalar(s) => (ParameterClass::Scalar, scalar_value_type(s), 0, 1),
        Type::Vector(v) => (ParameterClass::Vector, scalar_value_type(&v.scalar_ty), 0, 1),
        Type::Matrix(m) => (
            ParameterClass::MatrixColumns,
            scalar_value_type(&m.vector_ty.scalar_ty),
            m.vector_ty.nscalar as u8,
            1,
        ),
        Type::Array(a) => {
            let (class, value_ty, rows, _) = member_shape(&a.element_ty);
            (class, value_ty, rows, a.nelement.unwrap_or(0))
        }
        Type::Struct(_) => (ParameterClass::Struct, ValueType::Float, 0, 1),
        _ => (ParameterClass::Scalar, ValueType::Float, 0, 1),
    }
}

fn scalar_value_type(scalar: &spirq::ty::ScalarType) -> ValueType {
    use spirq::ty::ScalarType;
    match scalar {
        ScalarType::Float { bits: 64 } => ValueType::Double,
        ScalarType::Float { .. } => ValueType::Float,
        ScalarType::Integer { is_signed: true, .. } => ValueType::Int,
        ScalarType::Integer {
            is_signed: false, ..
        } => ValueType::UInt,
        ScalarType::Boolean => ValueType::Bool,
        _ => ValueType::Float,
    }
}

/// Texture dimensionality of an image-like type; defaults to 2D.
fn image_dimension(ty: &spirq::ty::Type) -> TextureDimension {
    use spirq::ty::Type;
    let dim = match ty {
        Type::Image(img) => Some(img.dim),
        Type::SampledImage(img) => Some(img.dim),
        Type::StorageImage(img) => Some(img.dim),
        Type::CombinedImageSampler(combined) => Some(combined.sampled_img_ty.dim),
        _ => None,
    };
    match dim {
        Some(spirq::spirv::Dim::Dim1D) => TextureDimension::D1,
        Some(spirq::spirv::Dim::Dim3D) => TextureDimension::D3,
        Some(spirq::spirv::Dim::DimCube) => TextureDimension::Cube,
        Some(spirq::spirv::Dim::DimBuffer) => TextureDimension::Buffer,
        _ => TextureDimension::D2,
    }
}

/// Remove debug-class instructions from a SPIR-V module.
///
/// Returns None if the input is not a well-formed little-endian SPIR-V
/// stream, leaving the original bytecode in place.
fn strip_spirv_debug(bytecode: &[u8]) -> Option<Vec<u8>> {
    if bytecode.len() < 20 || bytecode.len() % 4 != 0 {
        return None;
    }
    let words: Vec<u32> = bytecode
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    if words[0] != 0x0723_0203 {
        return None;
    }

    let mut out: Vec<u32> = words[..5].to_vec();
    let mut cursor = 5;
    while cursor < words.len() {
        let word = words[cursor];
        let word_count = (word >> 16) as usize;
        let opcode = word & 0xffff;
        if word_count == 0 || cursor + word_count > words.len() {
            return None;
        }
        if !DEBUG_OPCODES.contains(&opcode) {
            out.extend_from_slice(&words[cursor..cursor + word_count]);
        }
        cursor += word_count;
    }

    Some(out.iter().flat_map(|w| w.to_le_bytes()).collect())
}
