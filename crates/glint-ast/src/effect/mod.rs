//! The compiled effect description.
//!
//! This is the artifact the compiler produces and the engine consumes at
//! draw time: an [`EffectDescription`] owning an ordered set of techniques,
//! each technique an ordered set of passes, each pass a per-stage
//! [`Pipeline`] of [`ShaderLink`]s plus a bag of render-state properties.
//! Compiled shader blobs live in one flat [`EffectDescription::shaders`]
//! collection; passes reference them by index so structurally identical
//! shaders are stored exactly once.
//!
//! The whole model is plain serde data. Archive framing (magic, format
//! version, MessagePack payload) is applied by `glint-compiler`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Magic tag at the head of a serialized effect archive (`"GLFX"`).
pub const EFFECT_MAGIC: u32 = u32::from_le_bytes(*b"GLFX");

/// Format version written into and required from effect archives.
pub const EFFECT_FORMAT_VERSION: u32 = 1;

/// One programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Fragment,
    Compute,
}

impl ShaderStage {
    /// Number of stages (the pipeline slot count).
    pub const COUNT: usize = 6;

    /// All stages in pipeline order.
    pub const ALL: [ShaderStage; Self::COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::Hull,
        ShaderStage::Domain,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
        ShaderStage::Compute,
    ];

    /// Pipeline slot index of this stage.
    pub fn index(self) -> usize {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Hull => 1,
            ShaderStage::Domain => 2,
            ShaderStage::Geometry => 3,
            ShaderStage::Fragment => 4,
            ShaderStage::Compute => 5,
        }
    }

    /// Stage name as it appears in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Hull => "hull",
            ShaderStage::Domain => "domain",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }
}

/// A compiled multi-technique effect.
///
/// Owned exclusively by one compile invocation; immutable once the compile
/// finishes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectDescription {
    /// Effect name; defaults to the source file stem, overridden by the
    /// `EffectName` attribute.
    pub name: String,
    /// Whether the engine should share constant buffers across passes.
    pub share_constant_buffers: bool,
    /// Techniques in source order. Names are distinct (duplicates are
    /// diagnosed but still appended).
    pub techniques: Vec<Technique>,
    /// Deduplicated compiled shaders referenced by [`ShaderLink`] index.
    pub shaders: Vec<Shader>,
    /// Build parameters recorded for later from-scratch recompilation.
    /// Present only when dynamic compiling was requested and the compile
    /// succeeded.
    pub arguments: Option<CompilerArguments>,
}

impl EffectDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A named alternative implementation of an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub name: String,
    pub passes: Vec<Pass>,
}

impl Technique {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passes: Vec::new(),
        }
    }
}

/// Render-state values attached to a pass, keyed by attribute name.
pub type Properties = IndexMap<String, PropertyValue>;

/// One concrete GPU pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pass {
    pub name: String,
    /// Per-stage shader links.
    pub pipeline: Pipeline,
    /// Render-state attributes: the reserved blend/depth/rasterizer keys
    /// plus arbitrary caller-defined keys the compiler passed through.
    pub properties: Properties,
    /// True for passes consumed by a preceding `SubPassCount` declaration.
    pub is_sub_pass: bool,
}

impl Pass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipeline: Pipeline::default(),
            properties: Properties::default(),
            is_sub_pass: false,
        }
    }
}

/// The per-stage shader slots of a pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pipeline {
    slots: [Option<ShaderLink>; ShaderStage::COUNT],
}

impl Pipeline {
    /// Link for a stage, if the pass assigned one.
    pub fn get(&self, stage: ShaderStage) -> Option<&ShaderLink> {
        self.slots[stage.index()].as_ref()
    }

    /// Mutable link for a stage.
    pub fn get_mut(&mut self, stage: ShaderStage) -> Option<&mut ShaderLink> {
        self.slots[stage.index()].as_mut()
    }

    /// Install or replace the link for a stage.
    pub fn set(&mut self, stage: ShaderStage, link: ShaderLink) {
        self.slots[stage.index()] = Some(link);
    }

    /// Iterate assigned (stage, link) pairs in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderStage, &ShaderLink)> {
        ShaderStage::ALL
            .iter()
            .filter_map(move |&stage| self.get(stage).map(|link| (stage, link)))
    }
}

/// A pass's reference to a compiled shader for one stage.
///
/// Either the explicit null-shader marker (`GeometryShader = 0;`) or an index
/// into [`EffectDescription::shaders`]. The reference is positional, never
/// owning, so multiple passes can share one compiled shader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderLink {
    /// Index into the effect's shader collection; None for the null marker.
    pub shader_index: Option<usize>,
    /// Name of an externally provided shader this link resolves to.
    pub import_name: Option<String>,
    /// Rasterized stream index for geometry stream output; negative when
    /// unset.
    pub stream_output_rasterized_stream: i32,
}

impl ShaderLink {
    /// The explicit "no shader" marker.
    pub fn null() -> Self {
        Self {
            shader_index: None,
            import_name: None,
            stream_output_rasterized_stream: -1,
        }
    }

    /// Link to a shader by index.
    pub fn to_shader(index: usize) -> Self {
        Self {
            shader_index: Some(index),
            import_name: None,
            stream_output_rasterized_stream: -1,
        }
    }

    /// True for the null-shader marker.
    pub fn is_null(&self) -> bool {
        self.shader_index.is_none() && self.import_name.is_none()
    }
}

/// One compiled shader blob plus its reflected binding model.
///
/// Appended once per unique structural shape; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shader {
    /// Public name (`"<effect>::<entry>"`); non-None only if exported.
    pub name: Option<String>,
    pub stage: ShaderStage,
    pub bytecode: Vec<u8>,
    pub constant_buffers: Vec<ConstantBuffer>,
    pub resources: Vec<ResourceParameter>,
}

/// A reflected constant buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantBuffer {
    pub name: String,
    /// Total byte size.
    pub size: u32,
    /// Member parameters in declaration order.
    pub parameters: Vec<ValueTypeParameter>,
}

/// One value-typed member of a constant buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueTypeParameter {
    pub name: String,
    /// Byte offset inside the buffer.
    pub offset: u32,
    /// Byte size of the member.
    pub size: u32,
    /// Array element count; 1 for non-arrays.
    pub count: u32,
    pub class: ParameterClass,
    pub ty: ValueType,
    /// Matrix row count; 0 for non-matrices.
    pub row_count: u8,
}

/// Structural class of a reflected parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterClass {
    Scalar,
    Vector,
    MatrixRows,
    MatrixColumns,
    Struct,
    /// Opaque resource object (textures, buffers, samplers).
    Object,
}

/// Element type of a value parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int,
    UInt,
    Float,
    Double,
}

/// A reflected resource binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceParameter {
    pub name: String,
    /// Always [`ParameterClass::Object`].
    pub class: ParameterClass,
    pub ty: ResourceParameterType,
    /// Backing register/binding slot.
    pub slot: u32,
    /// Array element count; 1 for non-arrays.
    pub count: u32,
}

/// Closed classification of resource bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceParameterType {
    ConstantBuffer,
    Buffer,
    Texture1D,
    Texture2D,
    Texture3D,
    TextureCube,
    StorageBuffer,
    StorageImage,
    RwTexture1D,
    RwTexture2D,
    RwTexture3D,
    Sampler,
}

/// A typed render-state value in a pass properties bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    UInt(u32),
    Number(f64),
    String(String),
    Vector(Vec<f64>),
    Strings(Vec<String>),
}

/// A preprocessor macro definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderMacro {
    pub name: String,
    pub value: Option<String>,
}

impl ShaderMacro {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_owned),
        }
    }
}

/// Build parameters recorded onto an effect so a later consumer can trigger
/// a from-scratch recompile without re-supplying them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerArguments {
    pub file_path: PathBuf,
    pub dependency_file_path: Option<PathBuf>,
    pub macros: Vec<ShaderMacro>,
    pub include_dirs: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_indices_cover_pipeline() {
        for (i, stage) in ShaderStage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }

    #[test]
    fn test_pipeline_slots() {
        let mut pipeline = Pipeline::default();
        assert!(pipeline.get(ShaderStage::Vertex).is_none());

        pipeline.set(ShaderStage::Vertex, ShaderLink::to_shader(3));
        assert_eq!(
            pipeline.get(ShaderStage::Vertex).unwrap().shader_index,
            Some(3)
        );
        assert!(pipeline.get(ShaderStage::Geometry).is_none());

        let assigned: Vec<_> = pipeline.iter().map(|(stage, _)| stage).collect();
        assert_eq!(assigned, vec![ShaderStage::Vertex]);
    }

    #[test]
    fn test_null_link_marker() {
        let null = ShaderLink::null();
        assert!(null.is_null());
        assert_eq!(null.stream_output_rasterized_stream, -1);
        assert!(!ShaderLink::to_shader(0).is_null());
    }

    #[test]
    fn test_properties_preserve_order() {
        let mut pass = Pass::new("p0");
        pass.properties
            .insert("Zeta".to_string(), PropertyValue::Bool(true));
        pass.properties
            .insert("Alpha".to_string(), PropertyValue::UInt(1));
        let keys: Vec<_> = pass.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
    }
}
