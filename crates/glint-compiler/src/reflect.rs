//! Translates backend reflection into the effect binding model.
//!
//! Two jobs: copy reflected uniform buffers into [`ConstantBuffer`]
//! descriptors, and turn reflected resource bindings into
//! [`ResourceParameter`]s. Backends that split an indexable resource array
//! into per-index bindings (`tex[0]`, `tex[1]`, ...) get those reassembled
//! into a single contiguous descriptor; any gap in the index or slot
//! sequence is a sparse-index diagnostic and the group is dropped.
//!
//! Diagnostics from here carry no span: reflection data is detached from
//! source by the time it reaches the extractor.

use crate::backend::{ReflectedResource, ReflectedResourceKind, ShaderReflection, TextureDimension};
use crate::error::{DiagnosticKind, Diagnostics};
use glint_ast::effect::{
    ConstantBuffer, ParameterClass, ResourceParameter, ResourceParameterType, Shader,
    ValueTypeParameter,
};
use indexmap::IndexMap;

/// Populate a shader's constant buffers and resource parameters from the
/// backend's reflection object.
pub fn extract_parameters(
    shader: &mut Shader,
    reflection: &ShaderReflection,
    diags: &mut Diagnostics,
) {
    for buffer in &reflection.constant_buffers {
        let parameters = buffer
            .members
            .iter()
            .map(|m| ValueTypeParameter {
                name: m.name.clone(),
                offset: m.offset,
                size: m.size,
                count: m.count,
                class: m.class,
                ty: m.ty,
                row_count: m.row_count,
            })
            .collect();
        shader.constant_buffers.push(ConstantBuffer {
            name: buffer.name.clone(),
            size: buffer.size,
            parameters,
        });
    }

    // Indexable array groups are collected aside and reassembled after the
    // scan; everything else is emitted immediately.
    let mut groups: IndexMap<String, ArrayGroup> = IndexMap::new();
    for resource in &reflection.resources {
        match split_indexed_name(&resource.name) {
            Some((base, index)) => {
                let group = groups
                    .entry(base.to_string())
                    .or_insert_with(|| ArrayGroup::new(resource.kind));
                group.entries.push((index, resource.slot));
            }
            None => shader.resources.push(resource_parameter(resource)),
        }
    }

    for (base, group) in groups {
        match group.reassemble() {
            Some((slot, count)) => shader.resources.push(ResourceParameter {
                name: base,
                class: ParameterClass::Object,
                ty: classify(group.kind),
                slot,
                count,
            }),
            None => diags.error(
                DiagnosticKind::SparseIndex,
                None,
                format!(
                    "indexable resource array '{}' has non-contiguous indices or binding slots",
                    base
                ),
            ),
        }
    }
}

/// Per-index bindings recorded under one base name.
struct ArrayGroup {
    kind: ReflectedResourceKind,
    /// (array index, backing slot) pairs in scan order.
    entries: Vec<(u32, u32)>,
}

impl ArrayGroup {
    fn new(kind: ReflectedResourceKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Check contiguity and collapse to (base slot, element count).
    fn reassemble(&self) -> Option<(u32, u32)> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|&(index, _)| index);

        let (first_index, first_slot) = entries[0];
        for (step, &(index, slot)) in entries.iter().enumerate() {
            let step = step as u32;
            if index != first_index + step || slot != first_slot + step {
                return None;
            }
        }
        if first_slot < first_index {
            return None;
        }

        let (last_index, _) = entries[entries.len() - 1];
        Some((first_slot - first_index, last_index + 1))
    }
}

/// Split `base[index]` into its parts; None for plain names.
fn split_indexed_name(name: &str) -> Option<(&str, u32)> {
    let inner = name.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let (base, digits) = inner.split_at(open);
    if base.is_empty() {
        return None;
    }
    let index = digits[1..].parse().ok()?;
    Some((base, index))
}

fn resource_parameter(resource: &ReflectedResource) -> ResourceParameter {
    ResourceParameter {
        name: resource.name.clone(),
        class: ParameterClass::Object,
        ty: classify(resource.kind),
        slot: resource.slot,
        count: resource.count,
    }
}

/// Backend resource kind + dimension → closed parameter type.
fn classify(kind: ReflectedResourceKind) -> ResourceParameterType {
    use ResourceParameterType as R;
    use TextureDimension as D;
    match kind {
        ReflectedResourceKind::UniformBuffer => R::ConstantBuffer,
        ReflectedResourceKind::SampledTexture(D::Buffer) => R::Buffer,
        ReflectedResourceKind::SampledTexture(D::D1) => R::Texture1D,
        ReflectedResourceKind::SampledTexture(D::D2) => R::Texture2D,
        ReflectedResourceKind::SampledTexture(D::D3) => R::Texture3D,
        ReflectedResourceKind::SampledTexture(D::Cube) => R::TextureCube,
        ReflectedResourceKind::StorageTexture(D::D1) => R::RwTexture1D,
        ReflectedResourceKind::StorageTexture(D::D2) => R::RwTexture2D,
        ReflectedResourceKind::StorageTexture(D::D3) => R::RwTexture3D,
        ReflectedResourceKind::StorageTexture(D::Buffer | D::Cube) => R::StorageImage,
        ReflectedResourceKind::StorageBuffer => R::StorageBuffer,
        ReflectedResourceKind::Sampler => R::Sampler,
    }
}
