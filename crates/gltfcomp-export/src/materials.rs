//! Material collection
//!
//! Flattens an object's material slots into an ordered list of PBR records.

use crate::scene::{SceneMaterial, SceneObject};
use gltfcomp_core::{MaterialRecord, DEFAULT_METALLIC, DEFAULT_ROUGHNESS};
use std::collections::HashSet;
use tracing::trace;

/// A collected material together with the scene material it came from
///
/// The source is kept so texture resolution can walk its image inputs.
#[derive(Debug, Clone)]
pub struct CollectedMaterial<'a> {
    pub record: MaterialRecord,
    pub source: &'a SceneMaterial,
}

/// Collects the materials referenced by a mesh object
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialCollector;

impl MaterialCollector {
    pub fn new() -> Self {
        Self
    }

    /// One record per assigned slot, in slot order
    ///
    /// Empty slots are skipped. A material assigned to several slots is
    /// emitted once, at its first slot, so the output can be shorter than
    /// the slot list and is not indexed by slot.
    pub fn collect<'a>(&self, object: &'a SceneObject) -> Vec<CollectedMaterial<'a>> {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();

        for material in object.material_slots.iter().flatten() {
            if !seen.insert(material.name.as_str()) {
                trace!(object = %object.name, material = %material.name, "Material already collected");
                continue;
            }
            collected.push(CollectedMaterial {
                record: to_record(material),
                source: material,
            });
        }

        collected
    }
}

/// Convert a scene material into its PBR descriptor
pub fn to_record(material: &SceneMaterial) -> MaterialRecord {
    let [r, g, b, _] = material.diffuse_color;
    MaterialRecord::new(
        material.name.clone(),
        [r, g, b],
        material.metallic.unwrap_or(DEFAULT_METALLIC),
        material.roughness.unwrap_or(DEFAULT_ROUGHNESS),
    )
}
