//! Scene collaborator interface and snapshot types
//!
//! The host application (or a JSON scene description) supplies immutable
//! snapshots of its objects. The pipeline only reads them through
//! [`SceneSource`], so test doubles and other hosts plug in the same way.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scene loading errors
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scene description: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Read-only access to the host scene
pub trait SceneSource {
    /// Objects in scene iteration order
    fn objects(&self) -> &[SceneObject];

    /// Image-typed inputs of a material, in input order
    fn enumerate_image_inputs(&self, material: &SceneMaterial) -> Vec<&SceneImage>;

    /// Directory that relative image paths are resolved against
    fn base_dir(&self) -> &Path;
}

/// Type of a scene object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    #[default]
    Mesh,
    Curve,
    Camera,
    Light,
    Empty,
    Other,
}

/// Snapshot of one scene object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default)]
    pub kind: ObjectKind,
    /// Whether the object is part of the current selection
    #[serde(default)]
    pub selected: bool,
    /// Evaluated polygon mesh, present for mesh objects
    #[serde(default)]
    pub mesh: Option<PolygonMesh>,
    /// Material slots; `None` marks an empty slot
    #[serde(default)]
    pub material_slots: Vec<Option<SceneMaterial>>,
}

impl SceneObject {
    /// Create a mesh object
    pub fn mesh(name: impl Into<String>, mesh: PolygonMesh) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Mesh,
            selected: false,
            mesh: Some(mesh),
            material_slots: Vec::new(),
        }
    }

    /// Create an object without geometry
    pub fn other(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_material(mut self, material: SceneMaterial) -> Self {
        self.material_slots.push(Some(material));
        self
    }

    pub fn with_empty_slot(mut self) -> Self {
        self.material_slots.push(None);
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn is_mesh(&self) -> bool {
        self.kind == ObjectKind::Mesh
    }
}

/// One polygon; loops are its corners in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Position indices of the corners
    pub vertices: Vec<u32>,
    /// Smooth shaded (averaged normals) or flat
    #[serde(default)]
    pub smooth: bool,
}

impl Polygon {
    pub fn flat(vertices: impl Into<Vec<u32>>) -> Self {
        Self { vertices: vertices.into(), smooth: false }
    }

    pub fn smooth(vertices: impl Into<Vec<u32>>) -> Self {
        Self { vertices: vertices.into(), smooth: true }
    }
}

/// Evaluated polygon topology of a mesh object
///
/// Per-loop streams (`uvs`, `custom_normals`) hold one entry per polygon
/// corner, polygons in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonMesh {
    /// Mesh datablock name
    #[serde(default)]
    pub name: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub polygons: Vec<Polygon>,
    /// Active UV channel
    #[serde(default)]
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Custom split normals
    #[serde(default)]
    pub custom_normals: Option<Vec<[f32; 3]>>,
}

impl PolygonMesh {
    pub fn new(positions: Vec<[f32; 3]>, polygons: Vec<Polygon>) -> Self {
        Self {
            name: None,
            positions,
            polygons,
            uvs: None,
            custom_normals: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn with_custom_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.custom_normals = Some(normals);
        self
    }

    /// Total number of polygon corners
    pub fn loop_count(&self) -> usize {
        self.polygons.iter().map(|p| p.vertices.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.polygons.is_empty()
    }
}

/// Snapshot of a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMaterial {
    pub name: String,
    /// Viewport diffuse color (RGBA)
    #[serde(default = "default_diffuse")]
    pub diffuse_color: [f32; 4],
    #[serde(default)]
    pub metallic: Option<f32>,
    #[serde(default)]
    pub roughness: Option<f32>,
    /// Names of the images feeding the shading graph, in input order
    #[serde(default)]
    pub image_inputs: Vec<String>,
}

fn default_diffuse() -> [f32; 4] {
    [0.8, 0.8, 0.8, 1.0]
}

impl SceneMaterial {
    pub fn new(name: impl Into<String>, diffuse_color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            diffuse_color,
            metallic: None,
            roughness: None,
            image_inputs: Vec::new(),
        }
    }

    pub fn with_pbr(mut self, metallic: f32, roughness: f32) -> Self {
        self.metallic = Some(metallic);
        self.roughness = Some(roughness);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image_inputs.push(image.into());
        self
    }
}

/// Snapshot of an image datablock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneImage {
    pub name: String,
    /// Backing file, absolute or relative to the scene base directory
    #[serde(default)]
    pub filepath: Option<PathBuf>,
    /// Pixel data embedded in the scene
    #[serde(default)]
    pub packed: Option<PackedPixels>,
}

impl SceneImage {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            filepath: Some(path.into()),
            packed: None,
        }
    }

    pub fn packed(name: impl Into<String>, pixels: PackedPixels) -> Self {
        Self {
            name: name.into(),
            filepath: None,
            packed: Some(pixels),
        }
    }

    /// An image with no data source at all
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filepath: None,
            packed: None,
        }
    }
}

/// Embedded float pixels, row-major (height, width, channels), values nominally in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedPixels {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<f32>,
}

/// Scene held entirely in memory, loadable from a JSON description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryScene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub images: Vec<SceneImage>,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, object: SceneObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn with_image(mut self, image: SceneImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Parse a scene description
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scene description; relative image paths resolve against its directory
    pub fn from_json_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let scene = Self::from_json_str(&json)?;

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(scene.with_base_dir(base_dir))
    }

    /// Look up an image by name
    pub fn image(&self, name: &str) -> Option<&SceneImage> {
        self.images.iter().find(|img| img.name == name)
    }
}

impl SceneSource for InMemoryScene {
    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn enumerate_image_inputs(&self, material: &SceneMaterial) -> Vec<&SceneImage> {
        material
            .image_inputs
            .iter()
            .filter_map(|name| {
                let image = self.image(name);
                if image.is_none() {
                    tracing::debug!(material = %material.name, image = %name, "Image input not found in scene");
                }
                image
            })
            .collect()
    }

    fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
