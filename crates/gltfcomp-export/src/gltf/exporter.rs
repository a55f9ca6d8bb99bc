//! glTF backend implementation

use super::*;
use crate::gltf::archive::{self, ArchiveError};
use crate::textures::{ImageFormat, TextureEncoder, TextureError};
use gltfcomp_core::{
    BackendReport, BoundingBox, CompressionBackend, CompressionOptions, MeshExportRecord, MeshVertex,
    SceneExportPackage,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// glTF backend options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GltfOptions {
    /// Convert positions and normals from Z-up to glTF's Y-up
    pub convert_z_up: bool,
    /// Pretty-print JSON
    pub pretty_json: bool,
}

impl Default for GltfOptions {
    fn default() -> Self {
        Self {
            convert_z_up: true,
            pretty_json: true,
        }
    }
}

/// glTF export errors
#[derive(Debug, thiserror::Error)]
pub enum GltfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Invalid mesh data: {0}")]
    InvalidMeshData(String),
}

pub type GltfResult<T> = Result<T, GltfError>;

impl From<GltfError> for gltfcomp_core::Error {
    fn from(err: GltfError) -> Self {
        match err {
            GltfError::Io(e) => gltfcomp_core::Error::Io(e),
            other => gltfcomp_core::Error::backend(GltfBackend::NAME, other.to_string()),
        }
    }
}

/// Reference compression backend writing glTF 2.0
pub struct GltfBackend {
    options: GltfOptions,
    binary_data: Vec<u8>,
    accessors: Vec<Accessor>,
    buffer_views: Vec<BufferView>,
}

impl GltfBackend {
    pub const NAME: &'static str = "gltf";

    /// Create a new glTF backend
    pub fn new(options: GltfOptions) -> Self {
        Self {
            options,
            binary_data: Vec::new(),
            accessors: Vec::new(),
            buffer_views: Vec::new(),
        }
    }

    pub fn options(&self) -> &GltfOptions {
        &self.options
    }

    /// Write the package into `output_folder`, named after `output_filepath`
    pub fn export(
        &mut self,
        package: &SceneExportPackage,
        output_folder: &Path,
        output_filepath: &Path,
        options: &CompressionOptions,
    ) -> GltfResult<BackendReport> {
        let stem = output_filepath
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("scene");
        let use_glb = output_filepath
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("glb"));

        if options.draco_enabled {
            warn!(
                draco_level = options.draco_level,
                "Draco compression is not available in the glTF backend, writing uncompressed geometry"
            );
        }

        let format = if options.jpeg_enabled {
            ImageFormat::Jpeg {
                quality: options.jpeg_quality,
            }
        } else {
            ImageFormat::Png
        };

        let mut texture_files = Vec::new();
        let texture_uris = self.write_textures(package, output_folder, format, &mut texture_files);

        let mut gltf = self.build_gltf(package, &texture_uris, format)?;

        // The main file always leads the report
        let mut files = Vec::with_capacity(texture_files.len() + 2);
        if use_glb {
            let glb_path = output_folder.join(format!("{}.glb", stem));
            self.write_glb(&gltf, &glb_path)?;
            files.push(glb_path);
        } else {
            let json_path = output_folder.join(format!("{}.gltf", stem));
            let bin_path = output_folder.join(format!("{}.bin", stem));
            if let Some(buffer) = gltf.buffers.first_mut() {
                buffer.uri = Some(format!("{}.bin", stem));
            }
            let bin_written = self.write_separate_files(&gltf, &json_path, &bin_path)?;
            files.push(json_path);
            if bin_written {
                files.push(bin_path);
            }
        }
        files.extend(texture_files);

        if options.zip_enabled {
            let zip_path = output_folder.join(format!("{}.zip", stem));
            archive::bundle(&zip_path, &files)?;
            for file in &files {
                fs::remove_file(file)?;
            }
            debug!(entries = files.len(), path = %zip_path.display(), "Bundled output");
            files = vec![zip_path];
        }

        info!(
            meshes = package.meshes.len(),
            accessors = self.accessors.len(),
            bytes = self.binary_data.len(),
            "Wrote glTF"
        );

        Ok(BackendReport {
            files,
            draco_applied: false,
        })
    }

    /// Encode every texture; unreadable ones get `None`
    fn write_textures(
        &self,
        package: &SceneExportPackage,
        output_folder: &Path,
        format: ImageFormat,
        files: &mut Vec<PathBuf>,
    ) -> Vec<Option<String>> {
        let encoder = TextureEncoder::new(format);

        package
            .textures
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let file_name = format!("{}.{}", index, format.extension());
                let path = output_folder.join(&file_name);
                match encoder.encode(record, &path) {
                    Ok(()) => {
                        files.push(path);
                        Some(file_name)
                    }
                    Err(e) => {
                        warn!(texture = %record.name(), error = %e, "Failed to encode texture, skipping");
                        None
                    }
                }
            })
            .collect()
    }

    /// Build glTF structure from the package
    fn build_gltf(
        &mut self,
        package: &SceneExportPackage,
        texture_uris: &[Option<String>],
        format: ImageFormat,
    ) -> GltfResult<Gltf> {
        // Reset state
        self.binary_data.clear();
        self.accessors.clear();
        self.buffer_views.clear();

        let mut images = Vec::new();
        let mut textures = Vec::new();
        let mut texture_map = vec![None; texture_uris.len()];
        for (index, uri) in texture_uris.iter().enumerate() {
            if let Some(uri) = uri {
                texture_map[index] = Some(textures.len());
                textures.push(Texture {
                    sampler: Some(0),
                    source: images.len(),
                });
                images.push(Image {
                    name: Some(package.textures[index].name().to_string()),
                    uri: uri.clone(),
                    mime_type: Some(format.mime_type().to_string()),
                });
            }
        }
        let samplers = if textures.is_empty() {
            Vec::new()
        } else {
            vec![Sampler::default()]
        };

        let mut meshes = Vec::with_capacity(package.meshes.len());
        let mut nodes = Vec::with_capacity(package.meshes.len());
        let mut materials = Vec::new();

        for record in &package.meshes {
            let has_uvs = record.mesh.has_uvs();
            let first_material = (!record.materials.is_empty()).then_some(materials.len());

            for material in &record.materials {
                let base_color_texture = material
                    .textures
                    .first()
                    .and_then(|&i| texture_map.get(i).copied().flatten())
                    .filter(|_| has_uvs)
                    .map(|index| TextureInfo { index });

                materials.push(Material {
                    name: Some(material.name.clone()),
                    pbr_metallic_roughness: Some(PbrMetallicRoughness {
                        base_color_factor: Some(material.base_color_factor()),
                        base_color_texture,
                        metallic_factor: Some(material.metallic),
                        roughness_factor: Some(material.roughness),
                    }),
                });
            }

            nodes.push(Node {
                name: Some(record.object_name.clone()),
                mesh: Some(meshes.len()),
            });
            meshes.push(self.add_mesh(record, first_material)?);
        }

        let buffers = if self.binary_data.is_empty() {
            Vec::new()
        } else {
            vec![Buffer {
                uri: None,
                byte_length: self.binary_data.len(),
            }]
        };

        Ok(Gltf {
            asset: Asset {
                version: "2.0".to_string(),
                generator: Some(format!("gltfcomp {}", env!("CARGO_PKG_VERSION"))),
            },
            scene: Some(0),
            scenes: vec![Scene {
                name: Some("Scene".to_string()),
                nodes: (0..nodes.len()).collect(),
            }],
            nodes,
            meshes,
            materials,
            textures,
            images,
            samplers,
            accessors: self.accessors.clone(),
            buffer_views: self.buffer_views.clone(),
            buffers,
        })
    }

    fn add_mesh(&mut self, record: &MeshExportRecord, material: Option<usize>) -> GltfResult<Mesh> {
        let mesh = &record.mesh;
        mesh.validate()
            .map_err(|e| GltfError::InvalidMeshData(format!("{}: {}", record.object_name, e)))?;

        let mut attributes = BTreeMap::new();
        attributes.insert("POSITION".to_string(), self.add_positions(&mesh.vertices));
        attributes.insert("NORMAL".to_string(), self.add_normals(&mesh.vertices));
        if mesh.has_uvs() {
            attributes.insert("TEXCOORD_0".to_string(), self.add_uvs(&mesh.vertices));
        }
        let indices = self.add_indices(&mesh.indices);

        Ok(Mesh {
            name: Some(record.local_name.clone()),
            primitives: vec![Primitive {
                attributes,
                indices: Some(indices),
                material,
                mode: Some(MODE_TRIANGLES),
            }],
        })
    }

    fn convert_axis(&self, v: [f32; 3]) -> [f32; 3] {
        if self.options.convert_z_up {
            [v[0], v[2], -v[1]]
        } else {
            v
        }
    }

    /// Add position data
    fn add_positions(&mut self, vertices: &[MeshVertex]) -> usize {
        let offset = self.binary_data.len();
        let mut bounds: Option<BoundingBox> = None;

        for vertex in vertices {
            let position = self.convert_axis(vertex.position);
            for component in position {
                self.binary_data.extend_from_slice(&component.to_le_bytes());
            }
            match bounds.as_mut() {
                Some(bbox) => bbox.expand(&position),
                None => bounds = Some(BoundingBox::new(position, position)),
            }
        }

        let (min, max) = bounds.map(|b| (b.min.to_vec(), b.max.to_vec())).unzip();
        self.add_accessor(offset, vertices.len(), "VEC3", COMPONENT_TYPE_FLOAT, min, max, Some(TARGET_ARRAY_BUFFER))
    }

    /// Add normal data
    fn add_normals(&mut self, vertices: &[MeshVertex]) -> usize {
        let offset = self.binary_data.len();

        for vertex in vertices {
            for component in self.convert_axis(vertex.normal) {
                self.binary_data.extend_from_slice(&component.to_le_bytes());
            }
        }

        self.add_accessor(offset, vertices.len(), "VEC3", COMPONENT_TYPE_FLOAT, None, None, Some(TARGET_ARRAY_BUFFER))
    }

    /// Add UV data
    fn add_uvs(&mut self, vertices: &[MeshVertex]) -> usize {
        let offset = self.binary_data.len();

        for vertex in vertices {
            let uv = vertex.uv.unwrap_or([0.0, 0.0]);
            self.binary_data.extend_from_slice(&uv[0].to_le_bytes());
            self.binary_data.extend_from_slice(&uv[1].to_le_bytes());
        }

        self.add_accessor(offset, vertices.len(), "VEC2", COMPONENT_TYPE_FLOAT, None, None, Some(TARGET_ARRAY_BUFFER))
    }

    /// Add index data
    fn add_indices(&mut self, indices: &[u32]) -> usize {
        let offset = self.binary_data.len();

        for &index in indices {
            self.binary_data.extend_from_slice(&index.to_le_bytes());
        }

        self.add_accessor(
            offset,
            indices.len(),
            "SCALAR",
            COMPONENT_TYPE_UNSIGNED_INT,
            None,
            None,
            Some(TARGET_ELEMENT_ARRAY_BUFFER),
        )
    }

    /// Add accessor and buffer view
    #[allow(clippy::too_many_arguments)]
    fn add_accessor(
        &mut self,
        offset: usize,
        count: usize,
        accessor_type: &str,
        component_type: u32,
        min: Option<Vec<f32>>,
        max: Option<Vec<f32>>,
        target: Option<u32>,
    ) -> usize {
        let byte_length = self.binary_data.len() - offset;

        let buffer_view_index = self.buffer_views.len();
        self.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: Some(offset),
            byte_length,
            target,
        });

        let accessor_index = self.accessors.len();
        self.accessors.push(Accessor {
            buffer_view: Some(buffer_view_index),
            byte_offset: None,
            component_type,
            count,
            accessor_type: accessor_type.to_string(),
            max,
            min,
        });

        accessor_index
    }

    /// Write separate JSON + BIN files; returns whether a BIN file was written
    fn write_separate_files(&self, gltf: &Gltf, json_path: &Path, bin_path: &Path) -> GltfResult<bool> {
        let json = if self.options.pretty_json {
            serde_json::to_string_pretty(gltf)?
        } else {
            serde_json::to_string(gltf)?
        };
        fs::write(json_path, json)?;

        if self.binary_data.is_empty() {
            return Ok(false);
        }
        fs::write(bin_path, &self.binary_data)?;
        Ok(true)
    }

    /// Write GLB (binary glTF)
    fn write_glb(&self, gltf: &Gltf, glb_path: &Path) -> GltfResult<()> {
        let json = serde_json::to_string(gltf)?;
        let json_len = json.len();
        let json_padding = (4 - (json_len % 4)) % 4;
        let bin_len = self.binary_data.len();
        let bin_padding = (4 - (bin_len % 4)) % 4;

        let mut total_len = 12 + 8 + json_len + json_padding;
        if bin_len > 0 {
            total_len += 8 + bin_len + bin_padding;
        }

        let mut out = Vec::with_capacity(total_len);

        // GLB header
        out.extend_from_slice(b"glTF"); // Magic
        out.extend_from_slice(&2u32.to_le_bytes()); // Version
        out.extend_from_slice(&(total_len as u32).to_le_bytes());

        // JSON chunk
        out.extend_from_slice(&((json_len + json_padding) as u32).to_le_bytes());
        out.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // "JSON"
        out.extend_from_slice(json.as_bytes());
        out.resize(out.len() + json_padding, 0x20); // Space padding

        // BIN chunk
        if bin_len > 0 {
            out.extend_from_slice(&((bin_len + bin_padding) as u32).to_le_bytes());
            out.extend_from_slice(&0x004E4942u32.to_le_bytes()); // "BIN\0"
            out.extend_from_slice(&self.binary_data);
            out.resize(out.len() + bin_padding, 0x00);
        }

        let mut file = fs::File::create(glb_path)?;
        file.write_all(&out)?;
        Ok(())
    }
}

impl Default for GltfBackend {
    fn default() -> Self {
        Self::new(GltfOptions::default())
    }
}

impl CompressionBackend for GltfBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compress(
        &mut self,
        package: &SceneExportPackage,
        output_folder: &Path,
        output_filepath: &Path,
        options: &CompressionOptions,
    ) -> gltfcomp_core::Result<BackendReport> {
        Ok(self.export(package, output_folder, output_filepath, options)?)
    }
}
