//! Image input resolution

use crate::materials::CollectedMaterial;
use crate::scene::{PackedPixels, SceneImage, SceneMaterial, SceneSource};
use gltfcomp_core::{Error, PackedRaster, Result, TextureRecord};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolves material image inputs into texture records
#[derive(Debug, Clone)]
pub struct TextureResolver {
    base_dir: PathBuf,
}

impl TextureResolver {
    /// Create a resolver; relative image paths are joined to `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve the textures of all collected materials of one object
    ///
    /// Records come out in material order, then input order. Each material's
    /// `textures` list is filled with indices into the returned vector.
    pub fn resolve<S>(&self, scene: &S, materials: &mut [CollectedMaterial<'_>]) -> Result<Vec<TextureRecord>>
    where
        S: SceneSource + ?Sized,
    {
        let mut textures = Vec::new();
        for material in materials.iter_mut() {
            for record in self.resolve_material(scene, material.source)? {
                material.record.textures.push(textures.len());
                textures.push(record);
            }
        }
        Ok(textures)
    }

    /// Resolve the image inputs of one material
    pub fn resolve_material<S>(&self, scene: &S, material: &SceneMaterial) -> Result<Vec<TextureRecord>>
    where
        S: SceneSource + ?Sized,
    {
        let mut records = Vec::new();
        for image in scene.enumerate_image_inputs(material) {
            if let Some(record) = self.resolve_image(image)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Resolve a single image
    ///
    /// A non-empty file path wins over embedded pixels and is never read.
    /// Returns `None` for an image with no data source.
    pub fn resolve_image(&self, image: &SceneImage) -> Result<Option<TextureRecord>> {
        // Packed and generated images carry an empty path
        let filepath = image.filepath.as_ref().filter(|p| !p.as_os_str().is_empty());
        if let Some(filepath) = filepath {
            let path = normalize_path(&absolute(&self.base_dir.join(filepath)));
            return Ok(Some(TextureRecord::FileRef {
                path,
                name: image.name.clone(),
            }));
        }

        match &image.packed {
            Some(pixels) => Ok(Some(TextureRecord::PackedRaster(decode_packed(&image.name, pixels)?))),
            None => {
                debug!(image = %image.name, "Image has no file or packed data, skipping");
                Ok(None)
            }
        }
    }
}

/// Decode embedded float pixels to 8-bit, keeping channel count and layout
pub fn decode_packed(name: &str, pixels: &PackedPixels) -> Result<PackedRaster> {
    if !(1..=4).contains(&pixels.channels) {
        return Err(Error::malformed_image(
            name,
            format!("unsupported channel count {}", pixels.channels),
        ));
    }

    let expected = (pixels.width as u64) * (pixels.height as u64) * (pixels.channels as u64);
    if pixels.pixels.len() as u64 != expected {
        return Err(Error::malformed_image(
            name,
            format!(
                "expected {} values for {}x{}x{}, got {}",
                expected,
                pixels.width,
                pixels.height,
                pixels.channels,
                pixels.pixels.len()
            ),
        ));
    }

    let data = pixels.pixels.iter().map(|&v| to_byte(v)).collect();
    PackedRaster::new(name, pixels.width, pixels.height, pixels.channels, data)
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve `.` and `..` components lexically
///
/// `..` above the root is dropped. Symlinks are not followed.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if !at_root {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialCollector;
    use crate::scene::{InMemoryScene, PolygonMesh, SceneObject};

    fn rgba_2x2() -> PackedPixels {
        PackedPixels {
            width: 2,
            height: 2,
            channels: 4,
            pixels: vec![
                1.0, 0.0, 0.0, 1.0, //
                0.0, 1.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, 0.5, //
                1.5, -0.5, 0.2, 0.0,
            ],
        }
    }

    #[test]
    fn test_decode_packed_quantizes() {
        let raster = decode_packed("checker", &rgba_2x2()).unwrap();
        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.channels(), 4);
        assert_eq!(raster.data().len(), 16);
        assert_eq!(&raster.data()[..4], &[255, 0, 0, 255]);
        assert_eq!(&raster.data()[8..], &[0, 0, 255, 128, 255, 0, 51, 0]);
    }

    #[test]
    fn test_decode_packed_length_mismatch() {
        let mut pixels = rgba_2x2();
        pixels.pixels.pop();
        let err = decode_packed("short", &pixels).unwrap_err();
        assert!(matches!(err, Error::MalformedImage { ref image, .. } if image == "short"));
    }

    #[test]
    fn test_decode_packed_bad_channels() {
        let pixels = PackedPixels {
            width: 1,
            height: 1,
            channels: 5,
            pixels: vec![0.0; 5],
        };
        assert!(decode_packed("wide", &pixels).unwrap_err().is_object_local());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c.png")), PathBuf::from("/a/c.png"));
        assert_eq!(normalize_path(Path::new("/../x.png")), PathBuf::from("/x.png"));
        assert_eq!(normalize_path(Path::new("a/b/../../c")), PathBuf::from("c"));
    }

    #[test]
    fn test_file_ref_is_absolute_and_normalized() {
        let resolver = TextureResolver::new("/scenes/house");
        let image = SceneImage::file("wood", "../textures/./wood.png");
        let record = resolver.resolve_image(&image).unwrap().unwrap();

        match record {
            TextureRecord::FileRef { path, name } => {
                assert_eq!(name, "wood");
                assert_eq!(path, PathBuf::from("/scenes/textures/wood.png"));
            }
            other => panic!("expected file reference, got {:?}", other),
        }
    }

    #[test]
    fn test_file_path_wins_over_packed() {
        let resolver = TextureResolver::new("/scenes");
        let mut image = SceneImage::packed("both", rgba_2x2());
        image.filepath = Some(PathBuf::from("/abs/both.png"));

        let record = resolver.resolve_image(&image).unwrap().unwrap();
        assert!(!record.is_packed());
    }

    #[test]
    fn test_empty_path_uses_packed_pixels() {
        let resolver = TextureResolver::new("/scenes");
        let mut image = SceneImage::packed(
            "img",
            PackedPixels {
                width: 1,
                height: 1,
                channels: 3,
                pixels: vec![1.0, 0.0, 0.0],
            },
        );
        image.filepath = Some(PathBuf::new());

        match resolver.resolve_image(&image).unwrap() {
            Some(TextureRecord::PackedRaster(raster)) => assert_eq!(raster.data(), &[255, 0, 0]),
            other => panic!("expected packed raster, got {:?}", other),
        }
    }

    #[test]
    fn test_image_without_data_skipped() {
        let resolver = TextureResolver::new("/scenes");
        assert!(resolver.resolve_image(&SceneImage::empty("void")).unwrap().is_none());

        let mut blank = SceneImage::empty("blank");
        blank.filepath = Some(PathBuf::from(""));
        assert!(resolver.resolve_image(&blank).unwrap().is_none());
    }

    #[test]
    fn test_resolve_assigns_indices_per_material() {
        let scene = InMemoryScene::new()
            .with_image(SceneImage::packed("shared", rgba_2x2()))
            .with_image(SceneImage::file("albedo", "/tex/albedo.png"))
            .with_image(SceneImage::empty("void"));

        let object = SceneObject::mesh("Cube", PolygonMesh::default())
            .with_material(
                SceneMaterial::new("A", [1.0, 1.0, 1.0, 1.0])
                    .with_image("shared")
                    .with_image("void"),
            )
            .with_material(
                SceneMaterial::new("B", [1.0, 1.0, 1.0, 1.0])
                    .with_image("albedo")
                    .with_image("shared")
                    .with_image("missing"),
            );

        let mut materials = MaterialCollector::new().collect(&object);
        let textures = TextureResolver::new("/").resolve(&scene, &mut materials).unwrap();

        assert_eq!(textures.len(), 3);
        assert_eq!(materials[0].record.textures, vec![0]);
        assert_eq!(materials[1].record.textures, vec![1, 2]);
        assert!(textures[0].is_packed());
        assert!(textures[2].is_packed());
        assert_eq!(textures[1].name(), "albedo");
    }
}
