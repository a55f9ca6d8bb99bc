//! Export orchestration
//!
//! Walks the scene, runs every stage per object and hands the assembled
//! package to the injected backend exactly once.

use crate::dedup;
use crate::geometry::GeometryNormalizer;
use crate::logging::instrument_stage;
use crate::materials::MaterialCollector;
use crate::scene::{SceneObject, SceneSource};
use crate::textures::TextureResolver;
use gltfcomp_core::{
    BackendReport, CompressionBackend, CompressionOptions, Error, MeshExportRecord, Result, ResultExt,
    SceneExportPackage, TextureRecord,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Parameters of one export invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Requested output file; its parent directory is the output folder
    pub output_path: PathBuf,
    pub options: CompressionOptions,
    /// Export only selected objects
    pub selected_only: bool,
}

impl ExportRequest {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            options: CompressionOptions::default(),
            selected_only: false,
        }
    }

    pub fn with_options(mut self, options: CompressionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_selected_only(mut self, selected_only: bool) -> Self {
        self.selected_only = selected_only;
        self
    }

    /// Parent directory of the output path, `.` when it has none
    pub fn output_folder(&self) -> PathBuf {
        self.output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Per-object counters of one package build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageStats {
    pub exported_objects: usize,
    /// Non-mesh objects, objects without mesh data and empty meshes
    pub skipped_objects: usize,
    /// Objects dropped because of malformed data
    pub failed_objects: usize,
}

/// Result of a completed export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub exported_objects: usize,
    pub skipped_objects: usize,
    pub failed_objects: usize,
    pub texture_count: usize,
    pub triangle_count: usize,
    pub report: BackendReport,
}

enum ObjectOutcome {
    Exported(MeshExportRecord, Vec<TextureRecord>),
    Skipped(&'static str),
}

/// Drives the extraction pipeline for one backend
pub struct ExportOrchestrator<B> {
    backend: B,
    normalizer: GeometryNormalizer,
    collector: MaterialCollector,
}

impl<B: CompressionBackend> ExportOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            normalizer: GeometryNormalizer::new(),
            collector: MaterialCollector::new(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: GeometryNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Run a full export
    ///
    /// Options are validated and the backend probed before any object is
    /// touched. The backend is called once, even for an empty package.
    pub fn export<S>(&mut self, scene: &S, request: &ExportRequest) -> Result<ExportSummary>
    where
        S: SceneSource + ?Sized,
    {
        let options = request.options.validated()?;

        let backend_name = self.backend.name().to_string();
        self.backend.probe().map_err(|e| match e {
            e @ Error::BackendUnavailable { .. } => e,
            other => Error::BackendUnavailable {
                backend: backend_name.clone(),
                reason: other.to_string(),
            },
        })?;

        let output_folder = request.output_folder();
        fs::create_dir_all(&output_folder).map_err(|source| Error::OutputDirectory {
            path: output_folder.clone(),
            source,
        })?;

        info!(
            backend = %backend_name,
            output = %request.output_path.display(),
            objects = scene.objects().len(),
            "Starting export"
        );

        let (package, stats) = self.build_package(scene, request.selected_only);

        let report = instrument_stage("compress", || {
            self.backend
                .compress(&package, &output_folder, &request.output_path, &options)
                .with_context(|| format!("{} backend writing {}", backend_name, request.output_path.display()))
        })?;

        info!(
            meshes = package.meshes.len(),
            textures = package.textures.len(),
            triangles = package.triangle_count(),
            failed = stats.failed_objects,
            "Export complete"
        );

        Ok(ExportSummary {
            output_path: request.output_path.clone(),
            exported_objects: stats.exported_objects,
            skipped_objects: stats.skipped_objects,
            failed_objects: stats.failed_objects,
            texture_count: package.textures.len(),
            triangle_count: package.triangle_count(),
            report,
        })
    }

    /// Run every extraction stage and assemble the package without a backend
    ///
    /// Objects that fail are logged and contribute nothing.
    pub fn build_package<S>(&self, scene: &S, selected_only: bool) -> (SceneExportPackage, PackageStats)
    where
        S: SceneSource + ?Sized,
    {
        let resolver = TextureResolver::new(scene.base_dir());
        let mut package = SceneExportPackage::new();
        let mut stats = PackageStats::default();

        for object in scene.objects() {
            if selected_only && !object.selected {
                continue;
            }

            match self.process_object(scene, &resolver, object) {
                Ok(ObjectOutcome::Exported(record, textures)) => {
                    debug!(
                        object = %object.name,
                        vertices = record.mesh.vertex_count(),
                        triangles = record.mesh.triangle_count(),
                        materials = record.materials.len(),
                        textures = textures.len(),
                        "Object exported"
                    );
                    package.push_object(record, textures);
                    stats.exported_objects += 1;
                }
                Ok(ObjectOutcome::Skipped(reason)) => {
                    debug!(object = %object.name, reason, "Object skipped");
                    stats.skipped_objects += 1;
                }
                Err(e) => {
                    warn!(object = %object.name, error = %e, "Object failed, skipping");
                    stats.failed_objects += 1;
                }
            }
        }

        (package, stats)
    }

    fn process_object<S>(&self, scene: &S, resolver: &TextureResolver, object: &SceneObject) -> Result<ObjectOutcome>
    where
        S: SceneSource + ?Sized,
    {
        if !object.is_mesh() {
            return Ok(ObjectOutcome::Skipped("not a mesh"));
        }
        let Some(mesh) = &object.mesh else {
            return Ok(ObjectOutcome::Skipped("no mesh data"));
        };

        let geometry = instrument_stage("normalize", || self.normalizer.normalize(&object.name, mesh))?;
        if geometry.is_empty() {
            return Ok(ObjectOutcome::Skipped("empty mesh"));
        }
        let indexed = instrument_stage("deduplicate", || dedup::deduplicate(&geometry));

        let mut materials = instrument_stage("materials", || self.collector.collect(object));
        let textures = instrument_stage("textures", || resolver.resolve(scene, &mut materials))?;

        let record = MeshExportRecord {
            object_name: object.name.clone(),
            local_name: mesh.name.clone().unwrap_or_else(|| object.name.clone()),
            mesh: indexed,
            materials: materials.into_iter().map(|m| m.record).collect(),
        };

        Ok(ObjectOutcome::Exported(record, textures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{InMemoryScene, ObjectKind, Polygon, PolygonMesh};

    #[derive(Default)]
    struct CountingBackend {
        calls: usize,
        last: Option<SceneExportPackage>,
    }

    impl CompressionBackend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn compress(
            &mut self,
            package: &SceneExportPackage,
            _output_folder: &Path,
            _output_filepath: &Path,
            _options: &CompressionOptions,
        ) -> Result<BackendReport> {
            self.calls += 1;
            self.last = Some(package.clone());
            Ok(BackendReport::default())
        }
    }

    struct FailingBackend;

    impl CompressionBackend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }

        fn compress(
            &mut self,
            _package: &SceneExportPackage,
            _output_folder: &Path,
            _output_filepath: &Path,
            _options: &CompressionOptions,
        ) -> Result<BackendReport> {
            Err(Error::backend("failing", "disk full"))
        }
    }

    fn triangle() -> PolygonMesh {
        PolygonMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![Polygon::flat([0, 1, 2])],
        )
    }

    #[test]
    fn test_output_folder() {
        assert_eq!(ExportRequest::new("out/model.glb").output_folder(), PathBuf::from("out"));
        assert_eq!(ExportRequest::new("model.glb").output_folder(), PathBuf::from("."));
    }

    #[test]
    fn test_build_package_counts() {
        let scene = InMemoryScene::new()
            .with_object(SceneObject::mesh("Tri", triangle()))
            .with_object(SceneObject::other("Camera", ObjectKind::Camera))
            .with_object(SceneObject::mesh("Empty", PolygonMesh::default()))
            .with_object(SceneObject::mesh(
                "Broken",
                PolygonMesh::new(vec![[0.0; 3]], vec![Polygon::flat([0, 1, 2])]),
            ));

        let orchestrator = ExportOrchestrator::new(CountingBackend::default());
        let (package, stats) = orchestrator.build_package(&scene, false);

        assert_eq!(package.meshes.len(), 1);
        assert_eq!(package.meshes[0].object_name, "Tri");
        assert_eq!(package.meshes[0].local_name, "Tri");
        assert_eq!(
            stats,
            PackageStats {
                exported_objects: 1,
                skipped_objects: 2,
                failed_objects: 1,
            }
        );
    }

    #[test]
    fn test_selected_only() {
        let scene = InMemoryScene::new()
            .with_object(SceneObject::mesh("A", triangle()).with_selected(true))
            .with_object(SceneObject::mesh("B", triangle()));

        let orchestrator = ExportOrchestrator::new(CountingBackend::default());
        let (package, _) = orchestrator.build_package(&scene, true);
        assert_eq!(package.meshes.len(), 1);
        assert_eq!(package.meshes[0].object_name, "A");
    }

    #[test]
    fn test_local_name_from_mesh() {
        let scene = InMemoryScene::new().with_object(SceneObject::mesh("Obj", triangle().with_name("TriData")));
        let orchestrator = ExportOrchestrator::new(CountingBackend::default());
        let (package, _) = orchestrator.build_package(&scene, false);
        assert_eq!(package.meshes[0].local_name, "TriData");
    }

    #[test]
    fn test_export_calls_backend_once() {
        let dir = tempfile::tempdir().unwrap();
        let scene = InMemoryScene::new().with_object(SceneObject::mesh("Tri", triangle()));
        let request = ExportRequest::new(dir.path().join("nested/out.glb"));

        let mut orchestrator = ExportOrchestrator::new(CountingBackend::default());
        let summary = orchestrator.export(&scene, &request).unwrap();

        assert_eq!(summary.exported_objects, 1);
        assert_eq!(summary.triangle_count, 1);
        assert!(dir.path().join("nested").is_dir());

        let backend = orchestrator.into_backend();
        assert_eq!(backend.calls, 1);
        assert_eq!(backend.last.unwrap().meshes.len(), 1);
    }

    #[test]
    fn test_backend_failure_names_output() {
        let dir = tempfile::tempdir().unwrap();
        let scene = InMemoryScene::new().with_object(SceneObject::mesh("Tri", triangle()));
        let request = ExportRequest::new(dir.path().join("out.gltf"));

        let err = ExportOrchestrator::new(FailingBackend)
            .export(&scene, &request)
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("failing backend writing"));
        assert!(message.contains("out.gltf"));
        assert!(message.contains("disk full"));
        match err {
            Error::WithContext { source, .. } => assert!(matches!(*source, Error::Backend { .. })),
            other => panic!("expected context, got {:?}", other),
        }
    }
}
