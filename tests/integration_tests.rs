use anyhow::Result;
use frame_ingest::adapters::storage::{FilesystemStorage, NamespacedVolumeStorage};
use frame_ingest::composition::registry::{builtin, StorageConfig, StorageFactory};
use frame_ingest::config::toml_config::EnvironmentFile;
use frame_ingest::{
    run, run_with, Destination, Environment, ImplementationReference, IngestError, Payload,
    Registry, Source, Stage, StorageBackend,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

struct StubSource;

impl Source for StubSource {
    fn fetch(&self) -> frame_ingest::Result<Payload> {
        Ok(Payload::from(json!({"payload": [{"id": 1, "name": "A"}]})))
    }
}

struct FailingSource;

impl Source for FailingSource {
    fn fetch(&self) -> frame_ingest::Result<Payload> {
        Err(IngestError::collaborator(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "frame API unreachable",
        )))
    }
}

fn stub_source() -> ImplementationReference {
    ImplementationReference::from_string("tests.sources.StubSource").unwrap()
}

fn environment_writing_to(file_path: std::path::PathBuf) -> Environment {
    Environment::default_environment()
        .with_source(stub_source())
        .with_destination(Destination {
            file_path,
            ..Destination::default()
        })
}

#[test]
fn test_end_to_end_stub_source_to_filesystem() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file_path = temp_dir.path().join("landing").join("data.json");

    let mut registry = Registry::builtin();
    registry.register_source(stub_source(), || Ok(Box::new(StubSource)));

    run_with(&registry, &environment_writing_to(file_path.clone()))?;

    assert!(file_path.exists());
    assert_eq!(
        std::fs::read_to_string(&file_path)?,
        r#"{"payload": [{"id": 1, "name": "A"}]}"#
    );
    Ok(())
}

#[test]
fn test_run_twice_overwrites_previous_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file_path = temp_dir.path().join("nested").join("data.json");
    let mut registry = Registry::builtin();
    registry.register_source(stub_source(), || Ok(Box::new(StubSource)));
    let env = environment_writing_to(file_path.clone());

    run_with(&registry, &env)?;
    run_with(&registry, &env)?;

    assert_eq!(
        std::fs::read_to_string(&file_path)?,
        r#"{"payload": [{"id": 1, "name": "A"}]}"#
    );
    Ok(())
}

#[test]
fn test_builtin_default_environment_with_output_override() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file_path = temp_dir.path().join("frames.json");
    let env = Environment::default_environment().with_destination(Destination {
        file_path: file_path.clone(),
        ..Destination::default()
    });

    run(&env)?;

    let written: serde_json::Value = serde_json::from_slice(&std::fs::read(&file_path)?)?;
    assert_eq!(written["payload"].as_array().map(Vec::len), Some(4));
    assert_eq!(written["payload"][0]["location"], "London, UK");
    Ok(())
}

#[test]
fn test_unknown_storage_kind_instantiates_nothing() -> Result<()> {
    let constructed = Arc::new(AtomicUsize::new(0));
    let object_store = ImplementationReference::from_string("tests.storage.ObjectStore")?;

    let mut registry = Registry::builtin();
    let counter = constructed.clone();
    registry.register_source(stub_source(), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSource))
    });
    let counter = constructed.clone();
    registry.register_storage(
        object_store.clone(),
        StorageFactory::new("object-store", move |_config| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FilesystemStorage::new("/unused")) as Box<dyn StorageBackend>)
        }),
    );

    let env = Environment::default_environment()
        .with_source(stub_source())
        .with_storage(object_store);

    let err = run_with(&registry, &env).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Resolve));
    assert!(matches!(
        err.root(),
        IngestError::UnsupportedStorageKind { kind, .. } if kind == "object-store"
    ));
    assert_eq!(constructed.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_unregistered_storage_is_a_resolution_error() -> Result<()> {
    let env = Environment::default_environment()
        .with_storage(ImplementationReference::from_string("tests.storage.Nowhere")?);

    let err = run(&env).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Resolve));
    assert!(matches!(err.root(), IngestError::Resolution { .. }));
    Ok(())
}

#[test]
fn test_source_error_propagates_unmodified() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file_path = temp_dir.path().join("data.json");
    let failing = ImplementationReference::from_string("tests.sources.FailingSource")?;

    let mut registry = Registry::builtin();
    registry.register_source(failing.clone(), || Ok(Box::new(FailingSource)));
    let env = environment_writing_to(file_path.clone()).with_source(failing);

    let err = run_with(&registry, &env).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Fetch));
    match err.root() {
        IngestError::Collaborator(source) => {
            let io_error = source.downcast_ref::<std::io::Error>().unwrap();
            assert_eq!(io_error.kind(), std::io::ErrorKind::ConnectionRefused);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!file_path.exists());
    Ok(())
}

#[test]
fn test_namespaced_volume_environment_lands_under_mount_root() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mount_root = temp_dir.path().to_path_buf();

    // Same storage type, mounted inside the temp dir instead of /Volumes.
    let mut registry = Registry::builtin();
    registry.register_storage(
        builtin::namespaced_volume_storage(),
        StorageFactory::of::<NamespacedVolumeStorage, _>(move |config| match config {
            StorageConfig::NamespacedVolume {
                namespace,
                sub_namespace,
                volume,
                relative_path,
            } => Ok(Box::new(
                NamespacedVolumeStorage::new(namespace, sub_namespace, volume, relative_path)?
                    .with_mount_root(&mount_root),
            ) as Box<dyn StorageBackend>),
            other => Err(IngestError::Config {
                message: format!("unexpected storage config: {other}"),
            }),
        }),
    );

    run_with(&registry, &Environment::production_environment())?;

    let written = temp_dir
        .path()
        .join("prod_catalog_base/default/sales-reporting-gen2/landing_layer/frames.json");
    let frames: serde_json::Value = serde_json::from_slice(&std::fs::read(written)?)?;
    assert_eq!(
        frames[0],
        json!({"id": "10", "name": "frame1", "location": "London, UK"})
    );
    assert_eq!(frames.as_array().map(Vec::len), Some(4));
    Ok(())
}

#[test]
fn test_environment_file_drives_the_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("rest").join("frames.json");
    let normalized_path = output.to_string_lossy().replace('\\', "/");

    let config_content = format!(
        r#"
[environment]
name = "dev"

[implementations]
source = "frame_ingest.adapters.source.RestFrameService"
transformer = "frame_ingest.adapters.parser.FrameParser"
storage = "frame_ingest.adapters.storage.FilesystemStorage"

[destination]
file_path = "{}"
"#,
        normalized_path
    );
    let config_path = temp_dir.path().join("dev.toml");
    std::fs::write(&config_path, config_content)?;

    let env = EnvironmentFile::from_file(&config_path)?.into_environment()?;
    run(&env)?;

    assert_eq!(
        std::fs::read_to_string(&output)?,
        r#"[{"id": "1", "name": "frame1", "location": null}, {"id": "2", "name": "frame2", "location": null}, {"id": "3", "name": "frame3", "location": null}]"#
    );
    Ok(())
}
