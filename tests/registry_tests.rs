use mlagent::AgentError;
use mlagent::db::{ModelCreate, ModelSelector, ResourceCreate};
use mlagent::error::ResultCode;
use mlagent::registry::RegistryService;
use mlagent::schema::{ModelInfo, ResourceInfo, errno};
use tempfile::TempDir;

async fn registry(dir: &TempDir) -> RegistryService {
    let database_url = format!("sqlite:{}", dir.path().join("registry.db").display());
    let db = mlagent::db::open(&database_url, "mlagent.").await.unwrap();
    RegistryService::new(db)
}

fn model(name: &str, path: &str, active: bool) -> ModelCreate {
    ModelCreate {
        name: name.to_string(),
        path: path.to_string(),
        active,
        description: format!("{name} at {path}"),
        app_info: r#"{"origin":"test"}"#.to_string(),
    }
}

#[tokio::test]
async fn concurrent_registrations_get_distinct_consecutive_versions() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(&dir).await;

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .register_model(model("shared", &format!("/m/{i}"), i % 3 == 0))
                    .await
            })
        })
        .collect();

    let mut versions = Vec::new();
    for task in tasks {
        versions.push(task.await.unwrap().unwrap());
    }
    versions.sort_unstable();
    assert_eq!(versions, (1..=32).collect::<Vec<u32>>());

    let active_json = registry
        .get_model("shared", ModelSelector::Active)
        .await
        .unwrap();
    let active: ModelInfo = serde_json::from_str(&active_json).unwrap();
    assert!(active.active);

    let all_json = registry.get_model("shared", ModelSelector::All).await.unwrap();
    let all: Vec<ModelInfo> = serde_json::from_str(&all_json).unwrap();
    assert_eq!(all.len(), 32);
    assert_eq!(all.iter().filter(|m| m.active).count(), 1);
}

#[tokio::test]
async fn model_lookups_serialize_info_objects() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(&dir).await;

    assert_eq!(registry.register_model(model("m", "/a", true)).await.unwrap(), 1);
    assert_eq!(registry.register_model(model("m", "/b", false)).await.unwrap(), 2);

    let one: ModelInfo = serde_json::from_str(
        &registry
            .get_model("m", ModelSelector::Version(2))
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(
        one,
        ModelInfo {
            version: 2,
            active: false,
            path: "/b".to_string(),
            description: "m at /b".to_string(),
            app_info: r#"{"origin":"test"}"#.to_string(),
        }
    );

    registry.activate_model("m", 2).await.unwrap();
    let active: ModelInfo = serde_json::from_str(
        &registry.get_model("m", ModelSelector::Active).await.unwrap(),
    )
    .unwrap();
    assert_eq!(active.version, 2);

    let all: Vec<ModelInfo> =
        serde_json::from_str(&registry.get_model("m", ModelSelector::All).await.unwrap()).unwrap();
    let flags: Vec<(u32, bool)> = all.iter().map(|m| (m.version, m.active)).collect();
    assert_eq!(flags, vec![(1, false), (2, true)]);
}

#[tokio::test]
async fn resource_lookup_lists_files_oldest_first() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(&dir).await;

    for path in ["/res/labels.txt", "/res/anchors.bin"] {
        registry
            .add_resource(ResourceCreate {
                name: "detector".to_string(),
                path: path.to_string(),
                description: String::new(),
                app_info: String::new(),
            })
            .await
            .unwrap();
    }

    let files: Vec<ResourceInfo> =
        serde_json::from_str(&registry.get_resource("detector").await.unwrap()).unwrap();
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["/res/labels.txt", "/res/anchors.bin"]);

    registry.delete_resource("detector").await.unwrap();
    let err = registry.get_resource("detector").await.unwrap_err();
    assert_eq!(err.result_code(), errno::EINVAL);
}

#[tokio::test]
async fn errors_map_to_result_codes() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(&dir).await;

    let err = registry.get_pipeline("missing").await.unwrap_err();
    assert!(matches!(err, AgentError::NotFound(_)));
    assert_eq!(err.result_code(), errno::EINVAL);

    let err = registry.set_pipeline("p", "").await.unwrap_err();
    assert_eq!(err.result_code(), errno::EINVAL);

    registry.register_model(model("m", "/a", true)).await.unwrap();
    let err = registry.delete_model("m", 1, false).await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidState(_)));
    assert_eq!(err.result_code(), errno::EINVAL);
}

#[tokio::test]
async fn unusable_database_fails_probe_with_io_code() {
    let dir = tempfile::tempdir().unwrap();
    let database_url = format!(
        "sqlite:{}",
        dir.path().join("no-such-dir").join("agent.db").display()
    );
    let db = mlagent::db::open(&database_url, "mlagent.").await.unwrap();
    let registry = RegistryService::new(db);

    let err = registry.probe().await.unwrap_err();
    assert_eq!(err.result_code(), errno::EIO);
    let err = registry.get_pipeline("p").await.unwrap_err();
    assert_eq!(err.result_code(), errno::EIO);
}
