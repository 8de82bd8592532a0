use mlagent::AgentError;
use mlagent::db::{DbModel, ModelCreate, ModelSelector, ResourceCreate, Store};
use sqlx::Connection;
use tempfile::TempDir;

fn database_url(dir: &TempDir) -> String {
    format!("sqlite:{}", dir.path().join("agent.db").display())
}

async fn connected_store(dir: &TempDir) -> Store {
    let mut store = Store::new(&database_url(dir), "test.").unwrap();
    store.connect().await.unwrap();
    store
}

fn model(name: &str, path: &str, active: bool) -> ModelCreate {
    ModelCreate {
        name: name.to_string(),
        path: path.to_string(),
        active,
        description: String::new(),
        app_info: String::new(),
    }
}

fn resource(name: &str, path: &str, description: &str) -> ResourceCreate {
    ResourceCreate {
        name: name.to_string(),
        path: path.to_string(),
        description: description.to_string(),
        app_info: String::new(),
    }
}

fn summary(rows: &[DbModel]) -> Vec<(i64, bool, &str)> {
    rows.iter()
        .map(|r| (r.version, r.active, r.path.as_str()))
        .collect()
}

#[tokio::test]
async fn connect_is_idempotent_and_data_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::new(&database_url(&dir), "test.").unwrap();

    store.connect().await.unwrap();
    store.connect().await.unwrap();
    assert!(store.is_connected());
    store.set_pipeline("cam", "v4l2src ! fakesink").await.unwrap();

    store.disconnect().await;
    store.disconnect().await;
    assert!(matches!(
        store.get_pipeline("cam").await,
        Err(AgentError::NotConnected)
    ));

    store.connect().await.unwrap();
    assert_eq!(store.get_pipeline("cam").await.unwrap(), "v4l2src ! fakesink");
}

#[tokio::test]
async fn pipeline_round_trip_overwrite_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = connected_store(&dir).await;

    store.set_pipeline("k", "a ! b").await.unwrap();
    assert_eq!(store.get_pipeline("k").await.unwrap(), "a ! b");

    store.set_pipeline("k", "c ! d").await.unwrap();
    assert_eq!(store.get_pipeline("k").await.unwrap(), "c ! d");

    store.delete_pipeline("k").await.unwrap();
    assert!(matches!(
        store.get_pipeline("k").await,
        Err(AgentError::NotFound(_))
    ));
    assert!(matches!(
        store.delete_pipeline("k").await,
        Err(AgentError::NotFound(_))
    ));

    assert!(matches!(
        store.set_pipeline("k", "").await,
        Err(AgentError::InvalidArgument(_))
    ));
    assert!(matches!(
        store.get_pipeline("").await,
        Err(AgentError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn model_registration_activation_and_deletion_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = connected_store(&dir).await;

    assert_eq!(store.register_model(model("m", "/a", true)).await.unwrap(), 1);
    assert_eq!(store.register_model(model("m", "/b", true)).await.unwrap(), 2);

    let all = store.get_model("m", ModelSelector::All).await.unwrap();
    assert_eq!(summary(&all), vec![(1, false, "/a"), (2, true, "/b")]);

    store.delete_model("m", 1, false).await.unwrap();

    let err = store.delete_model("m", 2, false).await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidState(_)));
    let all = store.get_model("m", ModelSelector::All).await.unwrap();
    assert_eq!(summary(&all), vec![(2, true, "/b")]);

    store.delete_model("m", 0, false).await.unwrap();
    assert!(matches!(
        store.get_model("m", ModelSelector::All).await,
        Err(AgentError::NotFound(_))
    ));
    assert!(matches!(
        store.delete_model("m", 0, false).await,
        Err(AgentError::NotFound(_))
    ));
}

#[tokio::test]
async fn versions_count_up_per_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = connected_store(&dir).await;

    for expected in 1..=5 {
        let v = store
            .register_model(model("alpha", &format!("/alpha/{expected}"), expected % 2 == 0))
            .await
            .unwrap();
        assert_eq!(v, expected);
    }
    assert_eq!(store.register_model(model("beta", "/b", false)).await.unwrap(), 1);

    let versions: Vec<i64> = store
        .get_model("alpha", ModelSelector::All)
        .await
        .unwrap()
        .iter()
        .map(|r| r.version)
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn at_most_one_version_is_active() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = connected_store(&dir).await;

    store.register_model(model("m", "/a", true)).await.unwrap();
    store.register_model(model("m", "/b", false)).await.unwrap();
    store.register_model(model("m", "/c", false)).await.unwrap();

    let active = store.get_model("m", ModelSelector::Active).await.unwrap();
    assert_eq!(summary(&active), vec![(1, true, "/a")]);

    store.activate_model("m", 3).await.unwrap();
    let active = store.get_model("m", ModelSelector::Active).await.unwrap();
    assert_eq!(summary(&active), vec![(3, true, "/c")]);

    store.activate_model("m", 2).await.unwrap();
    let all = store.get_model("m", ModelSelector::All).await.unwrap();
    assert_eq!(
        summary(&all),
        vec![(1, false, "/a"), (2, true, "/b"), (3, false, "/c")]
    );

    assert!(matches!(
        store.activate_model("m", 9).await,
        Err(AgentError::NotFound(_))
    ));
    assert!(matches!(
        store.activate_model("m", 0).await,
        Err(AgentError::InvalidArgument(_))
    ));
    // The failed activation left the previous choice in place.
    let active = store.get_model("m", ModelSelector::Active).await.unwrap();
    assert_eq!(active[0].version, 2);
}

#[tokio::test]
async fn inactive_models_report_no_active_version() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = connected_store(&dir).await;

    store.register_model(model("m", "/a", false)).await.unwrap();
    assert!(matches!(
        store.get_model("m", ModelSelector::Active).await,
        Err(AgentError::NotFound(_))
    ));
    assert!(matches!(
        store.get_model("m", ModelSelector::Version(4)).await,
        Err(AgentError::NotFound(_))
    ));
    let one = store.get_model("m", ModelSelector::Version(1)).await.unwrap();
    assert_eq!(summary(&one), vec![(1, false, "/a")]);
}

#[tokio::test]
async fn update_description_targets_one_version() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = connected_store(&dir).await;

    store.register_model(model("m", "/a", true)).await.unwrap();
    store.register_model(model("m", "/b", false)).await.unwrap();
    store
        .update_model_description("m", 2, "quantized")
        .await
        .unwrap();

    let all = store.get_model("m", ModelSelector::All).await.unwrap();
    assert_eq!(all[0].description, "");
    assert_eq!(all[1].description, "quantized");

    assert!(matches!(
        store.update_model_description("m", 7, "x").await,
        Err(AgentError::NotFound(_))
    ));
    assert!(matches!(
        store.update_model_description("m", 1, "").await,
        Err(AgentError::InvalidArgument(_))
    ));
    assert!(matches!(
        store.update_model_description("m", 0, "x").await,
        Err(AgentError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn forced_delete_removes_the_active_version() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = connected_store(&dir).await;

    store.register_model(model("m", "/a", false)).await.unwrap();
    store.register_model(model("m", "/b", true)).await.unwrap();

    store.delete_model("m", 2, true).await.unwrap();
    assert!(matches!(
        store.get_model("m", ModelSelector::Active).await,
        Err(AgentError::NotFound(_))
    ));
    let all = store.get_model("m", ModelSelector::All).await.unwrap();
    assert_eq!(summary(&all), vec![(1, false, "/a")]);
    assert!(matches!(
        store.delete_model("m", 2, true).await,
        Err(AgentError::NotFound(_))
    ));
}

#[tokio::test]
async fn resources_keep_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = connected_store(&dir).await;

    store.set_resource(resource("r", "/p1", "first")).await.unwrap();
    store.set_resource(resource("r", "/p2", "second")).await.unwrap();
    store.set_resource(resource("other", "/p1", "x")).await.unwrap();
    store.set_resource(resource("r", "/p1", "first, again")).await.unwrap();

    let rows = store.get_resource("r").await.unwrap();
    let listed: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.path.as_str(), r.description.as_str()))
        .collect();
    assert_eq!(listed, vec![("/p1", "first, again"), ("/p2", "second")]);

    store.delete_resource("r").await.unwrap();
    assert!(matches!(
        store.get_resource("r").await,
        Err(AgentError::NotFound(_))
    ));
    assert!(matches!(
        store.delete_resource("r").await,
        Err(AgentError::NotFound(_))
    ));
    assert_eq!(store.get_resource("other").await.unwrap().len(), 1);

    assert!(matches!(
        store.set_resource(resource("r", "", "x")).await,
        Err(AgentError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn key_prefixes_isolate_stores_sharing_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let url = database_url(&dir);
    let mut a = Store::new(&url, "a.").unwrap();
    let mut b = Store::new(&url, "b.").unwrap();
    a.connect().await.unwrap();
    b.connect().await.unwrap();

    a.set_pipeline("p", "from ! a").await.unwrap();
    assert!(matches!(b.get_pipeline("p").await, Err(AgentError::NotFound(_))));
    b.set_pipeline("p", "from ! b").await.unwrap();

    assert_eq!(a.get_pipeline("p").await.unwrap(), "from ! a");
    assert_eq!(b.get_pipeline("p").await.unwrap(), "from ! b");
    assert_eq!(a.register_model(model("m", "/x", true)).await.unwrap(), 1);
    assert_eq!(b.register_model(model("m", "/y", true)).await.unwrap(), 1);
}

#[tokio::test]
async fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let url = database_url(&dir);

    let mut store = Store::new(&url, "test.").unwrap();
    store.connect().await.unwrap();
    store.disconnect().await;

    let mut raw = sqlx::SqliteConnection::connect(&url).await.unwrap();
    sqlx::query("UPDATE schema_info SET version = 99 WHERE name = 'models'")
        .execute(&mut raw)
        .await
        .unwrap();
    raw.close().await.unwrap();

    let err = store.connect().await.unwrap_err();
    match err {
        AgentError::SchemaMismatch {
            table,
            stored,
            supported,
        } => {
            assert_eq!(table, "models");
            assert_eq!(stored, 99);
            assert_eq!(supported, 1);
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }
    assert!(!store.is_connected());
}
