// ABOUTME: Full-pipeline test - real SQLite staging feeding the engine
// ABOUTME: Verifies field data read from disk drives remote mutations

use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::Mutex;

use field_sync::dedupe::ToleranceGeometry;
use field_sync::engine::{SyncEngine, SyncOptions};
use field_sync::error::SyncError;
use field_sync::records::{Record, RecordCollection};
use field_sync::report::LayerOutcome;
use field_sync::stores::{FieldPredicate, Layer, RemoteStore, SqliteStagingConverter};

struct RecordingRemote {
    layers: Vec<Layer>,
    collection: RecordCollection,
    deletes: Mutex<Vec<Vec<String>>>,
    inserts: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl RemoteStore for RecordingRemote {
    async fn list_layers(&self) -> Result<Vec<Layer>, SyncError> {
        Ok(self.layers.clone())
    }

    async fn fetch_records(&self, _layer: &Layer) -> Result<RecordCollection, SyncError> {
        Ok(self.collection.clone())
    }

    async fn delete_records(
        &self,
        _layer_url: &str,
        predicate: &FieldPredicate,
    ) -> Result<(), SyncError> {
        self.deletes.lock().unwrap().push(predicate.values.clone());
        Ok(())
    }

    async fn insert_records(&self, _layer_url: &str, records: &[Record]) -> Result<(), SyncError> {
        let ids = records
            .iter()
            .map(|r| r.identifier("globalid").unwrap().to_string())
            .collect();
        self.inserts.lock().unwrap().push(ids);
        Ok(())
    }
}

fn remote_record(id: &str, ts: &str) -> Record {
    let mut map = serde_json::Map::new();
    map.insert("globalid".to_string(), json!(id));
    map.insert("last_edited_date".to_string(), json!(ts));
    Record::new(map, None)
}

fn seed_offline_db(path: &Path) {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE hydrants (
            globalid TEXT,
            last_edited_date TEXT,
            geometry TEXT
        );
        INSERT INTO hydrants VALUES
            ('new-77', '2026-08-10T09:00:00Z', '{"x": 3.0, "y": 4.0}'),
            ('hyd-01', '2026-08-12T10:00:00Z', '{"x": 1.0, "y": 2.0}'),
            ('hyd-02', '2026-08-05T08:00:00Z', '{"x": 9.0, "y": 9.0}');
        "#,
    )
    .unwrap();
}

#[tokio::test]
async fn test_offline_sqlite_file_syncs_through_the_engine() {
    let offline_dir = tempfile::tempdir().unwrap();
    let offline_db = offline_dir.path().join("collected.db");
    seed_offline_db(&offline_db);

    // The remote knows hyd-01 (older, canonical case HYD-01) and hyd-02
    // (same timestamp). new-77 is unknown.
    let remote = RecordingRemote {
        layers: vec![Layer {
            name: "hydrants".to_string(),
            url: "mock://service/hydrants".to_string(),
        }],
        collection: RecordCollection::new(
            "hydrants",
            vec!["globalid".to_string(), "last_edited_date".to_string()],
            vec![
                remote_record("HYD-01", "2026-08-11T10:00:00Z"),
                remote_record("HYD-02", "2026-08-05T08:00:00Z"),
            ],
        ),
        deletes: Mutex::new(Vec::new()),
        inserts: Mutex::new(Vec::new()),
    };

    let geometry = ToleranceGeometry::default();
    let engine = SyncEngine::new(&remote, &geometry, SyncOptions::default());
    let report = engine
        .run(&SqliteStagingConverter, &offline_db)
        .await
        .unwrap();

    match &report.layers[0].outcome {
        LayerOutcome::Synced { counts } => {
            assert_eq!(counts.inserted, 1);
            assert_eq!(counts.updated, 1);
            assert_eq!(counts.unchanged, 1);
        }
        other => panic!("expected Synced, got {other:?}"),
    }

    // The update targets the remote's canonical casing.
    let deletes = remote.deletes.lock().unwrap().clone();
    assert_eq!(deletes, vec![vec!["HYD-01".to_string()]]);

    let inserts = remote.inserts.lock().unwrap().clone();
    assert_eq!(inserts.len(), 2);
    assert_eq!(inserts[0], vec!["hyd-01".to_string()]);
    assert_eq!(inserts[1], vec!["new-77".to_string()]);
}

#[tokio::test]
async fn test_missing_offline_file_is_run_fatal() {
    let remote = RecordingRemote {
        layers: vec![],
        collection: RecordCollection::default(),
        deletes: Mutex::new(Vec::new()),
        inserts: Mutex::new(Vec::new()),
    };

    let geometry = ToleranceGeometry::default();
    let engine = SyncEngine::new(&remote, &geometry, SyncOptions::default());
    let err = engine
        .run(&SqliteStagingConverter, Path::new("/nonexistent/field.db"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Workspace(_)));
}
