// ABOUTME: SQLite adapter for the staged offline dataset
// ABOUTME: Stages the offline file into the workspace and reads layer tables as records

use rusqlite::{Connection, OpenFlags};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::records::{Record, RecordCollection};
use crate::stores::{LocalStore, OfflineToStagingConverter};

/// Column holding the record geometry as JSON text. Exposed as
/// `Record::geometry`, not as an attribute.
const GEOMETRY_COLUMN: &str = "geometry";

/// Read-only view over the staged working copy. One table per layer.
#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open the staged database, verifying it is readable SQLite.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| SyncError::Workspace(format!("cannot open staged store {path:?}: {e}")))?;
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| SyncError::Workspace(format!("{path:?} is not a usable database: {e}")))?;
        Ok(Self { path })
    }

    fn connect(&self) -> Result<Connection, SyncError> {
        Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| SyncError::LocalRead(e.to_string()))
    }
}

impl LocalStore for SqliteStore {
    fn open_record_collection(
        &self,
        layer_name: &str,
    ) -> Result<Option<RecordCollection>, SyncError> {
        let conn = self.connect()?;

        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                [layer_name],
                |row| row.get(0),
            )
            .map_err(|e| SyncError::LocalRead(e.to_string()))?;
        if !exists {
            return Ok(None);
        }

        // Layer names come from the hosted service; identifier quoting with
        // doubled quotes keeps them out of the SQL text.
        let quoted = layer_name.replace('"', "\"\"");
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM \"{quoted}\""))
            .map_err(|e| SyncError::LocalRead(e.to_string()))?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let fields: Vec<String> = columns
            .iter()
            .filter(|c| !c.eq_ignore_ascii_case(GEOMETRY_COLUMN))
            .cloned()
            .collect();

        let mut records = Vec::new();
        let mut rows = stmt
            .query([])
            .map_err(|e| SyncError::LocalRead(e.to_string()))?;
        while let Some(row) = rows.next().map_err(|e| SyncError::LocalRead(e.to_string()))? {
            let mut attributes = serde_json::Map::new();
            let mut geometry = None;

            for (idx, column) in columns.iter().enumerate() {
                let value = row
                    .get_ref(idx)
                    .map_err(|e| SyncError::LocalRead(e.to_string()))?;
                let json = value_ref_to_json(value);

                if column.eq_ignore_ascii_case(GEOMETRY_COLUMN) {
                    geometry = match json {
                        Value::String(text) => serde_json::from_str(&text).ok(),
                        Value::Null => None,
                        other => Some(other),
                    };
                } else {
                    attributes.insert(column.clone(), json);
                }
            }

            records.push(Record::new(attributes, geometry));
        }

        Ok(Some(RecordCollection::new(layer_name, fields, records)))
    }
}

fn value_ref_to_json(value: rusqlite::types::ValueRef<'_>) -> Value {
    use rusqlite::types::ValueRef;
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        // Binary blobs carry no reconcilable content for this pipeline
        ValueRef::Blob(_) => Value::Null,
    }
}

/// Stages the offline SQLite dataset by copying it into the scoped workspace.
///
/// The copy keeps the run's reads off the original field-collected file; the
/// workspace owner removes it when the run ends.
#[derive(Debug, Default)]
pub struct SqliteStagingConverter;

impl OfflineToStagingConverter for SqliteStagingConverter {
    fn stage(
        &self,
        offline_path: &Path,
        staging_dir: &Path,
    ) -> Result<Box<dyn LocalStore>, SyncError> {
        if !offline_path.is_file() {
            return Err(SyncError::Workspace(format!(
                "offline dataset {offline_path:?} does not exist or is not a file"
            )));
        }

        let staged = staging_dir.join("staging.db");
        std::fs::copy(offline_path, &staged).map_err(|e| {
            SyncError::Workspace(format!("cannot stage {offline_path:?} to {staged:?}: {e}"))
        })?;
        tracing::info!("Staged offline dataset to {:?}", staged);

        Ok(Box::new(SqliteStore::open(staged)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed_database(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE hydrants (
                globalid TEXT,
                last_edited_date TEXT,
                pressure INTEGER,
                geometry TEXT
            );
            INSERT INTO hydrants VALUES
                ('A1', '2026-08-01T00:00:00Z', 60, '{"x": 1.5, "y": 2.5}'),
                ('B2', '2026-08-02T00:00:00Z', 45, NULL);
            "#,
        )
        .unwrap();
    }

    #[test]
    fn test_reads_layer_table_as_collection() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("field.db");
        seed_database(&db);

        let store = SqliteStore::open(&db).unwrap();
        let coll = store.open_record_collection("hydrants").unwrap().unwrap();

        assert_eq!(coll.layer, "hydrants");
        assert_eq!(coll.fields, vec!["globalid", "last_edited_date", "pressure"]);
        assert_eq!(coll.records.len(), 2);

        let a1 = coll.record_by_id("globalid", "A1").unwrap();
        assert_eq!(a1.attribute("pressure"), Some(&json!(60)));
        assert_eq!(a1.geometry, Some(json!({"x": 1.5, "y": 2.5})));

        let b2 = coll.record_by_id("globalid", "B2").unwrap();
        assert!(b2.geometry.is_none());
    }

    #[test]
    fn test_missing_layer_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("field.db");
        seed_database(&db);

        let store = SqliteStore::open(&db).unwrap();
        assert!(store.open_record_collection("valves").unwrap().is_none());
    }

    #[test]
    fn test_converter_copies_into_staging_dir() {
        let source_dir = tempfile::tempdir().unwrap();
        let staging_dir = tempfile::tempdir().unwrap();
        let db = source_dir.path().join("field.db");
        seed_database(&db);

        let local = SqliteStagingConverter
            .stage(&db, staging_dir.path())
            .unwrap();
        assert!(staging_dir.path().join("staging.db").is_file());

        let coll = local.open_record_collection("hydrants").unwrap().unwrap();
        assert_eq!(coll.records.len(), 2);
    }

    #[test]
    fn test_converter_rejects_missing_offline_file() {
        let staging_dir = tempfile::tempdir().unwrap();
        let err = SqliteStagingConverter
            .stage(Path::new("/nonexistent/field.db"), staging_dir.path())
            .unwrap_err();
        assert!(matches!(err, SyncError::Workspace(_)));
    }

    #[test]
    fn test_open_rejects_non_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, "this is not sqlite").unwrap();
        assert!(SqliteStore::open(&path).is_err());
    }
}
