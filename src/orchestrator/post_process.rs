//! Post-submission processing.
//!
//! Durable caching of the successful payload and CSV export of the rendered
//! table.

use crate::model::ResultPayload;
use crate::store::StateStore;
use crate::view::TableView;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Persist the most recent successful payload, overwriting the previous one.
/// Returns the cache location when the store is file-backed.
pub(crate) fn cache_result(
    store: &dyn StateStore,
    payload: &ResultPayload,
) -> Result<Option<PathBuf>> {
    store.save_last_result(payload)?;
    Ok(store.cache_path())
}

/// Write the table as CSV at the given path.
pub(crate) fn export_csv(path: &Path, view: &TableView) -> Result<()> {
    std::fs::write(path, view.to_csv()).with_context(|| format!("write {}", path.display()))
}

/// Default export filename: timestamp plus the short job id when one is
/// disclosed.
pub(crate) fn default_csv_name(short_id: Option<&str>) -> String {
    let ts = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
        .replace(':', "-")
        .replace('T', "_");
    match short_id {
        Some(id) => format!("seqjob-result-{ts}-{id}.csv"),
        None => format!("seqjob-result-{ts}.csv"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::store::MemStore;
    use serde_json::json;

    #[test]
    fn cache_result_overwrites_the_previous_payload() {
        let store = MemStore::default();
        let first: ResultPayload =
            serde_json::from_value(json!({"records": [{"a": 1}]})).unwrap();
        let second: ResultPayload =
            serde_json::from_value(json!({"records": [{"a": 2}]})).unwrap();

        assert_eq!(cache_result(&store, &first).unwrap(), None);
        cache_result(&store, &second).unwrap();
        assert_eq!(store.load_last_result(), Some(second));
    }

    #[test]
    fn export_writes_the_full_table() {
        let payload = serde_json::from_value(json!({
            "columns": ["a", "b"],
            "rows": [[1, 2]]
        }))
        .unwrap();
        let view = TableView::new(normalize(&payload));
        let path = std::env::temp_dir().join(format!(
            "seqjob-export-test-{}.csv",
            std::process::id()
        ));
        export_csv(&path, &view).unwrap();
        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(csv, "a,b\n1,2\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn default_name_includes_the_short_id_when_present() {
        let named = default_csv_name(Some("3f2c9a54"));
        assert!(named.starts_with("seqjob-result-"));
        assert!(named.ends_with("-3f2c9a54.csv"));
        assert!(!named.contains(':'));

        let anonymous = default_csv_name(None);
        assert!(anonymous.ends_with(".csv"));
        assert!(!anonymous.contains("3f2c9a54"));
    }
}
