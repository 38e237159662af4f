//! Payload normalization.
//!
//! Reconciles the heterogeneous result shapes the backend is allowed to send
//! into one uniform columns + records form. Three-tier fallback: explicit
//! records (or the `data` alias), columns inferred from the first record,
//! records synthesized from `columns` + `rows`.

use crate::model::{NormalizedResult, ResultPayload};
use serde_json::{Map, Value};

/// Normalize a raw payload into ordered columns plus field-keyed records.
///
/// Steps, in order:
/// 1. records come from `records`, else `data`, else empty;
/// 2. columns come from `columns`, else the first record's keys in that
///    record's own order;
/// 3. with no records but both `columns` and `rows` present, one record is
///    synthesized per row;
/// 4. no derivable columns means the empty table, a valid terminal state.
pub fn normalize(payload: &ResultPayload) -> NormalizedResult {
    let mut records = payload
        .records
        .clone()
        .or_else(|| payload.data.clone())
        .unwrap_or_default();

    let mut columns = payload.columns.clone().unwrap_or_default();
    if columns.is_empty() {
        if let Some(first) = records.first() {
            columns = first.keys().cloned().collect();
        }
    }

    if records.is_empty() && !columns.is_empty() {
        if let Some(rows) = payload.rows.as_ref() {
            records = rows.iter().map(|row| record_from_row(&columns, row)).collect();
        }
    }

    if columns.is_empty() {
        return NormalizedResult::default();
    }

    NormalizedResult { columns, records }
}

/// Map one row onto the column list. Positional arrays are zipped with the
/// columns; object rows are looked up by column name, falling back to the
/// stringified position for rows keyed by index.
fn record_from_row(columns: &[String], row: &Value) -> Map<String, Value> {
    match row {
        Value::Array(values) => columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                (col.clone(), values.get(i).cloned().unwrap_or(Value::Null))
            })
            .collect(),
        Value::Object(fields) => columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let value = fields
                    .get(col)
                    .or_else(|| fields.get(&i.to_string()))
                    .cloned()
                    .unwrap_or(Value::Null);
                (col.clone(), value)
            })
            .collect(),
        _ => columns
            .iter()
            .map(|col| (col.clone(), Value::Null))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: serde_json::Value) -> ResultPayload {
        serde_json::from_value(v).expect("payload parses")
    }

    #[test]
    fn records_pass_through_with_inferred_columns() {
        let p = payload(json!({
            "records": [
                {"epitope": "SIINFEKL", "count": 3},
                {"epitope": "GILGFVFTL", "count": 1}
            ]
        }));
        let n = normalize(&p);
        assert_eq!(n.columns, vec!["epitope", "count"]);
        assert_eq!(n.records.len(), 2);
        assert_eq!(n.records[0]["count"], json!(3));
    }

    #[test]
    fn data_is_an_alias_for_records() {
        let p = payload(json!({
            "data": [{"a": 1, "b": 2}]
        }));
        let n = normalize(&p);
        assert_eq!(n.columns, vec!["a", "b"]);
        assert_eq!(n.records.len(), 1);
    }

    #[test]
    fn explicit_columns_win_over_inference() {
        let p = payload(json!({
            "columns": ["b", "a"],
            "records": [{"a": 1, "b": 2}]
        }));
        let n = normalize(&p);
        assert_eq!(n.columns, vec!["b", "a"]);
    }

    #[test]
    fn positional_rows_are_zipped_with_columns() {
        let p = payload(json!({
            "columns": ["a", "b"],
            "rows": [[1, 2], [3, 4]]
        }));
        let n = normalize(&p);
        assert_eq!(n.records.len(), 2);
        assert_eq!(n.records[0]["a"], json!(1));
        assert_eq!(n.records[0]["b"], json!(2));
        assert_eq!(n.records[1]["a"], json!(3));
        assert_eq!(n.records[1]["b"], json!(4));
    }

    #[test]
    fn short_rows_pad_with_null() {
        let p = payload(json!({
            "columns": ["a", "b", "c"],
            "rows": [[1]]
        }));
        let n = normalize(&p);
        assert_eq!(n.records[0]["a"], json!(1));
        assert_eq!(n.records[0]["b"], Value::Null);
        assert_eq!(n.records[0]["c"], Value::Null);
    }

    #[test]
    fn keyed_rows_are_looked_up_by_column_name() {
        let p = payload(json!({
            "columns": ["a", "b"],
            "rows": [{"b": 2, "a": 1}, {"a": 3}]
        }));
        let n = normalize(&p);
        assert_eq!(n.records[0]["a"], json!(1));
        assert_eq!(n.records[0]["b"], json!(2));
        assert_eq!(n.records[1]["b"], Value::Null);
    }

    #[test]
    fn index_keyed_rows_still_map() {
        let p = payload(json!({
            "columns": ["a", "b"],
            "rows": [{"0": "x", "1": "y"}]
        }));
        let n = normalize(&p);
        assert_eq!(n.records[0]["a"], json!("x"));
        assert_eq!(n.records[0]["b"], json!("y"));
    }

    #[test]
    fn no_usable_shape_is_the_empty_table() {
        let n = normalize(&payload(json!({})));
        assert!(n.is_empty());
        assert!(n.records.is_empty());

        // Rows without a column list cannot be reconciled either.
        let n = normalize(&payload(json!({"rows": [[1, 2]]})));
        assert!(n.is_empty());
    }

    #[test]
    fn extra_payload_fields_are_tolerated() {
        let p = payload(json!({
            "source": "iedb_enriched",
            "db_path": "/tmp/x.sqlite3",
            "table": "iedb_result",
            "columns": ["a"],
            "records": [{"a": 1}]
        }));
        let n = normalize(&p);
        assert_eq!(n.columns, vec!["a"]);
        assert_eq!(n.records.len(), 1);
    }

    #[test]
    fn column_inference_preserves_first_record_key_order() {
        let p = payload(json!({
            "records": [{"z": 1, "m": 2, "a": 3}]
        }));
        let n = normalize(&p);
        assert_eq!(n.columns, vec!["z", "m", "a"]);
    }
}
