//! CSV export of stored survey records.
//!
//! Two modes, both all-or-nothing:
//!
//! - **Full**: every record in ascending id order, every row in canvas order.
//! - **Selective**: caller-supplied `(id, shapeId)` pairs, one row each,
//!   in the caller's order.
//!
//! Rows are collected completely before the document is written, so a
//! failing record never leaves a half-written export behind.
//!
//! # Example
//!
//! ```rust,ignore
//! use voices::{RecordStore, export::{full_export, selective_export, ShapeRef}};
//!
//! let store = RecordStore::open("voices.db").await?;
//! let everything = full_export(&store).await?;
//! let two_rows = selective_export(&store, &[ShapeRef::new(3, 0), ShapeRef::new(1, 2)]).await?;
//! ```

use serde::{Deserialize, Serialize};

use crate::api::logs::{log_info, log_success};
use crate::error::{ExportError, ExportResult};
use crate::store::RecordStore;
use crate::transform::{flatten, ExportRow, HEADERS};

/// Attachment name for exported documents.
pub const EXPORT_FILENAME: &str = "voices.csv";

/// Address of one exported row: record id plus 0-based canvas index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRef {
    pub id: i64,
    pub shape_id: usize,
}

impl ShapeRef {
    pub fn new(id: i64, shape_id: usize) -> Self {
        Self { id, shape_id }
    }
}

/// Flatten a record, tagging schema failures with its id.
fn flatten_record(payload: &serde_json::Value, record_id: i64) -> ExportResult<Vec<ExportRow>> {
    flatten(payload, record_id)
        .map(|rows| rows.collect())
        .map_err(|source| ExportError::Schema { record_id, source })
}

/// Rows of every stored record.
pub async fn collect_all_rows(store: &RecordStore) -> ExportResult<Vec<ExportRow>> {
    let records = store.list_all().await?;
    let mut rows = Vec::new();

    for record in &records {
        rows.extend(flatten_record(&record.payload, record.id)?);
    }

    log_info(format!(
        "Flattened {} record(s) into {} row(s)",
        records.len(),
        rows.len()
    ));
    Ok(rows)
}

/// One row per requested shape, in request order.
///
/// The shape index selects from the record's full flattening.
pub async fn collect_selected_rows(
    store: &RecordStore,
    selection: &[ShapeRef],
) -> ExportResult<Vec<ExportRow>> {
    let mut rows = Vec::with_capacity(selection.len());

    for shape in selection {
        let record = store.get(shape.id).await?;
        let mut record_rows = flatten_record(&record.payload, record.id)?;
        let row_count = record_rows.len();

        if shape.shape_id >= row_count {
            return Err(ExportError::ShapeOutOfRange {
                record_id: shape.id,
                shape_id: shape.shape_id,
                row_count,
            });
        }
        rows.push(record_rows.swap_remove(shape.shape_id));
    }

    Ok(rows)
}

/// Serialize rows as a CSV document with the fixed header.
pub fn write_csv(rows: &[ExportRow]) -> ExportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for row in rows {
        writer.write_record(row.to_record())?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::new(e.error().kind(), e.to_string())))
}

/// Full export as a CSV document.
pub async fn full_export(store: &RecordStore) -> ExportResult<Vec<u8>> {
    let rows = collect_all_rows(store).await?;
    let csv = write_csv(&rows)?;
    log_success(format!("Full export: {} row(s)", rows.len()));
    Ok(csv)
}

/// Selective export as a CSV document.
pub async fn selective_export(store: &RecordStore, selection: &[ShapeRef]) -> ExportResult<Vec<u8>> {
    let rows = collect_selected_rows(store, selection).await?;
    let csv = write_csv(&rows)?;
    log_success(format!("Selective export: {} row(s)", rows.len()));
    Ok(csv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SchemaError, StoreError};
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};

    fn survey(age: &str, areas: &[&str]) -> Value {
        let canvas: Vec<Value> = areas
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "form": {
                        "name": name,
                        "soundExample": "",
                        "associations": ["warm", "loud"],
                        "correctness": i,
                        "friendliness": 5,
                        "pleasantness": 3,
                        "trustworthiness": 4
                    }
                })
            })
            .collect();

        json!({
            "personalInformation": {
                "age": age,
                "gender": "female",
                "levelEducation": ["2"],
                "birthPlace": "Bootle",
                "currentPlace": "Crosby",
                "nonNative": "1"
            },
            "canvas": canvas
        })
    }

    async fn seeded_store() -> (TempDir, RecordStore, Vec<i64>) {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("voices.db")).await.unwrap();
        let mut ids = Vec::new();
        ids.push(store.insert(&survey("2", &["A1", "A2"])).await.unwrap());
        ids.push(store.insert(&survey("3", &[])).await.unwrap());
        ids.push(store.insert(&survey("4", &["C1", "C2", "C3"])).await.unwrap());
        (dir, store, ids)
    }

    fn parse(csv: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(csv)
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_full_export_row_count_and_order() {
        let (_dir, store, ids) = seeded_store().await;

        let lines = parse(&full_export(&store).await.unwrap());

        assert_eq!(lines.len(), 1 + 2 + 0 + 3);
        assert_eq!(lines[0], HEADERS.map(String::from).to_vec());

        let keys: Vec<(String, String)> = lines[1..]
            .iter()
            .map(|l| (l[0].clone(), l[1].clone()))
            .collect();
        let expected: Vec<(String, String)> = [(ids[0], 0), (ids[0], 1), (ids[2], 0), (ids[2], 1), (ids[2], 2)]
            .iter()
            .map(|(id, i)| (id.to_string(), i.to_string()))
            .collect();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_full_export_quotes_joined_fields() {
        let (_dir, store, _ids) = seeded_store().await;

        let text = String::from_utf8(full_export(&store).await.unwrap()).unwrap();
        assert!(text.contains("\"warm, loud\""));
        assert!(text.lines().nth(1).unwrap().contains("18 - 25"));
    }

    #[tokio::test]
    async fn test_empty_store_exports_header_only() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("voices.db")).await.unwrap();

        let lines = parse(&full_export(&store).await.unwrap());
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_record_aborts_full_export() {
        let (_dir, store, _ids) = seeded_store().await;
        let bad = store.insert(&survey("9", &["Z"])).await.unwrap();

        let err = full_export(&store).await.unwrap_err();
        match err {
            ExportError::Schema { record_id, source } => {
                assert_eq!(record_id, bad);
                assert!(matches!(source, SchemaError::UnknownCode { field: "age", .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_selective_export_preserves_request_order() {
        let (_dir, store, ids) = seeded_store().await;
        let selection = [ShapeRef::new(ids[2], 2), ShapeRef::new(ids[0], 0)];

        let rows = collect_selected_rows(&store, &selection).await.unwrap();
        let all = collect_all_rows(&store).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], all[4]);
        assert_eq!(rows[1], all[0]);
        assert_eq!(rows[0].area_name, "C3");

        let lines = parse(&selective_export(&store, &selection).await.unwrap());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1][0], ids[2].to_string());
        assert_eq!(lines[2][0], ids[0].to_string());
    }

    #[tokio::test]
    async fn test_selective_export_unknown_id() {
        let (_dir, store, _ids) = seeded_store().await;

        let err = selective_export(&store, &[ShapeRef::new(404, 0)]).await.unwrap_err();
        assert!(matches!(err, ExportError::Store(StoreError::NotFound(404))));
    }

    #[tokio::test]
    async fn test_selective_export_shape_out_of_range() {
        let (_dir, store, ids) = seeded_store().await;

        let err = selective_export(&store, &[ShapeRef::new(ids[0], 0), ShapeRef::new(ids[1], 0)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::ShapeOutOfRange { shape_id: 0, row_count: 0, .. }
        ));
    }

    #[test]
    fn test_shape_ref_wire_format() {
        let refs: Vec<ShapeRef> =
            serde_json::from_value(json!([{ "id": 4, "shapeId": 1 }])).unwrap();
        assert_eq!(refs, vec![ShapeRef::new(4, 1)]);
    }
}
