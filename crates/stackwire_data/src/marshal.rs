//! Conversion of tagged-union result sets into plain records.

use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::cell::{CellValue, WireCell};
use crate::error::{DataError, DataResult};
use crate::statement::StatementResponse;

/// One result row: column name to native value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Convert rows of wire cells into records.
///
/// Every cell is validated, including cells of columns left out by
/// `selected`. Names in `selected` that are not result columns are ignored.
/// Column names must be unique, since a record is keyed by name.
pub fn marshal_rows(
    columns: &[String],
    rows: &[Vec<WireCell>],
    selected: Option<&HashSet<String>>,
) -> DataResult<Vec<Record>> {
    let mut names = HashSet::with_capacity(columns.len());
    if let Some(column) = columns.iter().find(|c| !names.insert(c.as_str())) {
        return Err(DataError::DuplicateColumn {
            column: column.clone(),
        });
    }

    let mut records = Vec::with_capacity(rows.len());

    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(DataError::RowLength {
                row: row_index,
                expected: columns.len(),
                actual: row.len(),
            });
        }

        let mut fields = Vec::with_capacity(columns.len());
        for (column, cell) in columns.iter().zip(row) {
            let value = CellValue::from_wire(cell).map_err(|reason| DataError::MalformedCell {
                row: row_index,
                column: column.clone(),
                reason,
            })?;

            if selected.map_or(true, |wanted| wanted.contains(column)) {
                fields.push((column.clone(), value.into_json()));
            }
        }
        records.push(Record { fields });
    }

    debug!("Marshaled {} rows over {} columns", records.len(), columns.len());
    Ok(records)
}

/// Convert a full `executeStatement` response.
pub fn marshal_response(
    response: &StatementResponse,
    selected: Option<&HashSet<String>>,
) -> DataResult<Vec<Record>> {
    marshal_rows(&response.column_names(), &response.records, selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_marshal_null_and_long() {
        let records = marshal_rows(
            &columns(&["sID", "sName"]),
            &[vec![WireCell::long(1), WireCell::null()]],
            None,
        )
        .unwrap();

        assert_eq!(serde_json::to_value(&records).unwrap(), json!([{"sID": 1, "sName": null}]));
    }

    #[test]
    fn test_marshal_selected_columns() {
        let selected: HashSet<String> = ["sID".to_string()].into_iter().collect();
        let records = marshal_rows(
            &columns(&["sID", "sName"]),
            &[vec![WireCell::long(1), WireCell::null()]],
            Some(&selected),
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert!(!records[0].contains("sName"));
        assert_eq!(serde_json::to_value(&records).unwrap(), json!([{"sID": 1}]));
    }

    #[test]
    fn test_unknown_selected_column_is_ignored() {
        let selected: HashSet<String> = ["missing".to_string()].into_iter().collect();
        let records = marshal_rows(
            &columns(&["sID"]),
            &[vec![WireCell::long(1)]],
            Some(&selected),
        )
        .unwrap();

        assert!(records[0].is_empty());
    }

    #[test]
    fn test_column_order_follows_metadata() {
        let records = marshal_rows(
            &columns(&["b", "a", "c"]),
            &[vec![
                WireCell::boolean(true),
                WireCell::string("x"),
                WireCell::long(2),
            ]],
            None,
        )
        .unwrap();

        let order: Vec<&str> = records[0].columns().collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(
            serde_json::to_string(&records[0]).unwrap(),
            r#"{"b":true,"a":"x","c":2}"#
        );
    }

    #[test]
    fn test_malformed_cell() {
        let cell: WireCell = serde_json::from_str(r#"{"stringValue": "x", "isNull": true}"#).unwrap();
        let err = marshal_rows(&columns(&["sName"]), &[vec![cell]], None).unwrap_err();

        assert!(matches!(
            err,
            DataError::MalformedCell { row: 0, ref column, .. } if column == "sName"
        ));
    }

    #[test]
    fn test_malformed_cell_in_unselected_column() {
        let selected: HashSet<String> = ["sID".to_string()].into_iter().collect();
        let err = marshal_rows(
            &columns(&["sID", "sName"]),
            &[vec![WireCell::long(1), WireCell::default()]],
            Some(&selected),
        )
        .unwrap_err();

        assert!(matches!(err, DataError::MalformedCell { .. }));
    }

    #[test]
    fn test_duplicate_column_names_are_rejected() {
        let err = marshal_rows(
            &columns(&["id", "name", "id"]),
            &[vec![WireCell::long(1), WireCell::string("x"), WireCell::long(2)]],
            None,
        )
        .unwrap_err();

        assert!(matches!(err, DataError::DuplicateColumn { ref column } if column == "id"));
    }

    #[test]
    fn test_duplicate_columns_rejected_for_empty_result() {
        let err = marshal_rows(&columns(&["id", "id"]), &[], None).unwrap_err();
        assert!(matches!(err, DataError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_row_length_mismatch() {
        let err = marshal_rows(
            &columns(&["sID", "sName"]),
            &[vec![WireCell::long(1)]],
            None,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            DataError::RowLength { row: 0, expected: 2, actual: 1 }
        ));
    }
}
