//! Tagged-union cell values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A cell exactly as the data API sends it: one populated field per cell.
///
/// ```json
/// {"stringValue": "Topmodel"}   {"longValue": 3}   {"isNull": true}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_null: Option<bool>,
    /// Branches this tool does not handle (doubles, blobs, arrays).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl WireCell {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            string_value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn long(value: i64) -> Self {
        Self {
            long_value: Some(value),
            ..Self::default()
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            boolean_value: Some(value),
            ..Self::default()
        }
    }

    pub fn null() -> Self {
        Self {
            is_null: Some(true),
            ..Self::default()
        }
    }
}

/// A validated cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    String(String),
    Long(i64),
    Boolean(bool),
    Null,
}

impl CellValue {
    /// Validate a wire cell. The error names the offending branches.
    ///
    /// `isNull: false` is not a populated branch.
    pub fn from_wire(cell: &WireCell) -> Result<Self, String> {
        let mut populated: Vec<(&str, CellValue)> = Vec::with_capacity(1);
        if let Some(value) = &cell.string_value {
            populated.push(("stringValue", CellValue::String(value.clone())));
        }
        if let Some(value) = cell.long_value {
            populated.push(("longValue", CellValue::Long(value)));
        }
        if let Some(value) = cell.boolean_value {
            populated.push(("booleanValue", CellValue::Boolean(value)));
        }
        if cell.is_null == Some(true) {
            populated.push(("isNull", CellValue::Null));
        }

        if !cell.other.is_empty() {
            let unsupported: Vec<&str> = cell.other.keys().map(String::as_str).collect();
            return Err(format!("unsupported value branch {}", unsupported.join(", ")));
        }

        match populated.len() {
            1 => Ok(populated.remove(0).1),
            0 => Err("no value branch populated".to_string()),
            _ => {
                let names: Vec<&str> = populated.iter().map(|(name, _)| *name).collect();
                Err(format!("several value branches populated: {}", names.join(", ")))
            }
        }
    }

    /// Native JSON value of the cell.
    pub fn into_json(self) -> Value {
        match self {
            CellValue::String(s) => Value::String(s),
            CellValue::Long(n) => Value::from(n),
            CellValue::Boolean(b) => Value::Bool(b),
            CellValue::Null => Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}
