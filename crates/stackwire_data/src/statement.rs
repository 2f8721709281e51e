//! Statement parameters and data API responses.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::cell::WireCell;
use crate::error::{DataError, DataResult};

/// Typed value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    String(String),
    Long(i64),
    Boolean(bool),
    Null,
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            SqlValue::String(s) => map.serialize_entry("stringValue", s)?,
            SqlValue::Long(n) => map.serialize_entry("longValue", n)?,
            SqlValue::Boolean(b) => map.serialize_entry("booleanValue", b)?,
            SqlValue::Null => map.serialize_entry("isNull", &true)?,
        }
        map.end()
    }
}

/// Named statement parameter, e.g. `{"name": "sID", "value": {"longValue": 3}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlParameter {
    pub name: String,
    pub value: SqlValue,
}

impl SqlParameter {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: SqlValue::String(value.into()),
        }
    }

    pub fn long(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: SqlValue::Long(value),
        }
    }

    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value: SqlValue::Boolean(value),
        }
    }

    pub fn null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: SqlValue::Null,
        }
    }

    /// Build a parameter from a textual value and a type name
    /// (`string`, `int`, `long` or `bool`).
    pub fn typed(name: impl Into<String>, value: &str, param_type: &str) -> DataResult<Self> {
        let name = name.into();
        let value = match param_type {
            "string" => SqlValue::String(value.to_string()),
            "int" | "long" => SqlValue::Long(value.trim().parse().map_err(|_| {
                DataError::Config(format!("parameter {}: {:?} is not an integer", name, value))
            })?),
            "bool" => SqlValue::Boolean(value.trim().parse().map_err(|_| {
                DataError::Config(format!("parameter {}: {:?} is not a boolean", name, value))
            })?),
            other => {
                return Err(DataError::Config(format!(
                    "parameter type {} not supported, expected one of int, long, bool or string",
                    other
                )))
            }
        };
        Ok(Self { name, value })
    }
}

/// Join several statements into one batch.
pub fn join_statements<S: AsRef<str>>(statements: &[S]) -> String {
    statements
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(";")
}

/// Column description from the result metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
        }
    }
}

/// Response of one `executeStatement` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    #[serde(default)]
    pub column_metadata: Vec<ColumnMetadata>,
    #[serde(default)]
    pub records: Vec<Vec<WireCell>>,
    #[serde(default)]
    pub number_of_records_updated: i64,
}

impl StatementResponse {
    pub fn column_names(&self) -> Vec<String> {
        self.column_metadata.iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_parameters() {
        assert_eq!(
            SqlParameter::typed("sID", "3", "int").unwrap(),
            SqlParameter::long("sID", 3)
        );
        assert_eq!(
            SqlParameter::typed("approved", "true", "bool").unwrap(),
            SqlParameter::boolean("approved", true)
        );
        assert_eq!(
            SqlParameter::typed("sName", "Topmodel", "string").unwrap(),
            SqlParameter::string("sName", "Topmodel")
        );
    }

    #[test]
    fn test_typed_parameter_errors() {
        assert!(matches!(
            SqlParameter::typed("x", "1.5", "double"),
            Err(DataError::Config(msg)) if msg.contains("double")
        ));
        assert!(SqlParameter::typed("x", "three", "long").is_err());
        assert!(SqlParameter::typed("x", "yes", "bool").is_err());
    }

    #[test]
    fn test_parameter_wire_format() {
        let params = vec![SqlParameter::long("sID", 3), SqlParameter::null("qPic")];
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!([
                {"name": "sID", "value": {"longValue": 3}},
                {"name": "qPic", "value": {"isNull": true}}
            ])
        );
    }

    #[test]
    fn test_join_statements() {
        assert_eq!(join_statements(&["select 1", "select 2"]), "select 1;select 2");
        assert_eq!(join_statements(&["select 1"]), "select 1");
    }

    #[test]
    fn test_response_from_wire() {
        let response: StatementResponse = serde_json::from_value(json!({
            "columnMetadata": [{"name": "sID", "typeName": "int4"}, {"name": "sName"}],
            "records": [[{"longValue": 1}, {"stringValue": "Topmodel"}]],
            "numberOfRecordsUpdated": 0
        }))
        .unwrap();

        assert_eq!(response.column_names(), vec!["sID", "sName"]);
        assert_eq!(response.records[0][1], WireCell::string("Topmodel"));
    }
}
