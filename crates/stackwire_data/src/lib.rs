//! # stackwire_data
//!
//! Statement helpers and typed result marshaling for the row/column data API
//! in front of the relational backend.
//!
//! Query results arrive as tagged-union cells (`{"longValue": 1}`,
//! `{"isNull": true}`, ...). [`marshal_rows`] turns them into plain records
//! and rejects cells that do not carry exactly one value.
//!
//! ## Example
//!
//! ```rust
//! use stackwire_data::{marshal_rows, WireCell};
//!
//! let columns = vec!["sID".to_string(), "sName".to_string()];
//! let rows = vec![vec![WireCell::long(1), WireCell::null()]];
//!
//! let records = marshal_rows(&columns, &rows, None).unwrap();
//! assert_eq!(
//!     serde_json::to_string(&records).unwrap(),
//!     r#"[{"sID":1,"sName":null}]"#
//! );
//! ```

pub mod cell;
pub mod client;
pub mod error;
pub mod marshal;
pub mod statement;

pub use cell::{CellValue, WireCell};
pub use client::{DataApi, DataApiClient};
pub use error::{DataError, DataResult};
pub use marshal::{marshal_response, marshal_rows, Record};
pub use statement::{join_statements, ColumnMetadata, SqlParameter, SqlValue, StatementResponse};
