//! RDS Data API implementation of the data API.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_rdsdata::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_rdsdata::types::{Field, SqlParameter as RdsParameter};
use aws_sdk_rdsdata::Client;
use serde_json::{json, Map, Value};

use stackwire_data::{
    ColumnMetadata, DataApi, DataError, DataResult, SqlParameter, SqlValue, StatementResponse, WireCell,
};

use super::describe_sdk_error;

/// Output keys naming the database behind the data API.
pub const CLUSTER_ARN_KEY: &str = "DBAuroraClusterArn";
pub const SECRET_ARN_KEY: &str = "DBSecretsStoreArn";
pub const DATABASE_KEY: &str = "DBName";

pub struct RdsDataClient {
    client: Client,
    resource_arn: String,
    secret_arn: String,
    database: String,
}

impl RdsDataClient {
    pub fn new(
        config: &SdkConfig,
        resource_arn: impl Into<String>,
        secret_arn: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(config),
            resource_arn: resource_arn.into(),
            secret_arn: secret_arn.into(),
            database: database.into(),
        }
    }
}

#[async_trait]
impl DataApi for RdsDataClient {
    async fn execute_statement(
        &self,
        sql: &str,
        parameters: &[SqlParameter],
    ) -> DataResult<StatementResponse> {
        let response = self
            .client
            .execute_statement()
            .resource_arn(&self.resource_arn)
            .secret_arn(&self.secret_arn)
            .database(&self.database)
            .sql(sql)
            .set_parameters(Some(parameters.iter().map(to_rds_parameter).collect()))
            .include_result_metadata(true)
            .send()
            .await
            .map_err(to_data_error)?;

        Ok(StatementResponse {
            column_metadata: response
                .column_metadata()
                .iter()
                .map(|column| ColumnMetadata {
                    name: column.name().unwrap_or_default().to_string(),
                    type_name: column.type_name().map(str::to_string),
                })
                .collect(),
            records: response
                .records()
                .iter()
                .map(|row| row.iter().map(to_wire_cell).collect())
                .collect(),
            number_of_records_updated: response.number_of_records_updated(),
        })
    }
}

fn to_rds_parameter(parameter: &SqlParameter) -> RdsParameter {
    let value = match &parameter.value {
        SqlValue::String(s) => Field::StringValue(s.clone()),
        SqlValue::Long(n) => Field::LongValue(*n),
        SqlValue::Boolean(b) => Field::BooleanValue(*b),
        SqlValue::Null => Field::IsNull(true),
    };
    RdsParameter::builder().name(&parameter.name).value(value).build()
}

/// Map a response field onto the wire cell shape.
///
/// Branches the marshaler does not support land in `other` so validation
/// reports them by name.
fn to_wire_cell(field: &Field) -> WireCell {
    match field {
        Field::StringValue(s) => WireCell::string(s.clone()),
        Field::LongValue(n) => WireCell::long(*n),
        Field::BooleanValue(b) => WireCell::boolean(*b),
        Field::IsNull(is_null) => WireCell {
            is_null: Some(*is_null),
            ..WireCell::default()
        },
        Field::DoubleValue(d) => unsupported("doubleValue", json!(d)),
        Field::BlobValue(_) => unsupported("blobValue", Value::Null),
        Field::ArrayValue(_) => unsupported("arrayValue", Value::Null),
        _ => unsupported("unknown", Value::Null),
    }
}

fn unsupported(branch: &str, value: Value) -> WireCell {
    let mut other = Map::new();
    other.insert(branch.to_string(), value);
    WireCell {
        other,
        ..WireCell::default()
    }
}

fn to_data_error<E, R>(err: SdkError<E, R>) -> DataError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match describe_sdk_error(&err) {
        (message, true) => DataError::transient(message),
        (message, false) => DataError::data_api(message),
    }
}
