//! Data API seam and the retrying client used by commands.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use stackwire_core::RetryPolicy;

use crate::error::DataResult;
use crate::marshal::{marshal_response, Record};
use crate::statement::{join_statements, SqlParameter, StatementResponse};

/// Row/column data access API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataApi: Send + Sync {
    /// Execute one SQL statement (or a `;`-joined batch) with named parameters.
    async fn execute_statement(
        &self,
        sql: &str,
        parameters: &[SqlParameter],
    ) -> DataResult<StatementResponse>;
}

/// Client wrapping a [`DataApi`] with timeouts and retries.
///
/// Reads go through [`DataApiClient::query`] and are retried on transient
/// failures; [`DataApiClient::execute`] runs exactly once.
pub struct DataApiClient {
    api: Arc<dyn DataApi>,
    retry: RetryPolicy,
}

impl DataApiClient {
    pub fn new(api: Arc<dyn DataApi>) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run a read-only statement and marshal its rows.
    pub async fn query(
        &self,
        sql: &str,
        parameters: &[SqlParameter],
        selected: Option<&HashSet<String>>,
    ) -> DataResult<Vec<Record>> {
        let api = &self.api;
        let response = self
            .retry
            .run_read("execute statement", move || api.execute_statement(sql, parameters))
            .await?;
        let records = marshal_response(&response, selected)?;
        info!("Query returned {} rows", records.len());
        Ok(records)
    }

    /// Run a statement that may modify data. Never retried.
    pub async fn execute(
        &self,
        sql: &str,
        parameters: &[SqlParameter],
    ) -> DataResult<StatementResponse> {
        let response = self
            .retry
            .run_once("execute statement", self.api.execute_statement(sql, parameters))
            .await?;
        info!("Statement updated {} rows", response.number_of_records_updated);
        Ok(response)
    }

    /// Run several modifying statements as one `;`-joined batch.
    pub async fn execute_batch<S: AsRef<str>>(&self, statements: &[S]) -> DataResult<StatementResponse> {
        self.execute(&join_statements(statements), &[]).await
    }
}
