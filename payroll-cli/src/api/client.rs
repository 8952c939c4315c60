//! HTTP client for a Grist-style document REST API.
//!
//! The store is treated as a black-box record store with four operations:
//! fetch columns, fetch records (optionally filtered), bulk insert, bulk
//! patch. Transport errors carry the server-provided body so write
//! rejections are diagnosable from the log alone.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use serde_json::json;

use crate::config::Config;
use crate::sync::plan::{Fields, RecordPatch};

use super::models::{ColumnsResponse, CreatedResponse, RecordsResponse, StoredRecord};

/// Field → allowed-values filter for record fetches, serialized into the
/// `filter` query parameter.
pub type RecordFilter = HashMap<String, Vec<String>>;

pub struct GristClient {
    http: reqwest::Client,
    /// `{base}/api/docs/{doc_id}`
    doc_url: String,
    api_key: String,
}

impl GristClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build the HTTP client")?;

        log::info!("Using document API at {}", config.doc_api_url());

        Ok(Self {
            http,
            doc_url: config.doc_api_url(),
            api_key: config.api_key.clone(),
        })
    }

    /// Column names of a table, in document order.
    pub async fn fetch_columns(&self, table: &str) -> Result<Vec<String>> {
        let url = format!("{}/tables/{}/columns", self.doc_url, table);
        log::debug!("Fetching columns from {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .with_context(|| format!("Failed to fetch columns of table '{}'", table))?;
        let body = check(response).await?;

        let parsed: ColumnsResponse = serde_json::from_str(&body)
            .with_context(|| format!("Unexpected columns response for table '{}'", table))?;

        let columns: Vec<String> = parsed.columns.into_iter().map(|c| c.id).collect();
        log::debug!("Table '{}' has {} columns", table, columns.len());
        Ok(columns)
    }

    /// All records of a table, optionally narrowed by a field filter.
    pub async fn fetch_records(
        &self,
        table: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<StoredRecord>> {
        let url = format!("{}/tables/{}/records", self.doc_url, table);
        log::debug!("Fetching records from {}", url);

        let mut request = self.http.get(&url).bearer_auth(&self.api_key);
        if let Some(filter) = filter {
            let encoded = serde_json::to_string(filter).context("Failed to encode record filter")?;
            request = request.query(&[("filter", encoded)]);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch records of table '{}'", table))?;
        let body = check(response).await?;

        let parsed: RecordsResponse = serde_json::from_str(&body)
            .with_context(|| format!("Unexpected records response for table '{}'", table))?;

        log::info!("Fetched {} records from {}", parsed.records.len(), table);
        Ok(parsed.records)
    }

    /// Bulk-insert new records; returns how many the server created.
    pub async fn insert_records(&self, table: &str, records: &[Fields]) -> Result<usize> {
        let url = format!("{}/tables/{}/records", self.doc_url, table);
        let payload = json!({
            "records": records.iter().map(|fields| json!({ "fields": fields })).collect::<Vec<_>>(),
        });

        log::debug!("Inserting {} records into {}", records.len(), table);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to insert records into table '{}'", table))?;
        let body = check(response).await?;

        let created: CreatedResponse = serde_json::from_str(&body)
            .with_context(|| format!("Unexpected insert response for table '{}'", table))?;
        Ok(created.records.len())
    }

    /// Bulk-patch existing records by id.
    pub async fn patch_records(&self, table: &str, patches: &[RecordPatch]) -> Result<()> {
        let url = format!("{}/tables/{}/records", self.doc_url, table);
        let payload = json!({
            "records": patches
                .iter()
                .map(|patch| json!({ "id": patch.id, "fields": patch.fields }))
                .collect::<Vec<_>>(),
        });

        log::debug!("Patching {} records in {}", patches.len(), table);

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to patch records in table '{}'", table))?;
        check(response).await?;
        Ok(())
    }
}

/// Surface non-2xx responses as errors carrying the server's body text.
async fn check(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        bail!("API request failed with {}: {}", status, body);
    }
    Ok(body)
}
