//! Per-workbook orchestration: derive the reporting period from the
//! filename, read each sheet, reconcile each table, execute the plans.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::api::GristClient;
use crate::api::client::RecordFilter;
use crate::config::Config;
use crate::excel;
use crate::report::RunSummary;
use crate::sync::month::month_token;
use crate::sync::table::BusinessKey;
use crate::sync::tables;
use crate::sync::{Reconciler, TableSpec, WriteExecutor};

pub struct SyncJob<'a> {
    config: &'a Config,
    client: &'a GristClient,
    dry_run: bool,
}

impl<'a> SyncJob<'a> {
    pub fn new(config: &'a Config, client: &'a GristClient, dry_run: bool) -> Self {
        Self {
            config,
            client,
            dry_run,
        }
    }

    /// Process one workbook: every table in order, each isolated from the
    /// others' failures.
    pub async fn process_workbook(&self, path: &Path, summary: &mut RunSummary) -> Result<()> {
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        let Some(period) = month_token(filename) else {
            log::warn!(
                "Could not extract a month-year from filename '{}'; skipping this file",
                filename
            );
            return Ok(());
        };

        log::info!("Processing {} (period {})", path.display(), period);
        let today = Local::now().date_naive();

        for spec in tables::all(self.config) {
            if let Err(error) = self
                .process_table(path, &spec, &period, today, summary)
                .await
            {
                log::error!("{}: processing failed: {:#}", spec.label, error);
            }
        }

        Ok(())
    }

    async fn process_table(
        &self,
        path: &Path,
        spec: &TableSpec,
        period: &str,
        today: NaiveDate,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let rows = match excel::read_sheet(path, &spec.sheet, spec.layout) {
            Ok(rows) => rows,
            Err(error) => {
                log::warn!(
                    "{}: could not read sheet '{}' ({:#}); skipping this table",
                    spec.label,
                    spec.sheet,
                    error
                );
                return Ok(());
            }
        };

        // Without the schema we cannot build safe payloads; abort just this
        // table for this run.
        let columns: HashSet<String> = self
            .client
            .fetch_columns(&spec.table)
            .await
            .with_context(|| format!("could not fetch the schema of table '{}'", spec.table))?
            .into_iter()
            .collect();

        let filter: Option<RecordFilter> = match spec.key {
            BusinessKey::Employee => None,
            BusinessKey::EmployeePeriod => Some(RecordFilter::from([(
                spec.period_stored.clone(),
                vec![period.to_string()],
            )])),
        };
        let existing = self
            .client
            .fetch_records(&spec.table, filter.as_ref())
            .await
            .with_context(|| format!("could not fetch records of table '{}'", spec.table))?;

        let engine = Reconciler::new(spec, period, today);
        let plan = engine.build_plan(&rows, &existing, &columns);

        let executor = WriteExecutor::new(self.client, self.dry_run);
        let table_summary = executor
            .apply(spec, &self.config.tables.rate_log, period, plan)
            .await;
        summary.record(&spec.table, table_summary);

        Ok(())
    }
}
