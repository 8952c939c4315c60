//! Thin write executor: turns a write-plan into bulk store calls and
//! tallies the outcome counts.
//!
//! A failed batch is abandoned wholly — no retry, no partial commit — and
//! contributes zero to the counts; the run continues with the next batch.

use crate::api::GristClient;
use crate::report::TableSummary;

use super::plan::{Fields, WritePlan};
use super::table::TableSpec;

pub struct WriteExecutor<'a> {
    client: &'a GristClient,
    dry_run: bool,
}

impl<'a> WriteExecutor<'a> {
    pub fn new(client: &'a GristClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Issue the plan's batches against the store and return the table's
    /// outcome counts.
    pub async fn apply(
        &self,
        spec: &TableSpec,
        rate_log_table: &str,
        period: &str,
        plan: WritePlan,
    ) -> TableSummary {
        let mut summary = TableSummary {
            skipped: plan.skipped,
            unchanged: plan.unchanged,
            ..Default::default()
        };

        if plan.aborted.is_some() {
            return summary;
        }
        if !plan.has_writes() {
            log::info!("{}: nothing to write", spec.label);
            return summary;
        }

        if self.dry_run {
            log::info!(
                "{}: dry run; would insert {}, patch {}, flag {} departed and log {} rate changes",
                spec.label,
                plan.inserts.len(),
                plan.patches.len(),
                plan.departed.len(),
                plan.rate_logs.len()
            );
            return summary;
        }

        if !plan.inserts.is_empty() {
            match self.client.insert_records(&spec.table, &plan.inserts).await {
                Ok(count) => {
                    log::info!("{}: inserted {} new records", spec.label, count);
                    summary.new = count;
                }
                Err(error) => log::error!("{}: bulk insert failed: {:#}", spec.label, error),
            }
        }

        if !plan.patches.is_empty() {
            match self.client.patch_records(&spec.table, &plan.patches).await {
                Ok(()) => {
                    log::info!("{}: updated {} existing records", spec.label, plan.patches.len());
                    summary.updated = plan.patches.len();
                }
                Err(error) => log::error!("{}: bulk update failed: {:#}", spec.label, error),
            }
        }

        if !plan.departed.is_empty() {
            match self.client.patch_records(&spec.table, &plan.departed).await {
                Ok(()) => {
                    log::info!(
                        "{}: marked {} employees as left",
                        spec.label,
                        plan.departed.len()
                    );
                    summary.marked_departed = plan.departed.len();
                }
                Err(error) => log::error!("{}: departed-flag update failed: {:#}", spec.label, error),
            }
        }

        if !plan.rate_logs.is_empty() {
            let entries: Vec<Fields> = plan
                .rate_logs
                .iter()
                .map(|entry| entry.to_fields(period))
                .collect();
            match self.client.insert_records(rate_log_table, &entries).await {
                Ok(count) => {
                    log::info!("{}: logged {} rate changes to {}", spec.label, count, rate_log_table);
                    summary.rate_logged = count;
                }
                Err(error) => log::error!("{}: rate-log insert failed: {:#}", spec.label, error),
            }
        }

        summary
    }
}
