//! Runtime configuration, loaded once at startup and passed explicitly to
//! the client and job constructors.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Everything the run needs, resolved from the environment (after
/// `dotenvy::dotenv()`) plus CLI overrides. No other module reads the
/// environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub doc_id: String,
    pub base_url: String,
    /// Directory scanned for `.xlsx` workbooks
    pub workbook_dir: PathBuf,
    /// Flag departed employees after a full-roster reconciliation
    pub mark_departed: bool,
    pub tables: TableNames,
    pub sheets: SheetNames,
}

/// Remote table names, overridable per deployment.
#[derive(Debug, Clone)]
pub struct TableNames {
    pub master: String,
    pub rate_log: String,
    pub hour_clock: String,
    pub advances: String,
    pub overtime: String,
    pub salary_statement: String,
    pub pf_esic: String,
    pub new_pf_esic: String,
}

/// Workbook sheet names, overridable per deployment.
#[derive(Debug, Clone)]
pub struct SheetNames {
    pub master: String,
    pub hour_clock: String,
    pub advances: String,
    pub overtime: String,
    pub salary_statement: String,
    pub pf_esic: String,
    pub new_pf_esic: String,
}

impl Config {
    /// Load the configuration from the environment. `dir_override` comes
    /// from the CLI and wins over `EXCEL_FILES_DIR`.
    pub fn from_env(dir_override: Option<PathBuf>) -> Result<Self> {
        let api_key = require("GRIST_API_KEY")?;
        let doc_id = require("GRIST_DOC_ID")?;
        let base_url = env_or("GRIST_BASE_URL", "https://docs.getgrist.com");

        let workbook_dir = match dir_override {
            Some(dir) => dir,
            None => PathBuf::from(require("EXCEL_FILES_DIR")?),
        };

        let mark_departed = env_or("MARK_AS_LEFT", "no").eq_ignore_ascii_case("yes");

        let tables = TableNames {
            master: require("GRIST_TABLE_NAME")?,
            rate_log: env_or("GRIST_RATE_LOG_TABLE", "Emp_RateLog"),
            hour_clock: env_or("GRIST_HOURCLOCK_TABLE_NAME", "HC_Detail"),
            advances: env_or("GRIST_ADVANCES_TABLE_NAME", "Emp_Advances"),
            overtime: env_or("GRIST_DUMP_OT_TABLE_NAME", "Emp_Dump_OT"),
            salary_statement: env_or("GRIST_DUMP_SS_TABLE_NAME", "Emp_Dump_SS"),
            pf_esic: env_or("GRIST_DUMP_PFESIC_TABLE_NAME", "Emp_Dump_PFESIC"),
            new_pf_esic: env_or("GRIST_DUMP_NW_PFESIC_TABLE_NAME", "Emp_Dump_NW_PFESIC"),
        };

        let sheets = SheetNames {
            master: env_or("MASTER_SHEET_NAME", "MasterSalarySheet"),
            hour_clock: env_or("HOURCLOCK_SHEET_NAME", "HourClock"),
            advances: env_or("ADVANCES_SHEET_NAME", "Advances"),
            overtime: env_or("OT_SHEET_NAME", "OT"),
            salary_statement: env_or("SALARY_STATEMENT_SHEET_NAME", "SalaryStatement"),
            pf_esic: env_or("PFESIC_SHEET_NAME", "PF-ESIC Sheet"),
            new_pf_esic: env_or("NEW_PFESIC_SHEET_NAME", "NEW PF ESIC"),
        };

        Ok(Self {
            api_key,
            doc_id,
            base_url,
            workbook_dir,
            mark_departed,
            tables,
            sheets,
        })
    }

    /// Base URL of the document's REST API.
    pub fn doc_api_url(&self) -> String {
        format!("{}/api/docs/{}", self.base_url.trim_end_matches('/'), self.doc_id)
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("Missing required environment variable {}", name))
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
