//! The concrete table specs fed to the reconciliation engine, one per
//! record set the payroll workbook feeds.

use crate::config::Config;

use super::compare::FieldKind;
use super::table::{
    BusinessKey, FieldMap, IdempotencyPolicy, NameSplitMap, RateSpec, RowFilter, SheetLayout,
    TableSpec,
};

/// Day columns carried by the hour-clock sheet (one presence and one
/// overtime value per calendar day).
const HOUR_CLOCK_DAYS: u32 = 31;

/// Master employee roster: reconciled row-by-row on every run, since it
/// represents current state rather than a period snapshot.
pub fn master(cfg: &Config) -> TableSpec {
    TableSpec {
        label: "master",
        table: cfg.tables.master.clone(),
        sheet: cfg.sheets.master.clone(),
        layout: SheetLayout::SingleHeader,
        key: BusinessKey::Employee,
        key_source: "Emp No.".to_string(),
        key_stored: "SFNo".to_string(),
        period_stored: "Month_Year".to_string(),
        fields: vec![
            FieldMap::new("Designation", "Designation", FieldKind::Text).insert_only(),
            FieldMap::new("Emp Type : Temp / Perm", "Perm_Temp", FieldKind::Text),
            FieldMap::new("Salary Calculation on Fixed / Hourly", "Fixed_Hourly", FieldKind::Text),
            FieldMap::new("Date of Joining", "DOJ", FieldKind::Date),
        ],
        name_split: Some(NameSplitMap {
            source: "Name".to_string(),
            first: "FirstName".to_string(),
            middle: "MiddleName".to_string(),
            last: "LastName".to_string(),
        }),
        rate: Some(RateSpec {
            source: "Salary Rate (Per Day)".to_string(),
            stored: "Salary_PerDay".to_string(),
        }),
        history_field: Some("RecordHistory".to_string()),
        left_flag: Some("Left".to_string()),
        policy: IdempotencyPolicy::ReconcileRows,
        filters: Vec::new(),
        zero_fill_numeric: false,
        require_any_nonzero: Vec::new(),
        mark_departed: cfg.mark_departed,
    }
}

/// Hour-clock attendance detail: per-day presence/overtime values,
/// reconciled row-by-row so corrections within an already-loaded period
/// patch the existing record.
pub fn hour_clock(cfg: &Config) -> TableSpec {
    let mut fields = vec![FieldMap::new("No", "Sr_No", FieldKind::Integer).insert_only()];
    for day in 1..=HOUR_CLOCK_DAYS {
        fields.push(FieldMap::new(
            format!("P-{}", day),
            format!("P_{}", day),
            FieldKind::Integer,
        ));
        fields.push(FieldMap::new(
            format!("OT-{}", day),
            format!("OT_{}", day),
            FieldKind::Numeric,
        ));
    }

    TableSpec {
        label: "hour-clock",
        table: cfg.tables.hour_clock.clone(),
        sheet: cfg.sheets.hour_clock.clone(),
        layout: SheetLayout::HourClock,
        key: BusinessKey::EmployeePeriod,
        key_source: "SFNo".to_string(),
        key_stored: "SFNo".to_string(),
        period_stored: "Month_Year".to_string(),
        fields,
        name_split: None,
        rate: None,
        history_field: Some("RecordHistory".to_string()),
        left_flag: None,
        policy: IdempotencyPolicy::ReconcileRows,
        filters: vec![RowFilter::KeyPrefix("SF".to_string())],
        zero_fill_numeric: false,
        require_any_nonzero: Vec::new(),
        mark_departed: false,
    }
}

/// Cash advances and loans: append-only, one load per period. Rows carrying
/// neither an advance nor a loan amount are noise and get skipped.
pub fn advances(cfg: &Config) -> TableSpec {
    TableSpec {
        label: "advances",
        table: cfg.tables.advances.clone(),
        sheet: cfg.sheets.advances.clone(),
        layout: SheetLayout::SingleHeader,
        key: BusinessKey::EmployeePeriod,
        key_source: "Emp No.".to_string(),
        key_stored: "SFNo".to_string(),
        period_stored: "Month_Year".to_string(),
        fields: vec![
            FieldMap::new("No.", "SrNo", FieldKind::Integer),
            FieldMap::new("Unit No.", "Unit", FieldKind::Text),
            FieldMap::new("Advance Amount", "Advance_Amt", FieldKind::Numeric),
            FieldMap::new("Loan Amt", "Loan_Amt", FieldKind::Numeric),
        ],
        name_split: None,
        rate: None,
        history_field: None,
        left_flag: None,
        policy: IdempotencyPolicy::WholePeriodGuard,
        filters: vec![RowFilter::KeyPrefix("SF".to_string())],
        zero_fill_numeric: false,
        require_any_nonzero: vec!["Advance_Amt".to_string(), "Loan_Amt".to_string()],
        mark_departed: false,
    }
}

/// Overtime summary dump: append-only, one load per period.
pub fn overtime(cfg: &Config) -> TableSpec {
    TableSpec {
        label: "overtime",
        table: cfg.tables.overtime.clone(),
        sheet: cfg.sheets.overtime.clone(),
        layout: SheetLayout::SingleHeader,
        key: BusinessKey::EmployeePeriod,
        key_source: "Emp No.".to_string(),
        key_stored: "SFNo".to_string(),
        period_stored: "Month_Year".to_string(),
        fields: vec![
            FieldMap::new("ESIC  Rate", "ESIC_Rate", FieldKind::Numeric),
            FieldMap::new("OT Hours", "OT_Hours", FieldKind::Numeric),
            FieldMap::new("OT Hours Calculated", "OT_Hours_Calc", FieldKind::Numeric),
            FieldMap::new("OT Rate", "OT_Rate", FieldKind::Numeric),
            FieldMap::new("OT Amount", "OT_Amt", FieldKind::Numeric),
            FieldMap::new("ESIC on OT (4%)", "ESIC_4pct_Amt", FieldKind::Numeric),
            FieldMap::new("ESIC on OT (0.75%)", "ESIC_075pct_Amt", FieldKind::Numeric),
            FieldMap::new("Emp Type : Temp / Perm", "Emp_Type", FieldKind::Text),
        ],
        name_split: None,
        rate: None,
        history_field: None,
        left_flag: None,
        policy: IdempotencyPolicy::WholePeriodGuard,
        filters: vec![RowFilter::KeyPrefix("SF".to_string())],
        zero_fill_numeric: false,
        require_any_nonzero: Vec::new(),
        mark_departed: false,
    }
}

/// Computed salary statement dump: append-only, one load per period. Absent
/// numeric cells are stored as 0 so downstream totals stay additive.
pub fn salary_statement(cfg: &Config) -> TableSpec {
    TableSpec {
        label: "salary-statement",
        table: cfg.tables.salary_statement.clone(),
        sheet: cfg.sheets.salary_statement.clone(),
        layout: SheetLayout::SingleHeader,
        key: BusinessKey::EmployeePeriod,
        key_source: "Emp No.".to_string(),
        key_stored: "SFNo".to_string(),
        period_stored: "Month_Year".to_string(),
        fields: vec![
            FieldMap::new("No.", "SrNo", FieldKind::Integer),
            FieldMap::new("Salary Rate (Per Day)", "Rate_Per_Day", FieldKind::Numeric),
            FieldMap::new("No Of Days Present", "Present_Days", FieldKind::Numeric),
            FieldMap::new("Basic Salary", "BasicSalary_Amt", FieldKind::Numeric),
            FieldMap::new("Total OT Hours", "TotalOT_Hours", FieldKind::Numeric),
            FieldMap::new("OT Rate Per Hour", "OT_Rate_PerHour", FieldKind::Numeric),
            FieldMap::new("OT Salary", "OTSalary_Amt", FieldKind::Numeric),
            FieldMap::new("Gross Salary", "GrossSalary_Amt", FieldKind::Numeric),
            FieldMap::new("Adv Amt", "Advance_Amt", FieldKind::Numeric),
            FieldMap::new("Loan Amt", "Loan_Amt", FieldKind::Numeric),
            FieldMap::new("ESI Amt", "ESI_Amt", FieldKind::Numeric),
            FieldMap::new("PF Amt", "PF_Amt", FieldKind::Numeric),
            FieldMap::new("Prof Tax", "ProfTax_Amt", FieldKind::Numeric),
            FieldMap::new("Total Deductions", "TotalDeductions_Amt", FieldKind::Numeric),
            FieldMap::new("Net Salary", "NetSalary_Amt", FieldKind::Numeric),
            FieldMap::new("Salary To Pay (Rounded Off)", "TotalRoundOff_Amt", FieldKind::Numeric),
        ],
        name_split: None,
        rate: None,
        history_field: None,
        left_flag: None,
        policy: IdempotencyPolicy::WholePeriodGuard,
        filters: vec![RowFilter::KeyPrefix("SF".to_string())],
        zero_fill_numeric: true,
        require_any_nonzero: Vec::new(),
        mark_departed: false,
    }
}

/// Provident-fund / insurance contribution dump. The same sheet shape feeds
/// two tables (current and new format); only permanent employees contribute.
pub fn pf_esic(cfg: &Config) -> TableSpec {
    pf_esic_spec(
        "pf-esic",
        cfg.tables.pf_esic.clone(),
        cfg.sheets.pf_esic.clone(),
    )
}

/// The NEW PF-ESIC variant of [`pf_esic`].
pub fn new_pf_esic(cfg: &Config) -> TableSpec {
    pf_esic_spec(
        "new-pf-esic",
        cfg.tables.new_pf_esic.clone(),
        cfg.sheets.new_pf_esic.clone(),
    )
}

fn pf_esic_spec(label: &'static str, table: String, sheet: String) -> TableSpec {
    TableSpec {
        label,
        table,
        sheet,
        layout: SheetLayout::SingleHeader,
        key: BusinessKey::EmployeePeriod,
        key_source: "Emp No".to_string(),
        key_stored: "SFNo".to_string(),
        period_stored: "Month_Year".to_string(),
        fields: vec![
            FieldMap::new("Sr. No.", "SrNo", FieldKind::Integer),
            FieldMap::new("PRESENT DAY", "PresentDay", FieldKind::Numeric),
            FieldMap::new("BASIC WITH D.A", "Basic_DA_PerDay", FieldKind::Numeric),
            FieldMap::new("HRA    P DAY", "HRA_PerDay", FieldKind::Numeric),
            FieldMap::new("CONV P DAY", "Conv_PerDay", FieldKind::Numeric),
            FieldMap::new("W A   P DAY", "WA_PerDay", FieldKind::Numeric),
            FieldMap::new("BASIC", "Basic_Amt", FieldKind::Numeric),
            FieldMap::new("ACTUAL BASIC", "ActualBasic_Amt", FieldKind::Numeric),
            FieldMap::new("H.R A AMOUNT", "HRA_Amt", FieldKind::Numeric),
            FieldMap::new("CONV   AMOUNT", "Conv_Amt", FieldKind::Numeric),
            FieldMap::new("W. A     AMOUNT", "WA_Amt", FieldKind::Numeric),
            FieldMap::new("GROSS AMOUNT", "GrossAmt", FieldKind::Numeric),
            FieldMap::new("PF", "PF_Amt", FieldKind::Numeric),
            FieldMap::new("ESIC", "ESIC_Amt", FieldKind::Numeric),
            FieldMap::new("P TAX", "PTax_Amt", FieldKind::Numeric),
            FieldMap::new("TOTAL DED", "TotalDed_Amt", FieldKind::Numeric),
            FieldMap::new("NET PAYABLE", "NetPayable_Amt", FieldKind::Numeric),
        ],
        name_split: None,
        rate: None,
        history_field: None,
        left_flag: None,
        policy: IdempotencyPolicy::WholePeriodGuard,
        filters: vec![
            RowFilter::Equals {
                column: "Emp Type".to_string(),
                value: "Perm".to_string(),
            },
            RowFilter::KeyPrefix("SF".to_string()),
        ],
        zero_fill_numeric: false,
        require_any_nonzero: Vec::new(),
        mark_departed: false,
    }
}

/// All table specs in processing order: the roster first so new employees
/// exist before their detail rows land.
pub fn all(cfg: &Config) -> Vec<TableSpec> {
    vec![
        master(cfg),
        hour_clock(cfg),
        advances(cfg),
        overtime(cfg),
        salary_statement(cfg),
        pf_esic(cfg),
        new_pf_esic(cfg),
    ]
}
