use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Cells and tables
// ---------------------------------------------------------------------------

/// One untyped spreadsheet cell. Upstream payroll exports carry no schema,
/// so typing happens per cell at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Type a raw field: blank → `Empty`, parsable → `Number`, else `Text`.
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(t) => t.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Lenient numeric coercion: non-numeric cells contribute 0.
    pub fn numeric_or_zero(&self) -> f64 {
        match self {
            Cell::Number(n) => *n,
            Cell::Text(t) => t.trim().parse::<f64>().unwrap_or(0.0),
            Cell::Empty => 0.0,
        }
    }

    /// Render for display and keying. Integral numbers drop the `.0` so
    /// `1001.0` and `"1001"` key identically.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Text(t) => t.clone(),
        }
    }
}

pub type Row = Vec<Cell>;

/// A rectangular, header-bearing table. Rows are padded to header width at
/// load time.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

/// Per-column numeric flags over a row set: numeric iff the column holds at
/// least one number and no text. An entirely blank column is non-numeric —
/// "no data" is distinct from "sums to zero".
pub fn numeric_columns(rows: &[Row], width: usize) -> Vec<bool> {
    let mut has_number = vec![false; width];
    let mut has_text = vec![false; width];
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(width) {
            match cell {
                Cell::Number(_) => has_number[i] = true,
                Cell::Text(t) if !t.trim().is_empty() => has_text[i] = true,
                _ => {}
            }
        }
    }
    has_number
        .into_iter()
        .zip(has_text)
        .map(|(num, text)| num && !text)
        .collect()
}

// ---------------------------------------------------------------------------
// Reference index
// ---------------------------------------------------------------------------

/// Lookup tables built once from the employee reference table and treated as
/// read-only by both the report and disbursement pipelines. Both consumers
/// must see identical results from the same source table.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    cost_centers: HashMap<String, String>,
    accounts: HashMap<String, String>,
    names: HashMap<String, String>,
}

impl ReferenceIndex {
    pub fn cost_center(&self, id: &str) -> Option<&str> {
        self.cost_centers.get(id).map(String::as_str)
    }

    pub fn account(&self, id: &str) -> Option<&str> {
        self.accounts.get(id).map(String::as_str)
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Distinct employees indexed. Every accepted row stores a name, so this
    /// is the accepted-row count (malformed rows are silently excluded).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    pub(crate) fn insert_cost_center(&mut self, id: String, code: String) {
        self.cost_centers.insert(id, code);
    }

    pub(crate) fn insert_account(&mut self, id: String, account: String) {
        self.accounts.insert(id, account);
    }

    pub(crate) fn insert_name(&mut self, id: String, name: String) {
        self.names.insert(id, name);
    }
}

// ---------------------------------------------------------------------------
// Report output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Employee,
    Subtotal,
    Rollup,
    Spacer,
    GrandTotal,
}

impl std::fmt::Display for RowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Employee => write!(f, "employee"),
            Self::Subtotal => write!(f, "subtotal"),
            Self::Rollup => write!(f, "rollup"),
            Self::Spacer => write!(f, "spacer"),
            Self::GrandTotal => write!(f, "grand_total"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub kind: RowKind,
    pub cells: Row,
}

/// One visited group in processing order.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStat {
    pub position: usize,
    pub key: String,
    pub label: String,
    pub employees: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub groups: usize,
    pub employee_rows: usize,
    pub rollups_emitted: usize,
    pub group_stats: Vec<GroupStat>,
    /// Post-hoc diagnostic only: the tail column with the largest
    /// employee-row sum, presumed to be net pay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presumed_net_pay_column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presumed_net_pay_total: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTable {
    pub meta: ReportMeta,
    pub summary: ReportSummary,
    pub headers: Vec<String>,
    pub rows: Vec<ReportRow>,
}

// ---------------------------------------------------------------------------
// Disbursement output
// ---------------------------------------------------------------------------

/// One payee. Created once per unique employee id, immutable, routed to
/// exactly one of the two collections.
#[derive(Debug, Clone, Serialize)]
pub struct DisbursementRecord {
    pub employee_id: String,
    pub name: String,
    pub net_pay: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub no_employee_id: usize,
    pub duplicate: usize,
    pub keyword: usize,
    pub non_positive_pay: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.no_employee_id + self.duplicate + self.keyword + self.non_positive_pay
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DisbursementTotals {
    pub bank_total: f64,
    pub cash_total: f64,
    pub total: f64,
    pub bank_count: usize,
    pub cash_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DisbursementSplit {
    pub bank: Vec<DisbursementRecord>,
    pub cash: Vec<DisbursementRecord>,
    pub totals: DisbursementTotals,
    pub skipped: SkipCounts,
    /// Column the locator settled on, for operator triage.
    pub net_pay_column: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_parse_types() {
        assert_eq!(Cell::parse(""), Cell::Empty);
        assert_eq!(Cell::parse("   "), Cell::Empty);
        assert_eq!(Cell::parse("12.5"), Cell::Number(12.5));
        assert_eq!(Cell::parse(" 1001 "), Cell::Number(1001.0));
        assert_eq!(Cell::parse("IND2001"), Cell::Text("IND2001".into()));
    }

    #[test]
    fn cell_display_drops_integral_fraction() {
        assert_eq!(Cell::Number(1001.0).display(), "1001");
        assert_eq!(Cell::Number(12.5).display(), "12.5");
        assert_eq!(Cell::Empty.display(), "");
    }

    #[test]
    fn numeric_or_zero_is_lenient() {
        assert_eq!(Cell::Text("abc".into()).numeric_or_zero(), 0.0);
        assert_eq!(Cell::Text("42".into()).numeric_or_zero(), 42.0);
        assert_eq!(Cell::Empty.numeric_or_zero(), 0.0);
    }

    #[test]
    fn numeric_columns_require_numbers_and_no_text() {
        let rows: Vec<Row> = vec![
            vec![Cell::Number(1.0), Cell::Text("x".into()), Cell::Empty, Cell::Empty],
            vec![Cell::Number(2.0), Cell::Number(3.0), Cell::Empty, Cell::Number(4.0)],
        ];
        let flags = numeric_columns(&rows, 4);
        // col 1 mixes text and numbers, col 2 is entirely blank
        assert_eq!(flags, vec![true, false, false, true]);
    }
}
