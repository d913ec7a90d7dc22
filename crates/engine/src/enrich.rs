use std::cmp::Ordering;

use crate::config::ReportConfig;
use crate::model::{Cell, ReferenceIndex, Row, Table};
use crate::reference::normalize_employee_id;

/// Sentinel for identifiers the reference table does not know. Kept as data,
/// not an error: unmatched employees still appear on the report.
pub const NOT_IN_DBASE: &str = "Not in dbase";

pub const CCR_HEADER: &str = "CCR CODE";
pub const ACCT_HEADER: &str = "ACCT NO";
pub const BONUS_HEADER: &str = "13TH MONTH";

/// Join payroll rows against the reference index and lead with the derived
/// columns: `[cost-center, original id column, account, rest…]`.
pub fn enrich(table: &Table, index: &ReferenceIndex) -> Table {
    let mut headers = Vec::with_capacity(table.headers.len() + 2);
    headers.push(CCR_HEADER.to_string());
    if let Some(first) = table.headers.first() {
        headers.push(first.clone());
    }
    headers.push(ACCT_HEADER.to_string());
    headers.extend(table.headers.iter().skip(1).cloned());

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let id = row.first().and_then(normalize_employee_id);
            let ccr = id
                .as_deref()
                .and_then(|id| index.cost_center(id))
                .unwrap_or(NOT_IN_DBASE);
            let acct = id
                .as_deref()
                .and_then(|id| index.account(id))
                .unwrap_or(NOT_IN_DBASE);

            let mut out = Vec::with_capacity(row.len() + 2);
            out.push(Cell::Text(ccr.to_string()));
            out.push(row.first().cloned().unwrap_or(Cell::Empty));
            out.push(Cell::Text(acct.to_string()));
            out.extend(row.iter().skip(1).cloned());
            out
        })
        .collect();

    Table { headers, rows }
}

/// Stable ascending sort by (grouping key, identifier column, secondary key),
/// blank keys last. Stability matters: subtotal insertion order within a
/// group must match input order for reproducible output.
pub fn sort_table(table: &mut Table) {
    const SORT_KEYS: [usize; 3] = [0, 1, 3];
    table.rows.sort_by(|a, b| {
        for key in SORT_KEYS {
            let left = a.get(key).unwrap_or(&Cell::Empty);
            let right = b.get(key).unwrap_or(&Cell::Empty);
            let ord = cmp_cells(left, right);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// Cell ordering for sorting: numbers before text, both before blanks;
/// numbers compare numerically, text lexicographically.
fn cmp_cells(a: &Cell, b: &Cell) -> Ordering {
    match (a, b) {
        (Cell::Empty, Cell::Empty) => Ordering::Equal,
        (Cell::Empty, _) => Ordering::Greater,
        (_, Cell::Empty) => Ordering::Less,
        (Cell::Number(x), Cell::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Cell::Number(_), Cell::Text(_)) => Ordering::Less,
        (Cell::Text(_), Cell::Number(_)) => Ordering::Greater,
        (Cell::Text(x), Cell::Text(y)) => x.cmp(y),
    }
}

/// Append the prorated 13th-month column: basic pay divided by the bonus
/// divisor, 0 where basic pay is non-numeric.
pub fn add_bonus_column(table: &mut Table, cfg: &ReportConfig) {
    if table.headers.len() <= cfg.basic_pay_column {
        return;
    }
    table.headers.push(BONUS_HEADER.to_string());
    for row in &mut table.rows {
        let basic = row
            .get(cfg.basic_pay_column)
            .map(Cell::numeric_or_zero)
            .unwrap_or(0.0);
        row.push(Cell::Number(basic / cfg.bonus_divisor));
    }
}
