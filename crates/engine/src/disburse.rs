//! Disbursement classification: walk payroll rows, resolve one employee per
//! row, and route each to the bank or cash collection.

use std::collections::HashSet;

use crate::config::{DisburseConfig, PayrollConfig};
use crate::error::PayrollError;
use crate::locate;
use crate::model::{
    Cell, DisbursementRecord, DisbursementSplit, DisbursementTotals, ReferenceIndex, Row,
    SkipCounts, Table,
};
use crate::reference::{digits_only, normalize_employee_id};

/// Classify every payroll row into a bank or cash payee, in input order.
/// Skips are counted, never errors; only an empty result is terminal.
pub fn classify(
    table: &Table,
    index: &ReferenceIndex,
    config: &PayrollConfig,
) -> Result<DisbursementSplit, PayrollError> {
    let net_pay_column = locate::locate_net_pay(table, &config.net_pay)?;
    let cfg = &config.disburse;

    let mut bank: Vec<DisbursementRecord> = Vec::new();
    let mut cash: Vec<DisbursementRecord> = Vec::new();
    let mut skipped = SkipCounts::default();
    let mut seen: HashSet<String> = HashSet::new();

    for row in &table.rows {
        let Some(id) = resolve_employee_id(row, cfg) else {
            skipped.no_employee_id += 1;
            continue;
        };
        if seen.contains(&id) {
            skipped.duplicate += 1;
            continue;
        }
        if is_header_or_total_row(row, cfg) {
            skipped.keyword += 1;
            continue;
        }
        let net_pay = row
            .get(net_pay_column)
            .map(Cell::numeric_or_zero)
            .unwrap_or(0.0);
        if net_pay <= 0.0 {
            skipped.non_positive_pay += 1;
            continue;
        }

        let name = index
            .name(&id)
            .map(str::to_string)
            .unwrap_or_else(|| synthesize_name(row, cfg, &id));

        match index.account(&id) {
            Some(account) => {
                bank.push(DisbursementRecord {
                    employee_id: id.clone(),
                    name,
                    net_pay,
                    account: Some(format_bank_account(account, cfg)),
                });
            }
            None => {
                cash.push(DisbursementRecord {
                    employee_id: id.clone(),
                    name,
                    net_pay,
                    account: None,
                });
            }
        }
        seen.insert(id);
    }

    if bank.is_empty() && cash.is_empty() {
        return Err(PayrollError::NoValidRecords {
            accounts: index.account_count(),
            names: index.name_count(),
        });
    }

    bank.sort_by(|a, b| a.name.cmp(&b.name));
    cash.sort_by(|a, b| a.name.cmp(&b.name));

    let bank_total: f64 = bank.iter().map(|r| r.net_pay).sum();
    let cash_total: f64 = cash.iter().map(|r| r.net_pay).sum();

    Ok(DisbursementSplit {
        totals: DisbursementTotals {
            bank_total,
            cash_total,
            total: bank_total + cash_total,
            bank_count: bank.len(),
            cash_count: cash.len(),
        },
        bank,
        cash,
        skipped,
        net_pay_column,
    })
}

/// Prefer the primary id column; fall back to scanning the configured
/// columns for the first numeric token of sufficient raw length.
fn resolve_employee_id(row: &Row, cfg: &DisburseConfig) -> Option<String> {
    if let Some(id) = row.get(cfg.id_column).and_then(normalize_employee_id) {
        return Some(id);
    }
    for &col in &cfg.id_fallback_columns {
        let Some(cell) = row.get(col) else { continue };
        let raw = cell.display();
        if raw.trim().len() < cfg.min_fallback_id_len {
            continue;
        }
        if let Some(id) = normalize_employee_id(cell) {
            return Some(id);
        }
    }
    None
}

/// Header/total detection over the leading cells, keyword containment on the
/// upper-cased concatenation.
fn is_header_or_total_row(row: &Row, cfg: &DisburseConfig) -> bool {
    let text = row
        .iter()
        .take(cfg.keyword_columns)
        .filter(|c| !c.is_blank())
        .map(Cell::display)
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    cfg.skip_keywords
        .iter()
        .any(|k| text.contains(&k.to_uppercase()))
}

/// "Last, First M." from the row's name columns; middle reduced to one
/// initial. Falls back to `Employee {id}` when no fragment exists.
fn synthesize_name(row: &Row, cfg: &DisburseConfig, id: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for &col in &cfg.name_columns {
        if let Some(cell) = row.get(col) {
            let s = cell.display();
            let s = s.trim();
            if !s.is_empty() && !s.eq_ignore_ascii_case("nan") {
                parts.push(s.to_string());
            }
        }
    }
    match parts.as_slice() {
        [] => format!("Employee {id}"),
        [only] => only.clone(),
        [last, first, rest @ ..] => {
            let mut name = format!("{last}, {first}");
            if let Some(initial) = rest.first().and_then(|m| m.chars().next()) {
                name.push_str(&format!(" {initial}."));
            }
            name
        }
    }
}

/// Digits only, zero-padded to the configured width, routing prefix in
/// front. Accounts already at or past the width are not truncated.
fn format_bank_account(account: &str, cfg: &DisburseConfig) -> String {
    let digits = digits_only(account);
    let padded = if digits.len() < cfg.account_width {
        format!("{:0>width$}", digits, width = cfg.account_width)
    } else {
        digits
    };
    format!("{}{}", cfg.routing_prefix, padded)
}
