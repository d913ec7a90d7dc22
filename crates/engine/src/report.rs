//! Grouped subtotal/rollup engine: partitions the sorted payroll table by
//! cost-center key and emits employee rows, per-group subtotals, checkpoint
//! rollups with spacers, and a single grand total over employee rows only.

use std::collections::BTreeMap;

use crate::config::PayrollConfig;
use crate::locate;
use crate::model::{
    numeric_columns, Cell, GroupStat, ReportMeta, ReportRow, ReportSummary, ReportTable, Row,
    RowKind, Table,
};

fn blank_row(width: usize) -> Row {
    vec![Cell::Empty; width]
}

/// Build the report from an enriched, sorted table. Pure: the input is not
/// modified, synthetic rows are appended to the output only.
pub fn build_report(table: &Table, config: &PayrollConfig) -> ReportTable {
    let cfg = &config.report;
    let width = table.width();

    // Partition by the column-0 key. Blank keys are dropped from visiting.
    let mut partitions: BTreeMap<String, Vec<Row>> = BTreeMap::new();
    for row in &table.rows {
        let key = row.first().map(Cell::display).unwrap_or_default();
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        partitions.entry(key.to_string()).or_default().push(row.clone());
    }

    // Visit order: the taxonomy list is the source of truth, remaining keys
    // follow in ascending key order.
    let mut order: Vec<String> = cfg
        .taxonomy
        .iter()
        .filter(|e| partitions.contains_key(&e.code))
        .map(|e| e.code.clone())
        .collect();
    for key in partitions.keys() {
        if !cfg.taxonomy.iter().any(|e| &e.code == key) {
            order.push(key.clone());
        }
    }

    // Column-level numeric decision covers the whole input table; per-cell
    // coercion failures inside a numeric column contribute 0.
    let numeric = numeric_columns(&table.rows, width);

    let mut rows: Vec<ReportRow> = Vec::new();
    let mut subtotals: Vec<Row> = Vec::new();
    let mut group_stats: Vec<GroupStat> = Vec::new();
    let mut rollups_emitted = 0usize;
    let mut employee_rows: Vec<Row> = Vec::new();

    for (idx, key) in order.iter().enumerate() {
        let position = idx + 1;
        let group = &partitions[key];

        for row in group {
            rows.push(ReportRow {
                kind: RowKind::Employee,
                cells: row.clone(),
            });
        }
        employee_rows.extend(group.iter().cloned());

        let label = cfg
            .taxonomy
            .get(position - 1)
            .map(|e| e.label.clone())
            .unwrap_or_else(|| format!("TOTAL {key}"));

        let mut subtotal = blank_row(width);
        subtotal[0] = Cell::Text(key.clone());
        if width > 1 {
            subtotal[1] = Cell::Number(group.len() as f64);
        }
        if width > 2 {
            subtotal[2] = Cell::Text(label.clone());
        }
        for col in cfg.numeric_from..width {
            if numeric[col] {
                let sum: f64 = group
                    .iter()
                    .map(|r| r.get(col).map(Cell::numeric_or_zero).unwrap_or(0.0))
                    .sum();
                subtotal[col] = Cell::Number(sum);
            }
        }

        subtotals.push(subtotal.clone());
        group_stats.push(GroupStat {
            position,
            key: key.clone(),
            label,
            employees: group.len(),
        });
        rows.push(ReportRow {
            kind: RowKind::Subtotal,
            cells: subtotal,
        });

        for spec in cfg.rollups.iter().filter(|s| s.after == position) {
            let members: Vec<&Row> = spec
                .members
                .iter()
                .filter_map(|&p| subtotals.get(p - 1))
                .collect();
            rows.push(ReportRow {
                kind: RowKind::Rollup,
                cells: rollup_row(&members, &spec.label, width),
            });
            rows.push(ReportRow {
                kind: RowKind::Spacer,
                cells: blank_row(width),
            });
            rollups_emitted += 1;
        }
    }

    // Grand total sums original employee rows only — subtotals and rollups
    // are never double-counted.
    let mut grand = blank_row(width);
    if width > 1 {
        grand[1] = Cell::Number(employee_rows.len() as f64);
    }
    if width > 2 {
        grand[2] = Cell::Text(cfg.grand_total_label.clone());
    }
    for col in cfg.numeric_from..width {
        if numeric[col] {
            let sum: f64 = employee_rows
                .iter()
                .map(|r| r.get(col).map(Cell::numeric_or_zero).unwrap_or(0.0))
                .sum();
            grand[col] = Cell::Number(sum);
        }
    }
    rows.push(ReportRow {
        kind: RowKind::GrandTotal,
        cells: grand,
    });

    let presumed = locate::largest_tail_sum(&employee_rows, width, cfg.diagnostic_tail);

    ReportTable {
        meta: ReportMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: ReportSummary {
            groups: order.len(),
            employee_rows: employee_rows.len(),
            rollups_emitted,
            group_stats,
            presumed_net_pay_column: presumed.map(|(col, _)| col),
            presumed_net_pay_total: presumed.map(|(_, sum)| sum),
        },
        headers: table.headers.clone(),
        rows,
    }
}

/// Sum member subtotal rows field-by-field from position 1 on, writing only
/// nonzero sums (zero stays blank, matching the legacy sheet's display).
fn rollup_row(members: &[&Row], label: &str, width: usize) -> Row {
    let mut total = blank_row(width);
    if members.is_empty() {
        return total;
    }
    if width > 2 {
        total[2] = Cell::Text(label.to_string());
    }
    for col in 1..width {
        if col == 2 {
            continue;
        }
        let sum: f64 = members
            .iter()
            .map(|r| r.get(col).map(Cell::numeric_or_zero).unwrap_or(0.0))
            .sum();
        if sum != 0.0 {
            total[col] = Cell::Number(sum);
        }
    }
    total
}
