//! Net-pay column location. The report diagnostic and the disbursement
//! classifier both resolve "which column is net pay" here, over the same
//! column statistics, instead of carrying two private guesses.

use crate::config::NetPayConfig;
use crate::error::PayrollError;
use crate::model::{numeric_columns, Cell, Row, Table};

/// Count and mean of the strictly positive numeric values in a column.
#[derive(Debug, Clone, Copy)]
pub struct PositiveStats {
    pub count: usize,
    pub mean: f64,
}

pub fn positive_stats(rows: &[Row], col: usize) -> PositiveStats {
    let mut count = 0usize;
    let mut sum = 0.0f64;
    for row in rows {
        if let Some(cell) = row.get(col) {
            let v = match cell {
                Cell::Number(n) => *n,
                Cell::Text(t) => t.trim().parse::<f64>().unwrap_or(f64::NAN),
                Cell::Empty => f64::NAN,
            };
            if v.is_finite() && v > 0.0 {
                count += 1;
                sum += v;
            }
        }
    }
    let mean = if count > 0 { sum / count as f64 } else { 0.0 };
    PositiveStats { count, mean }
}

fn mean_in_range(stats: PositiveStats, cfg: &NetPayConfig) -> bool {
    cfg.min_mean < stats.mean && stats.mean < cfg.max_mean
}

/// Strategy 1: fixed-priority candidate indices, first plausible mean wins.
fn probe_candidates(rows: &[Row], width: usize, cfg: &NetPayConfig) -> Option<usize> {
    for &col in &cfg.candidates {
        if col >= width {
            continue;
        }
        let stats = positive_stats(rows, col);
        if stats.count > 0 && mean_in_range(stats, cfg) {
            return Some(col);
        }
    }
    None
}

/// Strategy 2: right-to-left over the trailing columns, requiring enough
/// positive values. The scan floor is exclusive.
fn scan_tail(rows: &[Row], width: usize, cfg: &NetPayConfig) -> Option<usize> {
    if width == 0 {
        return None;
    }
    let floor = width.saturating_sub(cfg.tail_columns);
    for col in ((floor + 1)..width).rev() {
        let stats = positive_stats(rows, col);
        if stats.count > cfg.min_positive && mean_in_range(stats, cfg) {
            return Some(col);
        }
    }
    None
}

/// Strategy 3: header text containing "net" or "pay", no range test.
fn scan_headers(headers: &[String], rows: &[Row], cfg: &NetPayConfig) -> Option<usize> {
    for (col, header) in headers.iter().enumerate() {
        let lower = header.to_lowercase();
        if lower.contains("net") || lower.contains("pay") {
            let stats = positive_stats(rows, col);
            if stats.count > cfg.min_positive {
                return Some(col);
            }
        }
    }
    None
}

/// Heuristic by design: tolerates inconsistent upstream spreadsheet layouts
/// at the cost of precision. Strategies run in order, first match wins.
pub fn locate_net_pay(table: &Table, cfg: &NetPayConfig) -> Result<usize, PayrollError> {
    let width = table.width();
    probe_candidates(&table.rows, width, cfg)
        .or_else(|| scan_tail(&table.rows, width, cfg))
        .or_else(|| scan_headers(&table.headers, &table.rows, cfg))
        .ok_or(PayrollError::ColumnNotFound { columns: width })
}

/// Post-hoc diagnostic: among the last `tail` columns, the numeric column
/// with the largest positive sum. Returns `(column, sum)`.
pub fn largest_tail_sum(rows: &[Row], width: usize, tail: usize) -> Option<(usize, f64)> {
    let numeric = numeric_columns(rows, width);
    let floor = width.saturating_sub(tail);
    let mut best: Option<(usize, f64)> = None;
    for col in floor..width {
        if !numeric[col] {
            continue;
        }
        let sum: f64 = rows
            .iter()
            .map(|row| row.get(col).map(Cell::numeric_or_zero).unwrap_or(0.0))
            .sum();
        if sum > 0.0 && best.map(|(_, s)| sum > s).unwrap_or(true) {
            best = Some((col, sum));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A `width`-column table whose column `target` holds `values` and whose
    /// other columns hold small or text noise.
    fn table_with(width: usize, target: usize, values: &[f64]) -> Table {
        let headers = (0..width).map(|i| format!("col{i}")).collect();
        let rows = values
            .iter()
            .map(|v| {
                (0..width)
                    .map(|c| {
                        if c == target {
                            Cell::Number(*v)
                        } else if c % 3 == 0 {
                            Cell::Text("x".into())
                        } else {
                            Cell::Number(2.0)
                        }
                    })
                    .collect()
            })
            .collect();
        Table { headers, rows }
    }

    #[test]
    fn candidate_index_hit() {
        let values: Vec<f64> = (0..12).map(|i| 20_000.0 + i as f64 * 1_000.0).collect();
        let table = table_with(40, 33, &values);
        let col = locate_net_pay(&table, &NetPayConfig::default()).unwrap();
        assert_eq!(col, 33);
    }

    #[test]
    fn candidate_rejected_outside_range_falls_back_to_tail() {
        // candidate columns carry tiny means; column 38 is plausible
        let values: Vec<f64> = vec![30_000.0; 15];
        let mut table = table_with(40, 38, &values);
        // force candidate indices to small constants
        for row in &mut table.rows {
            for &c in &[33usize, 34, 35, 32, 31] {
                row[c] = Cell::Number(5.0);
            }
        }
        let col = locate_net_pay(&table, &NetPayConfig::default()).unwrap();
        assert_eq!(col, 38);
    }

    #[test]
    fn tail_scan_requires_enough_positives() {
        // only 5 positive rows: below the >10 threshold, and no candidate or
        // header matches either
        let values: Vec<f64> = vec![30_000.0; 5];
        let mut table = table_with(40, 38, &values);
        for row in &mut table.rows {
            for &c in &[33usize, 34, 35, 32, 31] {
                row[c] = Cell::Number(5.0);
            }
        }
        let err = locate_net_pay(&table, &NetPayConfig::default()).unwrap_err();
        assert!(matches!(err, PayrollError::ColumnNotFound { columns: 40 }));
    }

    #[test]
    fn header_scan_ignores_range() {
        // mean 500_000 is outside the plausible range, but the header names it
        let values: Vec<f64> = vec![500_000.0; 12];
        let mut table = table_with(10, 8, &values);
        table.headers[8] = "NET PAY".into();
        let col = locate_net_pay(&table, &NetPayConfig::default()).unwrap();
        assert_eq!(col, 8);
    }

    #[test]
    fn not_found_when_nothing_plausible() {
        let values: Vec<f64> = vec![5.0; 20];
        let table = table_with(10, 8, &values);
        let err = locate_net_pay(&table, &NetPayConfig::default()).unwrap_err();
        assert!(matches!(err, PayrollError::ColumnNotFound { .. }));
    }

    #[test]
    fn largest_tail_sum_picks_max_numeric() {
        let rows: Vec<Row> = (0..3)
            .map(|_| {
                vec![
                    Cell::Text("k".into()),
                    Cell::Number(1.0),
                    Cell::Number(100.0),
                    Cell::Number(40.0),
                    Cell::Text("noise".into()),
                ]
            })
            .collect();
        // text column 4 is excluded; column 2 wins inside the 3-column tail
        assert_eq!(largest_tail_sum(&rows, 5, 3), Some((2, 300.0)));
    }

    #[test]
    fn largest_tail_sum_none_when_no_positive_numeric() {
        let rows: Vec<Row> = vec![vec![Cell::Number(-5.0), Cell::Text("x".into())]];
        assert_eq!(largest_tail_sum(&rows, 2, 2), None);
    }
}
