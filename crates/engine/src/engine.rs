use crate::config::PayrollConfig;
use crate::disburse;
use crate::enrich;
use crate::error::PayrollError;
use crate::model::{Cell, DisbursementSplit, ReferenceIndex, ReportTable, Row, Table};
use crate::reference;
use crate::report;

/// Columns 0–7 of the payroll table are structurally required.
pub const REQUIRED_PAYROLL_COLUMNS: usize = 8;

/// Build the lookup index from the employee reference table. Built once,
/// read-only afterwards; pass the same instance to both pipelines.
pub fn build_reference_index(
    table: &Table,
    config: &PayrollConfig,
) -> Result<ReferenceIndex, PayrollError> {
    reference::build(table, &config.reference)
}

/// The full report pipeline: enrich → sort → subtotal/rollup.
pub fn process_payroll(
    table: &Table,
    index: &ReferenceIndex,
    config: &PayrollConfig,
) -> Result<ReportTable, PayrollError> {
    if table.width() < REQUIRED_PAYROLL_COLUMNS {
        return Err(PayrollError::InsufficientColumns {
            columns: table.width(),
            required: REQUIRED_PAYROLL_COLUMNS,
        });
    }

    let mut enriched = enrich::enrich(table, index);
    enrich::sort_table(&mut enriched);
    enrich::add_bonus_column(&mut enriched, &config.report);

    Ok(report::build_report(&enriched, config))
}

/// The disbursement pipeline: locate net pay, classify rows into bank and
/// cash payees. Consumes the raw payroll table and the shared index; shares
/// no control flow with the report pipeline.
pub fn classify_disbursements(
    table: &Table,
    index: &ReferenceIndex,
    config: &PayrollConfig,
) -> Result<DisbursementSplit, PayrollError> {
    disburse::classify(table, index, config)
}

/// Load a header-bearing CSV into a typed table. Ragged rows are padded (or
/// truncated) to header width.
pub fn load_csv_table(csv_data: &str) -> Result<Table, PayrollError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PayrollError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let width = headers.len();

    let mut rows: Vec<Row> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| PayrollError::Io(e.to_string()))?;
        let mut row: Row = record.iter().map(Cell::parse).collect();
        row.resize(width, Cell::Empty);
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_csv_types_cells() {
        let csv = "\
CCR,EMP ID,ACCT,LAST,FIRST,MIDDLE,DAYS,BASIC
IND2001,1001,,Cruz,Maria,Santos,11,6600.00
IND2005,1002,,Reyes,Jose,,10.5,6300
";
        let table = load_csv_table(csv).unwrap();
        assert_eq!(table.width(), 8);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("IND2001".into()));
        assert_eq!(table.rows[0][1], Cell::Number(1001.0));
        assert_eq!(table.rows[0][2], Cell::Empty);
        assert_eq!(table.rows[0][7], Cell::Number(6600.0));
        assert_eq!(table.rows[1][6], Cell::Number(10.5));
    }

    #[test]
    fn load_csv_pads_ragged_rows() {
        let csv = "\
a,b,c,d
1,2
5,6,7,8,9
";
        let table = load_csv_table(csv).unwrap();
        assert_eq!(table.rows[0], vec![
            Cell::Number(1.0),
            Cell::Number(2.0),
            Cell::Empty,
            Cell::Empty,
        ]);
        assert_eq!(table.rows[1].len(), 4);
        assert_eq!(table.rows[1][3], Cell::Number(8.0));
    }

    #[test]
    fn process_rejects_narrow_tables() {
        let table = Table {
            headers: (0..7).map(|i| format!("c{i}")).collect(),
            rows: vec![],
        };
        let config = PayrollConfig::default();
        let index = ReferenceIndex::default();
        let err = process_payroll(&table, &index, &config).unwrap_err();
        assert!(matches!(
            err,
            PayrollError::InsufficientColumns {
                columns: 7,
                required: 8
            }
        ));
    }
}
