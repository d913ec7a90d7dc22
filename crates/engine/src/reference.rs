use crate::config::ReferenceConfig;
use crate::error::PayrollError;
use crate::model::{Cell, ReferenceIndex, Table};

/// Normalize an employee identifier: the leading numeric token before any
/// decimal point. A value qualifies when stripping `.` and `-` leaves only
/// ASCII digits. `1001.0` and `"1001"` both normalize to `"1001"`.
pub fn normalize_employee_id(cell: &Cell) -> Option<String> {
    let raw = cell.display();
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let stripped: String = raw.chars().filter(|c| *c != '.' && *c != '-').collect();
    if stripped.is_empty() || !stripped.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(match raw.split_once('.') {
        Some((head, _)) => head.to_string(),
        None => raw.to_string(),
    })
}

/// Keep only ASCII digits.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Build the lookup index from the reference table.
///
/// Rows whose identifier does not normalize are silently excluded — the
/// reference workbook routinely carries header and remark rows, and exclusion
/// is observable through `ReferenceIndex::len`. Accounts are coerced to
/// digits and accepted only at `min_account_digits` or longer; shorter means
/// the employee is accountless. Identifier uniqueness is assumed;
/// last-write-wins when violated.
pub fn build(table: &Table, config: &ReferenceConfig) -> Result<ReferenceIndex, PayrollError> {
    if table.width() < 2 {
        return Err(PayrollError::MalformedReferenceTable {
            columns: table.width(),
        });
    }

    let mut index = ReferenceIndex::default();

    for row in &table.rows {
        let id = match row.get(config.id_column).and_then(normalize_employee_id) {
            Some(id) => id,
            None => continue,
        };

        if let Some(cell) = row.get(config.cost_center_column) {
            let code = cell.display();
            let code = code.trim();
            if !code.is_empty() {
                index.insert_cost_center(id.clone(), code.to_string());
            }
        }

        if let Some(cell) = row.get(config.account_column) {
            let digits = digits_only(&cell.display());
            if digits.len() >= config.min_account_digits {
                index.insert_account(id.clone(), digits);
            }
        }

        let name = row
            .get(config.name_column)
            .map(Cell::display)
            .unwrap_or_default();
        let name = name.trim();
        let resolved = if name.is_empty() || name.eq_ignore_ascii_case("nan") {
            format!("Employee {id}")
        } else {
            name.to_string()
        };
        index.insert_name(id, resolved);
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<Cell>>) -> Table {
        Table {
            headers: (0..6).map(|i| format!("col{i}")).collect(),
            rows,
        }
    }

    fn row(id: &str, name: &str, account: &str, ccr: &str) -> Vec<Cell> {
        vec![
            Cell::parse(id),
            Cell::parse(name),
            Cell::Empty,
            Cell::parse(account),
            Cell::Empty,
            Cell::parse(ccr),
        ]
    }

    #[test]
    fn normalize_accepts_numeric_tokens() {
        assert_eq!(normalize_employee_id(&Cell::parse("1001")), Some("1001".into()));
        assert_eq!(normalize_employee_id(&Cell::Number(1001.0)), Some("1001".into()));
        assert_eq!(
            normalize_employee_id(&Cell::Text("1001.0".into())),
            Some("1001".into())
        );
        assert_eq!(normalize_employee_id(&Cell::parse("IND2001")), None);
        assert_eq!(normalize_employee_id(&Cell::Empty), None);
        assert_eq!(normalize_employee_id(&Cell::Text("  ".into())), None);
    }

    #[test]
    fn rejects_single_column_table() {
        let table = Table {
            headers: vec!["id".into()],
            rows: vec![],
        };
        let err = build(&table, &ReferenceConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PayrollError::MalformedReferenceTable { columns: 1 }
        ));
    }

    #[test]
    fn indexes_well_formed_rows() {
        let t = table(vec![
            row("1001", "Cruz, Maria S.", "00012345678", "IND2001"),
            row("1002", "Reyes, Jose", "55", "IND2005"),
        ]);
        let index = build(&t, &ReferenceConfig::default()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.name("1001"), Some("Cruz, Maria S."));
        assert_eq!(index.cost_center("1001"), Some("IND2001"));
        // 11 digits accepted as-is
        assert_eq!(index.account("1001"), Some("00012345678"));
        // 2 digits rejected: accountless
        assert_eq!(index.account("1002"), None);
    }

    #[test]
    fn malformed_rows_silently_excluded() {
        let t = table(vec![
            row("EMP ID", "NAME", "ACCOUNT", "CCR"),
            row("1001", "Cruz, Maria S.", "1234567890", "IND2001"),
            row("", "Blank row", "", ""),
        ]);
        let index = build(&t, &ReferenceConfig::default()).unwrap();
        // only the one parsable id survives, no error raised
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn synthesizes_missing_names() {
        let t = table(vec![
            row("1001", "", "1234567890", "IND2001"),
            row("1002", "nan", "", "IND2005"),
        ]);
        let index = build(&t, &ReferenceConfig::default()).unwrap();
        assert_eq!(index.name("1001"), Some("Employee 1001"));
        assert_eq!(index.name("1002"), Some("Employee 1002"));
    }

    #[test]
    fn duplicate_id_last_write_wins() {
        let t = table(vec![
            row("1001", "First, Entry", "1111111111", "IND2001"),
            row("1001", "Second, Entry", "2222222222", "IND2005"),
        ]);
        let index = build(&t, &ReferenceConfig::default()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.name("1001"), Some("Second, Entry"));
        assert_eq!(index.account("1001"), Some("2222222222"));
        assert_eq!(index.cost_center("1001"), Some("IND2005"));
    }

    #[test]
    fn numeric_account_cells_coerce_to_digits() {
        let mut r = row("1001", "Cruz, Maria", "", "IND2001");
        r[3] = Cell::Number(12345678901.0);
        let index = build(&table(vec![r]), &ReferenceConfig::default()).unwrap();
        assert_eq!(index.account("1001"), Some("12345678901"));
    }
}
