use serde::Deserialize;

use crate::error::PayrollError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Full engine configuration. Defaults reproduce the legacy payroll
/// workbook's constants; any piece can be overridden from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub net_pay: NetPayConfig,
    #[serde(default)]
    pub disburse: DisburseConfig,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            reference: ReferenceConfig::default(),
            report: ReportConfig::default(),
            net_pay: NetPayConfig::default(),
            disburse: DisburseConfig::default(),
        }
    }
}

fn default_name() -> String {
    "payroll".into()
}

// ---------------------------------------------------------------------------
// Reference table layout
// ---------------------------------------------------------------------------

/// Column positions in the employee reference table, plus the account
/// validity rule. One declared layout feeds both pipelines.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub id_column: usize,
    #[serde(default = "default_ref_name_column")]
    pub name_column: usize,
    #[serde(default = "default_ref_cost_center_column")]
    pub cost_center_column: usize,
    #[serde(default = "default_ref_account_column")]
    pub account_column: usize,
    /// Accounts with fewer digits than this are treated as absent.
    #[serde(default = "default_min_account_digits")]
    pub min_account_digits: usize,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            id_column: 0,
            name_column: default_ref_name_column(),
            cost_center_column: default_ref_cost_center_column(),
            account_column: default_ref_account_column(),
            min_account_digits: default_min_account_digits(),
        }
    }
}

fn default_ref_name_column() -> usize {
    1
}
fn default_ref_cost_center_column() -> usize {
    5
}
fn default_ref_account_column() -> usize {
    3
}
fn default_min_account_digits() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Report: taxonomy, rollups, derived column
// ---------------------------------------------------------------------------

/// One ordinal position in the business taxonomy. Groups are visited in the
/// order entries appear here; the list, not key sort order, is the source of
/// truth for processing order.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupEntry {
    pub code: String,
    pub label: String,
}

/// A cross-group rollup: sums the subtotal rows at the 1-based `members`
/// positions, emitted immediately after processing position `after`.
#[derive(Debug, Clone, Deserialize)]
pub struct RollupSpec {
    pub label: String,
    pub members: Vec<usize>,
    pub after: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// First column position whose values are summable pay fields.
    #[serde(default = "default_numeric_from")]
    pub numeric_from: usize,
    /// Post-reorder position of the basic-pay column feeding the prorated
    /// bonus, and its divisor (one month of twelve).
    #[serde(default = "default_basic_pay_column")]
    pub basic_pay_column: usize,
    #[serde(default = "default_bonus_divisor")]
    pub bonus_divisor: f64,
    #[serde(default = "default_taxonomy")]
    pub taxonomy: Vec<GroupEntry>,
    #[serde(default = "default_rollups")]
    pub rollups: Vec<RollupSpec>,
    #[serde(default = "default_grand_total_label")]
    pub grand_total_label: String,
    /// How many trailing columns the post-hoc net-pay diagnostic scans.
    #[serde(default = "default_diagnostic_tail")]
    pub diagnostic_tail: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            numeric_from: default_numeric_from(),
            basic_pay_column: default_basic_pay_column(),
            bonus_divisor: default_bonus_divisor(),
            taxonomy: default_taxonomy(),
            rollups: default_rollups(),
            grand_total_label: default_grand_total_label(),
            diagnostic_tail: default_diagnostic_tail(),
        }
    }
}

fn default_numeric_from() -> usize {
    7
}
fn default_basic_pay_column() -> usize {
    7
}
fn default_bonus_divisor() -> f64 {
    12.0
}
fn default_grand_total_label() -> String {
    "GRAND TOTAL DAILY".into()
}
fn default_diagnostic_tail() -> usize {
    5
}

fn default_taxonomy() -> Vec<GroupEntry> {
    [
        ("IND2001", "TOTAL IND2001"),
        ("IND2005", "TOTAL IND2005"),
        ("IND2101", "TOTAL IND2101"),
        ("IND2102", "TOTAL IND2102"),
        ("IND0202", "TOTAL IND202"),
        ("IND0202-1", "TOTAL IND202-1"),
        ("IND0203", "TOTAL IND203"),
        ("IND0203-1", "TOTAL IND203-1"),
        ("IND0204", "TOTAL IND204"),
        ("IND0205", "TOTAL IND205"),
        ("IND0503", "TOTAL IND503"),
        ("IND0506", "TOTAL IND506"),
        ("IND0702", "TOTAL IND702"),
        ("D2001", "TOTAL D2001"),
        ("D2005", "TOTAL D2005"),
        ("IND1002", "TOTAL IND1002"),
    ]
    .iter()
    .map(|(code, label)| GroupEntry {
        code: (*code).into(),
        label: (*label).into(),
    })
    .collect()
}

fn default_rollups() -> Vec<RollupSpec> {
    vec![
        RollupSpec {
            label: "IND PROD TOTAL".into(),
            members: vec![1, 2],
            after: 2,
        },
        RollupSpec {
            label: "IND QA TOTAL".into(),
            members: (3..=10).collect(),
            after: 10,
        },
        RollupSpec {
            label: "IND WAREHOUSE TOTAL".into(),
            members: vec![11, 12],
            after: 12,
        },
        RollupSpec {
            label: "DIRECT PROD TOTAL".into(),
            members: vec![14, 15],
            after: 15,
        },
    ]
}

// ---------------------------------------------------------------------------
// Net-pay locator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NetPayConfig {
    /// Fixed-priority candidate column indices tried first.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<usize>,
    /// Plausible mean range for a net-pay column (exclusive bounds).
    #[serde(default = "default_min_mean")]
    pub min_mean: f64,
    #[serde(default = "default_max_mean")]
    pub max_mean: f64,
    /// Fallback scans require strictly more positives than this.
    #[serde(default = "default_min_positive")]
    pub min_positive: usize,
    /// How many trailing columns the right-to-left scan covers.
    #[serde(default = "default_tail_columns")]
    pub tail_columns: usize,
}

impl Default for NetPayConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            min_mean: default_min_mean(),
            max_mean: default_max_mean(),
            min_positive: default_min_positive(),
            tail_columns: default_tail_columns(),
        }
    }
}

fn default_candidates() -> Vec<usize> {
    vec![33, 34, 35, 32, 31, 40, 41, 42]
}
fn default_min_mean() -> f64 {
    1_000.0
}
fn default_max_mean() -> f64 {
    200_000.0
}
fn default_min_positive() -> usize {
    10
}
fn default_tail_columns() -> usize {
    30
}

// ---------------------------------------------------------------------------
// Disbursement classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DisburseConfig {
    /// Primary employee-id column.
    #[serde(default = "default_id_column")]
    pub id_column: usize,
    /// Columns scanned when the primary id column yields nothing.
    #[serde(default = "default_id_fallback_columns")]
    pub id_fallback_columns: Vec<usize>,
    /// Minimum raw length for a fallback id token.
    #[serde(default = "default_min_fallback_id_len")]
    pub min_fallback_id_len: usize,
    /// Columns combined into "Last, First M." when the reference has no name.
    #[serde(default = "default_name_columns")]
    pub name_columns: Vec<usize>,
    /// How many leading cells feed the header/total keyword test.
    #[serde(default = "default_keyword_columns")]
    pub keyword_columns: usize,
    #[serde(default = "default_skip_keywords")]
    pub skip_keywords: Vec<String>,
    /// Bank routing prefix prepended to every padded account number.
    #[serde(default = "default_routing_prefix")]
    pub routing_prefix: String,
    /// Accounts are left-padded with zeros to this many digits.
    #[serde(default = "default_account_width")]
    pub account_width: usize,
}

impl Default for DisburseConfig {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            id_fallback_columns: default_id_fallback_columns(),
            min_fallback_id_len: default_min_fallback_id_len(),
            name_columns: default_name_columns(),
            keyword_columns: default_keyword_columns(),
            skip_keywords: default_skip_keywords(),
            routing_prefix: default_routing_prefix(),
            account_width: default_account_width(),
        }
    }
}

fn default_id_column() -> usize {
    1
}
fn default_id_fallback_columns() -> Vec<usize> {
    vec![0, 2, 3]
}
fn default_min_fallback_id_len() -> usize {
    4
}
fn default_name_columns() -> Vec<usize> {
    vec![3, 4, 5]
}
fn default_keyword_columns() -> usize {
    5
}
fn default_skip_keywords() -> Vec<String> {
    ["TOTAL", "GRAND", "CCR", "CODE", "NAME", "ACCOUNT"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}
fn default_routing_prefix() -> String {
    "00".into()
}
fn default_account_width() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PayrollConfig {
    pub fn from_toml(input: &str) -> Result<Self, PayrollError> {
        let config: PayrollConfig =
            toml::from_str(input).map_err(|e| PayrollError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PayrollError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.report.taxonomy {
            if entry.code.trim().is_empty() {
                return Err(PayrollError::ConfigValidation(
                    "taxonomy entries must have a non-empty code".into(),
                ));
            }
            if !seen.insert(entry.code.as_str()) {
                return Err(PayrollError::ConfigValidation(format!(
                    "duplicate taxonomy code '{}'",
                    entry.code
                )));
            }
        }

        for rollup in &self.report.rollups {
            if rollup.members.is_empty() {
                return Err(PayrollError::ConfigValidation(format!(
                    "rollup '{}' has no members",
                    rollup.label
                )));
            }
            if rollup.members.contains(&0) {
                return Err(PayrollError::ConfigValidation(format!(
                    "rollup '{}': member positions are 1-based, 0 is invalid",
                    rollup.label
                )));
            }
            if !rollup.members.contains(&rollup.after) {
                return Err(PayrollError::ConfigValidation(format!(
                    "rollup '{}': checkpoint position {} is not among its members",
                    rollup.label, rollup.after
                )));
            }
        }

        if self.net_pay.min_mean >= self.net_pay.max_mean {
            return Err(PayrollError::ConfigValidation(format!(
                "net_pay mean range is empty: {} >= {}",
                self.net_pay.min_mean, self.net_pay.max_mean
            )));
        }

        if self.disburse.account_width == 0 {
            return Err(PayrollError::ConfigValidation(
                "disburse.account_width must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PayrollConfig::default();
        config.validate().unwrap();
        assert_eq!(config.report.taxonomy.len(), 16);
        assert_eq!(config.report.rollups.len(), 4);
        assert_eq!(config.net_pay.candidates[0], 33);
        assert_eq!(config.disburse.routing_prefix, "00");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = PayrollConfig::from_toml("").unwrap();
        assert_eq!(config.name, "payroll");
        assert_eq!(config.report.grand_total_label, "GRAND TOTAL DAILY");
        assert_eq!(config.reference.cost_center_column, 5);
    }

    #[test]
    fn parse_partial_override() {
        let input = r#"
name = "August second cutoff"

[net_pay]
candidates = [12, 13]
min_mean = 500.0

[disburse]
routing_prefix = "21"
"#;
        let config = PayrollConfig::from_toml(input).unwrap();
        assert_eq!(config.name, "August second cutoff");
        assert_eq!(config.net_pay.candidates, vec![12, 13]);
        assert_eq!(config.net_pay.min_mean, 500.0);
        // untouched sections keep their defaults
        assert_eq!(config.net_pay.max_mean, 200_000.0);
        assert_eq!(config.disburse.routing_prefix, "21");
        assert_eq!(config.report.taxonomy.len(), 16);
    }

    #[test]
    fn parse_custom_taxonomy_and_rollups() {
        let input = r#"
[report]
grand_total_label = "GRAND TOTAL"

[[report.taxonomy]]
code = "A"
label = "TOTAL A"

[[report.taxonomy]]
code = "B"
label = "TOTAL B"

[[report.rollups]]
label = "AB TOTAL"
members = [1, 2]
after = 2
"#;
        let config = PayrollConfig::from_toml(input).unwrap();
        assert_eq!(config.report.taxonomy.len(), 2);
        assert_eq!(config.report.rollups.len(), 1);
        assert_eq!(config.report.rollups[0].after, 2);
    }

    #[test]
    fn reject_duplicate_taxonomy_code() {
        let input = r#"
[[report.taxonomy]]
code = "A"
label = "TOTAL A"

[[report.taxonomy]]
code = "A"
label = "TOTAL A AGAIN"
"#;
        let err = PayrollConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("duplicate taxonomy code 'A'"));
    }

    #[test]
    fn reject_checkpoint_outside_members() {
        let input = r#"
[[report.rollups]]
label = "BAD"
members = [1, 2]
after = 5
"#;
        let err = PayrollConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("not among its members"));
    }

    #[test]
    fn reject_zero_based_member() {
        let input = r#"
[[report.rollups]]
label = "BAD"
members = [0, 1]
after = 1
"#;
        let err = PayrollConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("1-based"));
    }

    #[test]
    fn reject_empty_mean_range() {
        let input = r#"
[net_pay]
min_mean = 5000.0
max_mean = 5000.0
"#;
        let err = PayrollConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("mean range is empty"));
    }
}
