use std::fmt;

#[derive(Debug)]
pub enum PayrollError {
    /// Reference table has too few columns to index.
    MalformedReferenceTable { columns: usize },
    /// Payroll table is missing structurally required columns.
    InsufficientColumns { columns: usize, required: usize },
    /// No column passed the net-pay locator's strategy chain.
    ColumnNotFound { columns: usize },
    /// Classification produced neither bank nor cash records.
    NoValidRecords { accounts: usize, names: usize },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad taxonomy, bad rollup reference, etc.).
    ConfigValidation(String),
    /// IO error (CSV read, etc.).
    Io(String),
}

impl fmt::Display for PayrollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedReferenceTable { columns } => {
                write!(f, "malformed reference table: {columns} column(s), need at least 2")
            }
            Self::InsufficientColumns { columns, required } => {
                write!(f, "payroll table has {columns} column(s), need at least {required}")
            }
            Self::ColumnNotFound { columns } => {
                write!(f, "no net-pay column found among {columns} column(s)")
            }
            Self::NoValidRecords { accounts, names } => {
                write!(
                    f,
                    "no valid employee records: reference index has {accounts} account(s) and {names} name(s); \
                     check that payroll employee ids match the reference table"
                )
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for PayrollError {}
