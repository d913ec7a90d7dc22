//! `paytally` — payroll grouped-subtotal reports and bank/cash disbursement.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use paytally_engine::model::{DisbursementRecord, ReportTable};
use paytally_engine::{
    build_reference_index, classify_disbursements, load_csv_table, process_payroll,
    DisbursementSplit, PayrollConfig, PayrollError, ReferenceIndex, Table,
};

mod exit_codes;

use exit_codes::{EXIT_DATA, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "paytally", version, about = "Payroll reporting and disbursement classification")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the grouped report: enrich, sort, subtotal, rollup
    #[command(after_help = "\
Examples:
  paytally report payroll.csv dbase.csv
  paytally report payroll.csv dbase.csv --config cutoff.toml --output report.csv
  paytally report payroll.csv dbase.csv --json")]
    Report {
        /// Raw payroll CSV export
        payroll: PathBuf,

        /// Employee reference table CSV
        dbase: PathBuf,

        /// Engine config TOML; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the report CSV to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Emit the full result as JSON instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Split payroll rows into bank and cash disbursement lists
    #[command(after_help = "\
Examples:
  paytally disburse payroll.csv dbase.csv
  paytally disburse payroll.csv dbase.csv --json
  paytally disburse payroll.csv dbase.csv --output payees.csv
  paytally disburse payroll.csv dbase.csv --bank bank.csv --cash cash.csv")]
    Disburse {
        /// Payroll CSV to classify
        payroll: PathBuf,

        /// Employee reference table CSV
        dbase: PathBuf,

        /// Engine config TOML; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the combined payee CSV to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write the bank collection to its own CSV
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Also write the cash collection to its own CSV
        #[arg(long)]
        cash: Option<PathBuf>,

        /// Emit the full result as JSON instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Validate an engine config without running
    #[command(after_help = "\
Examples:
  paytally validate cutoff.toml")]
    Validate {
        /// Config TOML to check
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            payroll,
            dbase,
            config,
            output,
            json,
        } => cmd_report(payroll, dbase, config, output, json),
        Commands::Disburse {
            payroll,
            dbase,
            config,
            output,
            bank,
            cash,
            json,
        } => cmd_disburse(payroll, dbase, config, output, bank, cash, json),
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn usage(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    fn data(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_DATA,
            message: msg.into(),
            hint: None,
        }
    }
}

/// Config and usage problems exit 2, everything the engine rejects at run
/// time exits 3.
fn engine_err(err: PayrollError) -> CliError {
    match err {
        PayrollError::ConfigParse(_) | PayrollError::ConfigValidation(_) => {
            CliError::usage(err.to_string())
        }
        _ => CliError::data(err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Shared loading
// ---------------------------------------------------------------------------

fn read_config(path: Option<&Path>) -> Result<PayrollConfig, CliError> {
    let Some(path) = path else {
        return Ok(PayrollConfig::default());
    };
    let toml_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    PayrollConfig::from_toml(&toml_str).map_err(engine_err)
}

fn load_table(path: &Path) -> Result<Table, CliError> {
    let csv_data = std::fs::read_to_string(path)
        .map_err(|e| CliError::data(format!("cannot read {}: {e}", path.display())))?;
    load_csv_table(&csv_data).map_err(engine_err)
}

fn load_inputs(
    payroll: &Path,
    dbase: &Path,
    config: Option<&Path>,
) -> Result<(Table, ReferenceIndex, PayrollConfig), CliError> {
    let config = read_config(config)?;
    let payroll = load_table(payroll)?;
    let reference = load_table(dbase)?;
    let index = build_reference_index(&reference, &config).map_err(engine_err)?;
    Ok((payroll, index, config))
}

fn write_or_print(text: &str, output: Option<&Path>) -> Result<(), CliError> {
    if let Some(path) = output {
        std::fs::write(path, text)
            .map_err(|e| CliError::data(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    } else {
        println!("{text}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// report
// ---------------------------------------------------------------------------

fn cmd_report(
    payroll_path: PathBuf,
    dbase_path: PathBuf,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let (payroll, index, config) = load_inputs(&payroll_path, &dbase_path, config_path.as_deref())?;
    let report = process_payroll(&payroll, &index, &config).map_err(engine_err)?;

    let rendered = if json {
        serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::data(format!("JSON serialization error: {e}")))?
    } else {
        report_csv(&report)?
    };
    write_or_print(&rendered, output.as_deref())?;

    let s = &report.summary;
    eprintln!(
        "report '{}': {} employees in {} group(s), {} rollup(s)",
        report.meta.config_name, s.employee_rows, s.groups, s.rollups_emitted,
    );
    if let (Some(col), Some(total)) = (s.presumed_net_pay_column, s.presumed_net_pay_total) {
        eprintln!("presumed net pay: column {col}, total {total:.2}");
    }
    Ok(())
}

fn report_csv(report: &ReportTable) -> Result<String, CliError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record(&report.headers)
        .map_err(|e| CliError::data(format!("CSV write error: {e}")))?;
    for row in &report.rows {
        let record: Vec<String> = row.cells.iter().map(|c| c.display()).collect();
        writer
            .write_record(&record)
            .map_err(|e| CliError::data(format!("CSV write error: {e}")))?;
    }
    finish_csv(writer)
}

// ---------------------------------------------------------------------------
// disburse
// ---------------------------------------------------------------------------

fn cmd_disburse(
    payroll_path: PathBuf,
    dbase_path: PathBuf,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    bank_path: Option<PathBuf>,
    cash_path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let (payroll, index, config) = load_inputs(&payroll_path, &dbase_path, config_path.as_deref())?;
    let split = classify_disbursements(&payroll, &index, &config).map_err(engine_err)?;

    let rendered = if json {
        serde_json::to_string_pretty(&split)
            .map_err(|e| CliError::data(format!("JSON serialization error: {e}")))?
    } else {
        disburse_csv(&split)?
    };
    write_or_print(&rendered, output.as_deref())?;

    if let Some(path) = bank_path.as_deref() {
        std::fs::write(path, collection_csv(&split.bank)?)
            .map_err(|e| CliError::data(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }
    if let Some(path) = cash_path.as_deref() {
        std::fs::write(path, collection_csv(&split.cash)?)
            .map_err(|e| CliError::data(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    let t = &split.totals;
    eprintln!(
        "disburse: {} bank ({:.2}), {} cash ({:.2}), {} row(s) skipped, net pay column {}",
        t.bank_count,
        t.bank_total,
        t.cash_count,
        t.cash_total,
        split.skipped.total(),
        split.net_pay_column,
    );
    Ok(())
}

fn disburse_csv(split: &DisbursementSplit) -> Result<String, CliError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record(["channel", "employee_id", "name", "account", "net_pay"])
        .map_err(|e| CliError::data(format!("CSV write error: {e}")))?;
    let mut write = |channel: &str, record: &DisbursementRecord| {
        writer
            .write_record([
                channel,
                record.employee_id.as_str(),
                record.name.as_str(),
                record.account.as_deref().unwrap_or(""),
                format!("{:.2}", record.net_pay).as_str(),
            ])
            .map_err(|e| CliError::data(format!("CSV write error: {e}")))
    };
    for record in &split.bank {
        write("bank", record)?;
    }
    for record in &split.cash {
        write("cash", record)?;
    }
    finish_csv(writer)
}

/// One collection on its own, without the channel column.
fn collection_csv(records: &[DisbursementRecord]) -> Result<String, CliError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record(["employee_id", "name", "account", "net_pay"])
        .map_err(|e| CliError::data(format!("CSV write error: {e}")))?;
    for record in records {
        writer
            .write_record([
                record.employee_id.as_str(),
                record.name.as_str(),
                record.account.as_deref().unwrap_or(""),
                format!("{:.2}", record.net_pay).as_str(),
            ])
            .map_err(|e| CliError::data(format!("CSV write error: {e}")))?;
    }
    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, CliError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::data(format!("CSV write error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CliError::data(format!("CSV write error: {e}")))
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let toml_str = std::fs::read_to_string(&config_path).map_err(|e| {
        CliError::usage(format!("cannot read config {}: {e}", config_path.display()))
    })?;
    let config = PayrollConfig::from_toml(&toml_str).map_err(engine_err)?;
    eprintln!(
        "valid: '{}' with {} taxonomy group(s), {} rollup(s), {} net-pay candidate(s)",
        config.name,
        config.report.taxonomy.len(),
        config.report.rollups.len(),
        config.net_pay.candidates.len(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paytally_engine::model::{
        DisbursementTotals, ReportMeta, ReportRow, ReportSummary, RowKind, SkipCounts,
    };
    use paytally_engine::Cell;

    #[test]
    fn report_csv_renders_cells_as_display() {
        let report = ReportTable {
            meta: ReportMeta {
                config_name: "payroll".into(),
                engine_version: "0.0.0".into(),
                run_at: String::new(),
            },
            summary: ReportSummary {
                groups: 1,
                employee_rows: 1,
                rollups_emitted: 0,
                group_stats: vec![],
                presumed_net_pay_column: None,
                presumed_net_pay_total: None,
            },
            headers: vec!["a".into(), "b".into()],
            rows: vec![ReportRow {
                kind: RowKind::Employee,
                cells: vec![Cell::Number(1001.0), Cell::Text("Cruz".into())],
            }],
        };
        let csv = report_csv(&report).unwrap();
        assert_eq!(csv, "a,b\n1001,Cruz\n");
    }

    #[test]
    fn disburse_csv_tags_channels() {
        let split = DisbursementSplit {
            bank: vec![DisbursementRecord {
                employee_id: "1001".into(),
                name: "Cruz, Maria S.".into(),
                net_pay: 6600.0,
                account: Some("0091234567890".into()),
            }],
            cash: vec![DisbursementRecord {
                employee_id: "1002".into(),
                name: "Reyes, Jose".into(),
                net_pay: 6250.0,
                account: None,
            }],
            totals: DisbursementTotals {
                bank_total: 6600.0,
                cash_total: 6250.0,
                total: 12_850.0,
                bank_count: 1,
                cash_count: 1,
            },
            skipped: SkipCounts::default(),
            net_pay_column: 9,
        };
        let csv = disburse_csv(&split).unwrap();
        assert_eq!(
            csv,
            "channel,employee_id,name,account,net_pay\n\
             bank,1001,\"Cruz, Maria S.\",0091234567890,6600.00\n\
             cash,1002,\"Reyes, Jose\",,6250.00\n"
        );
    }

    #[test]
    fn collection_csv_omits_channel_column() {
        let records = vec![DisbursementRecord {
            employee_id: "1002".into(),
            name: "Reyes, Jose".into(),
            net_pay: 6250.0,
            account: None,
        }];
        let csv = collection_csv(&records).unwrap();
        assert_eq!(
            csv,
            "employee_id,name,account,net_pay\n1002,\"Reyes, Jose\",,6250.00\n"
        );
    }

    #[test]
    fn config_errors_exit_usage_data_errors_exit_data() {
        let parse = engine_err(PayrollError::ConfigParse("bad".into()));
        assert_eq!(parse.code, EXIT_USAGE);
        let data = engine_err(PayrollError::ColumnNotFound { columns: 8 });
        assert_eq!(data.code, EXIT_DATA);
    }
}
