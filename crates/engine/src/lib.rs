//! `paytally-engine` — payroll report and disbursement classification engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns structured results.
//! No CLI or IO dependencies beyond the CSV ingestion helper.

pub mod config;
pub mod disburse;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod locate;
pub mod model;
pub mod reference;
pub mod report;

pub use config::PayrollConfig;
pub use engine::{build_reference_index, classify_disbursements, load_csv_table, process_payroll};
pub use error::PayrollError;
pub use model::{Cell, DisbursementSplit, ReferenceIndex, ReportTable, Row, Table};
