use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use medinsight_lib::config::AppConfig;
use medinsight_lib::db::{repository, SqliteStore};
use medinsight_lib::models::{ClinicalNote, ContactInfo, Patient, Report};
use medinsight_lib::{AnalysisOrchestrator, TimelineAggregator};

#[derive(Parser, Debug)]
#[command(
    name = "medinsight",
    version,
    about = "Analyze medical reports and summarize patient history."
)]
struct Cli {
    /// SQLite database path (overrides MEDINSIGHT_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a patient.
    AddPatient {
        #[arg(long)]
        mrn: String,
        #[arg(long)]
        name: String,
        /// Date of birth, YYYY-MM-DD.
        #[arg(long)]
        dob: NaiveDate,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Register a report document for a patient.
    AddReport {
        #[arg(long)]
        patient: Uuid,
        /// Report date, YYYY-MM-DD.
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Attach a clinical note to a report.
    AddNote {
        #[arg(long)]
        report: Uuid,
        #[arg(long)]
        author: String,
        #[arg(long)]
        content: String,
    },
    /// Run the analysis engine over a report's document.
    Analyze {
        #[arg(long)]
        report: Uuid,
        #[arg(long)]
        file: PathBuf,
    },
    /// Print a patient's timeline and critical findings.
    Summary {
        #[arg(long)]
        patient: Uuid,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    medinsight_lib::init_tracing(&config.log_filter);

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
    }
    let store = Arc::new(
        SqliteStore::open(&config.database_path)
            .with_context(|| format!("Cannot open {}", config.database_path.display()))?,
    );

    match cli.command {
        Command::AddPatient {
            mrn,
            name,
            dob,
            email,
            phone,
        } => {
            let contact = (email.is_some() || phone.is_some()).then_some(ContactInfo { email, phone });
            let patient = Patient {
                id: Uuid::new_v4(),
                medical_record_number: mrn,
                name,
                date_of_birth: dob,
                contact,
                created_at: Utc::now(),
                deleted_at: None,
            };
            repository::insert_patient(&*store.conn()?, &patient)?;
            print_json(&patient)
        }
        Command::AddReport {
            patient,
            date,
            file,
            description,
        } => {
            let report = build_report(patient, date, &file, description)?;
            repository::insert_report(&*store.conn()?, &report)?;
            print_json(&report)
        }
        Command::AddNote {
            report,
            author,
            content,
        } => {
            let note = ClinicalNote {
                id: Uuid::new_v4(),
                report_id: report,
                content,
                author_identifier: author,
                created_at: Utc::now(),
                deleted_at: None,
            };
            repository::insert_clinical_note(&*store.conn()?, &note)?;
            print_json(&note)
        }
        Command::Analyze { report, file } => {
            let content =
                std::fs::read(&file).with_context(|| format!("Cannot read {}", file.display()))?;
            let orchestrator =
                AnalysisOrchestrator::new(config.engine.build(), store.clone(), store.clone());
            let record = orchestrator.analyze_report(&report, &content, &file_name(&file))?;
            print_json(&record)
        }
        Command::Summary { patient, from, to } => {
            if let (Some(from), Some(to)) = (from, to) {
                if from > to {
                    bail!("--from {from} is after --to {to}");
                }
            }
            let aggregator =
                TimelineAggregator::new(store.clone(), store.clone(), store.clone(), store);
            let summary = aggregator.generate_summary(&patient, from, to)?;
            print_json(&summary)
        }
    }
}

fn build_report(
    patient_id: Uuid,
    report_date: NaiveDate,
    file: &Path,
    description: Option<String>,
) -> anyhow::Result<Report> {
    let content = std::fs::read(file).with_context(|| format!("Cannot read {}", file.display()))?;
    let reference = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());

    Ok(Report {
        id: Uuid::new_v4(),
        patient_id,
        report_date,
        description,
        file_name: file_name(file),
        file_reference: reference.display().to_string(),
        file_hash: format!("{:x}", Sha256::digest(&content)),
        file_format: mime_guess::from_path(file)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
        file_size: content.len() as u64,
        upload_timestamp: Utc::now(),
        deleted_at: None,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
