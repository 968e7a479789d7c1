use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{map_unique_violation, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::CompletionStatus;
use crate::models::{AnalysisOutcome, AnalysisRecord};

const ANALYSIS_COLUMNS: &str = "id, report_id, extracted_data, trend_indicators, confidence_score,
     summary_text, analysis_method, completion_status, error_details, analysis_timestamp";

/// Insert an analysis. A second analysis for the same report violates the
/// unique index and comes back as `AlreadyExists`.
pub fn insert_analysis(conn: &Connection, record: &AnalysisRecord) -> Result<(), DatabaseError> {
    let extracted_json = serde_json::to_string(&record.extracted_data)?;
    let trends_json = serde_json::to_string(&record.trend_indicators)?;

    conn.execute(
        "INSERT INTO analyses (id, report_id, extracted_data, trend_indicators, confidence_score,
         summary_text, analysis_method, completion_status, error_details, analysis_timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            record.id.to_string(),
            record.report_id.to_string(),
            extracted_json,
            trends_json,
            record.confidence_score,
            record.summary_text,
            record.method,
            record.completion_status().as_str(),
            record.error_details(),
            record.analysis_timestamp.to_rfc3339(),
        ],
    )
    .map_err(|e| map_unique_violation(e, "analysis", &record.report_id.to_string()))?;
    Ok(())
}

pub fn get_analysis(conn: &Connection, id: &Uuid) -> Result<Option<AnalysisRecord>, DatabaseError> {
    let sql = format!("SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id.to_string()], analysis_row_from_rusqlite)
        .optional()?;
    row.map(analysis_from_row).transpose()
}

pub fn get_analysis_by_report(
    conn: &Connection,
    report_id: &Uuid,
) -> Result<Option<AnalysisRecord>, DatabaseError> {
    let sql = format!("SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE report_id = ?1");
    let row = conn
        .query_row(&sql, params![report_id.to_string()], analysis_row_from_rusqlite)
        .optional()?;
    row.map(analysis_from_row).transpose()
}

struct AnalysisRow {
    id: String,
    report_id: String,
    extracted_data: String,
    trend_indicators: String,
    confidence_score: f64,
    summary_text: String,
    analysis_method: String,
    completion_status: String,
    error_details: Option<String>,
    analysis_timestamp: String,
}

fn analysis_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<AnalysisRow, rusqlite::Error> {
    Ok(AnalysisRow {
        id: row.get(0)?,
        report_id: row.get(1)?,
        extracted_data: row.get(2)?,
        trend_indicators: row.get(3)?,
        confidence_score: row.get(4)?,
        summary_text: row.get(5)?,
        analysis_method: row.get(6)?,
        completion_status: row.get(7)?,
        error_details: row.get(8)?,
        analysis_timestamp: row.get(9)?,
    })
}

fn analysis_from_row(row: AnalysisRow) -> Result<AnalysisRecord, DatabaseError> {
    let outcome = match CompletionStatus::from_str(&row.completion_status)? {
        CompletionStatus::Complete => AnalysisOutcome::Complete,
        CompletionStatus::Partial => AnalysisOutcome::Partial {
            error_details: row.error_details,
        },
        CompletionStatus::Failed => AnalysisOutcome::Failed {
            error_details: row.error_details.ok_or_else(|| {
                DatabaseError::ConstraintViolation(format!(
                    "failed analysis {} has no error details",
                    row.id
                ))
            })?,
        },
    };

    Ok(AnalysisRecord {
        id: parse_uuid(&row.id)?,
        report_id: parse_uuid(&row.report_id)?,
        extracted_data: serde_json::from_str(&row.extracted_data)?,
        trend_indicators: serde_json::from_str(&row.trend_indicators)?,
        confidence_score: row.confidence_score,
        summary_text: row.summary_text,
        method: row.analysis_method,
        outcome,
        analysis_timestamp: parse_timestamp(&row.analysis_timestamp)?,
    })
}
