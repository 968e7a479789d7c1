use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_date, map_unique_violation, parse_date, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Report;

const REPORT_COLUMNS: &str = "id, patient_id, report_date, description, file_name, file_reference,
     file_hash, file_format, file_size, upload_timestamp, deleted_at";

pub fn insert_report(conn: &Connection, report: &Report) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO reports (id, patient_id, report_date, description, file_name,
         file_reference, file_hash, file_format, file_size, upload_timestamp, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            report.id.to_string(),
            report.patient_id.to_string(),
            format_date(&report.report_date),
            report.description,
            report.file_name,
            report.file_reference,
            report.file_hash,
            report.file_format,
            report.file_size as i64,
            report.upload_timestamp.to_rfc3339(),
            report.deleted_at.map(|d| d.to_rfc3339()),
        ],
    )
    .map_err(|e| map_unique_violation(e, "report", &report.id.to_string()))?;
    Ok(())
}

/// Non-deleted report by id.
pub fn get_report(conn: &Connection, id: &Uuid) -> Result<Option<Report>, DatabaseError> {
    let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1 AND deleted_at IS NULL");
    let row = conn
        .query_row(&sql, params![id.to_string()], report_row_from_rusqlite)
        .optional()?;

    row.map(report_from_row).transpose()
}

/// Non-deleted reports of a patient, newest report date first.
pub fn get_reports_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Report>, DatabaseError> {
    let sql = format!(
        "SELECT {REPORT_COLUMNS} FROM reports
         WHERE patient_id = ?1 AND deleted_at IS NULL
         ORDER BY report_date DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id.to_string()], report_row_from_rusqlite)?;

    let mut reports = Vec::new();
    for row in rows {
        reports.push(report_from_row(row?)?);
    }
    Ok(reports)
}

pub fn soft_delete_report(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE reports SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![Utc::now().to_rfc3339(), id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "report".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct ReportRow {
    id: String,
    patient_id: String,
    report_date: String,
    description: Option<String>,
    file_name: String,
    file_reference: String,
    file_hash: String,
    file_format: String,
    file_size: i64,
    upload_timestamp: String,
    deleted_at: Option<String>,
}

fn report_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ReportRow, rusqlite::Error> {
    Ok(ReportRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        report_date: row.get(2)?,
        description: row.get(3)?,
        file_name: row.get(4)?,
        file_reference: row.get(5)?,
        file_hash: row.get(6)?,
        file_format: row.get(7)?,
        file_size: row.get(8)?,
        upload_timestamp: row.get(9)?,
        deleted_at: row.get(10)?,
    })
}

fn report_from_row(row: ReportRow) -> Result<Report, DatabaseError> {
    Ok(Report {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        report_date: parse_date(&row.report_date)?,
        description: row.description,
        file_name: row.file_name,
        file_reference: row.file_reference,
        file_hash: row.file_hash,
        file_format: row.file_format,
        file_size: u64::try_from(row.file_size)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        upload_timestamp: parse_timestamp(&row.upload_timestamp)?,
        deleted_at: row.deleted_at.as_deref().map(parse_timestamp).transpose()?,
    })
}
