use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{map_unique_violation, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::ClinicalNote;

pub fn insert_clinical_note(conn: &Connection, note: &ClinicalNote) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO clinical_notes (id, report_id, content, author_identifier, created_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            note.id.to_string(),
            note.report_id.to_string(),
            note.content,
            note.author_identifier,
            note.created_at.to_rfc3339(),
            note.deleted_at.map(|d| d.to_rfc3339()),
        ],
    )
    .map_err(|e| map_unique_violation(e, "clinical_note", &note.id.to_string()))?;
    Ok(())
}

/// Every note of a report, soft-deleted ones included.
pub fn get_notes_by_report(
    conn: &Connection,
    report_id: &Uuid,
) -> Result<Vec<ClinicalNote>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, report_id, content, author_identifier, created_at, deleted_at
         FROM clinical_notes WHERE report_id = ?1",
    )?;

    let rows = stmt.query_map(params![report_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut notes = Vec::new();
    for row in rows {
        let (id, report_id, content, author_identifier, created_at, deleted_at) = row?;
        notes.push(ClinicalNote {
            id: parse_uuid(&id)?,
            report_id: parse_uuid(&report_id)?,
            content,
            author_identifier,
            created_at: parse_timestamp(&created_at)?,
            deleted_at: deleted_at.as_deref().map(parse_timestamp).transpose()?,
        });
    }
    Ok(notes)
}

pub fn soft_delete_clinical_note(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE clinical_notes SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![Utc::now().to_rfc3339(), id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "clinical_note".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
