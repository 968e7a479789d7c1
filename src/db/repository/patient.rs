use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_date, map_unique_violation, parse_date, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{ContactInfo, Patient};

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let contact = patient.contact.clone().unwrap_or_default();
    conn.execute(
        "INSERT INTO patients (id, medical_record_number, name, date_of_birth,
         contact_email, contact_phone, created_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            patient.id.to_string(),
            patient.medical_record_number,
            patient.name,
            format_date(&patient.date_of_birth),
            contact.email,
            contact.phone,
            patient.created_at.to_rfc3339(),
            patient.deleted_at.map(|d| d.to_rfc3339()),
        ],
    )
    .map_err(|e| map_unique_violation(e, "patient", &patient.medical_record_number))?;
    Ok(())
}

/// Non-deleted patient by id.
pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, medical_record_number, name, date_of_birth, contact_email,
             contact_phone, created_at, deleted_at
             FROM patients WHERE id = ?1 AND deleted_at IS NULL",
            params![id.to_string()],
            patient_row_from_rusqlite,
        )
        .optional()?;

    row.map(patient_from_row).transpose()
}

struct PatientRow {
    id: String,
    medical_record_number: String,
    name: String,
    date_of_birth: String,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    created_at: String,
    deleted_at: Option<String>,
}

fn patient_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        medical_record_number: row.get(1)?,
        name: row.get(2)?,
        date_of_birth: row.get(3)?,
        contact_email: row.get(4)?,
        contact_phone: row.get(5)?,
        created_at: row.get(6)?,
        deleted_at: row.get(7)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    let contact = match (row.contact_email, row.contact_phone) {
        (None, None) => None,
        (email, phone) => Some(ContactInfo { email, phone }),
    };
    Ok(Patient {
        id: parse_uuid(&row.id)?,
        medical_record_number: row.medical_record_number,
        name: row.name,
        date_of_birth: parse_date(&row.date_of_birth)?,
        contact,
        created_at: parse_timestamp(&row.created_at)?,
        deleted_at: row.deleted_at.as_deref().map(parse_timestamp).transpose()?,
    })
}
