//! Row decoding and error mapping.

use eventform_core::{
    AnswerValue, AnswerValueFields, Contact, ContactId, Event, EventId, FieldId, IntakeError,
    Result, SubmissionAnswer, SubmissionStatus, VisitSession, VisitSessionId, Visitor, VisitorId,
};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use uuid::Uuid;

/// Map a driver error, counting it by operation.
pub(crate) fn db_error(operation: &'static str, e: &sqlx::Error) -> IntakeError {
    metrics::counter!("eventform_store_errors_total", "operation" => operation).increment(1);
    IntakeError::Database(format!("Failed to {operation}: {e}"))
}

pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| IntakeError::Database(format!("Failed to decode column {name}: {e}")))
}

pub(crate) fn status(rank: i16) -> Result<SubmissionStatus> {
    SubmissionStatus::from_rank(rank)
        .ok_or_else(|| IntakeError::Database(format!("Invalid status rank: {rank}")))
}

pub(crate) fn event(row: &PgRow) -> Result<Event> {
    let status: String = column(row, "status")?;
    Ok(Event {
        id: EventId(column(row, "id")?),
        slug: column(row, "slug")?,
        title: column(row, "title")?,
        status: status.parse()?,
    })
}

pub(crate) fn visitor(row: &PgRow) -> Result<Visitor> {
    Ok(Visitor {
        id: VisitorId(column(row, "id")?),
        uuid: column(row, "uuid")?,
        ip_address: column(row, "ip_address")?,
        user_agent: column(row, "user_agent")?,
        first_seen_at: column(row, "first_seen_at")?,
        last_seen_at: column(row, "last_seen_at")?,
    })
}

pub(crate) fn session(row: &PgRow) -> Result<VisitSession> {
    Ok(VisitSession {
        id: VisitSessionId(column(row, "id")?),
        visitor_id: VisitorId(column(row, "visitor_id")?),
        event_id: EventId(column(row, "event_id")?),
        status: status(column(row, "status")?)?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub(crate) fn contact(row: &PgRow) -> Result<Contact> {
    Ok(Contact {
        id: ContactId(column(row, "id")?),
        name: column(row, "name")?,
        email: column(row, "email")?,
        phone: column(row, "phone")?,
    })
}

/// Contact columns of a submission joined with `contacts`, prefixed `contact_`.
pub(crate) fn joined_contact(row: &PgRow) -> Result<Option<Contact>> {
    let id: Option<Uuid> = column(row, "contact_id")?;
    id.map(|id| {
        Ok(Contact {
            id: ContactId(id),
            name: column(row, "contact_name")?,
            email: column(row, "contact_email")?,
            phone: column(row, "contact_phone")?,
        })
    })
    .transpose()
}

pub(crate) fn answer(row: &PgRow) -> Result<SubmissionAnswer> {
    let fields = AnswerValueFields {
        value_text: column(row, "value_text")?,
        value_number: column(row, "value_number")?,
        value_boolean: column(row, "value_boolean")?,
        value_date: column(row, "value_date")?,
        value_json: column(row, "value_json")?,
        file_url: column(row, "file_url")?,
    };

    Ok(SubmissionAnswer {
        field_id: FieldId(column(row, "field_id")?),
        field_key: column(row, "field_key")?,
        value: AnswerValue::try_from(fields)
            .map_err(|e| IntakeError::Database(format!("Corrupt answer row: {e}")))?,
    })
}
