//! Submission commit and organizer reads.

use crate::PostgresStore;
use crate::rows::{self, column, db_error};
use crate::visitors;
use eventform_core::providers::{SubmissionStore, SubmissionTransaction};
use eventform_core::{
    AnswerId, AnswerValueFields, Contact, ContactId, ContactInput, EventId, FormId,
    FormSubmission, Result, SubmissionAnswer, SubmissionDetail, SubmissionId, SubmissionQuery,
    SubmissionStatus, VisitSession, Visitor, VisitorId, VisitorIdentity,
};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

const DETAIL_COLUMNS: &str = r"
    s.id, s.form_id, s.event_id, s.status, s.submitted_at,
    c.id AS contact_id, c.name AS contact_name, c.email AS contact_email, c.phone AS contact_phone
";

/// One submit's worth of writes on a single `PostgreSQL` transaction.
///
/// Dropping it without [`commit`](SubmissionTransaction::commit) rolls back.
pub struct PgSubmissionTransaction {
    tx: Transaction<'static, Postgres>,
}

impl SubmissionTransaction for PgSubmissionTransaction {
    async fn upsert_visitor(&mut self, identity: &VisitorIdentity) -> Result<Visitor> {
        visitors::upsert_visitor(&mut self.tx, identity).await
    }

    async fn find_contact_by_email_or_phone(
        &mut self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Contact>> {
        sqlx::query(
            r"
            SELECT id, name, email, phone
            FROM contacts
            WHERE ($1::text IS NOT NULL AND email = $1)
               OR ($2::text IS NOT NULL AND phone = $2)
            ORDER BY created_at ASC
            LIMIT 1
            ",
        )
        .bind(email)
        .bind(phone)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("find contact", &e))?
        .as_ref()
        .map(rows::contact)
        .transpose()
    }

    async fn create_contact(&mut self, input: &ContactInput) -> Result<Contact> {
        let row = sqlx::query(
            r"
            INSERT INTO contacts (id, name, email, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, now(), now())
            RETURNING id, name, email, phone
            ",
        )
        .bind(ContactId::new().0)
        .bind(input.name.as_deref())
        .bind(input.email.as_deref())
        .bind(input.phone.as_deref())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("create contact", &e))?;

        rows::contact(&row)
    }

    async fn update_contact(&mut self, contact: &Contact) -> Result<()> {
        sqlx::query(
            r"
            UPDATE contacts
            SET name = $2, email = $3, phone = $4, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(contact.id.0)
        .bind(contact.name.as_deref())
        .bind(contact.email.as_deref())
        .bind(contact.phone.as_deref())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("update contact", &e))?;

        Ok(())
    }

    async fn insert_submission(&mut self, submission: &FormSubmission) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO form_submissions
                (id, form_id, event_id, visitor_id, contact_id, status, submitted_at, is_deleted)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(submission.id.0)
        .bind(submission.form_id.0)
        .bind(submission.event_id.0)
        .bind(submission.visitor_id.0)
        .bind(submission.contact_id.map(|id| id.0))
        .bind(submission.status.rank())
        .bind(submission.submitted_at)
        .bind(submission.is_deleted)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("insert submission", &e))?;

        Ok(())
    }

    async fn insert_answers(
        &mut self,
        submission_id: SubmissionId,
        answers: &[SubmissionAnswer],
    ) -> Result<()> {
        for answer in answers {
            let fields = AnswerValueFields::from(answer.value.clone());
            sqlx::query(
                r"
                INSERT INTO submission_answers
                    (id, submission_id, field_id, field_key,
                     value_text, value_number, value_boolean, value_date, value_json, file_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ",
            )
            .bind(AnswerId::new().0)
            .bind(submission_id.0)
            .bind(answer.field_id.0)
            .bind(&answer.field_key)
            .bind(fields.value_text)
            .bind(fields.value_number)
            .bind(fields.value_boolean)
            .bind(fields.value_date)
            .bind(fields.value_json)
            .bind(fields.file_url)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("insert answer", &e))?;
        }

        Ok(())
    }

    async fn advance_session(
        &mut self,
        visitor_id: VisitorId,
        event_id: EventId,
        target: SubmissionStatus,
    ) -> Result<VisitSession> {
        visitors::advance_session(&mut self.tx, visitor_id, event_id, target).await
    }

    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_error("commit submission", &e))
    }
}

impl SubmissionStore for PostgresStore {
    type Transaction = PgSubmissionTransaction;

    async fn begin(&self) -> Result<Self::Transaction> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", &e))?;
        Ok(PgSubmissionTransaction { tx })
    }

    async fn find_submission(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Option<SubmissionDetail>> {
        let Some(row) = sqlx::query(&format!(
            r"
            SELECT {DETAIL_COLUMNS}
            FROM form_submissions s
            LEFT JOIN contacts c ON c.id = s.contact_id
            WHERE s.id = $1 AND s.is_deleted = FALSE
            "
        ))
        .bind(submission_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find submission", &e))?
        else {
            return Ok(None);
        };

        let mut answers = self.load_answers(&[submission_id.0]).await?;
        let detail = detail(&row, &mut answers)?;
        Ok(Some(detail))
    }

    async fn list_submissions(
        &self,
        event_id: EventId,
        query: &SubmissionQuery,
    ) -> Result<Vec<SubmissionDetail>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {DETAIL_COLUMNS}
            FROM form_submissions s
            LEFT JOIN contacts c ON c.id = s.contact_id
            WHERE s.event_id = $1
              AND s.is_deleted = FALSE
              AND ($2::smallint IS NULL OR s.status = $2)
              AND ($3::timestamptz IS NULL OR s.submitted_at >= $3)
              AND ($4::timestamptz IS NULL OR s.submitted_at <= $4)
            ORDER BY s.submitted_at DESC, s.id ASC
            LIMIT $5 OFFSET $6
            "
        ))
        .bind(event_id.0)
        .bind(query.status.map(SubmissionStatus::rank))
        .bind(query.from)
        .bind(query.to)
        .bind(i64::from(query.limit))
        .bind(i64::from(query.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list submissions", &e))?;

        let ids = rows
            .iter()
            .map(|row| column(row, "id"))
            .collect::<Result<Vec<Uuid>>>()?;
        let mut answers = self.load_answers(&ids).await?;

        rows.iter().map(|row| detail(row, &mut answers)).collect()
    }

    async fn soft_delete_submission(&self, submission_id: SubmissionId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE form_submissions SET is_deleted = TRUE WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(submission_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("delete submission", &e))?;

        Ok(result.rows_affected() > 0)
    }
}

impl PostgresStore {
    /// Answers for a set of submissions, grouped by submission and ordered by field key.
    async fn load_answers(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<SubmissionAnswer>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r"
            SELECT submission_id, field_id, field_key,
                   value_text, value_number, value_boolean, value_date, value_json, file_url
            FROM submission_answers
            WHERE submission_id = ANY($1)
            ORDER BY field_key ASC
            ",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load answers", &e))?;

        let mut grouped: HashMap<Uuid, Vec<SubmissionAnswer>> = HashMap::new();
        for row in &rows {
            let submission_id: Uuid = column(row, "submission_id")?;
            grouped
                .entry(submission_id)
                .or_default()
                .push(rows::answer(row)?);
        }
        Ok(grouped)
    }
}

fn detail(
    row: &PgRow,
    answers: &mut HashMap<Uuid, Vec<SubmissionAnswer>>,
) -> Result<SubmissionDetail> {
    let id: Uuid = column(row, "id")?;
    Ok(SubmissionDetail {
        id: SubmissionId(id),
        event_id: EventId(column(row, "event_id")?),
        form_id: FormId(column(row, "form_id")?),
        status: rows::status(column(row, "status")?)?,
        submitted_at: column(row, "submitted_at")?,
        contact: rows::joined_contact(row)?,
        answers: answers.remove(&id).unwrap_or_default(),
    })
}
