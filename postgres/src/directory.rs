//! Read-only event and form lookups.

use crate::PostgresStore;
use crate::rows::{self, column, db_error};
use eventform_core::providers::{EventDirectory, FormDirectory};
use eventform_core::{Event, EventId, FieldId, Form, FormField, FormId, FormStep, Result, StepId};
use std::collections::HashMap;
use uuid::Uuid;

impl EventDirectory for PostgresStore {
    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        sqlx::query("SELECT id, slug, title, status FROM events WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find event by slug", &e))?
            .as_ref()
            .map(rows::event)
            .transpose()
    }

    async fn find_event_by_id(&self, event_id: EventId) -> Result<Option<Event>> {
        sqlx::query("SELECT id, slug, title, status FROM events WHERE id = $1")
            .bind(event_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find event by id", &e))?
            .as_ref()
            .map(rows::event)
            .transpose()
    }
}

impl FormDirectory for PostgresStore {
    async fn find_form_by_event_id(&self, event_id: EventId) -> Result<Option<Form>> {
        let Some(form_row) = sqlx::query(
            r"
            SELECT id, event_id, is_multi_step, settings, published_at
            FROM forms
            WHERE event_id = $1
            ",
        )
        .bind(event_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find form", &e))?
        else {
            return Ok(None);
        };

        let form_id = FormId(column(&form_row, "id")?);

        let step_rows = sqlx::query(
            r"
            SELECT id, step_number, title, description
            FROM form_steps
            WHERE form_id = $1
            ORDER BY step_number ASC
            ",
        )
        .bind(form_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load form steps", &e))?;

        let field_rows = sqlx::query(
            r"
            SELECT id, step_id, key, field_type, label, required, field_order,
                   placeholder, options, validation
            FROM form_fields
            WHERE form_id = $1
            ORDER BY field_order ASC, key ASC
            ",
        )
        .bind(form_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load form fields", &e))?;

        let mut by_step: HashMap<Uuid, Vec<FormField>> = HashMap::new();
        let mut loose = Vec::new();
        for row in &field_rows {
            let step_id: Option<Uuid> = column(row, "step_id")?;
            let field = FormField {
                id: FieldId(column(row, "id")?),
                key: column(row, "key")?,
                field_type: column(row, "field_type")?,
                label: column(row, "label")?,
                required: column(row, "required")?,
                order: column(row, "field_order")?,
                placeholder: column(row, "placeholder")?,
                options: column(row, "options")?,
                validation: column(row, "validation")?,
                step_id: step_id.map(StepId),
            };
            match step_id {
                Some(step_id) => by_step.entry(step_id).or_default().push(field),
                None => loose.push(field),
            }
        }

        let steps = step_rows
            .iter()
            .map(|row| {
                let id: Uuid = column(row, "id")?;
                Ok(FormStep {
                    id: StepId(id),
                    step_number: column(row, "step_number")?,
                    title: column(row, "title")?,
                    description: column(row, "description")?,
                    fields: by_step.remove(&id).unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Form {
            id: form_id,
            event_id: EventId(column(&form_row, "event_id")?),
            is_multi_step: column(&form_row, "is_multi_step")?,
            settings: column(&form_row, "settings")?,
            published_at: column(&form_row, "published_at")?,
            steps,
            fields: loose,
        }))
    }
}
