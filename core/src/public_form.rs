//! Public projection of an event's form.
//!
//! This is what anonymous visitors receive. Internal columns (placeholder,
//! owning step, timestamps) are stripped and steps/fields are ordered.

use crate::error::{IntakeError, Result};
use crate::ids::{EventId, FieldId, FormId, StepId};
use crate::model::{Event, Form, FormField, FormStep};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Public view of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicField {
    /// Field identifier.
    pub id: FieldId,
    /// Answer key.
    pub key: String,
    /// Input type.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Label.
    pub label: String,
    /// Required flag.
    pub required: bool,
    /// Position.
    pub order: i32,
    /// Choices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Value>,
}

impl From<&FormField> for PublicField {
    fn from(field: &FormField) -> Self {
        Self {
            id: field.id,
            key: field.key.clone(),
            field_type: field.field_type.clone(),
            label: field.label.clone(),
            required: field.required,
            order: field.order,
            options: field.options.clone(),
            validation: field.validation.clone(),
        }
    }
}

/// Public view of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStep {
    /// Step identifier.
    pub id: StepId,
    /// 1-based position.
    pub step_number: i32,
    /// Heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered fields.
    pub fields: Vec<PublicField>,
}

impl From<&FormStep> for PublicStep {
    fn from(step: &FormStep) -> Self {
        Self {
            id: step.id,
            step_number: step.step_number,
            title: step.title.clone(),
            description: step.description.clone(),
            fields: ordered_fields(&step.fields),
        }
    }
}

/// Event header of the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicEvent {
    /// Event identifier.
    pub id: EventId,
    /// Title.
    pub title: String,
    /// Slug.
    pub slug: String,
}

/// Form body of the projection.
///
/// Multi-step forms carry `steps`; single-page forms carry `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicFormBody {
    /// Form identifier.
    pub id: FormId,
    /// Layout.
    pub is_multi_step: bool,
    /// Presentation settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    /// Publication time.
    pub published_at: DateTime<Utc>,
    /// Steps, for multi-step forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<PublicStep>>,
    /// Fields, for single-page forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<PublicField>>,
}

/// A published form as served to visitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicForm {
    /// Event header.
    pub event: PublicEvent,
    /// Form body.
    pub form: PublicFormBody,
}

impl PublicForm {
    /// Project an event and its form.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::NotFound`] if the form is not published.
    pub fn project(event: &Event, form: &Form) -> Result<Self> {
        let published_at = form
            .published_at
            .ok_or_else(|| IntakeError::not_found("Form not published"))?;

        let (steps, fields) = if form.is_multi_step {
            let mut steps: Vec<PublicStep> = form.steps.iter().map(PublicStep::from).collect();
            steps.sort_by_key(|step| step.step_number);
            (Some(steps), None)
        } else {
            (None, Some(ordered_fields(&form.fields)))
        };

        Ok(Self {
            event: PublicEvent {
                id: event.id,
                title: event.title.clone(),
                slug: event.slug.clone(),
            },
            form: PublicFormBody {
                id: form.id,
                is_multi_step: form.is_multi_step,
                settings: form.settings.clone(),
                published_at,
                steps,
                fields,
            },
        })
    }
}

fn ordered_fields(fields: &[FormField]) -> Vec<PublicField> {
    let mut projected: Vec<PublicField> = fields.iter().map(PublicField::from).collect();
    projected.sort_by_key(|field| field.order);
    projected
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::EventStatus;
    use serde_json::json;

    fn field(key: &str, order: i32, step_id: Option<StepId>) -> FormField {
        FormField {
            id: FieldId::new(),
            key: key.into(),
            field_type: "TEXT".into(),
            label: key.to_uppercase(),
            required: true,
            order,
            placeholder: Some("internal".into()),
            options: None,
            validation: Some(json!({"max": 80})),
            step_id,
        }
    }

    fn event() -> Event {
        Event {
            id: EventId::new(),
            slug: "spring-gala".into(),
            title: "Spring Gala".into(),
            status: EventStatus::Active,
        }
    }

    #[test]
    fn single_page_form_exposes_ordered_fields_only() {
        let form = Form {
            id: FormId::new(),
            event_id: EventId::new(),
            is_multi_step: false,
            settings: Some(json!({"theme": "dark"})),
            published_at: Some(Utc::now()),
            steps: vec![],
            fields: vec![field("email", 2, None), field("name", 1, None)],
        };

        let public = PublicForm::project(&event(), &form).unwrap();
        let value = serde_json::to_value(&public).unwrap();

        assert!(value["form"].get("steps").is_none());
        assert_eq!(value["form"]["fields"][0]["key"], "name");
        assert_eq!(value["form"]["fields"][1]["key"], "email");
        assert!(value["form"]["fields"][0].get("placeholder").is_none());
        assert!(value["form"]["fields"][0].get("stepId").is_none());
        assert_eq!(value["form"]["settings"], json!({"theme": "dark"}));
    }

    #[test]
    fn multi_step_form_orders_steps() {
        let first = StepId::new();
        let second = StepId::new();
        let form = Form {
            id: FormId::new(),
            event_id: EventId::new(),
            is_multi_step: true,
            settings: None,
            published_at: Some(Utc::now()),
            steps: vec![
                FormStep {
                    id: second,
                    step_number: 2,
                    title: None,
                    description: None,
                    fields: vec![field("phone", 1, Some(second))],
                },
                FormStep {
                    id: first,
                    step_number: 1,
                    title: Some("About you".into()),
                    description: None,
                    fields: vec![field("name", 1, Some(first))],
                },
            ],
            fields: vec![],
        };

        let public = PublicForm::project(&event(), &form).unwrap();
        let steps = public.form.steps.unwrap();

        assert!(public.form.fields.is_none());
        assert_eq!(steps[0].id, first);
        assert_eq!(steps[1].id, second);
    }

    #[test]
    fn unpublished_form_is_not_found() {
        let form = Form {
            id: FormId::new(),
            event_id: EventId::new(),
            is_multi_step: false,
            settings: None,
            published_at: None,
            steps: vec![],
            fields: vec![],
        };

        assert!(matches!(
            PublicForm::project(&event(), &form),
            Err(IntakeError::NotFound(_))
        ));
    }
}
