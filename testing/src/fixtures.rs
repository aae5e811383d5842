//! Ready-made directory data.

use chrono::{Duration, Utc};
use eventform_core::{
    Event, EventId, EventStatus, FieldId, Form, FormField, FormId, FormStep, StepId,
};
use serde_json::json;

/// An active event with a published single-page form.
///
/// The form has a required `name` text field and an optional `email` field.
#[must_use]
pub fn published_form(slug: &str) -> (Event, Form) {
    let event = Event {
        id: EventId::new(),
        slug: slug.to_string(),
        title: format!("Event {slug}"),
        status: EventStatus::Active,
    };

    let form = Form {
        id: FormId::new(),
        event_id: event.id,
        is_multi_step: false,
        settings: Some(json!({ "submitLabel": "Register" })),
        published_at: Some(Utc::now() - Duration::days(1)),
        steps: Vec::new(),
        fields: vec![
            field("email", "EMAIL", "Email", false, 2, None),
            field("name", "TEXT", "Full name", true, 1, None),
        ],
    };

    (event, form)
}

/// An active event with a published two-step form.
///
/// Steps are deliberately stored out of order.
#[must_use]
pub fn multi_step_form(slug: &str) -> (Event, Form) {
    let (event, mut form) = published_form(slug);
    let first = StepId::new();
    let second = StepId::new();

    form.is_multi_step = true;
    form.fields = Vec::new();
    form.steps = vec![
        FormStep {
            id: second,
            step_number: 2,
            title: Some("Preferences".into()),
            description: None,
            fields: vec![field("diet", "SELECT", "Dietary needs", false, 1, Some(second))],
        },
        FormStep {
            id: first,
            step_number: 1,
            title: Some("About you".into()),
            description: Some("Tell us who you are".into()),
            fields: vec![
                field("email", "EMAIL", "Email", true, 2, Some(first)),
                field("name", "TEXT", "Full name", true, 1, Some(first)),
            ],
        },
    ];

    (event, form)
}

fn field(
    key: &str,
    field_type: &str,
    label: &str,
    required: bool,
    order: i32,
    step_id: Option<StepId>,
) -> FormField {
    FormField {
        id: FieldId::new(),
        key: key.to_string(),
        field_type: field_type.to_string(),
        label: label.to_string(),
        required,
        order,
        placeholder: Some(label.to_lowercase()),
        options: None,
        validation: None,
        step_id,
    }
}
