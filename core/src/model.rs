//! Domain entities of the intake pipeline.
//!
//! Opaque organizer-defined payloads (`settings`, `options`, `validation`,
//! JSON answers, draft bodies) are carried as [`serde_json::Value`] and
//! replayed verbatim. Nothing in the pipeline interprets them.

use crate::error::{IntakeError, Result};
use crate::ids::{
    ContactId, EventId, FieldId, FormId, StepId, SubmissionId, VisitSessionId, VisitorId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════
// Directory: events and forms
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle of an event. Only `Active` events accept visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Being edited by the organizer.
    Draft,
    /// Open to visitors.
    Active,
    /// No longer accepting visitors.
    Closed,
}

impl EventStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
        }
    }
}

impl FromStr for EventStatus {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "ACTIVE" => Ok(Self::Active),
            "CLOSED" => Ok(Self::Closed),
            other => Err(IntakeError::Internal(format!("Unknown event status: {other}"))),
        }
    }
}

/// An organizer's event, as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Public URL slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Lifecycle status.
    pub status: EventStatus,
}

impl Event {
    /// Whether the event currently accepts visitors.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EventStatus::Active
    }
}

/// A single input on a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Field identifier.
    pub id: FieldId,
    /// Stable key used in answers.
    pub key: String,
    /// Organizer-chosen input type (`TEXT`, `EMAIL`, `SELECT`, ...).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Label shown to the visitor.
    pub label: String,
    /// Whether the organizer marked the field as required.
    pub required: bool,
    /// Position within its step or form.
    pub order: i32,
    /// Placeholder text. Not exposed publicly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Choice list for select-like fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Client-side validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Value>,
    /// Owning step for multi-step forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<StepId>,
}

/// One page of a multi-step form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStep {
    /// Step identifier.
    pub id: StepId,
    /// 1-based position.
    pub step_number: i32,
    /// Optional heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields on this step, ordered by `order`.
    pub fields: Vec<FormField>,
}

/// The form attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Form identifier.
    pub id: FormId,
    /// Owning event.
    pub event_id: EventId,
    /// Whether fields are grouped into steps.
    pub is_multi_step: bool,
    /// Opaque presentation settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    /// Publication timestamp. `None` while unpublished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Steps ordered by `step_number`.
    #[serde(default)]
    pub steps: Vec<FormStep>,
    /// Fields that belong to no step, ordered by `order`.
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl Form {
    /// Whether the form has been published.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Visitors and sessions
// ═══════════════════════════════════════════════════════════════════════

/// Progress of a visitor through an event's form.
///
/// Ordered by rank: `Visited < Started < Submitted`. A session's status
/// only ever moves up this ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Form was viewed.
    Visited,
    /// Visitor began filling the form.
    Started,
    /// Submission committed.
    Submitted,
}

impl SubmissionStatus {
    /// Numeric rank used for the monotonic comparison.
    #[must_use]
    pub const fn rank(self) -> i16 {
        match self {
            Self::Visited => 1,
            Self::Started => 2,
            Self::Submitted => 3,
        }
    }

    /// Inverse of [`rank`](Self::rank).
    #[must_use]
    pub const fn from_rank(rank: i16) -> Option<Self> {
        match rank {
            1 => Some(Self::Visited),
            2 => Some(Self::Started),
            3 => Some(Self::Submitted),
            _ => None,
        }
    }

    /// The status after a write of `target` lands on `self`.
    #[must_use]
    pub const fn advance(self, target: Self) -> Self {
        if target.rank() > self.rank() { target } else { self }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visited => "VISITED",
            Self::Started => "STARTED",
            Self::Submitted => "SUBMITTED",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "VISITED" => Ok(Self::Visited),
            "STARTED" => Ok(Self::Started),
            "SUBMITTED" => Ok(Self::Submitted),
            other => Err(IntakeError::bad_request(format!(
                "Invalid submission status: {other}"
            ))),
        }
    }
}

/// What the client tells us about itself on each contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorIdentity {
    /// Client-generated visitor UUID.
    pub uuid: Uuid,
    /// Best-effort client address.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Best-effort client user agent.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl VisitorIdentity {
    /// Identity with only the client UUID known.
    #[must_use]
    pub const fn anonymous(uuid: Uuid) -> Self {
        Self {
            uuid,
            ip_address: None,
            user_agent: None,
        }
    }
}

/// A durable visitor row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    /// Server-side identifier.
    pub id: VisitorId,
    /// Client-generated UUID, unique.
    pub uuid: Uuid,
    /// Last seen client address.
    pub ip_address: Option<String>,
    /// Last seen user agent.
    pub user_agent: Option<String>,
    /// First contact.
    pub first_seen_at: DateTime<Utc>,
    /// Most recent contact.
    pub last_seen_at: DateTime<Utc>,
}

/// A visitor's progress through one event, unique per `(visitor, event)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSession {
    /// Session identifier.
    pub id: VisitSessionId,
    /// Visitor.
    pub visitor_id: VisitorId,
    /// Event.
    pub event_id: EventId,
    /// Highest status reached so far.
    pub status: SubmissionStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last upgrade.
    pub updated_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════
// Contacts
// ═══════════════════════════════════════════════════════════════════════

/// Contact details supplied with a submission. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactInput {
    /// Whether no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }

    /// Whether an email or phone is available to deduplicate on.
    #[must_use]
    pub const fn has_lookup_key(&self) -> bool {
        self.email.is_some() || self.phone.is_some()
    }
}

/// A durable contact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Contact identifier.
    pub id: ContactId,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Contact {
    /// Overwrite the fields `input` supplies, keeping the rest.
    #[must_use]
    pub fn merged_with(mut self, input: &ContactInput) -> Self {
        if let Some(name) = &input.name {
            self.name = Some(name.clone());
        }
        if let Some(email) = &input.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &input.phone {
            self.phone = Some(phone.clone());
        }
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Answers
// ═══════════════════════════════════════════════════════════════════════

/// The six nullable value columns of an answer, as they travel on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerValueFields {
    /// Text value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_text: Option<String>,
    /// Numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_number: Option<f64>,
    /// Boolean value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    /// Date value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_date: Option<DateTime<Utc>>,
    /// Structured value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_json: Option<Value>,
    /// Uploaded file URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl AnswerValueFields {
    fn populated(&self) -> usize {
        [
            self.value_text.is_some(),
            self.value_number.is_some(),
            self.value_boolean.is_some(),
            self.value_date.is_some(),
            self.value_json.is_some(),
            self.file_url.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

/// Exactly one typed answer value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnswerValueFields", into = "AnswerValueFields")]
pub enum AnswerValue {
    /// Free text.
    Text(String),
    /// Number.
    Number(f64),
    /// Yes/no.
    Boolean(bool),
    /// Date or timestamp.
    Date(DateTime<Utc>),
    /// Arbitrary structured value, stored verbatim.
    Json(Value),
    /// Location of an uploaded file.
    FileUrl(String),
}

impl TryFrom<AnswerValueFields> for AnswerValue {
    type Error = IntakeError;

    fn try_from(fields: AnswerValueFields) -> Result<Self> {
        match fields.populated() {
            0 => {
                return Err(IntakeError::bad_request(
                    "At least one value must be provided for each answer",
                ));
            }
            1 => {}
            _ => {
                return Err(IntakeError::bad_request(
                    "Only one value may be provided for each answer",
                ));
            }
        }

        let value = if let Some(text) = fields.value_text {
            Self::Text(text)
        } else if let Some(number) = fields.value_number {
            Self::Number(number)
        } else if let Some(flag) = fields.value_boolean {
            Self::Boolean(flag)
        } else if let Some(date) = fields.value_date {
            Self::Date(date)
        } else if let Some(json) = fields.value_json {
            Self::Json(json)
        } else if let Some(url) = fields.file_url {
            Self::FileUrl(url)
        } else {
            return Err(IntakeError::Internal("answer value vanished".into()));
        };

        Ok(value)
    }
}

impl From<AnswerValue> for AnswerValueFields {
    fn from(value: AnswerValue) -> Self {
        let mut fields = Self::default();
        match value {
            AnswerValue::Text(text) => fields.value_text = Some(text),
            AnswerValue::Number(number) => fields.value_number = Some(number),
            AnswerValue::Boolean(flag) => fields.value_boolean = Some(flag),
            AnswerValue::Date(date) => fields.value_date = Some(date),
            AnswerValue::Json(json) => fields.value_json = Some(json),
            AnswerValue::FileUrl(url) => fields.file_url = Some(url),
        }
        fields
    }
}

/// An answer as submitted by the client, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    /// Answered field.
    pub field_id: FieldId,
    /// Key of the answered field.
    pub field_key: String,
    /// Raw value columns.
    #[serde(flatten)]
    pub values: AnswerValueFields,
}

/// A validated answer belonging to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAnswer {
    /// Answered field.
    pub field_id: FieldId,
    /// Key of the answered field.
    pub field_key: String,
    /// The single populated value.
    #[serde(flatten)]
    pub value: AnswerValue,
}

impl TryFrom<AnswerInput> for SubmissionAnswer {
    type Error = IntakeError;

    fn try_from(input: AnswerInput) -> Result<Self> {
        Ok(Self {
            field_id: input.field_id,
            field_key: input.field_key,
            value: AnswerValue::try_from(input.values)?,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Submissions
// ═══════════════════════════════════════════════════════════════════════

/// A committed form submission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    /// Submission identifier.
    pub id: SubmissionId,
    /// Form submitted.
    pub form_id: FormId,
    /// Event the form belongs to.
    pub event_id: EventId,
    /// Submitting visitor.
    pub visitor_id: VisitorId,
    /// Resolved contact, if any was supplied.
    pub contact_id: Option<ContactId>,
    /// Always `Submitted` for committed rows.
    pub status: SubmissionStatus,
    /// Commit time.
    pub submitted_at: DateTime<Utc>,
    /// Soft-delete flag.
    pub is_deleted: bool,
}

/// What a visitor gets back after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// New submission identifier.
    pub submission_id: SubmissionId,
    /// Always `SUBMITTED`.
    pub status: SubmissionStatus,
    /// Commit time.
    pub submitted_at: DateTime<Utc>,
}

impl From<&FormSubmission> for SubmissionReceipt {
    fn from(submission: &FormSubmission) -> Self {
        Self {
            submission_id: submission.id,
            status: submission.status,
            submitted_at: submission.submitted_at,
        }
    }
}

/// A submission with its contact and answers, for organizers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    /// Submission identifier.
    pub id: SubmissionId,
    /// Event.
    pub event_id: EventId,
    /// Form.
    pub form_id: FormId,
    /// Status.
    pub status: SubmissionStatus,
    /// Commit time.
    pub submitted_at: DateTime<Utc>,
    /// Contact, if one was resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// Answers ordered by field key.
    pub answers: Vec<SubmissionAnswer>,
}

/// Filter for listing an event's submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionQuery {
    /// Only this status; `None` means all.
    pub status: Option<SubmissionStatus>,
    /// Page size, 1 to 100.
    pub limit: u32,
    /// Rows to skip.
    pub offset: u32,
    /// Inclusive lower bound on `submitted_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `submitted_at`.
    pub to: Option<DateTime<Utc>>,
}

impl SubmissionQuery {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 20;
    /// Largest accepted page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Whether a submission passes the filter (ignores paging).
    #[must_use]
    pub fn matches(&self, submission: &FormSubmission) -> bool {
        !submission.is_deleted
            && self.status.is_none_or(|status| status == submission.status)
            && self.from.is_none_or(|from| submission.submitted_at >= from)
            && self.to.is_none_or(|to| submission.submitted_at <= to)
    }
}

impl Default for SubmissionQuery {
    fn default() -> Self {
        Self {
            status: None,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
            from: None,
            to: None,
        }
    }
}

/// One page of submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPage {
    /// Number of items on this page.
    pub total: usize,
    /// Submissions, newest first.
    pub items: Vec<SubmissionDetail>,
}

impl From<Vec<SubmissionDetail>> for SubmissionPage {
    fn from(items: Vec<SubmissionDetail>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Drafts and analytics
// ═══════════════════════════════════════════════════════════════════════

/// Work-in-progress answers, kept only in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Opaque answer payload.
    pub answers: Value,
    /// Opaque contact payload.
    #[serde(default)]
    pub contact: Option<Value>,
    /// Time of the save.
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counters for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAnalytics {
    /// Event.
    pub event_id: EventId,
    /// Unique visits within the dedup window.
    pub total_visits: i64,
    /// Unique starts within the dedup window.
    pub total_started: i64,
    /// Unique submissions within the dedup window.
    pub total_submitted: i64,
    /// `total_submitted / total_visits`, or 0 with no visits.
    pub conversion_rate: f64,
}

impl EventAnalytics {
    /// Build a snapshot from raw counters.
    #[must_use]
    pub fn from_counters(event_id: EventId, visits: i64, started: i64, submitted: i64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let conversion_rate = if visits > 0 {
            submitted as f64 / visits as f64
        } else {
            0.0
        };

        Self {
            event_id,
            total_visits: visits,
            total_started: started,
            total_submitted: submitted,
            conversion_rate,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn status() -> impl Strategy<Value = SubmissionStatus> {
        prop_oneof![
            Just(SubmissionStatus::Visited),
            Just(SubmissionStatus::Started),
            Just(SubmissionStatus::Submitted),
        ]
    }

    #[test]
    fn rank_round_trips() {
        for status in [
            SubmissionStatus::Visited,
            SubmissionStatus::Started,
            SubmissionStatus::Submitted,
        ] {
            assert_eq!(SubmissionStatus::from_rank(status.rank()), Some(status));
        }
        assert_eq!(SubmissionStatus::from_rank(0), None);
    }

    #[test]
    fn advance_never_downgrades() {
        assert_eq!(
            SubmissionStatus::Submitted.advance(SubmissionStatus::Visited),
            SubmissionStatus::Submitted
        );
        assert_eq!(
            SubmissionStatus::Visited.advance(SubmissionStatus::Started),
            SubmissionStatus::Started
        );
    }

    proptest! {
        #[test]
        fn folding_advances_yields_maximum(targets in prop::collection::vec(status(), 1..20)) {
            let folded = targets[1..]
                .iter()
                .fold(targets[0], |current, target| current.advance(*target));
            prop_assert_eq!(Some(folded), targets.iter().copied().max());
        }
    }

    #[test]
    fn answer_requires_exactly_one_value() {
        let none: AnswerInput = serde_json::from_value(json!({
            "fieldId": FieldId::new(),
            "fieldKey": "name",
        }))
        .unwrap();
        assert!(SubmissionAnswer::try_from(none).is_err());

        let two: AnswerInput = serde_json::from_value(json!({
            "fieldId": FieldId::new(),
            "fieldKey": "name",
            "valueText": "Ada",
            "valueNumber": 1.0,
        }))
        .unwrap();
        assert!(SubmissionAnswer::try_from(two).is_err());

        let one: AnswerInput = serde_json::from_value(json!({
            "fieldId": FieldId::new(),
            "fieldKey": "name",
            "valueText": "Ada",
        }))
        .unwrap();
        let answer = SubmissionAnswer::try_from(one).unwrap();
        assert_eq!(answer.value, AnswerValue::Text("Ada".into()));
    }

    #[test]
    fn answer_serializes_only_populated_column() {
        let answer = SubmissionAnswer {
            field_id: FieldId::new(),
            field_key: "tags".into(),
            value: AnswerValue::Json(json!(["a", {"b": 1}])),
        };

        let value = serde_json::to_value(&answer).unwrap();
        assert_eq!(value["valueJson"], json!(["a", {"b": 1}]));
        assert!(value.get("valueText").is_none());
        assert_eq!(value["fieldKey"], "tags");
    }

    #[test]
    fn contact_merge_keeps_unsupplied_fields() {
        let existing = Contact {
            id: ContactId::new(),
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            phone: None,
        };
        let merged = existing.clone().merged_with(&ContactInput {
            name: None,
            email: None,
            phone: Some("+44 20 7946 0000".into()),
        });

        assert_eq!(merged.name, existing.name);
        assert_eq!(merged.email, existing.email);
        assert_eq!(merged.phone.as_deref(), Some("+44 20 7946 0000"));
    }

    #[test]
    fn conversion_rate_handles_zero_visits() {
        let empty = EventAnalytics::from_counters(EventId::new(), 0, 0, 0);
        assert!(empty.conversion_rate.abs() < f64::EPSILON);

        let half = EventAnalytics::from_counters(EventId::new(), 4, 3, 2);
        assert!((half.conversion_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn query_excludes_deleted_and_out_of_range() {
        let now = Utc::now();
        let submission = FormSubmission {
            id: SubmissionId::new(),
            form_id: FormId::new(),
            event_id: EventId::new(),
            visitor_id: VisitorId::new(),
            contact_id: None,
            status: SubmissionStatus::Submitted,
            submitted_at: now,
            is_deleted: false,
        };

        assert!(SubmissionQuery::default().matches(&submission));
        assert!(!SubmissionQuery {
            from: Some(now + chrono::Duration::seconds(1)),
            ..SubmissionQuery::default()
        }
        .matches(&submission));
        assert!(!SubmissionQuery {
            status: Some(SubmissionStatus::Visited),
            ..SubmissionQuery::default()
        }
        .matches(&submission));
        assert!(!SubmissionQuery::default().matches(&FormSubmission {
            is_deleted: true,
            ..submission
        }));
    }
}
