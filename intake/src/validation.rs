//! Structural validation of visitor input.
//!
//! Runs before any component touches a store, so a rejected request has no
//! side effects.

use chrono::{DateTime, NaiveDate, Utc};
use eventform_core::{
    AnswerInput, ContactInput, IntakeError, Result, SubmissionAnswer, SubmissionQuery,
    VisitorIdentity,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submit request as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    /// Who is submitting.
    pub visitor: VisitorIdentity,
    /// Optional contact details.
    #[serde(default)]
    pub contact: Option<ContactInput>,
    /// Raw answers.
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

/// A submit request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    /// Who is submitting.
    pub visitor: VisitorIdentity,
    /// Contact details, `None` when nothing was supplied.
    pub contact: Option<ContactInput>,
    /// Answers, each with exactly one value.
    pub answers: Vec<SubmissionAnswer>,
}

impl SubmissionInput {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::BadRequest`] if:
    /// - `answers` is empty
    /// - an answer carries no value, or more than one
    /// - the contact email is malformed
    pub fn validate(self) -> Result<ValidSubmission> {
        if self.answers.is_empty() {
            return Err(IntakeError::bad_request("At least one answer is required"));
        }

        let answers = self
            .answers
            .into_iter()
            .map(SubmissionAnswer::try_from)
            .collect::<Result<Vec<_>>>()?;

        let contact = self.contact.filter(|contact| !contact.is_empty());
        if let Some(email) = contact.as_ref().and_then(|c| c.email.as_deref()) {
            if !is_valid_email(email) {
                return Err(IntakeError::bad_request("Invalid email"));
            }
        }

        Ok(ValidSubmission {
            visitor: self.visitor,
            contact,
            answers,
        })
    }
}

/// Parse a client-supplied visitor UUID.
///
/// # Errors
///
/// Returns [`IntakeError::BadRequest`] if the value is missing or not a UUID.
pub fn parse_visitor_uuid(raw: Option<&str>) -> Result<Uuid> {
    let raw = raw
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| IntakeError::bad_request("Visitor UUID is required"))?;

    Uuid::parse_str(raw).map_err(|_| IntakeError::bad_request("Invalid UUID"))
}

/// Query-string filter for listing submissions, as received.
///
/// Everything arrives as text so that bad values map to `BadRequest`
/// rather than a framework rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionListParams {
    /// `ALL`, `VISITED`, `STARTED` or `SUBMITTED`. Default `ALL`.
    pub status: Option<String>,
    /// Page size, 1 to 100. Default 20.
    pub limit: Option<String>,
    /// Rows to skip. Default 0.
    pub offset: Option<String>,
    /// Inclusive lower bound, RFC 3339 or `YYYY-MM-DD`.
    pub from_date: Option<String>,
    /// Inclusive upper bound, RFC 3339 or `YYYY-MM-DD`.
    pub to_date: Option<String>,
}

impl SubmissionListParams {
    /// Parse into a [`SubmissionQuery`].
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::BadRequest`] for an unknown status, a limit
    /// outside 1..=100, a negative or non-numeric offset, or an unparseable date.
    pub fn into_query(self) -> Result<SubmissionQuery> {
        let status = match self.status.as_deref() {
            None | Some("ALL") => None,
            Some(raw) => Some(raw.parse()?),
        };

        let limit = match self.limit.as_deref() {
            None => SubmissionQuery::DEFAULT_LIMIT,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|limit| (1..=SubmissionQuery::MAX_LIMIT).contains(limit))
                .ok_or_else(|| {
                    IntakeError::bad_request(format!(
                        "limit must be between 1 and {}",
                        SubmissionQuery::MAX_LIMIT
                    ))
                })?,
        };

        let offset = match self.offset.as_deref() {
            None => 0,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| IntakeError::bad_request("offset must be a non-negative integer"))?,
        };

        Ok(SubmissionQuery {
            status,
            limit,
            offset,
            from: self.from_date.as_deref().map(parse_date).transpose()?,
            to: self.to_date.as_deref().map(parse_date).transpose()?,
        })
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| IntakeError::bad_request(format!("Invalid date: {raw}")))
}

/// Basic email validation.
///
/// Not RFC 5322 complete, but rejects obviously invalid formats.
///
/// # Examples
///
/// ```
/// use eventform_intake::validation::is_valid_email;
///
/// assert!(is_valid_email("ada@example.com"));
/// assert!(!is_valid_email("ada"));
/// assert!(!is_valid_email("@example.com"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local) && domain.chars().all(valid_domain)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use eventform_core::{AnswerValue, AnswerValueFields, FieldId};

    fn text_answer(key: &str, text: &str) -> AnswerInput {
        AnswerInput {
            field_id: FieldId::new(),
            field_key: key.into(),
            values: AnswerValueFields {
                value_text: Some(text.into()),
                ..AnswerValueFields::default()
            },
        }
    }

    fn input(answers: Vec<AnswerInput>, contact: Option<ContactInput>) -> SubmissionInput {
        SubmissionInput {
            visitor: VisitorIdentity::anonymous(Uuid::new_v4()),
            contact,
            answers,
        }
    }

    #[test]
    fn empty_answers_are_rejected() {
        let err = input(vec![], None).validate().unwrap_err();
        assert!(matches!(err, IntakeError::BadRequest(_)));
    }

    #[test]
    fn valueless_answer_is_rejected() {
        let blank = AnswerInput {
            field_id: FieldId::new(),
            field_key: "name".into(),
            values: AnswerValueFields::default(),
        };
        let err = input(vec![blank], None).validate().unwrap_err();
        assert!(matches!(err, IntakeError::BadRequest(_)));
    }

    #[test]
    fn malformed_contact_email_is_rejected() {
        let contact = ContactInput {
            email: Some("not-an-email".into()),
            ..ContactInput::default()
        };
        let err = input(vec![text_answer("name", "Ada")], Some(contact))
            .validate()
            .unwrap_err();
        assert_eq!(err, IntakeError::bad_request("Invalid email"));
    }

    #[test]
    fn empty_contact_is_dropped() {
        let valid = input(vec![text_answer("name", "Ada")], Some(ContactInput::default()))
            .validate()
            .unwrap();
        assert!(valid.contact.is_none());
        assert_eq!(valid.answers[0].value, AnswerValue::Text("Ada".into()));
    }

    #[test]
    fn visitor_uuid_must_parse() {
        assert!(parse_visitor_uuid(None).is_err());
        assert!(parse_visitor_uuid(Some("  ")).is_err());
        assert!(parse_visitor_uuid(Some("not-a-uuid")).is_err());

        let uuid = Uuid::new_v4();
        assert_eq!(parse_visitor_uuid(Some(&uuid.to_string())).unwrap(), uuid);
    }

    #[test]
    fn list_params_default_and_bounds() {
        let query = SubmissionListParams::default().into_query().unwrap();
        assert_eq!(query, SubmissionQuery::default());

        let too_big = SubmissionListParams {
            limit: Some("101".into()),
            ..SubmissionListParams::default()
        };
        assert!(too_big.into_query().is_err());

        let zero = SubmissionListParams {
            limit: Some("0".into()),
            ..SubmissionListParams::default()
        };
        assert!(zero.into_query().is_err());

        let negative = SubmissionListParams {
            offset: Some("-1".into()),
            ..SubmissionListParams::default()
        };
        assert!(negative.into_query().is_err());
    }

    #[test]
    fn list_params_parse_status_and_dates() {
        let query = SubmissionListParams {
            status: Some("SUBMITTED".into()),
            limit: Some("5".into()),
            offset: Some("10".into()),
            from_date: Some("2025-03-01".into()),
            to_date: Some("2025-03-31T23:59:59Z".into()),
        }
        .into_query()
        .unwrap();

        assert_eq!(query.status, Some(eventform_core::SubmissionStatus::Submitted));
        assert_eq!(query.limit, 5);
        assert_eq!(query.offset, 10);
        assert_eq!(query.from.unwrap().to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert!(query.to.is_some());

        let bad_status = SubmissionListParams {
            status: Some("PENDING".into()),
            ..SubmissionListParams::default()
        };
        assert!(matches!(bad_status.into_query(), Err(IntakeError::BadRequest(_))));

        let bad_date = SubmissionListParams {
            from_date: Some("yesterday".into()),
            ..SubmissionListParams::default()
        };
        assert!(bad_date.into_query().is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ada.lovelace+forms@example.co.uk"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@.com"));
        assert!(!is_valid_email("ada smith@example.com"));
    }
}
