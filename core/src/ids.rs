//! Identifier newtypes.
//!
//! Every entity is keyed by a UUID. Wrapping each one in its own type keeps
//! a `FormId` from being passed where an `EventId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            #[doc = concat!("Generate a new random `", stringify!($name), "`.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Borrow the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for an event.
    EventId
);
uuid_id!(
    /// Unique identifier for a form.
    FormId
);
uuid_id!(
    /// Unique identifier for a form step.
    StepId
);
uuid_id!(
    /// Unique identifier for a form field.
    FieldId
);
uuid_id!(
    /// Server-side identifier for a visitor row.
    ///
    /// Distinct from the client-generated visitor UUID.
    VisitorId
);
uuid_id!(
    /// Unique identifier for a visit session.
    VisitSessionId
);
uuid_id!(
    /// Unique identifier for a contact.
    ContactId
);
uuid_id!(
    /// Unique identifier for a form submission.
    SubmissionId
);
uuid_id!(
    /// Unique identifier for a submission answer.
    AnswerId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_uuids() {
        let raw = Uuid::new_v4();
        let json = serde_json::to_string(&EventId(raw)).unwrap_or_default();
        assert_eq!(json, format!("\"{raw}\""));
    }

    #[test]
    fn display_matches_uuid() {
        let id = FormId::new();
        assert_eq!(id.to_string(), id.0.to_string());
    }
}
