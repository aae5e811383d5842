//! Visitor and visit-session persistence.
//!
//! The query functions take a bare connection so the same SQL runs on a
//! pooled connection and inside a submission transaction.

use crate::PostgresStore;
use crate::rows::{self, db_error};
use eventform_core::providers::VisitorStore;
use eventform_core::{
    EventId, Result, SubmissionStatus, VisitSession, VisitSessionId, Visitor, VisitorId,
    VisitorIdentity,
};
use sqlx::PgConnection;

/// Insert the visitor or refresh it. `COALESCE` keeps stored ip/UA when the
/// new contact did not supply them.
pub(crate) async fn upsert_visitor(
    conn: &mut PgConnection,
    identity: &VisitorIdentity,
) -> Result<Visitor> {
    let row = sqlx::query(
        r"
        INSERT INTO visitors (id, uuid, ip_address, user_agent, first_seen_at, last_seen_at)
        VALUES ($1, $2, $3, $4, now(), now())
        ON CONFLICT (uuid) DO UPDATE SET
            ip_address = COALESCE(EXCLUDED.ip_address, visitors.ip_address),
            user_agent = COALESCE(EXCLUDED.user_agent, visitors.user_agent),
            last_seen_at = now()
        RETURNING id, uuid, ip_address, user_agent, first_seen_at, last_seen_at
        ",
    )
    .bind(VisitorId::new().0)
    .bind(identity.uuid)
    .bind(identity.ip_address.as_deref())
    .bind(identity.user_agent.as_deref())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| db_error("upsert visitor", &e))?;

    rows::visitor(&row)
}

/// Atomic max-rank upsert of a session.
///
/// The `WHERE` on the conflict branch makes a lower-or-equal target a no-op,
/// in which case `RETURNING` yields nothing and the stored row is read back.
/// Status never decreases, so that read is at least `target`.
pub(crate) async fn advance_session(
    conn: &mut PgConnection,
    visitor_id: VisitorId,
    event_id: EventId,
    target: SubmissionStatus,
) -> Result<VisitSession> {
    let upgraded = sqlx::query(
        r"
        INSERT INTO visit_sessions (id, visitor_id, event_id, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, now(), now())
        ON CONFLICT (visitor_id, event_id) DO UPDATE SET
            status = EXCLUDED.status,
            updated_at = now()
        WHERE visit_sessions.status < EXCLUDED.status
        RETURNING id, visitor_id, event_id, status, created_at, updated_at
        ",
    )
    .bind(VisitSessionId::new().0)
    .bind(visitor_id.0)
    .bind(event_id.0)
    .bind(target.rank())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| db_error("advance session", &e))?;

    if let Some(row) = upgraded {
        let session = rows::session(&row)?;
        tracing::debug!(
            visitor_id = %visitor_id,
            event_id = %event_id,
            status = %session.status,
            "Session advanced"
        );
        return Ok(session);
    }

    find_session(conn, visitor_id, event_id)
        .await?
        .ok_or_else(|| {
            eventform_core::IntakeError::Database(
                "Session vanished after conflicting upsert".into(),
            )
        })
}

pub(crate) async fn find_session(
    conn: &mut PgConnection,
    visitor_id: VisitorId,
    event_id: EventId,
) -> Result<Option<VisitSession>> {
    sqlx::query(
        r"
        SELECT id, visitor_id, event_id, status, created_at, updated_at
        FROM visit_sessions
        WHERE visitor_id = $1 AND event_id = $2
        ",
    )
    .bind(visitor_id.0)
    .bind(event_id.0)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| db_error("find session", &e))?
    .as_ref()
    .map(rows::session)
    .transpose()
}

impl VisitorStore for PostgresStore {
    async fn upsert_visitor(&self, identity: &VisitorIdentity) -> Result<Visitor> {
        let mut conn = self.acquire().await?;
        upsert_visitor(&mut conn, identity).await
    }

    async fn advance_session(
        &self,
        visitor_id: VisitorId,
        event_id: EventId,
        target: SubmissionStatus,
    ) -> Result<VisitSession> {
        let mut conn = self.acquire().await?;
        advance_session(&mut conn, visitor_id, event_id, target).await
    }
}
