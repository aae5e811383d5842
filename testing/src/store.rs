//! In-memory durable store.
//!
//! Implements every durable-store trait over one shared state. A
//! [`MockTransaction`] stages its writes privately and applies them on
//! [`commit`](SubmissionTransaction::commit); dropping it discards them,
//! like a rolled-back database transaction.

use chrono::Utc;
use eventform_core::providers::{
    EventDirectory, FormDirectory, Readiness, SubmissionStore, SubmissionTransaction, VisitorStore,
};
use eventform_core::{
    Contact, ContactId, ContactInput, Event, EventId, Form, FormSubmission, IntakeError, Result,
    SubmissionAnswer, SubmissionDetail, SubmissionId, SubmissionQuery, SubmissionStatus,
    VisitSession, VisitSessionId, Visitor, VisitorId, VisitorIdentity,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Rows written by the pipeline.
#[derive(Debug, Default, Clone)]
struct Tables {
    visitors: HashMap<Uuid, Visitor>,
    sessions: HashMap<(VisitorId, EventId), VisitSession>,
    contacts: HashMap<ContactId, Contact>,
    submissions: HashMap<SubmissionId, FormSubmission>,
    answers: HashMap<SubmissionId, Vec<SubmissionAnswer>>,
}

#[derive(Debug, Default)]
struct State {
    events: HashMap<EventId, Event>,
    forms: HashMap<EventId, Form>,
    tables: Tables,
}

#[derive(Debug, Default)]
struct Faults {
    answer_inserts: AtomicBool,
    visitor_writes: AtomicBool,
    directory_calls: AtomicUsize,
}

impl Faults {
    fn check_visitor_write(&self) -> Result<()> {
        if self.visitor_writes.load(Ordering::SeqCst) {
            return Err(IntakeError::Database("Failed to upsert visitor: injected".into()));
        }
        Ok(())
    }

    fn check_answer_insert(&self) -> Result<()> {
        if self.answer_inserts.load(Ordering::SeqCst) {
            return Err(IntakeError::Database("Failed to insert answers: injected".into()));
        }
        Ok(())
    }
}

/// PostgreSQL stand-in.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    state: Arc<Mutex<State>>,
    faults: Arc<Faults>,
}

impl MockStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event and its form.
    pub fn insert_directory(&self, event: Event, form: Form) {
        let mut state = self.state.lock().unwrap();
        state.forms.insert(event.id, form);
        state.events.insert(event.id, event);
    }

    /// Register an event with no form.
    pub fn insert_event(&self, event: Event) {
        self.state.lock().unwrap().events.insert(event.id, event);
    }

    /// Number of directory lookups served so far.
    #[must_use]
    pub fn directory_calls(&self) -> usize {
        self.faults.directory_calls.load(Ordering::SeqCst)
    }

    /// Make every answer insert fail.
    pub fn fail_answer_inserts(&self, fail: bool) {
        self.faults.answer_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make every visitor upsert fail.
    pub fn fail_visitor_writes(&self, fail: bool) {
        self.faults.visitor_writes.store(fail, Ordering::SeqCst);
    }

    /// Committed visitors.
    #[must_use]
    pub fn visitor_count(&self) -> usize {
        self.state.lock().unwrap().tables.visitors.len()
    }

    /// The committed visitor with this client UUID.
    #[must_use]
    pub fn visitor(&self, uuid: Uuid) -> Option<Visitor> {
        self.state.lock().unwrap().tables.visitors.get(&uuid).cloned()
    }

    /// Committed submissions, deleted ones included.
    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.state.lock().unwrap().tables.submissions.len()
    }

    /// Committed answer rows.
    #[must_use]
    pub fn answer_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .tables
            .answers
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Committed contacts.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.state.lock().unwrap().tables.contacts.len()
    }

    /// Status of every session, oldest first.
    #[must_use]
    pub fn session_statuses(&self) -> Vec<SubmissionStatus> {
        let state = self.state.lock().unwrap();
        let mut sessions: Vec<&VisitSession> = state.tables.sessions.values().collect();
        sessions.sort_by_key(|session| session.created_at);
        sessions.iter().map(|session| session.status).collect()
    }

    /// A committed submission row.
    #[must_use]
    pub fn submission(&self, submission_id: SubmissionId) -> Option<FormSubmission> {
        self.state
            .lock()
            .unwrap()
            .tables
            .submissions
            .get(&submission_id)
            .cloned()
    }

    /// A committed contact.
    #[must_use]
    pub fn contact(&self, contact_id: ContactId) -> Option<Contact> {
        self.state
            .lock()
            .unwrap()
            .tables
            .contacts
            .get(&contact_id)
            .cloned()
    }

    fn count_directory_call(&self) {
        self.faults.directory_calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn upserted_visitor(existing: Option<&Visitor>, identity: &VisitorIdentity) -> Visitor {
    let now = Utc::now();
    match existing {
        Some(visitor) => Visitor {
            ip_address: identity
                .ip_address
                .clone()
                .or_else(|| visitor.ip_address.clone()),
            user_agent: identity
                .user_agent
                .clone()
                .or_else(|| visitor.user_agent.clone()),
            last_seen_at: now,
            ..visitor.clone()
        },
        None => Visitor {
            id: VisitorId::new(),
            uuid: identity.uuid,
            ip_address: identity.ip_address.clone(),
            user_agent: identity.user_agent.clone(),
            first_seen_at: now,
            last_seen_at: now,
        },
    }
}

fn advanced_session(
    existing: Option<&VisitSession>,
    visitor_id: VisitorId,
    event_id: EventId,
    target: SubmissionStatus,
) -> VisitSession {
    let now = Utc::now();
    match existing {
        Some(session) if target > session.status => VisitSession {
            status: target,
            updated_at: now,
            ..session.clone()
        },
        Some(session) => session.clone(),
        None => VisitSession {
            id: VisitSessionId::new(),
            visitor_id,
            event_id,
            status: target,
            created_at: now,
            updated_at: now,
        },
    }
}

fn detail(tables: &Tables, submission: &FormSubmission) -> SubmissionDetail {
    let mut answers = tables
        .answers
        .get(&submission.id)
        .cloned()
        .unwrap_or_default();
    answers.sort_by(|a, b| a.field_key.cmp(&b.field_key));

    SubmissionDetail {
        id: submission.id,
        event_id: submission.event_id,
        form_id: submission.form_id,
        status: submission.status,
        submitted_at: submission.submitted_at,
        contact: submission
            .contact_id
            .and_then(|id| tables.contacts.get(&id).cloned()),
        answers,
    }
}

impl EventDirectory for MockStore {
    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        self.count_directory_call();
        let state = self.state.lock().unwrap();
        Ok(state.events.values().find(|event| event.slug == slug).cloned())
    }

    async fn find_event_by_id(&self, event_id: EventId) -> Result<Option<Event>> {
        self.count_directory_call();
        Ok(self.state.lock().unwrap().events.get(&event_id).cloned())
    }
}

impl FormDirectory for MockStore {
    async fn find_form_by_event_id(&self, event_id: EventId) -> Result<Option<Form>> {
        self.count_directory_call();
        Ok(self.state.lock().unwrap().forms.get(&event_id).cloned())
    }
}

impl VisitorStore for MockStore {
    async fn upsert_visitor(&self, identity: &VisitorIdentity) -> Result<Visitor> {
        self.faults.check_visitor_write()?;
        let mut state = self.state.lock().unwrap();
        let visitor = upserted_visitor(state.tables.visitors.get(&identity.uuid), identity);
        state.tables.visitors.insert(identity.uuid, visitor.clone());
        Ok(visitor)
    }

    async fn advance_session(
        &self,
        visitor_id: VisitorId,
        event_id: EventId,
        target: SubmissionStatus,
    ) -> Result<VisitSession> {
        let mut state = self.state.lock().unwrap();
        let key = (visitor_id, event_id);
        let session = advanced_session(
            state.tables.sessions.get(&key),
            visitor_id,
            event_id,
            target,
        );
        state.tables.sessions.insert(key, session.clone());
        Ok(session)
    }
}

impl SubmissionStore for MockStore {
    type Transaction = MockTransaction;

    async fn begin(&self) -> Result<MockTransaction> {
        Ok(MockTransaction {
            state: Arc::clone(&self.state),
            faults: Arc::clone(&self.faults),
            staged: Tables::default(),
        })
    }

    async fn find_submission(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Option<SubmissionDetail>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tables
            .submissions
            .get(&submission_id)
            .filter(|submission| !submission.is_deleted)
            .map(|submission| detail(&state.tables, submission)))
    }

    async fn list_submissions(
        &self,
        event_id: EventId,
        query: &SubmissionQuery,
    ) -> Result<Vec<SubmissionDetail>> {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<&FormSubmission> = state
            .tables
            .submissions
            .values()
            .filter(|submission| submission.event_id == event_id && query.matches(submission))
            .collect();
        matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

        Ok(matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|submission| detail(&state.tables, submission))
            .collect())
    }

    async fn soft_delete_submission(&self, submission_id: SubmissionId) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.tables.submissions.get_mut(&submission_id) {
            Some(submission) if !submission.is_deleted => {
                submission.is_deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl Readiness for MockStore {
    async fn check_ready(&self) -> Result<()> {
        Ok(())
    }
}

/// Staged writes for one submit.
#[derive(Debug)]
pub struct MockTransaction {
    state: Arc<Mutex<State>>,
    faults: Arc<Faults>,
    staged: Tables,
}

impl SubmissionTransaction for MockTransaction {
    async fn upsert_visitor(&mut self, identity: &VisitorIdentity) -> Result<Visitor> {
        self.faults.check_visitor_write()?;
        let committed = self
            .state
            .lock()
            .unwrap()
            .tables
            .visitors
            .get(&identity.uuid)
            .cloned();
        let current = self.staged.visitors.get(&identity.uuid).or(committed.as_ref());
        let visitor = upserted_visitor(current, identity);
        self.staged.visitors.insert(identity.uuid, visitor.clone());
        Ok(visitor)
    }

    async fn find_contact_by_email_or_phone(
        &mut self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Contact>> {
        let matches = |contact: &&Contact| {
            (email.is_some() && contact.email.as_deref() == email)
                || (phone.is_some() && contact.phone.as_deref() == phone)
        };

        if let Some(contact) = self.staged.contacts.values().find(matches) {
            return Ok(Some(contact.clone()));
        }
        let state = self.state.lock().unwrap();
        Ok(state.tables.contacts.values().find(matches).cloned())
    }

    async fn create_contact(&mut self, input: &ContactInput) -> Result<Contact> {
        let contact = Contact {
            id: ContactId::new(),
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
        };
        self.staged.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn update_contact(&mut self, contact: &Contact) -> Result<()> {
        self.staged.contacts.insert(contact.id, contact.clone());
        Ok(())
    }

    async fn insert_submission(&mut self, submission: &FormSubmission) -> Result<()> {
        self.staged
            .submissions
            .insert(submission.id, submission.clone());
        Ok(())
    }

    async fn insert_answers(
        &mut self,
        submission_id: SubmissionId,
        answers: &[SubmissionAnswer],
    ) -> Result<()> {
        self.faults.check_answer_insert()?;
        self.staged
            .answers
            .entry(submission_id)
            .or_default()
            .extend_from_slice(answers);
        Ok(())
    }

    async fn advance_session(
        &mut self,
        visitor_id: VisitorId,
        event_id: EventId,
        target: SubmissionStatus,
    ) -> Result<VisitSession> {
        let key = (visitor_id, event_id);
        let committed = self.state.lock().unwrap().tables.sessions.get(&key).cloned();
        let current = self.staged.sessions.get(&key).or(committed.as_ref());
        let session = advanced_session(current, visitor_id, event_id, target);
        self.staged.sessions.insert(key, session.clone());
        Ok(session)
    }

    async fn commit(self) -> Result<()> {
        let Self { state, staged, .. } = self;
        let mut state = state.lock().unwrap();
        let tables = &mut state.tables;

        tables.visitors.extend(staged.visitors);
        tables.contacts.extend(staged.contacts);
        tables.submissions.extend(staged.submissions);
        for (submission_id, answers) in staged.answers {
            tables.answers.entry(submission_id).or_default().extend(answers);
        }
        // Another writer may have advanced the session since it was staged.
        for (key, session) in staged.sessions {
            let merged = match tables.sessions.get(&key) {
                Some(current) => advanced_session(Some(current), key.0, key.1, session.status),
                None => session,
            };
            tables.sessions.insert(key, merged);
        }
        Ok(())
    }
}
