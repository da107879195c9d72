//! Fixtures and in-memory collaborators for unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::models::{CompletedTicket, DependentCounts, PurgeOutcome};
use crate::features::admin::repositories::{CompletedTicketRepository, TransactionSettings};
use crate::features::auth::model::{AuthenticatedUser, UserRole};
use crate::features::tickets::models::{Ticket, TicketPriority, TicketStatus, TicketSummary};
use crate::features::tickets::query::{TicketQuery, TicketSortField, Visibility};
use crate::features::tickets::repositories::TicketRepository;
use crate::shared::audit::{AuditEvent, AuditSink};
use crate::shared::revalidation::ViewRevalidator;
use crate::shared::types::SortDirection;

// =============================================================================
// USERS
// =============================================================================

const ADMIN_ID: Uuid = Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0001);
const USER_ID: Uuid = Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0002);

pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: ADMIN_ID,
        username: "ana.admin".to_string(),
        email: "ana.admin@example.com".to_string(),
        role: UserRole::Admin,
    }
}

pub fn create_regular_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: USER_ID,
        username: "bruno".to_string(),
        email: "bruno@example.com".to_string(),
        role: UserRole::User,
    }
}

async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

async fn inject_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_regular_user());
    next.run(request).await
}

pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}

pub fn with_user_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_user_middleware))
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Ticket fields a test cares about; the rest are filled in
#[derive(Debug, Clone)]
pub struct TicketSeed {
    pub title: String,
    pub content: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub deadline: String,
    pub filial: Option<String>,
    pub category_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl Default for TicketSeed {
    fn default() -> Self {
        Self {
            title: "Printer offline".to_string(),
            content: "Nothing prints on the second floor".to_string(),
            status: TicketStatus::Open,
            priority: TicketPriority::Low,
            deadline: "2026-12-31".to_string(),
            filial: None,
            category_id: None,
            user_id: None,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredCategory {
    name: String,
    color: String,
}

#[derive(Debug, Clone)]
struct StoredDependent {
    ticket_id: Uuid,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    users: HashMap<Uuid, AuthenticatedUser>,
    categories: HashMap<Uuid, StoredCategory>,
    tickets: Vec<Ticket>,
    comments: Vec<StoredDependent>,
    attachments: Vec<StoredDependent>,
}

impl StoreState {
    fn comments_of(&self, ticket_id: Uuid) -> i64 {
        self.comments.iter().filter(|c| c.ticket_id == ticket_id).count() as i64
    }

    fn attachments_of(&self, ticket_id: Uuid) -> i64 {
        self.attachments
            .iter()
            .filter(|a| a.ticket_id == ticket_id)
            .count() as i64
    }
}

/// Implements both repositories over plain collections.
///
/// Purges work on a copy of the state that replaces the original only on
/// success, which gives the same all-or-nothing outcome as a transaction.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    clock: AtomicI64,
    fail_reads: AtomicBool,
    fail_after_comment_delete: AtomicBool,
    reopen_before_delete: Mutex<Option<Uuid>>,
    transactions: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strictly increasing creation times, one minute apart
    fn next_timestamp(&self) -> DateTime<Utc> {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap() + Duration::minutes(tick)
    }

    pub fn add_user(&self, user: &AuthenticatedUser) {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(user.id, user.clone());
    }

    /// Delete the account; tickets keep existing without an owner
    pub fn remove_user(&self, user_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        state.users.remove(&user_id);
        for ticket in state.tickets.iter_mut() {
            if ticket.user_id == Some(user_id) {
                ticket.user_id = None;
            }
        }
    }

    pub fn add_category(&self, name: &str, color: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().categories.insert(
            id,
            StoredCategory {
                name: name.to_string(),
                color: color.to_string(),
            },
        );
        id
    }

    pub fn add_ticket(&self, seed: TicketSeed) -> Uuid {
        let now = self.next_timestamp();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            title: seed.title,
            content: seed.content,
            status: seed.status,
            deadline: seed.deadline,
            filial: seed.filial,
            priority: seed.priority,
            category_id: seed.category_id,
            user_id: seed.user_id,
            created_at: now,
            updated_at: now,
        };
        let id = ticket.id;
        self.state.lock().unwrap().tickets.push(ticket);
        id
    }

    pub fn add_comment(&self, ticket_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .comments
            .push(StoredDependent { ticket_id });
    }

    pub fn add_attachment(&self, ticket_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .attachments
            .push(StoredDependent { ticket_id });
    }

    /// Make every read fail with a database error
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make the next purges fail once comments are gone but tickets are not
    pub fn fail_after_comment_delete(&self, fail: bool) {
        self.fail_after_comment_delete.store(fail, Ordering::SeqCst);
    }

    /// Simulate another process reopening `ticket_id` right before the purge
    /// transaction starts
    pub fn reopen_before_delete(&self, ticket_id: Uuid) {
        *self.reopen_before_delete.lock().unwrap() = Some(ticket_id);
    }

    pub fn transactions_started(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    pub fn ticket_count(&self) -> usize {
        self.state.lock().unwrap().tickets.len()
    }

    pub fn comment_count(&self) -> usize {
        self.state.lock().unwrap().comments.len()
    }

    pub fn attachment_count(&self) -> usize {
        self.state.lock().unwrap().attachments.len()
    }

    pub fn count_with_status(&self, status: TicketStatus) -> usize {
        self.ticket_ids_with_status(status).len()
    }

    pub fn ticket_ids_with_status(&self, status: TicketStatus) -> Vec<Uuid> {
        self.state
            .lock()
            .unwrap()
            .tickets
            .iter()
            .filter(|t| t.status == status)
            .map(|t| t.id)
            .collect()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::Protocol(
                "simulated read failure".to_string(),
            )));
        }
        Ok(())
    }

    fn matches(ticket: &Ticket, query: &TicketQuery) -> bool {
        if let Visibility::OwnedBy(user_id) = query.visibility {
            if ticket.user_id != Some(user_id) {
                return false;
            }
        }

        let f = &query.filter;
        if let Some(search) = &f.search {
            let needle = search.to_lowercase();
            if !ticket.title.to_lowercase().contains(&needle)
                && !ticket.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        f.status.map_or(true, |s| ticket.status == s)
            && f.category_id.map_or(true, |c| ticket.category_id == Some(c))
            && f
                .filial
                .as_ref()
                .map_or(true, |x| ticket.filial.as_ref() == Some(x))
            && f.priority.map_or(true, |p| ticket.priority == p)
            && f
                .date_from
                .as_ref()
                .map_or(true, |from| ticket.deadline.as_str() >= from.as_str())
            && f
                .date_to
                .as_ref()
                .map_or(true, |to| ticket.deadline.as_str() <= to.as_str())
    }

    fn sorted_matches(state: &StoreState, query: &TicketQuery) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = state
            .tickets
            .iter()
            .filter(|t| Self::matches(t, query))
            .cloned()
            .collect();

        tickets.sort_by(|a, b| {
            let primary = match query.sort.field {
                TicketSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                TicketSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                TicketSortField::Deadline => a.deadline.cmp(&b.deadline),
                TicketSortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                TicketSortField::Priority => a.priority.cmp(&b.priority),
            };
            let ordering = primary.then_with(|| a.id.cmp(&b.id));
            match query.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        tickets
    }

    fn summarize(state: &StoreState, t: Ticket) -> TicketSummary {
        let owner = t.user_id.and_then(|id| state.users.get(&id));
        let category = t.category_id.and_then(|id| state.categories.get(&id));
        TicketSummary {
            owner_username: owner.map(|u| u.username.clone()),
            owner_email: owner.map(|u| u.email.clone()),
            category_name: category.map(|c| c.name.clone()),
            category_color: category.map(|c| c.color.clone()),
            attachment_count: state.attachments_of(t.id),
            comment_count: state.comments_of(t.id),
            id: t.id,
            title: t.title,
            content: t.content,
            status: t.status,
            deadline: t.deadline,
            filial: t.filial,
            priority: t.priority,
            category_id: t.category_id,
            user_id: t.user_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[async_trait]
impl TicketRepository for InMemoryStore {
    async fn count(&self, query: &TicketQuery) -> Result<i64> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        Ok(Self::sorted_matches(&state, query).len() as i64)
    }

    async fn fetch_page(&self, query: &TicketQuery) -> Result<Vec<TicketSummary>> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        Ok(Self::sorted_matches(&state, query)
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .map(|t| Self::summarize(&state, t))
            .collect())
    }
}

#[async_trait]
impl CompletedTicketRepository for InMemoryStore {
    async fn list_completed(&self) -> Result<Vec<CompletedTicket>> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        let mut done: Vec<CompletedTicket> = state
            .tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Done)
            .map(|t| CompletedTicket {
                id: t.id,
                title: t.title.clone(),
                filial: t.filial.clone(),
                owner_username: t
                    .user_id
                    .and_then(|id| state.users.get(&id))
                    .map(|u| u.username.clone()),
                created_at: t.created_at,
                comment_count: state.comments_of(t.id),
                attachment_count: state.attachments_of(t.id),
            })
            .collect();
        done.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(done)
    }

    async fn count_dependents(&self, ticket_ids: &[Uuid]) -> Result<DependentCounts> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        Ok(DependentCounts {
            comments: ticket_ids.iter().map(|id| state.comments_of(*id)).sum(),
            attachments: ticket_ids.iter().map(|id| state.attachments_of(*id)).sum(),
        })
    }

    async fn delete_completed(
        &self,
        ticket_ids: &[Uuid],
        _settings: &TransactionSettings,
    ) -> Result<PurgeOutcome> {
        self.transactions.fetch_add(1, Ordering::SeqCst);
        let mut committed = self.state.lock().unwrap();

        if let Some(reopened) = self.reopen_before_delete.lock().unwrap().take() {
            if let Some(ticket) = committed.tickets.iter_mut().find(|t| t.id == reopened) {
                ticket.status = TicketStatus::Open;
            }
        }

        let mut working = committed.clone();
        let targeted = |id: &Uuid| ticket_ids.contains(id);

        let before = working.comments.len();
        working.comments.retain(|c| !targeted(&c.ticket_id));
        let comments_deleted = (before - working.comments.len()) as u64;

        if self.fail_after_comment_delete.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "simulated failure after comment delete".to_string(),
            ));
        }

        let before = working.attachments.len();
        working.attachments.retain(|a| !targeted(&a.ticket_id));
        let attachments_deleted = (before - working.attachments.len()) as u64;

        let before = working.tickets.len();
        working
            .tickets
            .retain(|t| !(t.status == TicketStatus::Done && targeted(&t.id)));
        let tickets_deleted = (before - working.tickets.len()) as u64;

        if tickets_deleted != ticket_ids.len() as u64 {
            return Err(AppError::Conflict(format!(
                "expected to delete {} tickets, deleted {}",
                ticket_ids.len(),
                tickets_deleted
            )));
        }

        *committed = working;
        Ok(PurgeOutcome {
            tickets_deleted,
            comments_deleted,
            attachments_deleted,
        })
    }
}

// =============================================================================
// RECORDING COLLABORATORS
// =============================================================================

#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[derive(Default)]
pub struct RecordingRevalidator {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingRevalidator {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ViewRevalidator for RecordingRevalidator {
    async fn invalidate(&self, views: &[&str]) {
        self.calls
            .lock()
            .unwrap()
            .push(views.iter().map(|v| v.to_string()).collect());
    }
}
