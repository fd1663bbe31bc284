//! Storage abstraction the flows persist through. The back office owns the
//! real schema; the call flows only need these lookups and two atomic write
//! operations.

use crate::domain::{
    Account, AccountId, CatalogItem, Digit, Event, EventId, LifecycleError, Student, StudentId,
};
use chrono::{DateTime, NaiveDate, Utc};

pub mod memory;

pub use memory::InMemoryStore;

/// Fields for a brand-new celebration. Created together with its voucher
/// rows in one transaction.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub student_id: StudentId,
    pub event_type: Digit,
    pub event_date: NaiveDate,
    pub gifts: Vec<Digit>,
}

/// An in-place mutation of an existing celebration. Each variant maps to a
/// validated lifecycle transition; none of them creates a row.
#[derive(Debug, Clone)]
pub enum EventChange {
    AssignPath(Digit),
    AssignGifts(Vec<Digit>),
    Complete {
        completed_path: Digit,
        completed_at: DateTime<Utc>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("event record in conflicting state: {0}")]
    Conflict(#[from] LifecycleError),
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The only shared resource across concurrent calls. Implementations keep
/// each operation atomic; multi-row writes never commit partially.
pub trait EventStore: Send + Sync {
    fn account_by_called_number(&self, number: &str) -> Result<Option<Account>, StoreError>;

    fn student_by_token(
        &self,
        account: AccountId,
        token: &str,
    ) -> Result<Option<Student>, StoreError>;

    fn selectable_event_types(&self, account: AccountId) -> Result<Vec<CatalogItem>, StoreError>;

    fn selectable_paths(&self, account: AccountId) -> Result<Vec<CatalogItem>, StoreError>;

    fn selectable_gifts(&self, account: AccountId) -> Result<Vec<CatalogItem>, StoreError>;

    fn events_for_student(&self, student: StudentId) -> Result<Vec<Event>, StoreError>;

    /// Duplicate-prevention lookup. Deliberately a separate operation from
    /// [`EventStore::create_event`], so the check is best-effort rather
    /// than a uniqueness guarantee.
    fn find_event(
        &self,
        student: StudentId,
        event_type: Digit,
        date: NaiveDate,
    ) -> Result<Option<Event>, StoreError>;

    /// Insert the event and its voucher rows atomically.
    fn create_event(&self, draft: EventDraft) -> Result<Event, StoreError>;

    /// Apply one lifecycle transition to an existing event atomically.
    fn update_event(&self, id: EventId, change: EventChange) -> Result<Event, StoreError>;
}
