//! Entities the call flows operate on, with the celebration lifecycle
//! modeled as an explicit tagged state rather than a bundle of nullable
//! columns. Menu eligibility is derived from that state by the pure
//! predicates on [`Event`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DTMF digit used as a catalog key. Keys stay within 1-9 so the finish
/// sentinel `0` of multi-selection never collides.
pub type Digit = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub u32);

/// A caller's tenant, resolved from the number the caller dialed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub called_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub account_id: AccountId,
    /// National-ID-like digit string the caller keys in to authenticate.
    pub token: String,
    pub name: String,
}

/// One keyed option offered during a session: an event type, a path, or a
/// gift voucher. Catalog entities are scoped per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub key: Digit,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogItem {
    pub fn new(key: Digit, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Where a celebration stands in its lifecycle.
///
/// `assigned_path` is carried into `Completed` because voucher eligibility
/// keys off the assigned path regardless of completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum EventProgress {
    Reported,
    PathAssigned {
        path: Digit,
    },
    Completed {
        assigned_path: Option<Digit>,
        completed_path: Digit,
        completed_at: DateTime<Utc>,
    },
}

/// A reported celebration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub student_id: StudentId,
    pub event_type: Digit,
    pub event_date: NaiveDate,
    /// Gift voucher keys. Attached at registration or replaced wholesale by
    /// the voucher flow, never patched one row at a time.
    pub gifts: Vec<Digit>,
    pub progress: EventProgress,
}

impl Event {
    pub fn assigned_path(&self) -> Option<Digit> {
        match self.progress {
            EventProgress::Reported => None,
            EventProgress::PathAssigned { path } => Some(path),
            EventProgress::Completed { assigned_path, .. } => assigned_path,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.progress, EventProgress::Completed { .. })
    }

    /// Eligible for the path-selection branch: no path picked yet and the
    /// celebration has not been completed.
    pub fn needs_path(&self) -> bool {
        matches!(self.progress, EventProgress::Reported)
    }

    /// Eligible for the voucher branch: a path was assigned and no vouchers
    /// were ever attached.
    pub fn needs_vouchers(&self) -> bool {
        self.assigned_path().is_some() && self.gifts.is_empty()
    }

    /// Eligible for the post-event branch: not completed and the reported
    /// date has passed.
    pub fn awaits_post_update(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.event_date < today
    }

    pub fn assign_path(&mut self, path: Digit) -> Result<(), LifecycleError> {
        match self.progress {
            EventProgress::Reported => {
                self.progress = EventProgress::PathAssigned { path };
                Ok(())
            }
            EventProgress::PathAssigned { .. } => Err(LifecycleError::PathAlreadyAssigned),
            EventProgress::Completed { .. } => Err(LifecycleError::AlreadyCompleted),
        }
    }

    /// Replace the voucher set. Legal only while the event still qualifies
    /// for the voucher branch.
    pub fn assign_gifts(&mut self, gifts: Vec<Digit>) -> Result<(), LifecycleError> {
        if self.assigned_path().is_none() {
            return Err(LifecycleError::PathRequiredForVouchers);
        }
        if !self.gifts.is_empty() {
            return Err(LifecycleError::VouchersAlreadyAssigned);
        }
        self.gifts = gifts;
        Ok(())
    }

    pub fn complete(
        &mut self,
        completed_path: Digit,
        completed_at: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        match self.progress {
            EventProgress::Completed { .. } => Err(LifecycleError::AlreadyCompleted),
            EventProgress::Reported => {
                self.progress = EventProgress::Completed {
                    assigned_path: None,
                    completed_path,
                    completed_at,
                };
                Ok(())
            }
            EventProgress::PathAssigned { path } => {
                self.progress = EventProgress::Completed {
                    assigned_path: Some(path),
                    completed_path,
                    completed_at,
                };
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    PathAlreadyAssigned,
    VouchersAlreadyAssigned,
    PathRequiredForVouchers,
    AlreadyCompleted,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::PathAlreadyAssigned => write!(f, "event already has a path assigned"),
            LifecycleError::VouchersAlreadyAssigned => {
                write!(f, "event already has vouchers assigned")
            }
            LifecycleError::PathRequiredForVouchers => {
                write!(f, "vouchers require an assigned path")
            }
            LifecycleError::AlreadyCompleted => write!(f, "event was already completed"),
        }
    }
}

impl std::error::Error for LifecycleError {}
