//! Mutex-guarded in-memory store backing the demo binary and the scripted
//! tests. Atomicity falls out of the single lock, but create still
//! validates the whole draft before touching state so a failure leaves no
//! partial rows, matching the contract a relational backend honors with a
//! transaction.

use super::{EventChange, EventDraft, EventStore, StoreError};
use crate::domain::{
    Account, AccountId, CatalogItem, Digit, Event, EventId, EventProgress, Student, StudentId,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    accounts: Vec<Account>,
    students: Vec<Student>,
    event_types: HashMap<AccountId, Vec<CatalogItem>>,
    paths: HashMap<AccountId, Vec<CatalogItem>>,
    gifts: HashMap<AccountId, Vec<CatalogItem>>,
    events: Vec<Event>,
    next_account: u32,
    next_student: u32,
    next_event: u32,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn add_account(
        &self,
        name: impl Into<String>,
        called_number: impl Into<String>,
    ) -> Result<AccountId, StoreError> {
        let mut inner = self.lock()?;
        inner.next_account += 1;
        let id = AccountId(inner.next_account);
        inner.accounts.push(Account {
            id,
            name: name.into(),
            called_number: called_number.into(),
        });
        Ok(id)
    }

    pub fn add_student(
        &self,
        account_id: AccountId,
        token: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<StudentId, StoreError> {
        let mut inner = self.lock()?;
        inner.next_student += 1;
        let id = StudentId(inner.next_student);
        inner.students.push(Student {
            id,
            account_id,
            token: token.into(),
            name: name.into(),
        });
        Ok(id)
    }

    pub fn set_event_types(
        &self,
        account: AccountId,
        items: Vec<CatalogItem>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.event_types.insert(account, items);
        Ok(())
    }

    pub fn set_paths(&self, account: AccountId, items: Vec<CatalogItem>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.paths.insert(account, items);
        Ok(())
    }

    pub fn set_gifts(&self, account: AccountId, items: Vec<CatalogItem>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.gifts.insert(account, items);
        Ok(())
    }

    /// Insert an event in an arbitrary lifecycle state, bypassing the saga.
    /// Seeding hook for tests and demos.
    pub fn seed_event(
        &self,
        student_id: StudentId,
        event_type: Digit,
        event_date: NaiveDate,
        gifts: Vec<Digit>,
        progress: EventProgress,
    ) -> Result<EventId, StoreError> {
        let mut inner = self.lock()?;
        inner.next_event += 1;
        let id = EventId(inner.next_event);
        inner.events.push(Event {
            id,
            student_id,
            event_type,
            event_date,
            gifts,
            progress,
        });
        Ok(id)
    }

    pub fn event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.events.iter().find(|e| e.id == id).cloned())
    }

    pub fn event_count(&self) -> Result<usize, StoreError> {
        let inner = self.lock()?;
        Ok(inner.events.len())
    }
}

fn account_catalog(
    map: &HashMap<AccountId, Vec<CatalogItem>>,
    account: AccountId,
) -> Vec<CatalogItem> {
    map.get(&account).cloned().unwrap_or_default()
}

impl EventStore for InMemoryStore {
    fn account_by_called_number(&self, number: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .accounts
            .iter()
            .find(|a| a.called_number == number)
            .cloned())
    }

    fn student_by_token(
        &self,
        account: AccountId,
        token: &str,
    ) -> Result<Option<Student>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .students
            .iter()
            .find(|s| s.account_id == account && s.token == token)
            .cloned())
    }

    fn selectable_event_types(&self, account: AccountId) -> Result<Vec<CatalogItem>, StoreError> {
        let inner = self.lock()?;
        Ok(account_catalog(&inner.event_types, account))
    }

    fn selectable_paths(&self, account: AccountId) -> Result<Vec<CatalogItem>, StoreError> {
        let inner = self.lock()?;
        Ok(account_catalog(&inner.paths, account))
    }

    fn selectable_gifts(&self, account: AccountId) -> Result<Vec<CatalogItem>, StoreError> {
        let inner = self.lock()?;
        Ok(account_catalog(&inner.gifts, account))
    }

    fn events_for_student(&self, student: StudentId) -> Result<Vec<Event>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.student_id == student)
            .cloned()
            .collect())
    }

    fn find_event(
        &self,
        student: StudentId,
        event_type: Digit,
        date: NaiveDate,
    ) -> Result<Option<Event>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .events
            .iter()
            .find(|e| e.student_id == student && e.event_type == event_type && e.event_date == date)
            .cloned())
    }

    fn create_event(&self, draft: EventDraft) -> Result<Event, StoreError> {
        let mut inner = self.lock()?;

        let account_id = inner
            .students
            .iter()
            .find(|s| s.id == draft.student_id)
            .map(|s| s.account_id)
            .ok_or(StoreError::NotFound)?;

        // Validate every voucher row before inserting anything, so a bad
        // draft commits nothing at all.
        let gift_catalog = account_catalog(&inner.gifts, account_id);
        for gift in &draft.gifts {
            if !gift_catalog.iter().any(|item| item.key == *gift) {
                return Err(StoreError::NotFound);
            }
        }

        inner.next_event += 1;
        let event = Event {
            id: EventId(inner.next_event),
            student_id: draft.student_id,
            event_type: draft.event_type,
            event_date: draft.event_date,
            gifts: draft.gifts,
            progress: EventProgress::Reported,
        };
        inner.events.push(event.clone());
        Ok(event)
    }

    fn update_event(&self, id: EventId, change: EventChange) -> Result<Event, StoreError> {
        let mut inner = self.lock()?;
        let event = inner
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound)?;

        match change {
            EventChange::AssignPath(path) => event.assign_path(path)?,
            EventChange::AssignGifts(gifts) => event.assign_gifts(gifts)?,
            EventChange::Complete {
                completed_path,
                completed_at,
            } => event.complete(completed_path, completed_at)?,
        }

        Ok(event.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LifecycleError;
    use chrono::{TimeZone, Utc};

    fn seeded() -> (InMemoryStore, StudentId) {
        let store = InMemoryStore::new();
        let account = store
            .add_account("Hillside School", "035550000")
            .expect("store seedable");
        let student = store
            .add_student(account, "111222333", "Dana")
            .expect("store seedable");
        store
            .set_gifts(
                account,
                vec![CatalogItem::new(1, "Book voucher"), CatalogItem::new(2, "Game voucher")],
            )
            .expect("store seedable");
        (store, student)
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).expect("valid date")
    }

    #[test]
    fn create_persists_event_with_voucher_rows() {
        let (store, student) = seeded();
        let event = store
            .create_event(EventDraft {
                student_id: student,
                event_type: 1,
                event_date: march(10),
                gifts: vec![1, 2],
            })
            .expect("create succeeds");

        assert_eq!(event.progress, EventProgress::Reported);
        assert_eq!(event.gifts, vec![1, 2]);
        assert_eq!(store.event_count().expect("store readable"), 1);
    }

    #[test]
    fn create_with_unknown_voucher_commits_nothing() {
        let (store, student) = seeded();
        let result = store.create_event(EventDraft {
            student_id: student,
            event_type: 1,
            event_date: march(10),
            gifts: vec![1, 9],
        });

        assert!(matches!(result, Err(StoreError::NotFound)));
        assert_eq!(store.event_count().expect("store readable"), 0);
    }

    #[test]
    fn find_event_matches_on_type_and_date() {
        let (store, student) = seeded();
        store
            .seed_event(student, 1, march(10), Vec::new(), EventProgress::Reported)
            .expect("store seedable");

        let hit = store.find_event(student, 1, march(10)).expect("lookup ok");
        assert!(hit.is_some());
        let miss = store.find_event(student, 2, march(10)).expect("lookup ok");
        assert!(miss.is_none());
        let miss = store.find_event(student, 1, march(11)).expect("lookup ok");
        assert!(miss.is_none());
    }

    #[test]
    fn update_applies_validated_transitions_in_place() {
        let (store, student) = seeded();
        let id = store
            .seed_event(student, 1, march(10), Vec::new(), EventProgress::Reported)
            .expect("store seedable");

        let updated = store
            .update_event(id, EventChange::AssignPath(2))
            .expect("path assignable");
        assert_eq!(updated.progress, EventProgress::PathAssigned { path: 2 });
        assert_eq!(store.event_count().expect("store readable"), 1);

        let conflict = store.update_event(id, EventChange::AssignPath(3));
        assert!(matches!(
            conflict,
            Err(StoreError::Conflict(LifecycleError::PathAlreadyAssigned))
        ));

        let completed_at = Utc.with_ymd_and_hms(2026, 3, 12, 8, 0, 0).unwrap();
        let updated = store
            .update_event(
                id,
                EventChange::Complete {
                    completed_path: 2,
                    completed_at,
                },
            )
            .expect("completable");
        assert!(updated.is_completed());
    }
}
