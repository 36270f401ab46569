use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use fractic_server_error::ServerError;

use crate::{
    domain::repositories::backend::{BackendSession, DataSource},
    entities::{Account, Document, DocumentType, Entry, Period, Settings},
    errors::{OrphanedEntry, StoreLockPoisoned},
};

/// In-memory reference backend.
///
/// Holds the whole bookkeeping in a mutex-guarded store. A session clones the
/// store on open and works on the copy; commit publishes the copy back,
/// rollback re-clones the shared state. That gives the same
/// all-writes-or-none contract a transactional database backend provides,
/// which the lifecycle usecases rely on.
#[derive(Clone, Default)]
pub struct MemoryDataSource {
    store: Arc<Mutex<Store>>,
}

#[derive(Clone, Default)]
struct Store {
    accounts: BTreeMap<i32, Account>,
    periods: BTreeMap<i32, Period>,
    document_types: BTreeMap<i32, DocumentType>,
    documents: BTreeMap<i32, Document>,
    entries: BTreeMap<i32, Entry>,
    settings: Settings,
    next_id: i32,
}

impl Store {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, ServerError> {
        self.store
            .lock()
            .map_err(|e| StoreLockPoisoned::with_debug(&e))
    }

    // Seeding. The session trait covers everything the engine itself writes;
    // periods and document types are set up out of band, so the reference
    // backend takes them directly.
    // ---

    /// Inserts a fiscal period, assigning an id if the given one is 0.
    pub fn insert_period(&self, mut period: Period) -> Result<Period, ServerError> {
        let mut store = self.lock()?;
        if period.id == 0 {
            period.id = store.allocate_id();
        }
        store.periods.insert(period.id, period.clone());
        Ok(period)
    }

    /// Inserts a chart-of-accounts row, assigning an id if the given one
    /// is 0.
    pub fn insert_account(&self, mut account: Account) -> Result<Account, ServerError> {
        let mut store = self.lock()?;
        if account.id == 0 {
            account.id = store.allocate_id();
        }
        store.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    /// Inserts a document type, assigning an id if the given one is 0.
    pub fn insert_document_type(
        &self,
        mut document_type: DocumentType,
    ) -> Result<DocumentType, ServerError> {
        let mut store = self.lock()?;
        if document_type.id == 0 {
            document_type.id = store.allocate_id();
        }
        store
            .document_types
            .insert(document_type.id, document_type.clone());
        Ok(document_type)
    }

    pub fn set_settings(&self, settings: Settings) -> Result<(), ServerError> {
        self.lock()?.settings = settings;
        Ok(())
    }
}

impl DataSource for MemoryDataSource {
    fn open_session(&self) -> Result<Box<dyn BackendSession>, ServerError> {
        let work = self.lock()?.clone();
        Ok(Box::new(MemorySession {
            shared: Arc::clone(&self.store),
            work,
        }))
    }
}

struct MemorySession {
    shared: Arc<Mutex<Store>>,
    work: Store,
}

impl MemorySession {
    fn shared(&self) -> Result<MutexGuard<'_, Store>, ServerError> {
        self.shared
            .lock()
            .map_err(|e| StoreLockPoisoned::with_debug(&e))
    }
}

impl BackendSession for MemorySession {
    fn commit(&mut self) -> Result<(), ServerError> {
        *self.shared()? = self.work.clone();
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), ServerError> {
        let snapshot = self.shared()?.clone();
        self.work = snapshot;
        Ok(())
    }

    fn document(&mut self, id: i32) -> Result<Option<Document>, ServerError> {
        Ok(self.work.documents.get(&id).cloned())
    }

    fn last_document(
        &mut self,
        period_id: i32,
        number_start: i32,
        number_end: i32,
    ) -> Result<Option<Document>, ServerError> {
        Ok(self
            .work
            .documents
            .values()
            .filter(|d| {
                d.period_id == period_id
                    && d.number >= number_start
                    && d.number <= number_end
            })
            .max_by_key(|d| d.number)
            .cloned())
    }

    fn document_by_number(
        &mut self,
        period_id: i32,
        number: i32,
    ) -> Result<Option<Document>, ServerError> {
        Ok(self
            .work
            .documents
            .values()
            .find(|d| d.period_id == period_id && d.number == number)
            .cloned())
    }

    fn save_document(&mut self, document: &mut Document) -> Result<(), ServerError> {
        if document.id == 0 {
            document.id = self.work.allocate_id();
        }
        self.work.documents.insert(document.id, document.clone());
        Ok(())
    }

    fn delete_document(&mut self, id: i32) -> Result<(), ServerError> {
        self.work.documents.remove(&id);
        self.work.entries.retain(|_, e| e.document_id != id);
        Ok(())
    }

    fn entries_by_document(&mut self, document_id: i32) -> Result<Vec<Entry>, ServerError> {
        let mut entries: Vec<Entry> = self
            .work
            .entries
            .values()
            .filter(|e| e.document_id == document_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.row_number);
        Ok(entries)
    }

    fn for_each_entry_in_period(
        &mut self,
        period_id: i32,
        callback: &mut dyn FnMut(&Entry),
    ) -> Result<(), ServerError> {
        let mut documents: Vec<&Document> = self
            .work
            .documents
            .values()
            .filter(|d| d.period_id == period_id)
            .collect();
        documents.sort_by_key(|d| d.number);

        for document in documents {
            let mut entries: Vec<&Entry> = self
                .work
                .entries
                .values()
                .filter(|e| e.document_id == document.id)
                .collect();
            entries.sort_by_key(|e| e.row_number);
            for entry in entries {
                callback(entry);
            }
        }
        Ok(())
    }

    fn save_entry(&mut self, entry: &mut Entry) -> Result<(), ServerError> {
        if !self.work.documents.contains_key(&entry.document_id) {
            return Err(OrphanedEntry::new(entry.id, entry.document_id));
        }
        if entry.id == 0 {
            entry.id = self.work.allocate_id();
        }
        self.work.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    fn delete_entry(&mut self, id: i32) -> Result<(), ServerError> {
        self.work.entries.remove(&id);
        Ok(())
    }

    fn accounts(&mut self) -> Result<Vec<Account>, ServerError> {
        let mut accounts: Vec<Account> = self.work.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(accounts)
    }

    fn save_account(&mut self, account: &mut Account) -> Result<(), ServerError> {
        if account.id == 0 {
            account.id = self.work.allocate_id();
        }
        self.work.accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn periods(&mut self) -> Result<Vec<Period>, ServerError> {
        let mut periods: Vec<Period> = self.work.periods.values().cloned().collect();
        periods.sort_by_key(|p| p.start_date);
        Ok(periods)
    }

    fn document_types(&mut self) -> Result<Vec<DocumentType>, ServerError> {
        let mut types: Vec<DocumentType> = self.work.document_types.values().cloned().collect();
        types.sort_by_key(|t| t.number);
        Ok(types)
    }

    fn settings(&mut self) -> Result<Settings, ServerError> {
        Ok(self.work.settings.clone())
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), ServerError> {
        self.work.settings = settings.clone();
        Ok(())
    }
}
