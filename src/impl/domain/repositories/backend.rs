use fractic_server_error::ServerError;

use crate::entities::{Account, Document, DocumentType, Entry, Period, Settings};

/// Handle to a backing store. The single entry point is opening a session;
/// everything a backend must be able to do is on [`BackendSession`], so a new
/// backend implements exactly one trait.
pub trait DataSource: Send + Sync {
    fn open_session(&self) -> Result<Box<dyn BackendSession>, ServerError>;
}

/// One unit of work against the backing store.
///
/// Writes become visible to other sessions only at `commit`; `rollback`
/// discards them. Dropping a session without committing is equivalent to a
/// rollback. `save_document` and `save_entry` upsert: a record with id 0 is
/// inserted and its assigned id written back, a persisted record is updated
/// in place.
pub trait BackendSession: Send {
    fn commit(&mut self) -> Result<(), ServerError>;
    fn rollback(&mut self) -> Result<(), ServerError>;

    // Documents.
    // ---

    fn document(&mut self, id: i32) -> Result<Option<Document>, ServerError>;

    /// The document with the highest sequence number within the given range
    /// of the period, if any.
    fn last_document(
        &mut self,
        period_id: i32,
        number_start: i32,
        number_end: i32,
    ) -> Result<Option<Document>, ServerError>;

    fn document_by_number(
        &mut self,
        period_id: i32,
        number: i32,
    ) -> Result<Option<Document>, ServerError>;

    fn save_document(&mut self, document: &mut Document) -> Result<(), ServerError>;

    /// Deletes a document and its entries.
    fn delete_document(&mut self, id: i32) -> Result<(), ServerError>;

    // Entries.
    // ---

    /// Entries of one document, in row-number order.
    fn entries_by_document(&mut self, document_id: i32) -> Result<Vec<Entry>, ServerError>;

    /// Streams every entry of the period, in document-number order, to the
    /// callback. Used by the balance accumulation passes, which must not
    /// materialize a whole period.
    fn for_each_entry_in_period(
        &mut self,
        period_id: i32,
        callback: &mut dyn FnMut(&Entry),
    ) -> Result<(), ServerError>;

    fn save_entry(&mut self, entry: &mut Entry) -> Result<(), ServerError>;

    fn delete_entry(&mut self, id: i32) -> Result<(), ServerError>;

    // Chart of accounts, periods, document types, settings.
    // ---

    /// The chart of accounts, in account-number order.
    fn accounts(&mut self) -> Result<Vec<Account>, ServerError>;

    fn save_account(&mut self, account: &mut Account) -> Result<(), ServerError>;

    /// All fiscal periods, oldest first.
    fn periods(&mut self) -> Result<Vec<Period>, ServerError>;

    fn document_types(&mut self) -> Result<Vec<DocumentType>, ServerError>;

    fn settings(&mut self) -> Result<Settings, ServerError>;

    fn save_settings(&mut self, settings: &Settings) -> Result<(), ServerError>;
}
