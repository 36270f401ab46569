use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Local, Months, NaiveDate};
use fractic_server_error::ServerError;

use crate::{
    domain::{
        logic::editor::VoucherEditor,
        repositories::backend::{BackendSession, DataSource},
    },
    entities::{Document, Entry, LedgerContext},
    errors::{DocumentNotFound, NoEditableDate},
};

/// Validation failure that blocks a save. Not an error: the caller points the
/// user at the offending field and no persistence is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveBlock {
    PeriodLocked,
    DateOutsidePeriod,
    MonthLocked,
    /// Entry at the given row index has no account selected.
    MissingAccount { row: usize },
    /// Entry at the given row index has an account but no amount.
    MissingAmount { row: usize },
    /// Another document in the period already carries this number.
    NumberTaken { number: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Blocked(SaveBlock),
}

/// Result of checking a manually entered document number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberCheck {
    Free,
    Taken { document_id: i32 },
    OutsideRange { start: i32, end: i32 },
}

#[async_trait]
pub trait DocumentUsecase: Send + Sync {
    /// Opens a new, unsaved document: next free sequence number in the active
    /// range, dated like the latest document of that range (or today), with
    /// the date shifted forward out of locked months.
    async fn create_document(&self, ctx: &LedgerContext) -> Result<VoucherEditor, ServerError>;

    /// Loads a persisted document and its entries for editing.
    async fn open_document(&self, document_id: i32) -> Result<VoucherEditor, ServerError>;

    /// Validates and persists the edited document: pending deletions are
    /// flushed first, then every remaining entry is upserted, all in one
    /// transaction with the document row. On success the editor adopts the
    /// persisted ids and becomes clean; on a validation block nothing is
    /// written; on a storage failure the transaction is rolled back and the
    /// in-memory edits are left untouched.
    async fn save_document(
        &self,
        editor: &mut VoucherEditor,
        ctx: &LedgerContext,
    ) -> Result<SaveOutcome, ServerError>;

    /// Deletes the document and its entries. A document that was never saved
    /// is simply discarded.
    async fn delete_document(&self, editor: &VoucherEditor) -> Result<(), ServerError>;

    /// Checks a manually entered document number against the active range and
    /// the other documents of the period.
    async fn check_document_number(
        &self,
        editor: &VoucherEditor,
        ctx: &LedgerContext,
        number: i32,
    ) -> Result<NumberCheck, ServerError>;
}

pub struct DocumentUsecaseImpl<D: DataSource> {
    datasource: Arc<D>,
}

impl<D: DataSource> DocumentUsecaseImpl<D> {
    pub fn new(datasource: Arc<D>) -> Self {
        Self { datasource }
    }
}

#[async_trait]
impl<D: DataSource> DocumentUsecase for DocumentUsecaseImpl<D> {
    async fn create_document(&self, ctx: &LedgerContext) -> Result<VoucherEditor, ServerError> {
        let mut session = self.datasource.open_session()?;
        let document = allocate_document(&mut *session, ctx)?;
        Ok(VoucherEditor::new(document))
    }

    async fn open_document(&self, document_id: i32) -> Result<VoucherEditor, ServerError> {
        let mut session = self.datasource.open_session()?;
        let document = session
            .document(document_id)?
            .ok_or_else(|| DocumentNotFound::new(document_id))?;
        let entries = session.entries_by_document(document_id)?;
        Ok(VoucherEditor::load(document, entries))
    }

    async fn save_document(
        &self,
        editor: &mut VoucherEditor,
        ctx: &LedgerContext,
    ) -> Result<SaveOutcome, ServerError> {
        if ctx.period.locked {
            return Ok(SaveOutcome::Blocked(SaveBlock::PeriodLocked));
        }
        editor.remove_trailing_empty_entry();

        let date = editor.document().date;
        if !ctx.period.contains(date) {
            return Ok(SaveOutcome::Blocked(SaveBlock::DateOutsidePeriod));
        }
        if !ctx.is_month_editable(date) {
            return Ok(SaveOutcome::Blocked(SaveBlock::MonthLocked));
        }
        for (row, voucher_row) in editor.rows().enumerate() {
            if voucher_row.entry.account_id.is_none() {
                return Ok(SaveOutcome::Blocked(SaveBlock::MissingAccount { row }));
            }
            if voucher_row.entry.amount.is_zero() && voucher_row.gross_amount.is_zero() {
                return Ok(SaveOutcome::Blocked(SaveBlock::MissingAmount { row }));
            }
        }

        let mut session = self.datasource.open_session()?;
        let number = editor.document().number;
        if let Some(existing) = session.document_by_number(ctx.period.id, number)? {
            if existing.id != editor.document().id {
                return Ok(SaveOutcome::Blocked(SaveBlock::NumberTaken { number }));
            }
        }

        match persist(&mut *session, editor) {
            Ok((document, entries)) => {
                editor.committed(document, entries);
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                let _ = session.rollback();
                Err(e)
            }
        }
    }

    async fn delete_document(&self, editor: &VoucherEditor) -> Result<(), ServerError> {
        if !editor.document().is_persisted() {
            return Ok(());
        }
        let mut session = self.datasource.open_session()?;
        match session
            .delete_document(editor.document().id)
            .and_then(|_| session.commit())
        {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = session.rollback();
                Err(e)
            }
        }
    }

    async fn check_document_number(
        &self,
        editor: &VoucherEditor,
        ctx: &LedgerContext,
        number: i32,
    ) -> Result<NumberCheck, ServerError> {
        let (start, end) = ctx.active_number_range();
        if number < start || number > end {
            return Ok(NumberCheck::OutsideRange { start, end });
        }
        let mut session = self.datasource.open_session()?;
        if let Some(existing) = session.document_by_number(ctx.period.id, number)? {
            if existing.id != editor.document().id {
                return Ok(NumberCheck::Taken {
                    document_id: existing.id,
                });
            }
        }
        Ok(NumberCheck::Free)
    }
}

/// Builds the document a new voucher starts from: number = highest existing
/// number in the active range + 1, dated like that document; or the range
/// start dated today when the range is still empty. Number 0 stays reserved
/// for the opening-balance voucher. Also used by the settlement generator.
pub(crate) fn allocate_document(
    session: &mut dyn BackendSession,
    ctx: &LedgerContext,
) -> Result<Document, ServerError> {
    let (start, end) = ctx.active_number_range();
    let start = start.max(1);
    let (number, date) = match session.last_document(ctx.period.id, start, end)? {
        Some(last) => (last.number + 1, last.date),
        None => (start, Local::now().date_naive()),
    };
    let date = first_editable_date(ctx, date)?;
    Ok(Document::new(ctx.period.id, number, date))
}

/// Shifts a date forward, month by month, until it lands in a month that is
/// not locked.
fn first_editable_date(ctx: &LedgerContext, date: NaiveDate) -> Result<NaiveDate, ServerError> {
    let mut candidate = date;
    // A period never spans more than a few years of months.
    for _ in 0..120 {
        if ctx.is_month_editable(candidate) {
            return Ok(candidate);
        }
        candidate = candidate
            .with_day(1)
            .and_then(|d| d.checked_add_months(Months::new(1)))
            .ok_or_else(|| NoEditableDate::new(&date.to_string()))?;
    }
    Err(NoEditableDate::new(&date.to_string()))
}

fn persist(
    session: &mut dyn BackendSession,
    editor: &VoucherEditor,
) -> Result<(Document, Vec<Entry>), ServerError> {
    let mut document = editor.document().clone();
    session.save_document(&mut document)?;
    for id in editor.pending_deletions() {
        session.delete_entry(*id)?;
    }
    let mut entries: Vec<Entry> = editor.entries().to_vec();
    for entry in &mut entries {
        entry.document_id = document.id;
        session.save_entry(entry)?;
    }
    session.commit()?;
    Ok((document, entries))
}
