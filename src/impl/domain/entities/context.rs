use chrono::NaiveDate;

use super::{
    account::Account, document_type::DocumentType, period::Period, settings::Settings,
};

/// Read-only snapshot of everything an editing or generation operation needs
/// to look up: the active period, the chart of accounts, the document types
/// and the settings. Built once per operation from a storage session and
/// passed explicitly; there is no shared registry.
#[derive(Debug, Clone)]
pub struct LedgerContext {
    pub period: Period,
    pub settings: Settings,
    /// Chart of accounts, sorted by account number.
    pub accounts: Vec<Account>,
    pub document_types: Vec<DocumentType>,
    locked_months: Vec<String>,
}

impl LedgerContext {
    pub fn new(
        period: Period,
        settings: Settings,
        mut accounts: Vec<Account>,
        document_types: Vec<DocumentType>,
    ) -> Self {
        accounts.sort_by(|a, b| a.number.cmp(&b.number));
        let mut locked_months = settings.locked_months(period.id);
        locked_months.sort();
        Self {
            period,
            settings,
            accounts,
            document_types,
            locked_months,
        }
    }

    pub fn account_by_id(&self, id: i32) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn account_by_number(&self, number: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.number == number)
    }

    pub fn default_account(&self) -> Option<&Account> {
        self.account_by_id(self.settings.default_account_id()?)
    }

    /// The active document type, per the settings.
    pub fn active_document_type(&self) -> Option<&DocumentType> {
        let id = self.settings.document_type_id?;
        self.document_types.iter().find(|t| t.id == id)
    }

    /// Sequence-number range new documents are allocated from: the active
    /// document type's range, or the unrestricted range if none is active.
    pub fn active_number_range(&self) -> (i32, i32) {
        match self.active_document_type() {
            Some(t) => (t.number_start, t.number_end),
            None => (1, i32::MAX),
        }
    }

    pub fn document_type_for_number(&self, number: i32) -> Option<&DocumentType> {
        self.document_types.iter().find(|t| t.contains(number))
    }

    /// Whether documents dated in the given month may still be edited.
    pub fn is_month_editable(&self, date: NaiveDate) -> bool {
        let month = date.format("%Y-%m").to_string();
        self.locked_months.binary_search(&month).is_err()
    }
}
