use std::collections::HashSet;

use chrono::NaiveDate;
use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    domain::logic::vat,
    entities::{AccountType, Document, Entry, EntryRole, LedgerContext, VatClass, VatTier},
};

/// One user-visible row of the open voucher: the primary entry plus the
/// tax-inclusive amount and tax portion shown next to it.
#[derive(Debug)]
pub struct VoucherRow<'a> {
    pub entry: &'a Entry,
    pub gross_amount: Decimal,
    pub vat_amount: Decimal,
}

/// In-memory editing state of one open voucher.
///
/// Owns the ordered entry list and keeps the synthesized VAT entries
/// consistent with the primary entries on every edit. Primary entries occupy
/// indices `0..entry_count()` of the entry list; their VAT entries follow.
/// The parallel `gross_amounts`/`vat_amounts` vectors are indexed like the
/// primary entries and hold what the user sees (primary amounts themselves
/// are stored net of tax).
///
/// Removing a persisted entry queues its id for deletion; the queue is
/// flushed by the lifecycle usecase at save time, before the remaining
/// entries are upserted.
pub struct VoucherEditor {
    document: Document,
    entries: Vec<Entry>,
    gross_amounts: Vec<Decimal>,
    vat_amounts: Vec<Decimal>,
    pending_deletions: HashSet<i32>,
    changed: bool,
}

impl VoucherEditor {
    /// Starts editing a fresh document with no entries.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            entries: Vec::new(),
            gross_amounts: Vec::new(),
            vat_amounts: Vec::new(),
            pending_deletions: HashSet::new(),
            changed: false,
        }
    }

    /// Starts editing a persisted document from its fetched entry list,
    /// reconstructing the gross/tax presentation values.
    pub fn load(document: Document, mut entries: Vec<Entry>) -> Self {
        entries.sort_by_key(|e| e.row_number);
        let mut editor = Self {
            document,
            entries,
            gross_amounts: Vec::new(),
            vat_amounts: Vec::new(),
            pending_deletions: HashSet::new(),
            changed: false,
        };
        editor.rebuild_presentation();
        editor
    }

    /// Replaces the entry list with a freshly fetched one, dropping all
    /// unsaved edits and pending deletions.
    pub fn reload(&mut self, mut entries: Vec<Entry>) {
        entries.sort_by_key(|e| e.row_number);
        self.entries = entries;
        self.pending_deletions.clear();
        self.changed = false;
        self.rebuild_presentation();
    }

    // Accessors.
    // ---

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.document.date = date;
        self.changed = true;
    }

    pub fn set_number(&mut self, number: i32) {
        self.document.number = number;
        self.changed = true;
    }

    /// Number of user-visible (primary) entries.
    pub fn entry_count(&self) -> usize {
        self.gross_amounts.len()
    }

    pub fn entry(&self, index: usize) -> &Entry {
        &self.entries[index]
    }

    /// Every entry of the document, synthesized VAT entries included.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn gross_amount(&self, index: usize) -> Decimal {
        self.gross_amounts[index]
    }

    pub fn vat_amount(&self, index: usize) -> Decimal {
        self.vat_amounts[index]
    }

    /// The user-visible rows, in order.
    pub fn rows(&self) -> impl Iterator<Item = VoucherRow<'_>> {
        self.entries[..self.entry_count()]
            .iter()
            .zip(self.gross_amounts.iter())
            .zip(self.vat_amounts.iter())
            .map(|((entry, gross), vat)| VoucherRow {
                entry,
                gross_amount: *gross,
                vat_amount: *vat,
            })
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn set_changed(&mut self) {
        self.changed = true;
    }

    pub(crate) fn pending_deletions(&self) -> &HashSet<i32> {
        &self.pending_deletions
    }

    // Editing operations.
    // ---

    /// Appends a new primary entry, copying the description forward from the
    /// previous row and auto-assigning the configured default account (never
    /// on the first row). Returns the new row index.
    pub fn add_entry(&mut self, ctx: &LedgerContext) -> Result<usize, ServerError> {
        let count = self.entry_count();
        let mut row_number = 0;
        let mut description = String::new();

        for entry in &self.entries[..count] {
            row_number = row_number.max(entry.row_number);
            description = entry.description.clone();
        }

        let entry = Entry {
            row_number: if count == 0 { 0 } else { row_number + 1 },
            description,
            ..Entry::default()
        };
        self.entries.insert(count, entry);
        self.gross_amounts.push(Decimal::ZERO);
        self.vat_amounts.push(Decimal::ZERO);
        self.changed = true;

        if count > 0 {
            if let Some(default_account_id) = ctx.default_account().map(|a| a.id) {
                self.set_account(count, Some(default_account_id), ctx)?;
            }
        }
        Ok(count)
    }

    /// Removes the primary entry at `index` together with its VAT entries.
    /// Persisted entries are queued for deletion at the next save.
    pub fn remove_entry(&mut self, index: usize) {
        let entry = self.entries.remove(index);
        if entry.is_persisted() {
            self.pending_deletions.insert(entry.id);
        }
        self.gross_amounts.remove(index);
        self.vat_amounts.remove(index);
        for tier in VatTier::ALL {
            self.remove_vat_entry(entry.row_number, tier);
        }
        self.changed = true;
    }

    /// Sets the account of the primary entry at `index` and re-derives its
    /// VAT entries. If no amount has been entered yet, the entry direction
    /// defaults to the account's natural side (credit for revenue, debit for
    /// expense, otherwise whichever offsets the document's current
    /// debit/credit imbalance) and the amount is seeded from that imbalance.
    pub fn set_account(
        &mut self,
        index: usize,
        account_id: Option<i32>,
        ctx: &LedgerContext,
    ) -> Result<(), ServerError> {
        self.entries[index].account_id = account_id;
        let account = account_id.and_then(|id| ctx.account_by_id(id));
        let mut amount = self.gross_amounts[index];

        if let Some(account) = account {
            if amount.is_zero() {
                let diff = self.debit_credit_difference();
                let debit = match account.account_type {
                    AccountType::Revenue => false,
                    AccountType::Expense => true,
                    _ => !(diff > Decimal::ZERO),
                };
                self.entries[index].debit = debit;

                if debit && diff < Decimal::ZERO {
                    amount = diff.abs();
                } else if !debit && diff > Decimal::ZERO {
                    amount = diff;
                }
            } else {
                match account.account_type {
                    AccountType::Revenue => self.entries[index].debit = false,
                    AccountType::Expense => self.entries[index].debit = true,
                    _ => {}
                }
            }
        }

        self.set_gross_amount(index, amount, true, ctx)
    }

    /// Stores the tax-inclusive amount of the primary entry at `index`.
    /// With `apply_vat`, the net amount and the VAT entries are re-derived
    /// from the account's VAT class; without it (and for accounts with no
    /// counter-account configured) the amount passes through unchanged and
    /// all VAT entries are removed.
    pub fn set_gross_amount(
        &mut self,
        index: usize,
        amount: Decimal,
        apply_vat: bool,
        ctx: &LedgerContext,
    ) -> Result<(), ServerError> {
        let primary_row = self.entries[index].row_number;
        let debit = self.entries[index].debit;
        let account = self.entries[index]
            .account_id
            .and_then(|id| ctx.account_by_id(id))
            .cloned();

        let (net_amount, vat_amount) = match account {
            Some(account) if apply_vat => match account.vat_class() {
                VatClass::ReverseCharge => {
                    // The entered amount is the tax base; the self-assessed
                    // tax is posted twice, cancelling out in the ledger total.
                    let percent = vat::rate_to_percent(account.vat_rate)?;
                    let tax = vat::add_vat(percent, amount);
                    self.remove_vat_entry(primary_row, VatTier::Extracted);
                    self.update_vat_entry(
                        primary_row,
                        account.vat_account1_id,
                        tax,
                        debit,
                        VatTier::SelfAssessed,
                    );
                    self.update_vat_entry(
                        primary_row,
                        account.vat_account2_id,
                        tax,
                        !debit,
                        VatTier::SelfAssessedOffset,
                    );
                    (amount, tax)
                }
                VatClass::Normal => {
                    let percent = vat::rate_to_percent(account.vat_rate)?;
                    let tax = vat::subtract_vat(percent, amount);
                    self.update_vat_entry(
                        primary_row,
                        account.vat_account1_id,
                        tax,
                        debit,
                        VatTier::Extracted,
                    );
                    self.remove_vat_entry(primary_row, VatTier::SelfAssessed);
                    self.remove_vat_entry(primary_row, VatTier::SelfAssessedOffset);
                    (amount - tax, tax)
                }
                VatClass::PassThrough => {
                    self.remove_all_vat_entries(primary_row);
                    (amount, Decimal::ZERO)
                }
            },
            _ => {
                self.remove_all_vat_entries(primary_row);
                (amount, Decimal::ZERO)
            }
        };

        self.entries[index].amount = net_amount;
        self.gross_amounts[index] = amount;
        self.vat_amounts[index] = vat_amount;
        self.changed = true;
        Ok(())
    }

    /// Overrides the tax figure of the primary entry at `index` (the user
    /// corrects a rounding difference against a paper invoice). The amount is
    /// normalized to non-negative. For normal taxable accounts the net
    /// becomes gross minus tax; for reverse-charge accounts only the two
    /// self-assessed entries change. While no account is selected the figure
    /// is kept (still netted out of the gross) so it survives until the
    /// account is picked; an account without a counter-account zeroes it.
    pub fn set_vat_amount(
        &mut self,
        index: usize,
        amount: Decimal,
        ctx: &LedgerContext,
    ) -> Result<(), ServerError> {
        let vat_amount = amount.abs();
        let primary_row = self.entries[index].row_number;
        let debit = self.entries[index].debit;
        let account = self.entries[index]
            .account_id
            .and_then(|id| ctx.account_by_id(id))
            .cloned();

        match account.map(|a| (a.vat_class(), a)) {
            Some((VatClass::ReverseCharge, account)) => {
                self.remove_vat_entry(primary_row, VatTier::Extracted);
                self.update_vat_entry(
                    primary_row,
                    account.vat_account1_id,
                    vat_amount,
                    debit,
                    VatTier::SelfAssessed,
                );
                self.update_vat_entry(
                    primary_row,
                    account.vat_account2_id,
                    vat_amount,
                    !debit,
                    VatTier::SelfAssessedOffset,
                );
                self.vat_amounts[index] = vat_amount;
            }
            Some((VatClass::Normal, account)) => {
                self.update_vat_entry(
                    primary_row,
                    account.vat_account1_id,
                    vat_amount,
                    debit,
                    VatTier::Extracted,
                );
                self.remove_vat_entry(primary_row, VatTier::SelfAssessed);
                self.remove_vat_entry(primary_row, VatTier::SelfAssessedOffset);
                self.entries[index].amount = self.gross_amounts[index] - vat_amount;
                self.vat_amounts[index] = vat_amount;
            }
            Some((VatClass::PassThrough, _)) => {
                self.remove_all_vat_entries(primary_row);
                self.entries[index].amount = self.gross_amounts[index];
                self.vat_amounts[index] = Decimal::ZERO;
            }
            None => {
                self.remove_all_vat_entries(primary_row);
                self.entries[index].amount = self.gross_amounts[index] - vat_amount;
                self.vat_amounts[index] = vat_amount;
            }
        }
        self.changed = true;
        Ok(())
    }

    /// Flips the direction of the primary entry at `index` and re-derives its
    /// VAT entries (their directions follow the primary's).
    pub fn set_debit(
        &mut self,
        index: usize,
        debit: bool,
        ctx: &LedgerContext,
    ) -> Result<(), ServerError> {
        self.entries[index].debit = debit;
        let gross = self.gross_amounts[index];
        self.set_gross_amount(index, gross, true, ctx)
    }

    pub fn set_description(&mut self, index: usize, description: impl Into<String>) {
        self.entries[index].description = description.into();
        self.changed = true;
    }

    /// Drops the last row if it is an unused remnant of rapid entry: no
    /// account or a zero amount, and a description merely copied forward from
    /// the previous row. Called by the lifecycle usecase right before
    /// validation.
    pub fn remove_trailing_empty_entry(&mut self) {
        let count = self.entry_count();
        if count == 0 {
            return;
        }
        let prev_description = if count >= 2 {
            self.entries[count - 2].description.clone()
        } else {
            String::new()
        };
        let last = &self.entries[count - 1];
        if (last.account_id.is_none() || last.amount.is_zero())
            && last.description == prev_description
        {
            self.remove_entry(count - 1);
        }
    }

    /// Debit total minus credit total over the user-visible rows, gross
    /// amounts included.
    pub fn debit_credit_difference(&self) -> Decimal {
        let mut diff = Decimal::ZERO;
        for (entry, gross) in self.entries[..self.entry_count()]
            .iter()
            .zip(self.gross_amounts.iter())
        {
            if entry.debit {
                diff += *gross;
            } else {
                diff -= *gross;
            }
        }
        diff
    }

    // Generator support.
    // ---

    /// Appends an already-complete primary entry (used by the settlement and
    /// opening-balance generators).
    pub(crate) fn append_generated(&mut self, entry: Entry) {
        let index = self.entry_count();
        self.gross_amounts.push(entry.amount);
        self.vat_amounts.push(Decimal::ZERO);
        self.entries.insert(index, entry);
        self.changed = true;
    }

    /// Called by the lifecycle usecase after a successful commit: adopts the
    /// persisted ids and clears the dirty state.
    pub(crate) fn committed(&mut self, document: Document, entries: Vec<Entry>) {
        self.document = document;
        self.entries = entries;
        self.pending_deletions.clear();
        self.changed = false;
    }

    // VAT entry maintenance.
    // ---

    fn find_vat_entry(&self, primary_row: i32, tier: VatTier) -> Option<&Entry> {
        let row = EntryRole::Vat { primary_row, tier }.row_number();
        self.entries.iter().find(|e| e.row_number == row)
    }

    /// Creates or updates the VAT entry of the given tier. A zero amount or a
    /// missing counter-account removes the entry instead.
    fn update_vat_entry(
        &mut self,
        primary_row: i32,
        account_id: Option<i32>,
        amount: Decimal,
        debit: bool,
        tier: VatTier,
    ) {
        let Some(account_id) = account_id else {
            self.remove_vat_entry(primary_row, tier);
            return;
        };
        if amount.is_zero() {
            self.remove_vat_entry(primary_row, tier);
            return;
        }

        let row = EntryRole::Vat { primary_row, tier }.row_number();
        if !self.entries.iter().any(|e| e.row_number == row) {
            self.entries.push(Entry {
                row_number: row,
                ..Entry::default()
            });
        }
        // Unwrap-free update: the entry exists now by construction.
        for entry in &mut self.entries {
            if entry.row_number == row {
                entry.account_id = Some(account_id);
                entry.debit = debit;
                entry.amount = amount;
                entry.description.clear();
            }
        }
    }

    fn remove_vat_entry(&mut self, primary_row: i32, tier: VatTier) {
        let row = EntryRole::Vat { primary_row, tier }.row_number();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].row_number == row {
                let entry = self.entries.remove(i);
                if entry.is_persisted() {
                    self.pending_deletions.insert(entry.id);
                }
            } else {
                i += 1;
            }
        }
    }

    fn remove_all_vat_entries(&mut self, primary_row: i32) {
        for tier in VatTier::ALL {
            self.remove_vat_entry(primary_row, tier);
        }
    }

    /// Rebuilds the gross/tax presentation values from the entry list: the
    /// extracted tax is added back onto the net amount for the gross figure,
    /// and the displayed tax comes from the extracted-tax entry, or else from
    /// the self-assessed one (which does not change the gross total but
    /// communicates the computed tax).
    fn rebuild_presentation(&mut self) {
        self.gross_amounts.clear();
        self.vat_amounts.clear();

        let primaries: Vec<(i32, Decimal)> = self
            .entries
            .iter()
            .filter(|e| e.is_primary())
            .map(|e| (e.row_number, e.amount))
            .collect();

        for (row, net) in primaries {
            let mut gross = net;
            let mut vat = Decimal::ZERO;
            if let Some(extracted) = self.find_vat_entry(row, VatTier::Extracted) {
                vat = extracted.amount;
                gross += extracted.amount;
            } else if let Some(self_assessed) = self.find_vat_entry(row, VatTier::SelfAssessed) {
                vat = self_assessed.amount;
            }
            self.gross_amounts.push(gross);
            self.vat_amounts.push(vat);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::entities::{Account, Period, Settings, VatCode};

    const RATE_24_PERCENT: u32 = 8;

    fn account(
        id: i32,
        number: &str,
        account_type: AccountType,
        vat_code: VatCode,
        vat_rate: u32,
        vat_account1_id: Option<i32>,
        vat_account2_id: Option<i32>,
    ) -> Account {
        Account {
            id,
            number: number.to_string(),
            name: format!("Account {}", number),
            account_type,
            vat_code,
            vat_rate,
            vat_account1_id,
            vat_account2_id,
            flags: 0,
        }
    }

    fn context(accounts: Vec<Account>) -> LedgerContext {
        let period = Period {
            id: 1,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            locked: false,
        };
        LedgerContext::new(period, Settings::default(), accounts, vec![])
    }

    /// A101: expense account, taxable purchase at 24 %, counter-account A201.
    /// A301/A302: reverse-charge counter-accounts.
    fn test_context() -> LedgerContext {
        context(vec![
            account(
                101,
                "A101",
                AccountType::Expense,
                VatCode::TaxablePurchase,
                RATE_24_PERCENT,
                Some(201),
                None,
            ),
            account(201, "A201", AccountType::Asset, VatCode::InputVat, 0, None, None),
            account(
                102,
                "A102",
                AccountType::Expense,
                VatCode::IntraCommunityPurchase,
                RATE_24_PERCENT,
                Some(301),
                Some(302),
            ),
            account(301, "A301", AccountType::Liability, VatCode::OutputVat, 0, None, None),
            account(302, "A302", AccountType::Asset, VatCode::InputVat, 0, None, None),
            account(401, "A401", AccountType::Revenue, VatCode::None, 0, None, None),
            account(501, "A501", AccountType::Asset, VatCode::None, 0, None, None),
        ])
    }

    fn editor() -> VoucherEditor {
        VoucherEditor::new(Document::new(
            1,
            1,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        ))
    }

    fn vat_entry(editor: &VoucherEditor, primary_row: i32, tier: VatTier) -> Option<&Entry> {
        let row = EntryRole::Vat { primary_row, tier }.row_number();
        editor.entries().iter().find(|e| e.row_number == row)
    }

    #[test]
    fn taxable_purchase_extracts_tax_onto_counter_account() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(101), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(124.00), true, &ctx).unwrap();

        // Net on the expense account, tax on the counter-account, same
        // direction, no self-assessed entries.
        assert_eq!(editor.entry(0).amount, dec!(100.00));
        assert!(editor.entry(0).debit);
        assert_eq!(editor.gross_amount(0), dec!(124.00));
        assert_eq!(editor.vat_amount(0), dec!(24.00));

        let tax = vat_entry(&editor, 0, VatTier::Extracted).expect("tier-1 entry");
        assert_eq!(tax.account_id, Some(201));
        assert_eq!(tax.amount, dec!(24.00));
        assert!(tax.debit);
        assert!(vat_entry(&editor, 0, VatTier::SelfAssessed).is_none());
        assert!(vat_entry(&editor, 0, VatTier::SelfAssessedOffset).is_none());
    }

    #[test]
    fn reverse_charge_posts_two_offsetting_tax_entries() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(102), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(100.00), true, &ctx).unwrap();

        // The entered amount is the tax base, unchanged.
        assert_eq!(editor.entry(0).amount, dec!(100.00));
        assert_eq!(editor.gross_amount(0), dec!(100.00));
        assert_eq!(editor.vat_amount(0), dec!(24.00));

        let payable = vat_entry(&editor, 0, VatTier::SelfAssessed).expect("tier-2 entry");
        let deductible =
            vat_entry(&editor, 0, VatTier::SelfAssessedOffset).expect("tier-3 entry");
        assert_eq!(payable.account_id, Some(301));
        assert_eq!(deductible.account_id, Some(302));
        assert_eq!(payable.amount, dec!(24.00));
        assert_eq!(deductible.amount, dec!(24.00));
        assert_eq!(payable.debit, editor.entry(0).debit);
        assert_eq!(deductible.debit, !editor.entry(0).debit);
        assert!(vat_entry(&editor, 0, VatTier::Extracted).is_none());
    }

    #[test]
    fn switching_account_class_replaces_tax_entries() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(101), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(124.00), true, &ctx).unwrap();
        assert!(vat_entry(&editor, 0, VatTier::Extracted).is_some());

        // Reconfigure to the reverse-charge account and re-enter the amount.
        editor.set_account(0, Some(102), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(100.00), true, &ctx).unwrap();

        assert!(vat_entry(&editor, 0, VatTier::Extracted).is_none());
        assert!(vat_entry(&editor, 0, VatTier::SelfAssessed).is_some());
        assert!(vat_entry(&editor, 0, VatTier::SelfAssessedOffset).is_some());
        assert_eq!(editor.entry(0).amount, dec!(100.00));
    }

    #[test]
    fn switching_to_untaxed_account_drops_tax_entries() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(101), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(124.00), true, &ctx).unwrap();

        editor.set_account(0, Some(501), &ctx).unwrap();

        assert_eq!(editor.entries().len(), 1);
        assert_eq!(editor.entry(0).amount, dec!(124.00));
        assert_eq!(editor.vat_amount(0), dec!(0.00));
    }

    #[test]
    fn tier_invariant_after_random_edits() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(101), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(124.00), true, &ctx).unwrap();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(1, Some(102), &ctx).unwrap();
        editor.set_gross_amount(1, dec!(50.00), true, &ctx).unwrap();
        editor.set_vat_amount(0, dec!(23.99), &ctx).unwrap();
        editor.set_debit(1, false, &ctx).unwrap();
        editor.add_entry(&ctx).unwrap();
        editor.remove_entry(0);

        let primary_rows: Vec<i32> = editor
            .entries()
            .iter()
            .filter(|e| e.is_primary())
            .map(|e| e.row_number)
            .collect();
        let mut seen = HashSet::new();
        for entry in editor.entries().iter().filter(|e| !e.is_primary()) {
            let EntryRole::Vat { primary_row, tier } = entry.role() else {
                panic!("non-primary entry without VAT role");
            };
            assert!(
                primary_rows.contains(&primary_row),
                "tax entry {} points at a dead primary",
                entry.row_number
            );
            assert!(
                seen.insert((primary_row, tier as i32)),
                "duplicate tax entry for ({}, {:?})",
                primary_row,
                tier
            );
        }
    }

    #[test]
    fn removing_entry_cascades_to_tax_entries() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(102), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(100.00), true, &ctx).unwrap();
        assert_eq!(editor.entries().len(), 3);

        editor.remove_entry(0);
        assert!(editor.entries().is_empty());
    }

    #[test]
    fn removing_persisted_entry_queues_deletions() {
        let mut entries = vec![
            Entry {
                id: 11,
                account_id: Some(101),
                debit: true,
                amount: dec!(100.00),
                row_number: 0,
                ..Entry::default()
            },
            Entry {
                id: 12,
                account_id: Some(201),
                debit: true,
                amount: dec!(24.00),
                row_number: crate::entities::TIER_SPAN,
                ..Entry::default()
            },
        ];
        entries[0].document_id = 5;
        entries[1].document_id = 5;
        let mut editor = VoucherEditor::load(
            Document {
                id: 5,
                number: 3,
                period_id: 1,
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            },
            entries,
        );

        editor.remove_entry(0);
        assert_eq!(editor.pending_deletions(), &HashSet::from([11, 12]));
    }

    #[test]
    fn direction_defaults_offset_the_imbalance() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(501), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(80.00), true, &ctx).unwrap();
        assert!(editor.entry(0).debit);

        // Second row: revenue account defaults to credit and is seeded with
        // the open debit imbalance.
        editor.add_entry(&ctx).unwrap();
        editor.set_account(1, Some(401), &ctx).unwrap();
        assert!(!editor.entry(1).debit);
        assert_eq!(editor.gross_amount(1), dec!(80.00));
        assert_eq!(editor.debit_credit_difference(), dec!(0.00));
    }

    #[test]
    fn new_entry_copies_description_forward() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_description(0, "Office supplies");
        editor.add_entry(&ctx).unwrap();

        assert_eq!(editor.entry(1).description, "Office supplies");
        assert_eq!(editor.entry(1).row_number, 1);
    }

    #[test]
    fn trailing_empty_entry_is_dropped() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(501), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(10.00), true, &ctx).unwrap();
        editor.set_description(0, "Cash");
        editor.add_entry(&ctx).unwrap();

        editor.remove_trailing_empty_entry();
        assert_eq!(editor.entry_count(), 1);

        // A row with its own description survives.
        editor.add_entry(&ctx).unwrap();
        editor.set_description(1, "Something else");
        editor.remove_trailing_empty_entry();
        assert_eq!(editor.entry_count(), 2);
    }

    #[test]
    fn editing_vat_amount_directly_recomputes_net() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(101), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(124.00), true, &ctx).unwrap();

        editor.set_vat_amount(0, dec!(-23.50), &ctx).unwrap();

        // Normalized to non-negative; net = gross - tax.
        assert_eq!(editor.vat_amount(0), dec!(23.50));
        assert_eq!(editor.entry(0).amount, dec!(100.50));
        let tax = vat_entry(&editor, 0, VatTier::Extracted).expect("tier-1 entry");
        assert_eq!(tax.amount, dec!(23.50));
    }

    #[test]
    fn editing_vat_amount_on_reverse_charge_keeps_net() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(102), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(100.00), true, &ctx).unwrap();

        editor.set_vat_amount(0, dec!(25.00), &ctx).unwrap();

        assert_eq!(editor.entry(0).amount, dec!(100.00));
        assert_eq!(
            vat_entry(&editor, 0, VatTier::SelfAssessed).map(|e| e.amount),
            Some(dec!(25.00))
        );
        assert_eq!(
            vat_entry(&editor, 0, VatTier::SelfAssessedOffset).map(|e| e.amount),
            Some(dec!(25.00))
        );
    }

    #[test]
    fn counter_account_alone_enables_extraction() {
        // Tax-free sale code, but a counter-account is configured: the tax
        // is extracted like on any taxable account.
        let ctx = context(vec![
            account(
                601,
                "A601",
                AccountType::Revenue,
                VatCode::TaxFreeSale,
                RATE_24_PERCENT,
                Some(201),
                None,
            ),
            account(201, "A201", AccountType::Asset, VatCode::InputVat, 0, None, None),
        ]);
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_account(0, Some(601), &ctx).unwrap();
        editor.set_gross_amount(0, dec!(124.00), true, &ctx).unwrap();

        assert_eq!(editor.entry(0).amount, dec!(100.00));
        assert_eq!(editor.vat_amount(0), dec!(24.00));
        let tax = vat_entry(&editor, 0, VatTier::Extracted).expect("tier-1 entry");
        assert_eq!(tax.account_id, Some(201));
        assert_eq!(tax.amount, dec!(24.00));
    }

    #[test]
    fn vat_figure_survives_until_an_account_is_picked() {
        let ctx = test_context();
        let mut editor = editor();
        editor.add_entry(&ctx).unwrap();
        editor.set_gross_amount(0, dec!(124.00), true, &ctx).unwrap();
        editor.set_vat_amount(0, dec!(24.00), &ctx).unwrap();

        // No account yet: the figure stays and is netted out of the gross,
        // but no tax entries exist.
        assert_eq!(editor.vat_amount(0), dec!(24.00));
        assert_eq!(editor.entry(0).amount, dec!(100.00));
        assert_eq!(editor.entries().len(), 1);

        // An account with no counter-account zeroes it back out.
        editor.set_account(0, Some(501), &ctx).unwrap();
        editor.set_vat_amount(0, dec!(10.00), &ctx).unwrap();
        assert_eq!(editor.vat_amount(0), dec!(0.00));
        assert_eq!(editor.entry(0).amount, dec!(124.00));
    }

    #[test]
    fn load_reconstructs_gross_and_tax() {
        let document = Document {
            id: 7,
            number: 4,
            period_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        };
        let entries = vec![
            Entry {
                id: 21,
                document_id: 7,
                account_id: Some(101),
                debit: true,
                amount: dec!(100.00),
                row_number: 0,
                ..Entry::default()
            },
            Entry {
                id: 22,
                document_id: 7,
                account_id: Some(201),
                debit: true,
                amount: dec!(24.00),
                row_number: crate::entities::TIER_SPAN,
                ..Entry::default()
            },
            Entry {
                id: 23,
                document_id: 7,
                account_id: Some(102),
                debit: true,
                amount: dec!(50.00),
                row_number: 1,
                ..Entry::default()
            },
            Entry {
                id: 24,
                document_id: 7,
                account_id: Some(301),
                debit: true,
                amount: dec!(12.00),
                row_number: 1 + 2 * crate::entities::TIER_SPAN,
                ..Entry::default()
            },
            Entry {
                id: 25,
                document_id: 7,
                account_id: Some(302),
                debit: false,
                amount: dec!(12.00),
                row_number: 1 + 3 * crate::entities::TIER_SPAN,
                ..Entry::default()
            },
        ];

        let editor = VoucherEditor::load(document, entries);

        assert_eq!(editor.entry_count(), 2);
        // Extracted tax is added back for the gross figure.
        assert_eq!(editor.gross_amount(0), dec!(124.00));
        assert_eq!(editor.vat_amount(0), dec!(24.00));
        // Self-assessed tax shows in the tax column but not in the gross.
        assert_eq!(editor.gross_amount(1), dec!(50.00));
        assert_eq!(editor.vat_amount(1), dec!(12.00));
        assert!(!editor.is_changed());
    }
}
