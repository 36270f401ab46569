use std::sync::Arc;

use async_trait::async_trait;
use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    domain::{
        logic::{balances::AccountBalances, editor::VoucherEditor},
        repositories::backend::DataSource,
    },
    entities::{AccountType, Document, Entry, LedgerContext},
};

#[async_trait]
pub trait OpeningBalanceUsecase: Send + Sync {
    /// Generates the period's opening-balance voucher from the closing
    /// balances of the previous fiscal period: one entry per balance-sheet
    /// account with a non-zero balance, with the previous period's profit
    /// rolled into the retained-earnings account. The voucher is document
    /// number 0, dated the period's start.
    ///
    /// Returns `None` when there is no previous period to carry forward
    /// from. If the period already has an opening-balance voucher, its
    /// entries are replaced.
    async fn create_opening_balance_voucher(
        &self,
        ctx: &LedgerContext,
    ) -> Result<Option<VoucherEditor>, ServerError>;
}

pub struct OpeningBalanceUsecaseImpl<D: DataSource> {
    datasource: Arc<D>,
}

impl<D: DataSource> OpeningBalanceUsecaseImpl<D> {
    pub fn new(datasource: Arc<D>) -> Self {
        Self { datasource }
    }
}

#[async_trait]
impl<D: DataSource> OpeningBalanceUsecase for OpeningBalanceUsecaseImpl<D> {
    async fn create_opening_balance_voucher(
        &self,
        ctx: &LedgerContext,
    ) -> Result<Option<VoucherEditor>, ServerError> {
        let mut session = self.datasource.open_session()?;

        let previous_period = session
            .periods()?
            .into_iter()
            .filter(|p| p.start_date < ctx.period.start_date)
            .max_by_key(|p| p.start_date);
        let Some(previous_period) = previous_period else {
            return Ok(None);
        };

        let mut balances = AccountBalances::new(&ctx.accounts);
        session.for_each_entry_in_period(previous_period.id, &mut |entry| {
            balances.add_entry(entry);
        })?;

        // Reuse the existing opening-balance voucher if the period already
        // has one, replacing its entries.
        let mut editor = match session.document_by_number(ctx.period.id, 0)? {
            Some(document) => {
                let entries = session.entries_by_document(document.id)?;
                let mut editor = VoucherEditor::load(document, entries);
                while editor.entry_count() > 0 {
                    editor.remove_entry(0);
                }
                editor.set_date(ctx.period.start_date);
                editor
            }
            None => VoucherEditor::new(Document::new(
                ctx.period.id,
                0,
                ctx.period.start_date,
            )),
        };

        let mut row = 0;
        for account in &ctx.accounts {
            if !account.account_type.is_balance_sheet() {
                continue;
            }
            let mut balance = balances.balance(account.id).unwrap_or(Decimal::ZERO);
            if account.account_type == AccountType::ProfitPrevPeriods {
                balance += balances.profit();
            }
            if balance.is_zero() {
                continue;
            }

            // Assets carry over on the debit side, everything else on the
            // credit side; a negative balance flips that.
            let debit = match account.account_type {
                AccountType::Asset => balance > Decimal::ZERO,
                _ => balance < Decimal::ZERO,
            };
            editor.append_generated(Entry {
                account_id: Some(account.id),
                debit,
                amount: balance.abs(),
                description: "Opening balance".to_string(),
                row_number: row,
                ..Entry::default()
            });
            row += 1;
        }

        Ok(Some(editor))
    }
}
