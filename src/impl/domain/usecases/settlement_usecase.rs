use std::sync::Arc;

use async_trait::async_trait;
use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    domain::{
        logic::{balances::AccountBalances, editor::VoucherEditor},
        repositories::backend::DataSource,
        usecases::document_usecase::allocate_document,
    },
    entities::{Entry, LedgerContext, VatCode},
};

/// Flag bit marking a settlement clearing entry.
const FLAG_VAT_CLEARED: u32 = 0;

/// A generated, not-yet-saved settlement voucher. When no account is
/// configured as the VAT liability account the voucher is created anyway,
/// unbalanced, for the user to complete by hand; `liability_account_found`
/// tells the caller to warn about that.
pub struct VatSettlement {
    pub editor: VoucherEditor,
    pub liability_account_found: bool,
}

#[async_trait]
pub trait SettlementUsecase: Send + Sync {
    /// Generates the period's VAT settlement voucher: one clearing entry per
    /// output/input-VAT account with a non-zero balance, plus one balancing
    /// entry for the net payable/receivable on the VAT liability account.
    async fn create_settlement_voucher(
        &self,
        ctx: &LedgerContext,
    ) -> Result<VatSettlement, ServerError>;
}

pub struct SettlementUsecaseImpl<D: DataSource> {
    datasource: Arc<D>,
}

impl<D: DataSource> SettlementUsecaseImpl<D> {
    pub fn new(datasource: Arc<D>) -> Self {
        Self { datasource }
    }
}

#[async_trait]
impl<D: DataSource> SettlementUsecase for SettlementUsecaseImpl<D> {
    async fn create_settlement_voucher(
        &self,
        ctx: &LedgerContext,
    ) -> Result<VatSettlement, ServerError> {
        let mut session = self.datasource.open_session()?;

        let mut balances = AccountBalances::new(&ctx.accounts);
        session.for_each_entry_in_period(ctx.period.id, &mut |entry| {
            let is_vat_balance = entry
                .account_id
                .and_then(|id| ctx.account_by_id(id))
                .map(|a| a.vat_code.is_vat_balance())
                .unwrap_or(false);
            if is_vat_balance {
                balances.add_entry(entry);
            }
        })?;

        let document = allocate_document(&mut *session, ctx)?;
        let mut editor = VoucherEditor::new(document);

        // Clear each VAT account: a positive balance is cleared with a debit
        // entry, a negative one with a credit entry. The signed balances sum
        // to the net debt, which the liability account absorbs on the
        // opposite side.
        let mut debt = Decimal::ZERO;
        let mut liability_account_id = None;
        let mut row = 0;
        for account in &ctx.accounts {
            if account.vat_code == VatCode::VatLiability {
                liability_account_id = Some(account.id);
            }
            let Some(balance) = balances.balance(account.id) else {
                continue;
            };
            if balance.is_zero() {
                continue;
            }
            debt += balance;

            let mut entry = Entry {
                account_id: Some(account.id),
                debit: balance > Decimal::ZERO,
                amount: balance.abs(),
                row_number: row,
                ..Entry::default()
            };
            entry.set_flag(FLAG_VAT_CLEARED, true);
            editor.append_generated(entry);
            row += 1;
        }

        if let Some(account_id) = liability_account_id {
            if !debt.is_zero() {
                editor.append_generated(Entry {
                    account_id: Some(account_id),
                    debit: debt < Decimal::ZERO,
                    amount: debt.abs(),
                    row_number: row,
                    ..Entry::default()
                });
            }
        }

        Ok(VatSettlement {
            editor,
            liability_account_found: liability_account_id.is_some(),
        })
    }
}
