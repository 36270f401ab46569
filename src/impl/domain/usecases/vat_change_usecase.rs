use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::{
    domain::{logic::vat, repositories::backend::DataSource},
    entities::{Account, VatCode},
};

/// One remapping rule of a statutory VAT rate change: an account-specific
/// rule (`account_id` set) rewrites that account unconditionally; a wildcard
/// rule rewrites every account currently on `old_rate`. Later rules take
/// precedence over earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatChangeRule {
    pub account_id: Option<i32>,
    /// Rate-table index the rule matches (wildcard rules only).
    pub old_rate: u32,
    /// Rate-table index to rewrite to.
    pub new_rate: u32,
}

#[async_trait]
pub trait VatChangeUsecase: Send + Sync {
    /// Applies a set of rate-change rules across the whole chart of accounts
    /// in one transaction. Only sale/purchase accounts that carry a rate
    /// (taxable sale, taxable purchase, intra-community acquisition) are
    /// touched.
    ///
    /// Designed to run as a background task: the cancellation flag is polled
    /// between accounts, and on cancellation the transaction is rolled back
    /// wholesale and `None` returned. Otherwise returns the number of
    /// accounts rewritten.
    async fn apply_rate_changes(
        &self,
        rules: &[VatChangeRule],
        cancel: &AtomicBool,
    ) -> Result<Option<usize>, ServerError>;
}

pub struct VatChangeUsecaseImpl<D: DataSource> {
    datasource: Arc<D>,
}

impl<D: DataSource> VatChangeUsecaseImpl<D> {
    pub fn new(datasource: Arc<D>) -> Self {
        Self { datasource }
    }
}

#[async_trait]
impl<D: DataSource> VatChangeUsecase for VatChangeUsecaseImpl<D> {
    async fn apply_rate_changes(
        &self,
        rules: &[VatChangeRule],
        cancel: &AtomicBool,
    ) -> Result<Option<usize>, ServerError> {
        for rule in rules {
            vat::rate_to_percent(rule.new_rate)?;
        }

        let mut session = self.datasource.open_session()?;
        let accounts = session.accounts()?;
        let mut changes = 0;

        for mut account in accounts {
            if cancel.load(Ordering::Relaxed) {
                session.rollback()?;
                return Ok(None);
            }
            let Some(new_rate) = matching_rate(rules, &account) else {
                continue;
            };
            if account.vat_rate == new_rate {
                continue;
            }

            account.vat_rate = new_rate;
            if let Err(e) = session.save_account(&mut account) {
                let _ = session.rollback();
                return Err(e);
            }
            changes += 1;
        }

        session.commit()?;
        Ok(Some(changes))
    }
}

fn matching_rate(rules: &[VatChangeRule], account: &Account) -> Option<u32> {
    if !matches!(
        account.vat_code,
        VatCode::TaxableSale | VatCode::TaxablePurchase | VatCode::IntraCommunityPurchase
    ) {
        return None;
    }
    for rule in rules.iter().rev() {
        match rule.account_id {
            Some(id) if id == account.id => return Some(rule.new_rate),
            Some(_) => {}
            None if account.vat_rate == rule.old_rate => return Some(rule.new_rate),
            None => {}
        }
    }
    None
}
