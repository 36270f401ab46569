use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::entities::{Account, AccountType, Entry};

/// Accumulates signed account balances from a stream of entries.
///
/// The sign convention follows the account type:
///
/// ```text
/// +-------------+--------+--------+
/// | Account     | Debit  | Credit |
/// +-------------+--------+--------+
/// | Asset       |  INC   |  DEC   |
/// | Expense     |  INC   |  DEC   |
/// | Liability   |  DEC   |  INC   |
/// | Equity      |  DEC   |  INC   |
/// | Revenue     |  DEC   |  INC   |
/// +-------------+--------+--------+
/// ```
///
/// Alongside the per-account totals, the accumulator tracks the period's
/// profit (revenue minus expense) over every entry it has seen. An account's
/// balance stays `None` until the first entry touches it, so callers can tell
/// "no postings" apart from "postings netting to zero".
pub struct AccountBalances {
    balances: HashMap<i32, AccountBalance>,
    profit: Decimal,
    count: usize,
}

struct AccountBalance {
    account_type: AccountType,
    balance: Option<Decimal>,
}

impl AccountBalances {
    pub fn new(accounts: &[Account]) -> Self {
        Self {
            balances: accounts
                .iter()
                .map(|a| {
                    (
                        a.id,
                        AccountBalance {
                            account_type: a.account_type,
                            balance: None,
                        },
                    )
                })
                .collect(),
            profit: Decimal::ZERO,
            count: 0,
        }
    }

    /// Folds one entry into the totals. Entries against accounts that were
    /// not registered up front are ignored.
    pub fn add_entry(&mut self, entry: &Entry) {
        let Some(account_id) = entry.account_id else {
            return;
        };
        let Some(ab) = self.balances.get_mut(&account_id) else {
            return;
        };

        let negate = match ab.account_type {
            AccountType::Asset | AccountType::Expense => !entry.debit,
            _ => entry.debit,
        };
        let amount = if negate { -entry.amount } else { entry.amount };

        match ab.account_type {
            AccountType::Expense => self.profit -= amount,
            AccountType::Revenue => self.profit += amount,
            _ => {}
        }

        match ab.balance {
            None => {
                ab.balance = Some(amount);
                self.count += 1;
            }
            Some(balance) => ab.balance = Some(balance + amount),
        }
    }

    /// Balance of the given account, or `None` if no entry has touched it.
    pub fn balance(&self, account_id: i32) -> Option<Decimal> {
        self.balances.get(&account_id)?.balance
    }

    /// Profit of the period: revenue minus expense over all entries seen.
    pub fn profit(&self) -> Decimal {
        self.profit
    }

    /// Number of accounts with at least one posting.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        for ab in self.balances.values_mut() {
            ab.balance = None;
        }
        self.profit = Decimal::ZERO;
        self.count = 0;
    }
}
