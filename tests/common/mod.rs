#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use tilikirja::{
    entities::{Account, AccountType, Period, Settings, VatCode},
    storage::MemoryDataSource,
    util::Bookkeeper,
};

/// Rate-table index of the 24 % VAT rate.
pub const RATE_24: u32 = 8;

// Fixed account ids of the test chart.
pub const CASH: i32 = 1;
pub const EXPENSE: i32 = 2;
pub const REVENUE: i32 = 3;
pub const OUTPUT_VAT: i32 = 4;
pub const INPUT_VAT: i32 = 5;
pub const VAT_LIABILITY: i32 = 6;
pub const RETAINED_EARNINGS: i32 = 7;
pub const LOAN: i32 = 8;

pub fn account(
    id: i32,
    number: &str,
    account_type: AccountType,
    vat_code: VatCode,
    vat_rate: u32,
    vat_account1_id: Option<i32>,
) -> Account {
    Account {
        id,
        number: number.to_string(),
        name: format!("Account {}", number),
        account_type,
        vat_code,
        vat_rate,
        vat_account1_id,
        vat_account2_id: None,
        flags: 0,
    }
}

/// A minimal Finnish-style chart: bank, one taxable expense and one taxable
/// revenue account, the VAT balance accounts, the VAT liability account,
/// retained earnings and a loan.
pub fn chart_of_accounts() -> Vec<Account> {
    vec![
        account(CASH, "1910", AccountType::Asset, VatCode::None, 0, None),
        account(
            EXPENSE,
            "4000",
            AccountType::Expense,
            VatCode::TaxablePurchase,
            RATE_24,
            Some(INPUT_VAT),
        ),
        account(
            REVENUE,
            "3000",
            AccountType::Revenue,
            VatCode::TaxableSale,
            RATE_24,
            Some(OUTPUT_VAT),
        ),
        account(
            OUTPUT_VAT,
            "2936",
            AccountType::Liability,
            VatCode::OutputVat,
            0,
            None,
        ),
        account(
            INPUT_VAT,
            "2937",
            AccountType::Liability,
            VatCode::InputVat,
            0,
            None,
        ),
        account(
            VAT_LIABILITY,
            "2935",
            AccountType::Liability,
            VatCode::VatLiability,
            0,
            None,
        ),
        account(
            RETAINED_EARNINGS,
            "2370",
            AccountType::ProfitPrevPeriods,
            VatCode::None,
            0,
            None,
        ),
        account(LOAN, "2800", AccountType::Liability, VatCode::None, 0, None),
    ]
}

/// A period wide enough that "today" always falls inside it, so date checks
/// never depend on the wall clock.
pub fn wide_period() -> Period {
    Period {
        id: 0,
        start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2999, 12, 31).unwrap(),
        locked: false,
    }
}

pub fn setup_with(
    accounts: Vec<Account>,
    periods: Vec<Period>,
    settings: Settings,
) -> (
    Arc<MemoryDataSource>,
    Bookkeeper<MemoryDataSource>,
    Vec<Period>,
) {
    let datasource = Arc::new(MemoryDataSource::new());
    for account in accounts {
        datasource.insert_account(account).unwrap();
    }
    let periods = periods
        .into_iter()
        .map(|p| datasource.insert_period(p).unwrap())
        .collect();
    datasource.set_settings(settings).unwrap();
    let bookkeeper = Bookkeeper::new(Arc::clone(&datasource));
    (datasource, bookkeeper, periods)
}

pub fn setup() -> (
    Arc<MemoryDataSource>,
    Bookkeeper<MemoryDataSource>,
    Period,
) {
    let (datasource, bookkeeper, mut periods) = setup_with(
        chart_of_accounts(),
        vec![wide_period()],
        Settings::default(),
    );
    (datasource, bookkeeper, periods.remove(0))
}
