/// Account types, following the standard balance-sheet / income-statement
/// split. `ProfitPrevPeriods` is the retained-earnings account that receives
/// the rolled-forward result of closed periods; `ProfitCurrent` is a
/// statement-only placeholder that no entry is ever posted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde_derive::Serialize, serde_derive::Deserialize)]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
    ProfitPrevPeriods,
    ProfitCurrent,
}

impl AccountType {
    /// Balance-sheet types, i.e. the types whose balances carry over into the
    /// next fiscal period.
    pub fn is_balance_sheet(&self) -> bool {
        matches!(
            self,
            AccountType::Asset
                | AccountType::Liability
                | AccountType::Equity
                | AccountType::ProfitPrevPeriods
        )
    }
}

/// VAT treatment code of an account. The numeric values are part of the
/// persisted row format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde_derive::Serialize, serde_derive::Deserialize)]
#[repr(u8)]
pub enum VatCode {
    None = 0,
    /// The account the period's net VAT payable/receivable is settled
    /// against.
    VatLiability = 1,
    /// Output VAT collected on sales.
    OutputVat = 2,
    /// Input VAT deductible on purchases.
    InputVat = 3,
    TaxableSale = 4,
    TaxablePurchase = 5,
    TaxFreeSale = 6,
    TaxFreePurchase = 7,
    IntraCommunitySale = 8,
    /// Intra-community acquisition: the buyer self-assesses the tax.
    IntraCommunityPurchase = 9,
    ConstructionSale = 10,
    /// Construction-service purchase under the domestic reverse charge.
    ConstructionPurchase = 11,
}

impl VatCode {
    /// Codes whose tax is self-assessed by the buyer: the tax is added on top
    /// of the net amount and posted as two offsetting entries.
    pub fn is_reverse_charge(&self) -> bool {
        matches!(
            self,
            VatCode::IntraCommunityPurchase | VatCode::ConstructionPurchase
        )
    }

    /// Codes that mark an account as a VAT balance account (collected or
    /// deductible tax), picked up by the settlement voucher.
    pub fn is_vat_balance(&self) -> bool {
        matches!(self, VatCode::OutputVat | VatCode::InputVat)
    }
}

/// How VAT entries are synthesized for a primary entry on this account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VatClass {
    /// No tax entries: gross equals net.
    PassThrough,
    /// Tax extracted from the gross amount, posted once on counter-account
    /// #1, same direction as the primary entry.
    Normal,
    /// Tax added on top of the net amount, posted as two offsetting entries
    /// on counter-accounts #1 and #2.
    ReverseCharge,
}

/// One row of the chart of accounts. Owned by the chart-of-accounts
/// collaborator; read-only to this crate apart from the VAT rate migration.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Account {
    pub id: i32,
    /// Sortable account number, e.g. "1700". Defines chart ordering.
    pub number: String,
    pub name: String,
    pub account_type: AccountType,
    pub vat_code: VatCode,
    /// Index into the fixed VAT rate table (`logic::vat::rate_to_percent`).
    pub vat_rate: u32,
    /// VAT counter-account #1: receives the extracted tax (normal codes) or
    /// the self-assessed payable tax (reverse-charge codes).
    pub vat_account1_id: Option<i32>,
    /// VAT counter-account #2: receives the offsetting deductible tax of a
    /// reverse-charge posting.
    pub vat_account2_id: Option<i32>,
    pub flags: u32,
}

const FLAG_FAVOURITE: u32 = 0;

impl Account {
    /// Counter-account #1 decides whether tax entries are synthesized at all;
    /// the code only picks between extraction and self-assessment.
    pub fn vat_class(&self) -> VatClass {
        if self.vat_account1_id.is_none() {
            VatClass::PassThrough
        } else if self.vat_code.is_reverse_charge() {
            VatClass::ReverseCharge
        } else {
            VatClass::Normal
        }
    }

    pub fn flag(&self, index: u32) -> bool {
        self.flags & (1 << index) != 0
    }

    pub fn set_flag(&mut self, index: u32, value: bool) {
        if value {
            self.flags |= 1 << index;
        } else {
            self.flags &= !(1 << index);
        }
    }

    pub fn is_favourite(&self) -> bool {
        self.flag(FLAG_FAVOURITE)
    }
}
