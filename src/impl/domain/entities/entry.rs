use rust_decimal::Decimal;

/// Row-number distance between VAT tiers. An entry with row number
/// `primary + tier * TIER_SPAN` is the synthesized tax entry of tier `tier`
/// attached to the primary entry at `primary`. The encoding is part of the
/// persisted row format; `EntryRole` is its in-memory form.
pub const TIER_SPAN: i32 = 100_000;

/// Tier of a synthesized VAT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VatTier {
    /// Tax extracted from the gross amount (normal taxable codes).
    Extracted = 1,
    /// Self-assessed payable tax of a reverse-charge posting.
    SelfAssessed = 2,
    /// Deductible tax offsetting the self-assessed tax.
    SelfAssessedOffset = 3,
}

impl VatTier {
    pub const ALL: [VatTier; 3] = [
        VatTier::Extracted,
        VatTier::SelfAssessed,
        VatTier::SelfAssessedOffset,
    ];
}

/// What an entry's row number says about it: either a user-visible primary
/// entry, or a synthesized VAT entry attached to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRole {
    Primary { row: i32 },
    Vat { primary_row: i32, tier: VatTier },
}

impl EntryRole {
    pub fn row_number(&self) -> i32 {
        match self {
            EntryRole::Primary { row } => *row,
            EntryRole::Vat { primary_row, tier } => primary_row + (*tier as i32) * TIER_SPAN,
        }
    }
}

/// One ledger line: a debit or credit of `amount` against an account. The
/// amount is always net of tax; the tax portion lives in the synthesized VAT
/// entries. `id` is 0 until persisted.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Entry {
    pub id: i32,
    pub document_id: i32,
    /// `None` while the user has not picked an account yet. Synthesized
    /// entries always carry an account.
    pub account_id: Option<i32>,
    /// `true` = debit, `false` = credit.
    pub debit: bool,
    pub amount: Decimal,
    pub description: String,
    pub row_number: i32,
    pub flags: u32,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            id: 0,
            document_id: 0,
            account_id: None,
            debit: true,
            amount: Decimal::ZERO,
            description: String::new(),
            row_number: 0,
            flags: 0,
        }
    }
}

impl Entry {
    pub fn role(&self) -> EntryRole {
        let primary_row = self.row_number % TIER_SPAN;
        match self.row_number / TIER_SPAN {
            0 => EntryRole::Primary {
                row: self.row_number,
            },
            1 => EntryRole::Vat {
                primary_row,
                tier: VatTier::Extracted,
            },
            2 => EntryRole::Vat {
                primary_row,
                tier: VatTier::SelfAssessed,
            },
            _ => EntryRole::Vat {
                primary_row,
                tier: VatTier::SelfAssessedOffset,
            },
        }
    }

    pub fn is_primary(&self) -> bool {
        self.row_number < TIER_SPAN
    }

    pub fn is_persisted(&self) -> bool {
        self.id > 0
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
}
