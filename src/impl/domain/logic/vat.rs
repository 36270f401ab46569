use fractic_server_error::ServerError;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::InvalidVatRateIndex;

/// Fixed VAT rate table, in percent. Accounts store an index into this table
/// rather than the percentage itself, so a statutory rate change is a single
/// remapping of indices (see the VAT rate migration usecase).
const VAT_RATES: [(i64, u32); 12] = [
    (0, 0),    // 0 %
    (22, 0),   // 22 %
    (17, 0),   // 17 %
    (8, 0),    // 8 %
    (12, 0),   // 12 %
    (9, 0),    // 9 %
    (13, 0),   // 13 %
    (23, 0),   // 23 %
    (24, 0),   // 24 %
    (10, 0),   // 10 %
    (14, 0),   // 14 %
    (255, 1),  // 25.5 %
];

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Resolves a rate-table index to a percentage.
pub fn rate_to_percent(index: u32) -> Result<Decimal, ServerError> {
    let (mantissa, scale) = *VAT_RATES
        .get(index as usize)
        .ok_or_else(|| InvalidVatRateIndex::new(index))?;
    Ok(Decimal::new(mantissa, scale))
}

/// Tax portion of a gross (tax-inclusive) amount:
/// `gross - gross / (1 + percent/100)`, rounded to currency precision.
/// The multiplier is computed at 14 decimal places before the final rounding,
/// so the result matches a by-hand half-up calculation to the cent.
pub fn subtract_vat(percent: Decimal, gross: Decimal) -> Decimal {
    let factor = (Decimal::ONE
        - Decimal::ONE / ((percent + HUNDRED) / HUNDRED))
        .round_dp_with_strategy(14, RoundingStrategy::MidpointAwayFromZero);
    round_currency(gross * factor)
}

/// Tax on top of a net (tax-exclusive) amount: `net * percent/100`, rounded
/// to currency precision.
pub fn add_vat(percent: Decimal, net: Decimal) -> Decimal {
    round_currency(net * percent / HUNDRED)
}

/// Rounds to 2 decimal places, half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
