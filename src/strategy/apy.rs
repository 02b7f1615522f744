use rust_decimal::Decimal;

const DAYS_PER_YEAR: i64 = 365;

/// Annualized return of `expected_value` on `total_cost` over `days_to_resolution`
///
/// Returns `None` when either the cost or the horizon is not positive.
pub fn apy(expected_value: Decimal, total_cost: Decimal, days_to_resolution: Decimal) -> Option<Decimal> {
    if total_cost <= Decimal::ZERO || days_to_resolution <= Decimal::ZERO {
        return None;
    }
    let period_return = expected_value.checked_div(total_cost)?;
    let periods_per_year = Decimal::from(DAYS_PER_YEAR).checked_div(days_to_resolution)?;
    period_return.checked_mul(periods_per_year)
}
