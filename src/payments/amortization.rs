use rust_decimal::prelude::ToPrimitive;

use crate::decimal::{Money, Rate};
use crate::types::{PayoffProjection, RateConvention};

/// decimal places a zero-interest period count is rounded to before the
/// ceiling, so division noise never adds a month
pub const HORIZON_EPSILON_DP: u32 = 9;

/// months until `remaining` is paid down by fixed `monthly_payment`s at
/// the nominal annual `rate`.
///
/// pure, never panics. a payment that cannot outrun the monthly interest
/// yields `PayoffProjection::InsufficientPayment`.
pub fn payoff_horizon(
    remaining: Money,
    monthly_payment: Money,
    rate: Rate,
    convention: RateConvention,
) -> PayoffProjection {
    if !remaining.is_positive() {
        return PayoffProjection::Horizon(0.0);
    }

    let interest_due = minimum_payment(remaining, rate);
    if !monthly_payment.is_positive() || (!rate.is_zero() && monthly_payment <= interest_due) {
        return PayoffProjection::InsufficientPayment {
            monthly_payment,
            interest_due,
        };
    }

    if rate.is_zero() {
        return PayoffProjection::Horizon(interest_free_horizon(remaining, monthly_payment));
    }

    let horizon = match convention {
        RateConvention::Monthly => monthly_rate_horizon(remaining, monthly_payment, rate),
        RateConvention::Legacy => legacy_horizon(remaining, monthly_payment, rate),
    };

    match horizon {
        Some(months) if months.is_finite() && months >= 0.0 => PayoffProjection::Horizon(months),
        _ => PayoffProjection::InsufficientPayment {
            monthly_payment,
            interest_due,
        },
    }
}

/// interest accruing on `remaining` in one month; a payment must exceed it
pub fn minimum_payment(remaining: Money, rate: Rate) -> Money {
    remaining * rate.monthly_fraction()
}

/// months expressed in years
pub fn payoff_years(months: f64) -> f64 {
    months / 12.0
}

/// true ceiling of `remaining / payment`, computed in decimal.
///
/// a quotient past the decimal range falls back to float division.
fn interest_free_horizon(remaining: Money, monthly_payment: Money) -> f64 {
    match remaining.as_decimal().checked_div(monthly_payment.as_decimal()) {
        Some(periods) => periods
            .round_dp(HORIZON_EPSILON_DP)
            .ceil()
            .to_f64()
            .unwrap_or(f64::MAX),
        None => (remaining.to_f64() / monthly_payment.to_f64()).ceil(),
    }
}

/// n = ln(P / (P - B·r)) / ln(1 + r) with r the monthly rate
fn monthly_rate_horizon(remaining: Money, monthly_payment: Money, rate: Rate) -> Option<f64> {
    let r = rate.monthly_fraction().to_f64()?;
    let balance = remaining.to_f64();
    let payment = monthly_payment.to_f64();

    let numerator = (payment / (payment - balance * r)).ln();
    let denominator = r.ln_1p();
    Some(numerator / denominator)
}

/// the same series with the raw annual percentage standing in for the
/// monthly rate, as horizons were computed before the monthly convention
fn legacy_horizon(remaining: Money, monthly_payment: Money, rate: Rate) -> Option<f64> {
    let i = rate.as_percentage().to_f64()?;
    if i <= -1.0 {
        return None;
    }
    let balance = remaining.to_f64();
    let payment = monthly_payment.to_f64();

    let numerator = (payment / (payment - balance * i)).ln();
    let denominator = i.ln_1p();
    Some(numerator / denominator)
}
