pub mod amortization;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::{Loan, Payment};
use crate::types::{PaymentId, PayoffProjection, RateConvention};

pub use amortization::{minimum_payment, payoff_horizon, payoff_years, HORIZON_EPSILON_DP};

/// outcome of a payment mutation, with the loan's totals after it
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub payment_id: PaymentId,
    pub remaining_amount: Money,
    pub total_paid: Money,
    pub time_paid_off: f64,
    /// `InsufficientPayment` when the horizon could not be refreshed
    pub projection: PayoffProjection,
}

impl PaymentReceipt {
    fn capture(loan: &Loan, payment_id: PaymentId, projection: PayoffProjection) -> Self {
        Self {
            payment_id,
            remaining_amount: loan.remaining_amount(),
            total_paid: loan.total_paid(),
            time_paid_off: loan.time_paid_off(),
            projection,
        }
    }
}

/// append a payment and rebook the loan's totals
pub fn add_payment(
    loan: &mut Loan,
    amount: Money,
    description: &str,
    date_time: impl Into<String>,
    convention: RateConvention,
) -> PaymentReceipt {
    let payment = Payment::new(amount, description, date_time);
    let payment_id = payment.payment_id;

    loan.payments.push(payment);
    loan.apply_amount(amount);
    let projection = loan.recalculate_payoff(convention);

    PaymentReceipt::capture(loan, payment_id, projection)
}

/// replace a payment's amount and description in place.
///
/// the id and timestamp are kept, so the result equals a remove followed
/// by an add at the same position.
pub fn modify_payment(
    loan: &mut Loan,
    payment_id: PaymentId,
    new_amount: Money,
    new_description: &str,
    convention: RateConvention,
) -> Result<PaymentReceipt> {
    let index = loan
        .payment_index(payment_id)
        .ok_or_else(|| LedgerError::PaymentNotFound {
            loan_id: loan.loan_id().clone(),
            payment_id,
        })?;

    let old_amount = loan.payments[index].amount;
    loan.reverse_amount(old_amount);

    let payment = &mut loan.payments[index];
    payment.amount = new_amount;
    payment.description = new_description.trim().to_string();

    loan.apply_amount(new_amount);
    let projection = loan.recalculate_payoff(convention);

    Ok(PaymentReceipt::capture(loan, payment_id, projection))
}

/// drop a payment from the ledger, keeping the order of the rest
pub fn remove_payment(
    loan: &mut Loan,
    payment_id: PaymentId,
    convention: RateConvention,
) -> Result<(Payment, PaymentReceipt)> {
    let index = loan
        .payment_index(payment_id)
        .ok_or_else(|| LedgerError::PaymentNotFound {
            loan_id: loan.loan_id().clone(),
            payment_id,
        })?;

    let removed = loan.payments.remove(index);
    loan.reverse_amount(removed.amount);
    let projection = loan.recalculate_payoff(convention);

    let receipt = PaymentReceipt::capture(loan, payment_id, projection);
    Ok((removed, receipt))
}
