use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::payments::amortization;
use crate::types::{LoanId, PaymentId, PayoffProjection, RateConvention};

/// one entry in a loan's payment history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// display timestamp, not an identity
    pub date_time: String,
    pub description: String,
    /// signed, a negative amount books a correction
    pub amount: Money,
    /// documents written before ids existed get one assigned at load
    #[serde(default)]
    pub payment_id: PaymentId,
}

impl Payment {
    pub fn new(amount: Money, description: &str, date_time: impl Into<String>) -> Self {
        Self {
            date_time: date_time.into(),
            description: description.trim().to_string(),
            amount,
            payment_id: PaymentId::new(),
        }
    }
}

/// terms supplied when a loan is opened
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub loan_name: String,
    pub amount: Money,
    pub interest: Rate,
    pub monthly_payment: Money,
}

/// a fixed-rate, fixed-payment loan and its payment ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub(crate) loan_id: LoanId,
    pub(crate) loan_name: String,
    pub(crate) amount: Money,
    pub(crate) remaining_amount: Money,
    pub(crate) total_paid: Money,
    pub(crate) interest: Rate,
    pub(crate) monthly_payment: Money,
    pub(crate) time_paid_off: f64,
    pub(crate) payments: Vec<Payment>,
}

impl Loan {
    /// open a loan with nothing paid; call `recalculate_payoff` for the first horizon
    pub fn new(loan_id: LoanId, terms: NewLoan) -> Self {
        Self {
            loan_id,
            loan_name: terms.loan_name.trim().to_string(),
            amount: terms.amount,
            remaining_amount: terms.amount,
            total_paid: Money::ZERO,
            interest: terms.interest,
            monthly_payment: terms.monthly_payment,
            time_paid_off: 0.0,
            payments: Vec::new(),
        }
    }

    pub fn loan_id(&self) -> &LoanId {
        &self.loan_id
    }

    pub fn loan_name(&self) -> &str {
        &self.loan_name
    }

    /// original principal
    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn remaining_amount(&self) -> Money {
        self.remaining_amount
    }

    pub fn total_paid(&self) -> Money {
        self.total_paid
    }

    pub fn interest(&self) -> Rate {
        self.interest
    }

    pub fn monthly_payment(&self) -> Money {
        self.monthly_payment
    }

    /// months until payoff under the current rate and payment
    pub fn time_paid_off(&self) -> f64 {
        self.time_paid_off
    }

    /// payments in ledger order
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn payment(&self, payment_id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.payment_id == payment_id)
    }

    pub(crate) fn payment_index(&self, payment_id: PaymentId) -> Option<usize> {
        self.payments.iter().position(|p| p.payment_id == payment_id)
    }

    /// lookup by display timestamp; the first match wins when several share one
    pub fn find_payment_by_timestamp(&self, date_time: &str) -> Option<&Payment> {
        self.payments.iter().find(|p| p.date_time == date_time)
    }

    pub fn is_paid_off(&self) -> bool {
        !self.remaining_amount.is_positive()
    }

    /// book an amount against the balance
    pub(crate) fn apply_amount(&mut self, amount: Money) {
        self.remaining_amount -= amount;
        self.total_paid += amount;
    }

    /// undo a previously booked amount
    pub(crate) fn reverse_amount(&mut self, amount: Money) {
        self.remaining_amount += amount;
        self.total_paid -= amount;
    }

    /// project the payoff horizon from the current balance.
    ///
    /// an insufficient payment leaves `time_paid_off` at its previous value.
    pub fn recalculate_payoff(&mut self, convention: RateConvention) -> PayoffProjection {
        let projection = amortization::payoff_horizon(
            self.remaining_amount,
            self.monthly_payment,
            self.interest,
            convention,
        );
        if let PayoffProjection::Horizon(months) = projection {
            self.time_paid_off = months;
        }
        projection
    }

    /// check the balance bookkeeping against the payment history
    pub fn verify_invariants(&self) -> Result<()> {
        let sum: Money = self.payments.iter().map(|p| p.amount).sum();
        if sum != self.total_paid {
            return Err(LedgerError::InvariantViolation {
                loan_id: self.loan_id.clone(),
                message: format!("total paid {} differs from payment sum {}", self.total_paid, sum),
            });
        }
        if self.amount - self.total_paid != self.remaining_amount {
            return Err(LedgerError::InvariantViolation {
                loan_id: self.loan_id.clone(),
                message: format!(
                    "remaining {} differs from amount {} minus paid {}",
                    self.remaining_amount, self.amount, self.total_paid
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn car_loan() -> Loan {
        Loan::new(
            LoanId::sequence(1),
            NewLoan {
                loan_name: " car ".to_string(),
                amount: Money::from_major(1_000),
                interest: Rate::ZERO,
                monthly_payment: Money::from_major(100),
            },
        )
    }

    #[test]
    fn test_new_loan_starts_unpaid() {
        let loan = car_loan();
        assert_eq!(loan.loan_name(), "car");
        assert_eq!(loan.remaining_amount(), Money::from_major(1_000));
        assert_eq!(loan.total_paid(), Money::ZERO);
        assert!(loan.payments().is_empty());
        assert!(loan.verify_invariants().is_ok());
    }

    #[test]
    fn test_initial_horizon_without_placeholder_payment() {
        let mut loan = car_loan();
        let projection = loan.recalculate_payoff(RateConvention::Monthly);
        assert_eq!(projection, PayoffProjection::Horizon(10.0));
        assert_eq!(loan.time_paid_off(), 10.0);
        assert!(loan.payments().is_empty());
    }

    #[test]
    fn test_insufficient_payment_keeps_previous_horizon() {
        let mut loan = car_loan();
        loan.recalculate_payoff(RateConvention::Monthly);

        loan.interest = Rate::from_percentage(dec!(240));
        let projection = loan.recalculate_payoff(RateConvention::Monthly);
        assert!(projection.is_insufficient());
        assert_eq!(loan.time_paid_off(), 10.0);
    }

    #[test]
    fn test_timestamp_lookup_returns_first_match() {
        let mut loan = car_loan();
        let first = Payment::new(Money::from_major(10), "first", "2024-01-01 10:00:00");
        let second = Payment::new(Money::from_major(20), "second", "2024-01-01 10:00:00");
        loan.payments.push(first.clone());
        loan.payments.push(second);

        let found = loan.find_payment_by_timestamp("2024-01-01 10:00:00").unwrap();
        assert_eq!(found.payment_id, first.payment_id);
    }

    #[test]
    fn test_verify_invariants_detects_drift() {
        let mut loan = car_loan();
        loan.total_paid = Money::from_major(5);
        let err = loan.verify_invariants().unwrap_err();
        assert!(matches!(err, LedgerError::InvariantViolation { .. }));
    }

    #[test]
    fn test_legacy_payment_gets_an_id() {
        let json = r#"{"date_time":"2024-03-01 09:15:00","description":"march","amount":150.5}"#;
        let payment: Payment = serde_json::from_str(json).unwrap();
        assert_eq!(payment.amount, Money::from_str_exact("150.5").unwrap());
        assert!(!payment.payment_id.as_uuid().is_nil());
    }
}
