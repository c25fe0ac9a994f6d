use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};

/// loan identifier, unique within one user
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(String);

impl LoanId {
    pub fn new(id: impl Into<String>) -> Self {
        LoanId(id.into())
    }

    /// numeric form of ids handed out by `User::next_loan_id`
    pub fn sequence(n: usize) -> Self {
        LoanId(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LoanId {
    fn from(s: &str) -> Self {
        LoanId::new(s)
    }
}

/// surrogate payment identifier, time ordered (uuid v7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// fresh id, monotonic within the process
    pub fn new() -> Self {
        PaymentId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        PaymentId::new()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PaymentId {
    fn from(id: Uuid) -> Self {
        PaymentId(id)
    }
}

/// how the annual rate enters the payoff formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateConvention {
    /// monthly rate `annual / 12 / 100` in both the guard and the formula
    #[default]
    Monthly,
    /// monthly rate in the guard, raw annual percentage in the formula.
    /// reproduces horizons stored by older versions of the tool
    Legacy,
}

/// result of projecting a payoff horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayoffProjection {
    /// months until the balance reaches zero
    Horizon(f64),
    /// the monthly payment does not cover the interest accruing each month
    InsufficientPayment {
        monthly_payment: Money,
        interest_due: Money,
    },
}

impl PayoffProjection {
    pub fn horizon(&self) -> Option<f64> {
        match self {
            PayoffProjection::Horizon(months) => Some(*months),
            PayoffProjection::InsufficientPayment { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, PayoffProjection::InsufficientPayment { .. })
    }

    /// promote the soft signal to a hard error
    pub fn into_result(self) -> Result<f64> {
        match self {
            PayoffProjection::Horizon(months) => Ok(months),
            PayoffProjection::InsufficientPayment {
                monthly_payment,
                interest_due,
            } => Err(LedgerError::InsufficientPayment {
                monthly_payment,
                interest_due,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_ids_are_ordered() {
        let first = PaymentId::new();
        let second = PaymentId::new();
        assert_ne!(first, second);
        assert!(first < second);
    }

    #[test]
    fn test_rate_convention_names() {
        let legacy: RateConvention = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(legacy, RateConvention::Legacy);
        assert_eq!(RateConvention::default(), RateConvention::Monthly);
    }

    #[test]
    fn test_projection_into_result() {
        assert_eq!(PayoffProjection::Horizon(12.0).into_result().unwrap(), 12.0);

        let err = PayoffProjection::InsufficientPayment {
            monthly_payment: Money::from_major(50),
            interest_due: Money::from_major(100),
        }
        .into_result()
        .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientPayment { .. }));
    }
}
