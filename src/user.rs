use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::loan::Loan;
use crate::types::LoanId;

/// an operator and the loans they track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub(crate) user_name: String,
    #[serde(default)]
    pub(crate) loans: Vec<Loan>,
}

impl User {
    /// new user without loans; the name doubles as the storage key
    pub fn new(user_name: &str) -> Result<Self> {
        let user_name = user_name.trim();
        validate_user_name(user_name)?;
        Ok(Self {
            user_name: user_name.to_string(),
            loans: Vec::new(),
        })
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// loans in creation order
    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn loan(&self, loan_id: &LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.loan_id() == loan_id)
    }

    pub fn loan_mut(&mut self, loan_id: &LoanId) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|l| l.loan_id() == loan_id)
    }

    /// `loan_count + 1`, bumped past any id already in use
    pub fn next_loan_id(&self) -> LoanId {
        let mut n = self.loans.len() + 1;
        loop {
            let candidate = LoanId::sequence(n);
            if self.loan(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    pub(crate) fn push_loan(&mut self, loan: Loan) {
        self.loans.push(loan);
    }
}

/// names become file names, so they must be a single plain path component
pub fn validate_user_name(user_name: &str) -> Result<()> {
    let invalid = user_name.is_empty()
        || user_name.trim() != user_name
        || user_name.starts_with('.')
        || user_name.contains(['/', '\\'])
        || user_name.chars().any(char::is_control);

    if invalid {
        return Err(LedgerError::InvalidUserName {
            user_name: user_name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::loan::NewLoan;

    fn terms(name: &str) -> NewLoan {
        NewLoan {
            loan_name: name.to_string(),
            amount: Money::from_major(5_000),
            interest: Rate::ZERO,
            monthly_payment: Money::from_major(250),
        }
    }

    #[test]
    fn test_user_name_validation() {
        assert!(User::new("alice").is_ok());
        assert_eq!(User::new("  bob ").unwrap().user_name(), "bob");

        for bad in ["", "   ", "../etc", "a/b", "a\\b", ".hidden"] {
            let err = User::new(bad).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidUserName { .. }), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_next_loan_id_counts_loans() {
        let mut user = User::new("alice").unwrap();
        assert_eq!(user.next_loan_id(), LoanId::new("1"));

        user.push_loan(Loan::new(user.next_loan_id(), terms("car")));
        user.push_loan(Loan::new(user.next_loan_id(), terms("bike")));
        assert_eq!(user.next_loan_id(), LoanId::new("3"));
    }

    #[test]
    fn test_next_loan_id_skips_taken_ids() {
        let mut user = User::new("alice").unwrap();
        user.push_loan(Loan::new(LoanId::new("2"), terms("imported")));

        // count + 1 would collide with the imported loan
        assert_eq!(user.next_loan_id(), LoanId::new("3"));
    }

    #[test]
    fn test_loan_lookup() {
        let mut user = User::new("alice").unwrap();
        user.push_loan(Loan::new(LoanId::new("1"), terms("car")));

        assert_eq!(user.loan(&LoanId::new("1")).unwrap().loan_name(), "car");
        assert!(user.loan(&LoanId::new("9")).is_none());
        assert!(user.loan_mut(&LoanId::new("1")).is_some());
    }
}
