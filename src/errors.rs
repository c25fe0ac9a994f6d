use std::path::PathBuf;

use thiserror::Error;

use crate::decimal::Money;
use crate::types::{LoanId, PaymentId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("user not found: {user_name}")]
    UserNotFound {
        user_name: String,
    },

    #[error("loan {loan_id} not found for user {user_name}")]
    LoanNotFound {
        user_name: String,
        loan_id: LoanId,
    },

    #[error("user already exists: {user_name}")]
    UserAlreadyExists {
        user_name: String,
    },

    #[error("invalid user name: {user_name:?}")]
    InvalidUserName {
        user_name: String,
    },

    #[error("loan {loan_id} is fully paid")]
    LoanFullyPaid {
        loan_id: LoanId,
    },

    #[error("payment {payment_id} not found in loan {loan_id}")]
    PaymentNotFound {
        loan_id: LoanId,
        payment_id: PaymentId,
    },

    #[error("insufficient payment: monthly payment {monthly_payment} does not cover interest {interest_due}")]
    InsufficientPayment {
        monthly_payment: Money,
        interest_due: Money,
    },

    #[error("overpayment: remaining {remaining}, requested {requested}")]
    Overpayment {
        remaining: Money,
        requested: Money,
    },

    #[error("invariant violated on loan {loan_id}: {message}")]
    InvariantViolation {
        loan_id: LoanId,
        message: String,
    },

    #[error("storage failure at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failure at {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid document at {}: {message}", path.display())]
    InvalidDocument {
        path: PathBuf,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl LedgerError {
    /// user or loan absent
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::UserNotFound { .. } | LedgerError::LoanNotFound { .. }
        )
    }

    /// i/o, (de)serialization or validation of a persisted record failed
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            LedgerError::Storage { .. }
                | LedgerError::Serialization { .. }
                | LedgerError::InvalidDocument { .. }
        )
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LedgerError::Storage {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_document(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LedgerError::InvalidDocument {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn serialization(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        LedgerError::Serialization {
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for LedgerError {
    fn from(err: config::ConfigError) -> Self {
        LedgerError::InvalidConfiguration {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
