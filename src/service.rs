use hourglass_rs::SafeTimeProvider;
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::{Loan, NewLoan};
use crate::payments::{self, PaymentReceipt};
use crate::report::{LoanView, UserView};
use crate::storage::{user_not_found, UserRepository};
use crate::types::{LoanId, PaymentId, PayoffProjection};
use crate::user::User;

/// result of opening a loan
#[derive(Debug, Clone, PartialEq)]
pub struct LoanCreated {
    pub loan_id: LoanId,
    pub projection: PayoffProjection,
}

/// command surface over the user registry.
///
/// enforces the rules that span users and loans (existence, fully paid
/// loans, overpayment) and logs the outcome of each command. mutations
/// stay in memory until `persist` or `persist_user` is called. the rate
/// convention and timestamp format come from the repository's config.
pub struct LedgerService<R: UserRepository> {
    repo: R,
    time: SafeTimeProvider,
}

impl<R: UserRepository> LedgerService<R> {
    pub fn new(repo: R, time: SafeTimeProvider) -> Self {
        Self { repo, time }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &LedgerConfig {
        self.repo.config()
    }

    pub fn create_user(&mut self, user_name: &str) -> Result<&User> {
        let user = User::new(user_name)?;
        let key = user.user_name().to_string();

        self.repo.add_user(user)?;
        info!(user = %key, "user created");

        self.repo.get_user(&key).ok_or_else(|| user_not_found(&key))
    }

    pub fn get_user(&self, user_name: &str) -> Option<&User> {
        self.repo.get_user(user_name.trim())
    }

    /// existing user, or a fresh one on first use
    pub fn get_or_create_user(&mut self, user_name: &str) -> Result<&User> {
        let key = user_name.trim();
        if self.repo.get_user(key).is_none() {
            self.create_user(key)?;
        }
        self.repo.get_user(key).ok_or_else(|| user_not_found(key))
    }

    pub fn delete_user(&mut self, user_name: &str) -> Result<()> {
        let key = user_name.trim();
        if self.repo.get_user(key).is_none() {
            return Err(user_not_found(key));
        }

        self.repo.move_user_to_deleted(key)?;
        info!(user = %key, "user deleted");
        Ok(())
    }

    pub fn list_users(&self) -> Vec<String> {
        self.repo.list_users()
    }

    /// open a loan for the user under the next free loan id
    pub fn add_loan_to_user(&mut self, user_name: &str, terms: NewLoan) -> Result<LoanCreated> {
        let convention = self.config().rate_convention;
        let user = self
            .repo
            .get_user_mut(user_name)
            .ok_or_else(|| user_not_found(user_name))?;

        let loan_id = user.next_loan_id();
        let mut loan = Loan::new(loan_id.clone(), terms);
        let projection = loan.recalculate_payoff(convention);
        user.push_loan(loan);

        log_projection(user_name, &loan_id, &projection);
        info!(user = %user_name, loan_id = %loan_id, "loan created");

        Ok(LoanCreated { loan_id, projection })
    }

    pub fn loans(&self, user_name: &str) -> Result<&[Loan]> {
        self.repo
            .get_user(user_name)
            .map(User::loans)
            .ok_or_else(|| user_not_found(user_name))
    }

    pub fn loan(&self, user_name: &str, loan_id: &LoanId) -> Result<&Loan> {
        let user = self
            .repo
            .get_user(user_name)
            .ok_or_else(|| user_not_found(user_name))?;
        user.loan(loan_id).ok_or_else(|| loan_not_found(user_name, loan_id))
    }

    pub fn loan_view(&self, user_name: &str, loan_id: &LoanId) -> Result<LoanView> {
        let loan = self.loan(user_name, loan_id)?;
        Ok(LoanView::from_loan(loan, self.config().rate_convention))
    }

    pub fn user_view(&self, user_name: &str) -> Result<UserView> {
        let user = self
            .repo
            .get_user(user_name)
            .ok_or_else(|| user_not_found(user_name))?;
        Ok(UserView::from_user(user, self.config().rate_convention))
    }

    /// record a payment stamped with the current time
    pub fn add_payment_to_loan(
        &mut self,
        user_name: &str,
        loan_id: &LoanId,
        amount: Money,
        description: &str,
    ) -> Result<PaymentReceipt> {
        let date_time = self.timestamp();
        let convention = self.config().rate_convention;
        let loan = self.loan_mut(user_name, loan_id)?;

        if loan.is_paid_off() {
            return Err(LedgerError::LoanFullyPaid {
                loan_id: loan_id.clone(),
            });
        }
        if amount > loan.remaining_amount() {
            return Err(LedgerError::Overpayment {
                remaining: loan.remaining_amount(),
                requested: amount,
            });
        }

        let receipt = payments::add_payment(loan, amount, description, date_time, convention);

        log_projection(user_name, loan_id, &receipt.projection);
        info!(
            user = %user_name,
            loan_id = %loan_id,
            payment_id = %receipt.payment_id,
            amount = %amount,
            remaining = %receipt.remaining_amount,
            "payment added"
        );
        Ok(receipt)
    }

    pub fn modify_payment_from_loan(
        &mut self,
        user_name: &str,
        loan_id: &LoanId,
        payment_id: PaymentId,
        new_amount: Money,
        new_description: &str,
    ) -> Result<PaymentReceipt> {
        let convention = self.config().rate_convention;
        let loan = self.loan_mut(user_name, loan_id)?;

        let old_amount = loan
            .payment(payment_id)
            .map(|p| p.amount)
            .ok_or_else(|| LedgerError::PaymentNotFound {
                loan_id: loan_id.clone(),
                payment_id,
            })?;
        let remaining_after = loan.remaining_amount() + old_amount - new_amount;
        if new_amount > old_amount && remaining_after.is_negative() {
            return Err(LedgerError::Overpayment {
                remaining: loan.remaining_amount() + old_amount,
                requested: new_amount,
            });
        }

        let receipt = payments::modify_payment(loan, payment_id, new_amount, new_description, convention)?;

        log_projection(user_name, loan_id, &receipt.projection);
        info!(
            user = %user_name,
            loan_id = %loan_id,
            payment_id = %payment_id,
            new_amount = %new_amount,
            "payment modified"
        );
        Ok(receipt)
    }

    pub fn remove_payment_from_loan(
        &mut self,
        user_name: &str,
        loan_id: &LoanId,
        payment_id: PaymentId,
    ) -> Result<PaymentReceipt> {
        let convention = self.config().rate_convention;
        let loan = self.loan_mut(user_name, loan_id)?;

        let (removed, receipt) = payments::remove_payment(loan, payment_id, convention)?;

        log_projection(user_name, loan_id, &receipt.projection);
        info!(
            user = %user_name,
            loan_id = %loan_id,
            payment_id = %payment_id,
            amount = %removed.amount,
            "payment removed"
        );
        Ok(receipt)
    }

    /// flush the whole registry to storage
    pub fn persist(&mut self) -> Result<()> {
        self.repo.persist_all()
    }

    pub fn persist_user(&mut self, user_name: &str) -> Result<()> {
        self.repo.persist_user(user_name)
    }

    fn loan_mut(&mut self, user_name: &str, loan_id: &LoanId) -> Result<&mut Loan> {
        let user = self
            .repo
            .get_user_mut(user_name)
            .ok_or_else(|| user_not_found(user_name))?;
        user.loan_mut(loan_id)
            .ok_or_else(|| loan_not_found(user_name, loan_id))
    }

    fn timestamp(&self) -> String {
        self.time.now().format(&self.config().timestamp_format).to_string()
    }
}

fn loan_not_found(user_name: &str, loan_id: &LoanId) -> LedgerError {
    LedgerError::LoanNotFound {
        user_name: user_name.to_string(),
        loan_id: loan_id.clone(),
    }
}

fn log_projection(user_name: &str, loan_id: &LoanId, projection: &PayoffProjection) {
    if let PayoffProjection::InsufficientPayment {
        monthly_payment,
        interest_due,
    } = projection
    {
        warn!(
            user = %user_name,
            loan_id = %loan_id,
            monthly_payment = %monthly_payment,
            interest_due = %interest_due,
            "monthly payment is too low to cover the interest, payoff horizon unchanged"
        );
    }
}
