/// read-only views for presenting loans and their payment history
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::loan::{Loan, Payment};
use crate::payments::{payoff_horizon, payoff_years};
use crate::types::{LoanId, PaymentId, RateConvention};
use crate::user::User;

/// where a loan stands against its monthly payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffStatus {
    OnTrack,
    PaidOff,
    InsufficientPayment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentView {
    pub payment_id: PaymentId,
    pub date_time: String,
    pub description: String,
    pub amount: Money,
}

impl From<&Payment> for PaymentView {
    fn from(payment: &Payment) -> Self {
        Self {
            payment_id: payment.payment_id,
            date_time: payment.date_time.clone(),
            description: payment.description.clone(),
            amount: payment.amount,
        }
    }
}

/// serializable snapshot of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    pub loan_id: LoanId,
    pub loan_name: String,
    pub amount: Money,
    pub remaining_amount: Money,
    pub total_paid: Money,
    pub interest: Rate,
    pub monthly_payment: Money,
    pub months_to_pay_off: f64,
    pub years_to_pay_off: f64,
    pub payoff_status: PayoffStatus,
    pub payments: Vec<PaymentView>,
}

impl LoanView {
    /// snapshot of `loan`, its status judged under the same `convention`
    /// that produced its horizon
    pub fn from_loan(loan: &Loan, convention: RateConvention) -> Self {
        let projection = payoff_horizon(
            loan.remaining_amount(),
            loan.monthly_payment(),
            loan.interest(),
            convention,
        );
        let payoff_status = if loan.is_paid_off() {
            PayoffStatus::PaidOff
        } else if projection.is_insufficient() {
            PayoffStatus::InsufficientPayment
        } else {
            PayoffStatus::OnTrack
        };

        LoanView {
            loan_id: loan.loan_id().clone(),
            loan_name: loan.loan_name().to_string(),
            amount: loan.amount(),
            remaining_amount: loan.remaining_amount(),
            total_paid: loan.total_paid(),
            interest: loan.interest(),
            monthly_payment: loan.monthly_payment(),
            months_to_pay_off: loan.time_paid_off(),
            years_to_pay_off: payoff_years(loan.time_paid_off()),
            payoff_status,
            payments: loan.payments().iter().map(PaymentView::from).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub user_name: String,
    pub loans: Vec<LoanView>,
    pub total_remaining: Money,
    pub total_paid: Money,
}

impl UserView {
    pub fn from_user(user: &User, convention: RateConvention) -> Self {
        let loans: Vec<LoanView> = user
            .loans()
            .iter()
            .map(|loan| LoanView::from_loan(loan, convention))
            .collect();
        UserView {
            user_name: user.user_name().to_string(),
            total_remaining: loans.iter().map(|l| l.remaining_amount).sum(),
            total_paid: loans.iter().map(|l| l.total_paid).sum(),
            loans,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
