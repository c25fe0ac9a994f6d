pub mod config;
pub mod decimal;
pub mod errors;
pub mod loan;
pub mod payments;
pub mod report;
pub mod service;
pub mod storage;
pub mod types;
pub mod user;

// re-export key types
pub use config::LedgerConfig;
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use loan::{Loan, NewLoan, Payment};
pub use payments::{add_payment, modify_payment, payoff_horizon, remove_payment, PaymentReceipt};
pub use report::{LoanView, PaymentView, PayoffStatus, UserView};
pub use service::{LedgerService, LoanCreated};
pub use storage::{FileRepository, MemoryRepository, UserRepository};
pub use types::{LoanId, PaymentId, PayoffProjection, RateConvention};
pub use user::User;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
