//! End-to-end tests for the ledger service over the file repository

use chrono::{TimeZone, Utc};
use loan_ledger_rs::{
    FileRepository, LedgerConfig, LedgerError, LedgerService, LoanId, LoanView, Money, NewLoan,
    PayoffStatus, Rate, RateConvention, SafeTimeProvider, TimeSource, UserRepository,
};
use rust_decimal_macros::dec;

fn open(dir: &std::path::Path) -> LedgerService<FileRepository> {
    let repo = FileRepository::open(LedgerConfig::with_data_dir(dir)).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 9, 12, 10, 30, 0).unwrap(),
    ));
    LedgerService::new(repo, time)
}

fn mortgage() -> NewLoan {
    NewLoan {
        loan_name: "Mortgage".to_string(),
        amount: Money::from_major(10_000),
        interest: Rate::from_percentage(dec!(12)),
        monthly_payment: Money::from_major(200),
    }
}

#[test]
fn session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let loan_id;
    let payment_id;
    {
        let mut service = open(dir.path());
        service.create_user("alice").unwrap();
        loan_id = service.add_loan_to_user("alice", mortgage()).unwrap().loan_id;

        // two payments in the same second
        payment_id = service
            .add_payment_to_loan("alice", &loan_id, Money::from_major(500), "bonus")
            .unwrap()
            .payment_id;
        service
            .add_payment_to_loan("alice", &loan_id, Money::from_major(200), "monthly")
            .unwrap();

        service.persist().unwrap();
    }

    let mut service = open(dir.path());
    let loan = service.loan("alice", &loan_id).unwrap();
    assert_eq!(loan.remaining_amount(), Money::from_major(9_300));
    assert_eq!(loan.total_paid(), Money::from_major(700));
    assert_eq!(loan.payments().len(), 2);
    assert_eq!(loan.payments()[0].date_time, loan.payments()[1].date_time);

    service
        .modify_payment_from_loan("alice", &loan_id, payment_id, Money::from_major(800), "bigger bonus")
        .unwrap();
    let loan = service.loan("alice", &loan_id).unwrap();
    assert_eq!(loan.total_paid(), Money::from_major(1_000));
    assert_eq!(loan.payments()[1].description, "monthly");
}

#[test]
fn mutations_are_not_persisted_until_flushed() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut service = open(dir.path());
        service.create_user("alice").unwrap();
        service.persist_user("alice").unwrap();
        service.add_loan_to_user("alice", mortgage()).unwrap();
    }

    let service = open(dir.path());
    assert!(service.loans("alice").unwrap().is_empty());
}

#[test]
fn deleted_user_is_moved_not_erased() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = open(dir.path());
    service.create_user("bob").unwrap();
    service.persist().unwrap();

    service.delete_user("bob").unwrap();
    assert!(service.get_user("bob").is_none());
    assert!(!dir.path().join("bob.json").exists());
    assert!(dir.path().join("deleted/bob.json").is_file());

    let err = service.delete_user("bob").unwrap_err();
    assert!(matches!(err, LedgerError::UserNotFound { .. }));
    assert!(open(dir.path()).repository().list_users().is_empty());
}

#[test]
fn recreated_user_keeps_first_deleted_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = open(dir.path());
    service.create_user("bob").unwrap();
    service.add_loan_to_user("bob", mortgage()).unwrap();
    service.persist().unwrap();
    service.delete_user("bob").unwrap();

    service.create_user("bob").unwrap();
    service.persist().unwrap();
    service.delete_user("bob").unwrap();

    let deleted: Vec<_> = std::fs::read_dir(dir.path().join("deleted"))
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect();
    assert_eq!(deleted.len(), 2);
    assert!(deleted.iter().any(|doc| doc.contains("Mortgage")));
}

#[test]
fn insufficient_monthly_payment_keeps_horizon() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = open(dir.path());
    service.create_user("alice").unwrap();
    let loan_id = service.add_loan_to_user("alice", mortgage()).unwrap().loan_id;
    let horizon = service.loan("alice", &loan_id).unwrap().time_paid_off();
    assert!((horizon - 69.66).abs() < 0.01);

    // a correction that raises the balance past the break-even point
    let receipt = service
        .add_payment_to_loan("alice", &loan_id, Money::from_major(-15_000), "reversal")
        .unwrap();
    assert!(receipt.projection.is_insufficient());
    assert!(matches!(
        receipt.projection.into_result(),
        Err(LedgerError::InsufficientPayment { .. })
    ));

    let loan = service.loan("alice", &loan_id).unwrap();
    assert_eq!(loan.time_paid_off(), horizon);
    assert_eq!(
        LoanView::from_loan(loan, RateConvention::Monthly).payoff_status,
        PayoffStatus::InsufficientPayment
    );
    assert_eq!(
        service.loan_view("alice", &loan_id).unwrap().payoff_status,
        PayoffStatus::InsufficientPayment
    );
}

#[test]
fn legacy_convention_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = LedgerConfig::with_data_dir(dir.path()).rate_convention(RateConvention::Legacy);
    let repo = FileRepository::open(config).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
    let mut service = LedgerService::new(repo, time);

    service.create_user("alice").unwrap();
    let created = service.add_loan_to_user("alice", mortgage()).unwrap();

    // the raw percentage makes P - B·I negative, so no horizon is produced
    assert!(created.projection.is_insufficient());
    assert_eq!(created.loan_id, LoanId::new("1"));
    assert_eq!(service.config().rate_convention, RateConvention::Legacy);
    assert_eq!(
        service.loan_view("alice", &created.loan_id).unwrap().payoff_status,
        PayoffStatus::InsufficientPayment
    );
}
