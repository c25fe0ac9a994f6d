/// quick start - open a ledger on disk, track a loan and flush it
use loan_ledger_rs::{
    FileRepository, LedgerConfig, LedgerService, Money, NewLoan, Rate, SafeTimeProvider,
    TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // LOAN_LEDGER_DATA_DIR and friends override the defaults
    let config = LedgerConfig::from_env()?;
    let repo = FileRepository::open(config)?;
    let mut ledger = LedgerService::new(repo, SafeTimeProvider::new(TimeSource::System));

    ledger.get_or_create_user("alice")?;

    // a $10,000 loan at 12% a year, paid down by $200 a month
    let created = ledger.add_loan_to_user(
        "alice",
        NewLoan {
            loan_name: "Car".to_string(),
            amount: Money::from_major(10_000),
            interest: Rate::from_percentage(dec!(12)),
            monthly_payment: Money::from_major(200),
        },
    )?;
    println!("loan {} pays off in {:?} months", created.loan_id, created.projection.horizon());

    let receipt = ledger.add_payment_to_loan("alice", &created.loan_id, "500.00".parse::<Money>()?, "bonus")?;
    ledger.modify_payment_from_loan("alice", &created.loan_id, receipt.payment_id, Money::from_major(750), "bonus, corrected")?;

    println!("{}", ledger.user_view("alice")?.to_json_pretty()?);

    ledger.persist()?;
    Ok(())
}
