use fund_core::ledger::{Ledger, TransactionKind, TransferOutcome};
use uuid::Uuid;

fn two_fund_ledger(cash_balance: f64, savings_balance: f64) -> (Ledger, Uuid, Uuid) {
    let mut ledger = Ledger::new();
    let cash = ledger.create_fund("Cash", cash_balance, "", "General");
    let savings = ledger.create_fund("Savings", savings_balance, "Long term", "Savings");
    (ledger, cash, savings)
}

#[test]
fn sufficient_transfer_conserves_total_balance() {
    let (mut ledger, cash, savings) = two_fund_ledger(120.0, 35.0);
    let before_total = ledger.total_balance();

    ledger.transfer(40.0, savings, "", Some(cash)).unwrap();

    assert_eq!(ledger.fund_balance(Some(cash)), 80.0);
    assert_eq!(ledger.fund_balance(Some(savings)), 75.0);
    assert_eq!(ledger.total_balance(), before_total);
}

#[test]
fn insufficient_transfer_zeroes_source_and_creates_debt() {
    let (mut ledger, cash, savings) = two_fund_ledger(50.0, 20.0);

    let outcome = ledger.transfer(100.0, savings, "", Some(cash)).unwrap();
    let TransferOutcome::Partial { debt, .. } = outcome else {
        panic!("expected a partial transfer");
    };

    assert_eq!(debt, 50.0);
    assert_eq!(ledger.fund_balance(Some(cash)), 0.0);
    assert_eq!(ledger.fund_balance(Some(savings)), 70.0);
    assert_eq!(ledger.debt_balance, 50.0);
}

#[test]
fn delete_reverses_a_deposit() {
    let (mut ledger, cash, _) = two_fund_ledger(100.0, 0.0);
    let funds_before = ledger.funds.clone();
    let (balance_before, cost_before) = (ledger.global_balance, ledger.global_cost);

    let tx = ledger.deposit(25.0, "bonus", Some(cash)).unwrap();
    ledger.delete_transaction(tx);

    assert_eq!(ledger.funds, funds_before);
    assert_eq!(ledger.global_balance, balance_before);
    assert_eq!(ledger.global_cost, cost_before);
}

#[test]
fn delete_reverses_a_withdrawal() {
    let (mut ledger, cash, _) = two_fund_ledger(100.0, 0.0);
    let funds_before = ledger.funds.clone();
    let (balance_before, cost_before) = (ledger.global_balance, ledger.global_cost);

    let tx = ledger.withdraw(30.0, "lunch", Some(cash)).unwrap();
    ledger.delete_transaction(tx);

    assert_eq!(ledger.funds, funds_before);
    assert_eq!(ledger.global_balance, balance_before);
    assert_eq!(ledger.global_cost, cost_before);
}

#[test]
fn delete_reverses_a_cost_with_fund() {
    let (mut ledger, cash, _) = two_fund_ledger(100.0, 0.0);
    let funds_before = ledger.funds.clone();
    let (balance_before, cost_before) = (ledger.global_balance, ledger.global_cost);

    let tx = ledger.add_cost(15.0, "Food", "snacks", Some(cash)).unwrap();
    ledger.delete_transaction(tx);

    assert_eq!(ledger.funds, funds_before);
    assert_eq!(ledger.global_balance, balance_before);
    assert_eq!(ledger.global_cost, cost_before);
}

#[test]
fn no_orphaned_transfer_leg_survives_a_delete() {
    let (mut ledger, cash, savings) = two_fund_ledger(100.0, 0.0);
    let TransferOutcome::Completed { from_tx, .. } =
        ledger.transfer(20.0, savings, "", Some(cash)).unwrap()
    else {
        panic!("expected a completed transfer");
    };

    ledger.delete_transaction(from_tx);

    for tx in &ledger.transactions {
        if tx.kind == TransactionKind::Transfer {
            let counterpart = tx.counterpart.expect("transfer legs stay paired");
            assert!(
                ledger.transactions.iter().any(|t| t.id == counterpart),
                "orphaned transfer leg {} left behind",
                tx.id
            );
        }
    }
    assert!(ledger
        .transactions
        .iter()
        .all(|tx| tx.kind != TransactionKind::Transfer));
}

#[test]
fn balances_never_go_negative() {
    let (mut ledger, cash, savings) = two_fund_ledger(10.0, 0.0);

    ledger.add_cost(500.0, "Household", "", Some(cash));
    ledger.transfer(1000.0, savings, "", Some(cash));
    ledger.withdraw(50.0, "", Some(savings));
    if let Some(tx) = ledger.transactions.first().map(|t| t.id) {
        ledger.delete_transaction(tx);
    }

    for fund in ledger.funds.values() {
        assert!(fund.balance >= 0.0, "{} went negative", fund.name);
    }
    assert!(ledger.global_balance >= 0.0);
    assert!(ledger.global_cost >= 0.0);
    assert!(ledger.debt_balance >= 0.0);
}

#[test]
fn bad_input_operations_leave_the_ledger_untouched() {
    let (mut ledger, cash, _) = two_fund_ledger(100.0, 0.0);
    let before = ledger.clone();

    assert!(ledger.deposit(-5.0, "bad", Some(cash)).is_none());
    assert!(ledger.withdraw(0.0, "bad", Some(cash)).is_none());
    assert!(ledger.transfer(10.0, cash, "bad", Some(cash)).is_none());
    assert!(ledger.add_cost(0.0, "Food", "bad", Some(cash)).is_none());

    assert_eq!(ledger, before);
}

#[test]
fn unresolved_fund_operations_leave_the_ledger_untouched() {
    let mut ledger = Ledger::new();
    let before = ledger.clone();

    assert!(ledger.deposit(10.0, "", None).is_none());
    assert!(ledger.withdraw(10.0, "", None).is_none());
    assert!(ledger.transfer(10.0, Uuid::new_v4(), "", None).is_none());

    assert_eq!(ledger, before);
}

// The worked scenario from the product notes: seed, spend, split across two
// envelopes, overdraw into debt.
#[test]
fn tracker_walkthrough() {
    let mut ledger = Ledger::new();

    let cash = ledger.create_fund("Cash", 100.0, "", "General");
    assert_eq!(ledger.fund_balance(Some(cash)), 100.0);
    assert_eq!(ledger.global_balance, 100.0);
    assert_eq!(ledger.transactions.len(), 1);

    ledger.withdraw(30.0, "lunch", Some(cash)).unwrap();
    assert_eq!(ledger.fund_balance(Some(cash)), 70.0);
    assert_eq!(ledger.global_balance, 70.0);
    assert_eq!(ledger.global_cost, 30.0);

    let savings = ledger.create_fund("Savings", 0.0, "", "General");
    ledger.transfer(20.0, savings, "", Some(cash)).unwrap();
    assert_eq!(ledger.fund_balance(Some(cash)), 50.0);
    assert_eq!(ledger.fund_balance(Some(savings)), 20.0);
    assert_eq!(ledger.global_balance, 70.0);

    ledger.transfer(100.0, savings, "", Some(cash)).unwrap();
    assert_eq!(ledger.fund_balance(Some(cash)), 0.0);
    assert_eq!(ledger.fund_balance(Some(savings)), 70.0);
    assert_eq!(ledger.debt_balance, 50.0);
}

#[test]
fn deleting_a_withdrawal_restores_spending_power() {
    let mut ledger = Ledger::new();
    let cash = ledger.create_fund("Cash", 100.0, "", "General");
    let tx = ledger.withdraw(30.0, "lunch", Some(cash)).unwrap();

    ledger.delete_transaction(tx);

    assert_eq!(ledger.fund_balance(Some(cash)), 100.0);
    assert_eq!(ledger.global_balance, 100.0);
    assert_eq!(ledger.global_cost, 0.0);
}

#[test]
fn cost_without_explicit_fund_falls_to_active_then_unassigned() {
    let mut ledger = Ledger::new();
    let cash = ledger.create_fund("Cash", 100.0, "", "General");

    ledger.add_cost(15.0, "Food", "street food", None).unwrap();

    // the cost fell to the active fund
    assert_eq!(ledger.fund_balance(Some(cash)), 85.0);
    assert_eq!(ledger.global_balance, 85.0);
    assert_eq!(ledger.global_cost, 15.0);

    let mut bare = Ledger::new();
    bare.add_cost(15.0, "Food", "street food", None).unwrap();
    assert_eq!(bare.global_balance, 0.0);
    assert_eq!(bare.global_cost, 15.0);
    assert!(bare.funds.is_empty());
}
