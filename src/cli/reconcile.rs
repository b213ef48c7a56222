use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::reconciler::{self, ReconcileInput};
use crate::settings::{default_operator, get_data_dir};

pub fn run(
    account_id: i64,
    date: &str,
    balance: f64,
    vouchers: Vec<i64>,
    notes: Option<String>,
) -> Result<()> {
    let mut conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let outcome = reconciler::reconcile(
        &mut conn,
        &ReconcileInput {
            account_id,
            statement_date: date.to_string(),
            statement_balance: balance,
            voucher_ids: vouchers.clone(),
            operator: Some(default_operator()),
            notes,
        },
    )?;

    let record = &outcome.record;
    println!(
        "Reconciled {} voucher(s) against statement of {}",
        vouchers.len(),
        record.statement_date
    );
    println!("  Statement: {}", money(record.statement_balance));
    println!("  Book:      {}", money(record.book_balance));
    println!("  Selected:  {}", money(outcome.selected_total));
    if record.difference.abs() < 0.005 {
        println!("  {}", "Balances match.".green());
    } else {
        println!(
            "  {} {}",
            "DIFFERENCE:".yellow().bold(),
            money(record.difference)
        );
        println!("  Recorded as-is; investigate before the next statement.");
    }
    Ok(())
}

pub fn pending(account_id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let vouchers = reconciler::list_unreconciled(&conn, account_id)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Number", "Date", "Party", "Dr/Cr", "Amount", "Status"]);
    for v in &vouchers {
        table.add_row(vec![
            Cell::new(v.id),
            Cell::new(&v.voucher_number),
            Cell::new(&v.voucher_date),
            Cell::new(v.party_name.as_deref().unwrap_or_default()),
            Cell::new(v.direction),
            Cell::new(money(v.amount)),
            Cell::new(v.cleared_status),
        ]);
    }
    println!("Unreconciled vouchers ({})\n{table}", vouchers.len());
    Ok(())
}

pub fn history(account_id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let records = reconciler::get_history(&conn, account_id)?;

    let mut table = Table::new();
    table.set_header(vec![
        "Date", "Statement", "Book", "Difference", "By", "Notes",
    ]);
    for r in &records {
        table.add_row(vec![
            Cell::new(&r.statement_date),
            Cell::new(money(r.statement_balance)),
            Cell::new(money(r.book_balance)),
            Cell::new(money(r.difference)),
            Cell::new(r.reconciled_by.as_deref().unwrap_or_default()),
            Cell::new(r.notes.as_deref().unwrap_or_default()),
        ]);
    }
    println!("Reconciliation history\n{table}");
    Ok(())
}
