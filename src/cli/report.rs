use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::today;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::reports;
use crate::settings::get_data_dir;

pub fn statement(account_id: i64, from_date: &str, to_date: &str) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let statement = reports::get_statement(&conn, account_id, from_date, to_date)?;

    println!(
        "Statement: {} ({from_date} to {to_date})",
        statement.account.account_name.bold()
    );
    println!("Opening balance: {}", money(statement.opening_balance));

    let mut table = Table::new();
    table.set_header(vec!["Date", "Number", "Party", "Dr/Cr", "Amount", "Balance"]);
    for line in &statement.lines {
        let v = &line.voucher;
        table.add_row(vec![
            Cell::new(&v.voucher_date),
            Cell::new(&v.voucher_number),
            Cell::new(v.party_name.as_deref().unwrap_or_default()),
            Cell::new(v.direction),
            Cell::new(money(v.amount)),
            Cell::new(money(line.running_balance)),
        ]);
    }
    println!("{table}");
    println!("Closing balance: {}", money(statement.closing_balance).bold());
    Ok(())
}

pub fn cashflow(from_date: &str, to_date: &str) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let report = reports::get_cashflow(&conn, from_date, to_date)?;

    println!("Cash flow ({from_date} to {to_date})");
    println!(
        "Receipts: {} ({} vouchers)",
        money(report.total_receipts).green(),
        report.receipt_count
    );
    println!(
        "Payments: {} ({} vouchers)",
        money(report.total_payments).red(),
        report.payment_count
    );
    let net = money(report.net_cashflow);
    println!(
        "Net:      {}",
        if report.net_cashflow >= 0.0 { net.green().bold() } else { net.red().bold() }
    );

    if !report.expense_by_category.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Expense head", "Amount", "Count"]);
        for flow in &report.expense_by_category {
            table.add_row(vec![
                Cell::new(&flow.category),
                Cell::new(money(flow.amount)),
                Cell::new(flow.count),
            ]);
        }
        println!("\nExpenses by head\n{table}");
    }

    if !report.income_by_category.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Income head", "Amount", "Count"]);
        for flow in &report.income_by_category {
            table.add_row(vec![
                Cell::new(&flow.category),
                Cell::new(money(flow.amount)),
                Cell::new(flow.count),
            ]);
        }
        println!("\nIncome by head\n{table}");
    }
    Ok(())
}

pub fn daybook(date: Option<String>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let date = date.unwrap_or_else(today);
    let daybook = reports::get_daybook(&conn, &date)?;

    let mut table = Table::new();
    table.set_header(vec!["Number", "Type", "Party", "Dr/Cr", "Amount", "Status"]);
    for v in &daybook.vouchers {
        table.add_row(vec![
            Cell::new(&v.voucher_number),
            Cell::new(v.voucher_type),
            Cell::new(v.party_name.as_deref().unwrap_or_default()),
            Cell::new(v.direction),
            Cell::new(money(v.amount)),
            Cell::new(v.cleared_status),
        ]);
    }
    println!("Daybook {date}\n{table}");
    println!(
        "In: {}   Out: {}   Net: {}",
        money(daybook.total_receipts).green(),
        money(daybook.total_payments).red(),
        money(daybook.net).bold()
    );
    Ok(())
}
