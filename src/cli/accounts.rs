use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::accounts::{self, AccountInput};
use crate::cli::parse_arg;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::get_data_dir;

fn build_input(
    name: &str,
    number: &str,
    bank: &str,
    branch: Option<&str>,
    ifsc: Option<&str>,
    account_type: &str,
    opening: f64,
) -> Result<AccountInput> {
    Ok(AccountInput {
        account_name: name.to_string(),
        account_number: number.to_string(),
        bank_name: bank.to_string(),
        branch_name: branch.map(str::to_string),
        ifsc_code: ifsc.map(str::to_string),
        account_type: parse_arg(account_type)?,
        opening_balance: opening,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    name: &str,
    number: &str,
    bank: &str,
    branch: Option<&str>,
    ifsc: Option<&str>,
    account_type: &str,
    opening: f64,
) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let input = build_input(name, number, bank, branch, ifsc, account_type, opening)?;
    let id = accounts::create_account(&conn, &input)?;
    println!("Added account {id}: {name} ({})", money(opening));
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let accounts = accounts::list_active(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Number", "Bank", "Type", "Balance"]);
    let mut total = 0.0;
    for account in &accounts {
        total += account.current_balance;
        table.add_row(vec![
            Cell::new(account.id),
            Cell::new(&account.account_name),
            Cell::new(&account.account_number),
            Cell::new(&account.bank_name),
            Cell::new(account.account_type),
            Cell::new(money(account.current_balance)),
        ]);
    }
    println!("Accounts\n{table}");
    println!("Total position: {}", money(total).bold());
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let details = accounts::get_details(&conn, id)?;
    let account = &details.account;

    println!("{}", account.account_name.bold());
    println!("Number:   {}", account.account_number);
    println!("Bank:     {}", account.bank_name);
    if let Some(branch) = &account.branch_name {
        println!("Branch:   {branch}");
    }
    if let Some(ifsc) = &account.ifsc_code {
        println!("IFSC:     {ifsc}");
    }
    println!("Type:     {}", account.account_type);
    println!("Opening:  {}", money(account.opening_balance));
    println!("Balance:  {}", money(account.current_balance).bold());
    println!(
        "Vouchers: {} ({} debits, {} credits)",
        details.voucher_count,
        money(details.total_debits),
        money(details.total_credits)
    );

    if !details.recent_vouchers.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["ID", "Number", "Date", "Party", "Dr/Cr", "Amount", "Status"]);
        for v in &details.recent_vouchers {
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
        println!("\nRecent vouchers\n{table}");
    }
    Ok(())
}

pub fn update(
    id: i64,
    name: &str,
    number: &str,
    bank: &str,
    branch: Option<&str>,
    ifsc: Option<&str>,
    account_type: &str,
) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let input = build_input(name, number, bank, branch, ifsc, account_type, 0.0)?;
    accounts::update_metadata(&conn, id, &input)?;
    println!("Updated account {id}: {name}");
    Ok(())
}

pub fn deactivate(id: i64) -> Result<()> {
    let mut conn = get_connection(&get_data_dir().join("rokar.db"))?;
    accounts::deactivate(&mut conn, id)?;
    println!("Deactivated account {id}");
    Ok(())
}
