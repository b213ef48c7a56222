use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{parse_arg, today};
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{money, money_or_blank};
use crate::settings::{default_operator, get_data_dir};
use crate::vouchers::{self, VoucherFilters, VoucherInput};

#[allow(clippy::too_many_arguments)]
fn build_input(
    voucher_type: &str,
    account: i64,
    amount: f64,
    date: Option<String>,
    to_account: Option<i64>,
    party: Option<String>,
    cheque: Option<String>,
    cheque_date: Option<String>,
    cheque_bank: Option<String>,
    narration: Option<String>,
    pdc: bool,
) -> Result<VoucherInput> {
    Ok(VoucherInput {
        voucher_type: parse_arg(voucher_type)?,
        voucher_date: date.unwrap_or_else(today),
        account_id: account,
        to_account_id: to_account,
        party_name: party,
        amount,
        cheque_number: cheque,
        cheque_date,
        cheque_bank,
        narration,
        is_pdc: pdc,
        created_by: Some(default_operator()),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    voucher_type: &str,
    account: i64,
    amount: f64,
    date: Option<String>,
    to_account: Option<i64>,
    party: Option<String>,
    cheque: Option<String>,
    cheque_date: Option<String>,
    cheque_bank: Option<String>,
    narration: Option<String>,
    pdc: bool,
) -> Result<()> {
    let mut conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let input = build_input(
        voucher_type,
        account,
        amount,
        date,
        to_account,
        party,
        cheque,
        cheque_date,
        cheque_bank,
        narration,
        pdc,
    )?;
    let saved = vouchers::create_voucher(&mut conn, &input)?;
    println!(
        "Recorded {} {} for {}",
        input.voucher_type,
        saved.voucher_number,
        money(input.amount)
    );
    if saved.paired_voucher_id.is_some() {
        println!("Transfer booked on both accounts.");
    }
    Ok(())
}

pub fn list(
    from_date: Option<String>,
    to_date: Option<String>,
    account: Option<i64>,
    voucher_type: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let filters = VoucherFilters {
        from_date,
        to_date,
        account_id: account,
        voucher_type: voucher_type.as_deref().map(parse_arg).transpose()?,
        cleared_status: status.as_deref().map(parse_arg).transpose()?,
    };
    let vouchers = vouchers::list_vouchers(&conn, &filters)?;

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Number", "Type", "Date", "Party", "Dr/Cr", "Amount", "Status", "Rec",
    ]);
    for v in &vouchers {
        table.add_row(vec![
            Cell::new(v.id),
            Cell::new(&v.voucher_number),
            Cell::new(v.voucher_type),
            Cell::new(&v.voucher_date),
            Cell::new(v.party_name.as_deref().unwrap_or_default()),
            Cell::new(v.direction),
            Cell::new(money(v.amount)),
            Cell::new(v.cleared_status),
            Cell::new(if v.reconciled { "Y" } else { "" }),
        ]);
    }
    println!("Vouchers ({})\n{table}", vouchers.len());
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let detail = vouchers::get_voucher_detail(&conn, id)?;
    let v = &detail.voucher;

    println!("{} {}", v.voucher_type, v.voucher_number.bold());
    println!("Date:     {}", v.voucher_date);
    println!("Party:    {}", v.party_name.as_deref().unwrap_or_default());
    println!("Amount:   {} ({})", money(v.amount), v.direction);
    println!("Status:   {}", v.cleared_status);
    if let Some(cheque) = &v.cheque_number {
        println!("Cheque:   {cheque} ({})", v.cheque_date.as_deref().unwrap_or("no date"));
    }
    if let Some(narration) = &v.narration {
        if !narration.is_empty() {
            println!("Note:     {narration}");
        }
    }
    if v.reconciled {
        println!(
            "Reconciled on {}",
            v.reconciled_date.as_deref().unwrap_or_default()
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["Ledger", "Name", "Debit", "Credit"]);
    for entry in &detail.entries {
        table.add_row(vec![
            Cell::new(entry.ledger_type),
            Cell::new(&entry.ledger_name),
            Cell::new(money_or_blank(entry.debit_amount)),
            Cell::new(money_or_blank(entry.credit_amount)),
        ]);
    }
    println!("\nLedger entries\n{table}");

    if let Some(pdc) = &detail.pdc {
        println!(
            "\nPost-dated cheque {} dated {} — {}",
            pdc.cheque_number, pdc.cheque_date, pdc.status
        );
        if let Some(notes) = &pdc.notes {
            println!("Notes: {notes}");
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    id: i64,
    voucher_type: &str,
    account: i64,
    amount: f64,
    date: Option<String>,
    to_account: Option<i64>,
    party: Option<String>,
    cheque: Option<String>,
    cheque_date: Option<String>,
    cheque_bank: Option<String>,
    narration: Option<String>,
    pdc: bool,
) -> Result<()> {
    let mut conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let input = build_input(
        voucher_type,
        account,
        amount,
        date,
        to_account,
        party,
        cheque,
        cheque_date,
        cheque_bank,
        narration,
        pdc,
    )?;
    let saved = vouchers::update_voucher(&mut conn, id, &input)?;
    println!("Rewrote voucher {} ({})", saved.voucher_number, money(input.amount));
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let mut conn = get_connection(&get_data_dir().join("rokar.db"))?;
    vouchers::delete_voucher(&mut conn, id, Some(&default_operator()))?;
    println!("Deleted voucher {id} and reversed its balance effect");
    Ok(())
}

pub fn next_number(voucher_type: &str) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let number = vouchers::next_voucher_number(&conn, parse_arg(voucher_type)?)?;
    println!("{number}");
    Ok(())
}

pub fn parties() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    for party in vouchers::recent_parties(&conn, 50)? {
        println!("{party}");
    }
    Ok(())
}
