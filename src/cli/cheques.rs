use comfy_table::{Cell, Table};

use crate::cheques;
use crate::cli::{parse_arg, today};
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::{default_operator, get_data_dir};

pub fn deposit(voucher_id: i64, date: Option<String>) -> Result<()> {
    let mut conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let date = date.unwrap_or_else(today);
    cheques::deposit_cheque(&mut conn, voucher_id, &date)?;
    println!("Cheque on voucher {voucher_id} marked deposited ({date})");
    Ok(())
}

pub fn clear(voucher_id: i64, date: Option<String>) -> Result<()> {
    let mut conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let date = date.unwrap_or_else(today);
    cheques::clear_cheque(&mut conn, voucher_id, &date)?;
    println!("Cheque on voucher {voucher_id} cleared ({date})");
    Ok(())
}

pub fn bounce(voucher_id: i64, date: Option<String>, reason: &str) -> Result<()> {
    let mut conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let date = date.unwrap_or_else(today);
    cheques::bounce_cheque(&mut conn, voucher_id, &date, reason, Some(&default_operator()))?;
    println!("Cheque on voucher {voucher_id} bounced; balance effect reversed");
    Ok(())
}

pub fn cancel(voucher_id: i64, reason: &str) -> Result<()> {
    let mut conn = get_connection(&get_data_dir().join("rokar.db"))?;
    cheques::cancel_cheque(&mut conn, voucher_id, reason, Some(&default_operator()))?;
    println!("Cheque on voucher {voucher_id} cancelled; balance effect reversed");
    Ok(())
}

pub fn list(status: Option<String>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let filter = status.as_deref().map(parse_arg).transpose()?;
    let cheques = cheques::list_cheques(&conn, filter)?;

    let mut table = Table::new();
    table.set_header(vec![
        "Voucher", "Cheque", "Date", "Party", "Bank", "Amount", "Status",
    ]);
    for c in &cheques {
        table.add_row(vec![
            Cell::new(c.voucher_id),
            Cell::new(&c.cheque_number),
            Cell::new(&c.cheque_date),
            Cell::new(&c.party_name),
            Cell::new(c.bank_name.as_deref().unwrap_or_default()),
            Cell::new(money(c.amount)),
            Cell::new(c.status),
        ]);
    }
    println!("Post-dated cheques ({})\n{table}", cheques.len());
    Ok(())
}
