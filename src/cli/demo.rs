use chrono::{Datelike, Local, Months, NaiveDate};
use rusqlite::Connection;

use crate::accounts::{self, AccountInput};
use crate::cheques;
use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::models::{AccountType, VoucherType};
use crate::settings::get_data_dir;
use crate::vouchers::{self, VoucherInput};

struct DemoVoucher {
    voucher_type: VoucherType,
    day: u32,
    party: &'static str,
    amount: f64,
}

/// One month of typical shop activity, repeated for each generated month.
const MONTHLY: &[DemoVoucher] = &[
    DemoVoucher { voucher_type: VoucherType::Receipt, day: 2, party: "Sales Revenue", amount: 85_000.0 },
    DemoVoucher { voucher_type: VoucherType::Payment, day: 3, party: "Purchase of Goods", amount: 52_000.0 },
    DemoVoucher { voucher_type: VoucherType::Payment, day: 5, party: "Rent", amount: 15_000.0 },
    DemoVoucher { voucher_type: VoucherType::Payment, day: 7, party: "Salary & Wages", amount: 18_000.0 },
    DemoVoucher { voucher_type: VoucherType::Receipt, day: 16, party: "Sales Revenue", amount: 64_000.0 },
    DemoVoucher { voucher_type: VoucherType::Payment, day: 20, party: "Electricity", amount: 3_200.0 },
    DemoVoucher { voucher_type: VoucherType::Payment, day: 24, party: "Transportation & Freight", amount: 4_500.0 },
];

fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    let last_day = NaiveDate::from_ymd_opt(year, month + 1, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap())
        .pred_opt()
        .unwrap()
        .day();
    day.min(last_day)
}

fn make_date(year: i32, month: u32, day: u32) -> String {
    let d = clamp_day(year, month, day);
    format!("{year:04}-{month:02}-{d:02}")
}

fn voucher(
    voucher_type: VoucherType,
    date: String,
    account_id: i64,
    party: &str,
    amount: f64,
) -> VoucherInput {
    VoucherInput {
        voucher_type,
        voucher_date: date,
        account_id,
        to_account_id: None,
        party_name: Some(party.to_string()),
        amount,
        cheque_number: None,
        cheque_date: None,
        cheque_bank: None,
        narration: None,
        is_pdc: false,
        created_by: Some("demo".to_string()),
    }
}

fn seed(conn: &mut Connection) -> Result<(i64, i64)> {
    let shop = accounts::create_account(
        conn,
        &AccountInput {
            account_name: "Shop Current".to_string(),
            account_number: "3201456789".to_string(),
            bank_name: "State Bank of India".to_string(),
            branch_name: Some("Gandhi Road".to_string()),
            ifsc_code: Some("SBIN0004321".to_string()),
            account_type: AccountType::Current,
            opening_balance: 250_000.0,
        },
    )?;
    let savings = accounts::create_account(
        conn,
        &AccountInput {
            account_name: "Proprietor Savings".to_string(),
            account_number: "8897001234".to_string(),
            bank_name: "Bank of Baroda".to_string(),
            branch_name: Some("Station Road".to_string()),
            ifsc_code: Some("BARB0STATIO".to_string()),
            account_type: AccountType::Savings,
            opening_balance: 40_000.0,
        },
    )?;

    let today = Local::now().date_naive();
    for months_ago in (0..3u32).rev() {
        let target = today - Months::new(months_ago);
        for demo in MONTHLY {
            let date = make_date(target.year(), target.month(), demo.day);
            vouchers::create_voucher(
                conn,
                &voucher(demo.voucher_type, date, shop, demo.party, demo.amount),
            )?;
        }
    }

    // A transfer to savings and a supplier cheque still in flight.
    let this_month = make_date(today.year(), today.month(), 10);
    let mut transfer = voucher(VoucherType::Contra, this_month, shop, "", 25_000.0);
    transfer.party_name = None;
    transfer.to_account_id = Some(savings);
    vouchers::create_voucher(conn, &transfer)?;

    let mut supplier = voucher(
        VoucherType::Payment,
        make_date(today.year(), today.month(), 12),
        shop,
        "Sharma Traders",
        36_000.0,
    );
    supplier.cheque_number = Some("CHQ104522".to_string());
    supplier.cheque_date = Some(make_date(today.year(), today.month(), 28));
    supplier.cheque_bank = Some("State Bank of India".to_string());
    supplier.is_pdc = true;
    supplier.narration = Some("Post-dated cheque for April stock".to_string());
    let pdc = vouchers::create_voucher(conn, &supplier)?;
    cheques::deposit_cheque(conn, pdc.voucher_id, &make_date(today.year(), today.month(), 14))?;

    Ok((shop, savings))
}

pub fn run() -> Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let mut conn = get_connection(&data_dir.join("rokar.db"))?;
    init_db(&conn)?;

    let existing: i64 = conn.query_row(
        "SELECT count(*) FROM vouchers WHERE is_deleted = 0",
        [],
        |r| r.get(0),
    )?;
    if existing > 0 {
        println!("Ledger already has vouchers; demo data not loaded.");
        return Ok(());
    }

    let (shop, savings) = seed(&mut conn)?;
    let shop_balance = accounts::get_account(&conn, shop)?.current_balance;
    let savings_balance = accounts::get_account(&conn, savings)?.current_balance;

    println!("Loaded demo data: 3 months of activity across 2 bank accounts.");
    println!("  Shop Current:        {}", crate::fmt::money(shop_balance));
    println!("  Proprietor Savings:  {}", crate::fmt::money(savings_balance));
    println!("Try: rokar accounts list, rokar voucher list, rokar cheque list");
    Ok(())
}
