use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use crate::error::{Result, RokarError};
use crate::models::{AccountType, BankAccount, Voucher};
use crate::vouchers::{voucher_from_row, VOUCHER_COLUMNS};

#[derive(Debug, Clone)]
pub struct AccountInput {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub branch_name: Option<String>,
    pub ifsc_code: Option<String>,
    pub account_type: AccountType,
    pub opening_balance: f64,
}

#[derive(Debug)]
pub struct AccountDetails {
    pub account: BankAccount,
    pub recent_vouchers: Vec<Voucher>,
    pub voucher_count: i64,
    pub total_debits: f64,
    pub total_credits: f64,
}

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BankAccount> {
    Ok(BankAccount {
        id: row.get(0)?,
        account_name: row.get(1)?,
        account_number: row.get(2)?,
        bank_name: row.get(3)?,
        branch_name: row.get(4)?,
        ifsc_code: row.get(5)?,
        account_type: row.get(6)?,
        opening_balance: row.get(7)?,
        current_balance: row.get(8)?,
        is_active: row.get(9)?,
    })
}

const ACCOUNT_COLUMNS: &str = "id, account_name, account_number, bank_name, branch_name, \
     ifsc_code, account_type, opening_balance, current_balance, is_active";

pub fn create_account(conn: &Connection, input: &AccountInput) -> Result<i64> {
    if input.account_name.trim().is_empty() {
        return Err(RokarError::Validation("account name is required".into()));
    }
    if input.account_number.trim().is_empty() {
        return Err(RokarError::Validation("account number is required".into()));
    }
    if input.bank_name.trim().is_empty() {
        return Err(RokarError::Validation("bank name is required".into()));
    }

    conn.execute(
        "INSERT INTO bank_accounts \
         (account_name, account_number, bank_name, branch_name, ifsc_code, account_type, \
          opening_balance, current_balance) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        rusqlite::params![
            input.account_name,
            input.account_number,
            input.bank_name,
            input.branch_name,
            input.ifsc_code,
            input.account_type,
            input.opening_balance,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_active(conn: &Connection) -> Result<Vec<BankAccount>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM bank_accounts WHERE is_active = 1 ORDER BY account_name"
    ))?;
    let accounts = stmt
        .query_map([], account_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(accounts)
}

pub fn get_account(conn: &Connection, id: i64) -> Result<BankAccount> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM bank_accounts WHERE id = ?1"),
        [id],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| RokarError::NotFound(format!("bank account {id}")))
}

/// Active-account lookup used by the voucher engine before posting.
pub(crate) fn get_active_account(conn: &Connection, id: i64) -> Result<BankAccount> {
    let account = get_account(conn, id)?;
    if !account.is_active {
        return Err(RokarError::NotFound(format!(
            "bank account {id} is deactivated"
        )));
    }
    Ok(account)
}

pub fn get_details(conn: &Connection, id: i64) -> Result<AccountDetails> {
    let account = get_account(conn, id)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {VOUCHER_COLUMNS} FROM vouchers \
         WHERE account_id = ?1 AND is_deleted = 0 \
         ORDER BY voucher_date DESC, id DESC LIMIT 10"
    ))?;
    let recent_vouchers = stmt
        .query_map([id], voucher_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let (voucher_count, total_debits, total_credits): (i64, f64, f64) = conn.query_row(
        "SELECT COUNT(*), \
                COALESCE(SUM(CASE WHEN direction = 'Debit' THEN amount ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN direction = 'Credit' THEN amount ELSE 0 END), 0) \
         FROM vouchers WHERE account_id = ?1 AND is_deleted = 0",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    Ok(AccountDetails {
        account,
        recent_vouchers,
        voucher_count,
        total_debits,
        total_credits,
    })
}

/// Updates descriptive fields only. The balance columns are owned by the
/// voucher engine and never pass through here.
pub fn update_metadata(conn: &Connection, id: i64, input: &AccountInput) -> Result<()> {
    if input.account_name.trim().is_empty() {
        return Err(RokarError::Validation("account name is required".into()));
    }
    let updated = conn.execute(
        "UPDATE bank_accounts SET \
           account_name = ?1, account_number = ?2, bank_name = ?3, branch_name = ?4, \
           ifsc_code = ?5, account_type = ?6, updated_at = datetime('now') \
         WHERE id = ?7",
        rusqlite::params![
            input.account_name,
            input.account_number,
            input.bank_name,
            input.branch_name,
            input.ifsc_code,
            input.account_type,
            id,
        ],
    )?;
    if updated == 0 {
        return Err(RokarError::NotFound(format!("bank account {id}")));
    }
    Ok(())
}

pub fn deactivate(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    get_account(&tx, id)?;
    let live_vouchers: i64 = tx.query_row(
        "SELECT COUNT(*) FROM vouchers WHERE account_id = ?1 AND is_deleted = 0",
        [id],
        |row| row.get(0),
    )?;
    if live_vouchers > 0 {
        return Err(RokarError::Conflict(format!(
            "cannot deactivate account {id}: {live_vouchers} live voucher(s) reference it"
        )));
    }

    tx.execute(
        "UPDATE bank_accounts SET is_active = 0, updated_at = datetime('now') WHERE id = ?1",
        [id],
    )?;
    tx.commit()?;
    Ok(())
}

/// The only balance mutation path. Positive delta for money in, negative
/// for money out; callers hold the surrounding transaction.
pub(crate) fn apply_balance_delta(conn: &Connection, id: i64, delta: f64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE bank_accounts SET current_balance = current_balance + ?1, \
         updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![delta, id],
    )?;
    if updated == 0 {
        return Err(RokarError::NotFound(format!("bank account {id}")));
    }
    Ok(())
}

/// Resums `opening_balance + Σ(signed live vouchers)` and rewrites the
/// cached balance. Bounced and cancelled vouchers are dead weight: their
/// effect was reversed when they left the live set.
pub fn recompute_balance(conn: &Connection, id: i64) -> Result<f64> {
    get_account(conn, id)?;
    let balance: f64 = conn.query_row(
        "SELECT a.opening_balance + COALESCE(SUM( \
             CASE WHEN v.direction = 'Credit' THEN v.amount ELSE -v.amount END), 0) \
         FROM bank_accounts a \
         LEFT JOIN vouchers v ON v.account_id = a.id \
             AND v.is_deleted = 0 \
             AND v.cleared_status NOT IN ('Bounced', 'Cancelled') \
         WHERE a.id = ?1",
        [id],
        |row| row.get(0),
    )?;
    conn.execute(
        "UPDATE bank_accounts SET current_balance = ?1, updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![balance, id],
    )?;
    Ok(balance)
}
