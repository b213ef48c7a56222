use std::sync::OnceLock;

use regex::Regex;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use crate::accounts;
use crate::error::{Result, RokarError};
use crate::models::{
    ClearanceStatus, Direction, LedgerEntry, LedgerType, PostDatedCheque, Voucher, VoucherType,
};

/// Suffix on the destination-side voucher number of a Contra transfer.
/// Display convention only; the rows are linked by `paired_voucher_id`.
pub const CONTRA_IN_SUFFIX: &str = "-IN";

pub(crate) const VOUCHER_COLUMNS: &str = "id, voucher_number, voucher_type, voucher_date, \
     account_id, party_name, amount, direction, cheque_number, cheque_date, narration, \
     cleared_status, cleared_date, reconciled, reconciled_date, paired_voucher_id, created_by";

pub(crate) fn voucher_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Voucher> {
    Ok(Voucher {
        id: row.get(0)?,
        voucher_number: row.get(1)?,
        voucher_type: row.get(2)?,
        voucher_date: row.get(3)?,
        account_id: row.get(4)?,
        party_name: row.get(5)?,
        amount: row.get(6)?,
        direction: row.get(7)?,
        cheque_number: row.get(8)?,
        cheque_date: row.get(9)?,
        narration: row.get(10)?,
        cleared_status: row.get(11)?,
        cleared_date: row.get(12)?,
        reconciled: row.get(13)?,
        reconciled_date: row.get(14)?,
        paired_voucher_id: row.get(15)?,
        created_by: row.get(16)?,
    })
}

#[derive(Debug, Clone)]
pub struct VoucherInput {
    pub voucher_type: VoucherType,
    pub voucher_date: String,
    pub account_id: i64,
    pub to_account_id: Option<i64>,
    pub party_name: Option<String>,
    pub amount: f64,
    pub cheque_number: Option<String>,
    pub cheque_date: Option<String>,
    pub cheque_bank: Option<String>,
    pub narration: Option<String>,
    pub is_pdc: bool,
    pub created_by: Option<String>,
}

#[derive(Debug)]
pub struct SavedVoucher {
    pub voucher_id: i64,
    pub voucher_number: String,
    pub paired_voucher_id: Option<i64>,
}

#[derive(Debug)]
pub struct VoucherDetail {
    pub voucher: Voucher,
    pub entries: Vec<LedgerEntry>,
    pub pdc: Option<PostDatedCheque>,
}

#[derive(Debug, Default, Clone)]
pub struct VoucherFilters {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub account_id: Option<i64>,
    pub voucher_type: Option<VoucherType>,
    pub cleared_status: Option<ClearanceStatus>,
}

// ---------------------------------------------------------------------------
// Voucher numbering
// ---------------------------------------------------------------------------

fn trailing_number(s: &str) -> Option<i64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(\d+)$").expect("literal pattern"));
    re.captures(s).and_then(|c| c[1].parse().ok())
}

/// PAY/RCP/CNT prefix + 6-digit sequence. Reads the newest live voucher of
/// the type; destination-side "-IN" rows are excluded so a transfer can
/// never reset the sequence.
pub fn next_voucher_number(conn: &Connection, voucher_type: VoucherType) -> Result<String> {
    let last: Option<String> = conn
        .query_row(
            "SELECT voucher_number FROM vouchers \
             WHERE voucher_type = ?1 AND is_deleted = 0 AND voucher_number NOT LIKE '%-IN' \
             ORDER BY id DESC LIMIT 1",
            [voucher_type],
            |row| row.get(0),
        )
        .optional()?;
    let next = last.as_deref().and_then(trailing_number).map_or(1, |n| n + 1);
    Ok(format!("{}{next:06}", voucher_type.prefix()))
}

// ---------------------------------------------------------------------------
// Create / update / delete
// ---------------------------------------------------------------------------

fn validate_input(input: &VoucherInput) -> Result<()> {
    if input.amount <= 0.0 {
        return Err(RokarError::Validation(
            "amount must be greater than zero".into(),
        ));
    }
    if input.voucher_date.trim().is_empty() {
        return Err(RokarError::Validation("voucher date is required".into()));
    }
    if input.is_pdc {
        if input.voucher_type == VoucherType::Contra {
            return Err(RokarError::Validation(
                "a Contra transfer cannot carry a post-dated cheque".into(),
            ));
        }
        if input.cheque_number.is_none() {
            return Err(RokarError::Validation(
                "a post-dated cheque needs a cheque number".into(),
            ));
        }
        if input.cheque_date.is_none() {
            return Err(RokarError::Validation(
                "a post-dated cheque needs a cheque date".into(),
            ));
        }
    }
    Ok(())
}

pub fn create_voucher(conn: &mut Connection, input: &VoucherInput) -> Result<SavedVoucher> {
    validate_input(input)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let number = next_voucher_number(&tx, input.voucher_type)?;
    let saved = post_voucher(&tx, None, &number, input)?;
    tx.commit()?;
    Ok(saved)
}

/// Rejected while the voucher is reconciled or is a cleared cheque; both
/// states freeze the row. Otherwise the old effect is unwound and the new
/// input posted under the original identity and number.
pub fn update_voucher(conn: &mut Connection, id: i64, input: &VoucherInput) -> Result<SavedVoucher> {
    validate_input(input)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let old = get_live_voucher(&tx, id)?;
    guard_mutable(&old)?;
    record_audit(&tx, &old, "update", input.created_by.as_deref())?;
    unwind_voucher(&tx, &old, true)?;

    let saved = post_voucher(&tx, Some(id), &old.voucher_number, input)?;
    tx.commit()?;
    Ok(saved)
}

pub fn delete_voucher(conn: &mut Connection, id: i64, operator: Option<&str>) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let old = get_live_voucher(&tx, id)?;
    guard_mutable(&old)?;
    record_audit(&tx, &old, "delete", operator)?;
    unwind_voucher(&tx, &old, false)?;

    tx.execute(
        "UPDATE vouchers SET is_deleted = 1, updated_at = datetime('now') WHERE id = ?1",
        [id],
    )?;
    tx.commit()?;
    Ok(())
}

pub(crate) fn get_live_voucher(conn: &Connection, id: i64) -> Result<Voucher> {
    conn.query_row(
        &format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE id = ?1 AND is_deleted = 0"),
        [id],
        voucher_from_row,
    )
    .optional()?
    .ok_or_else(|| RokarError::NotFound(format!("voucher {id}")))
}

fn guard_mutable(voucher: &Voucher) -> Result<()> {
    if voucher.reconciled {
        return Err(RokarError::Conflict(format!(
            "voucher {} is reconciled",
            voucher.voucher_number
        )));
    }
    if voucher.cleared_status == ClearanceStatus::Cleared && voucher.cheque_number.is_some() {
        return Err(RokarError::Conflict(format!(
            "voucher {} is a cleared cheque",
            voucher.voucher_number
        )));
    }
    if voucher.voucher_type == VoucherType::Contra && voucher.direction == Direction::Credit {
        return Err(RokarError::Conflict(format!(
            "voucher {} is the destination side of a transfer; edit the source voucher",
            voucher.voucher_number
        )));
    }
    Ok(())
}

pub(crate) fn record_audit(
    conn: &Connection,
    voucher: &Voucher,
    action: &str,
    operator: Option<&str>,
) -> Result<()> {
    let previous = serde_json::to_string(voucher)?;
    conn.execute(
        "INSERT INTO voucher_audit (voucher_id, action, previous, operator) \
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![voucher.id, action, previous, operator],
    )?;
    Ok(())
}

/// True while the voucher still weighs on its account balance. A bounced or
/// cancelled voucher was already reversed when it left the live set.
fn balance_effective(voucher: &Voucher) -> bool {
    !matches!(
        voucher.cleared_status,
        ClearanceStatus::Bounced | ClearanceStatus::Cancelled
    )
}

/// Reverses the balance effect of `old` (and its transfer pair, which is
/// soft-deleted). With `purge_postings` the ledger entries and PDC rows are
/// physically removed, as a voucher edit replaces them wholesale.
fn unwind_voucher(conn: &Connection, old: &Voucher, purge_postings: bool) -> Result<()> {
    if balance_effective(old) {
        accounts::apply_balance_delta(conn, old.account_id, -old.direction.signed(old.amount))?;
    }

    if old.voucher_type == VoucherType::Contra {
        if let Some(pair_id) = old.paired_voucher_id {
            let pair: Option<Voucher> = conn
                .query_row(
                    &format!(
                        "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE id = ?1 AND is_deleted = 0"
                    ),
                    [pair_id],
                    voucher_from_row,
                )
                .optional()?;
            if let Some(pair) = pair {
                accounts::apply_balance_delta(
                    conn,
                    pair.account_id,
                    -pair.direction.signed(pair.amount),
                )?;
                conn.execute(
                    "UPDATE vouchers SET is_deleted = 1, updated_at = datetime('now') WHERE id = ?1",
                    [pair.id],
                )?;
                if purge_postings {
                    conn.execute("DELETE FROM ledger_entries WHERE voucher_id = ?1", [pair.id])?;
                }
            }
        }
    }

    if purge_postings {
        conn.execute("DELETE FROM ledger_entries WHERE voucher_id = ?1", [old.id])?;
        conn.execute("DELETE FROM post_dated_cheques WHERE voucher_id = ?1", [old.id])?;
    }
    Ok(())
}

fn post_entry(
    conn: &Connection,
    voucher_id: i64,
    ledger_type: LedgerType,
    ledger_name: &str,
    debit: f64,
    credit: f64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO ledger_entries (voucher_id, ledger_type, ledger_name, debit_amount, credit_amount) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![voucher_id, ledger_type, ledger_name, debit, credit],
    )?;
    Ok(())
}

/// Persists one voucher (insert, or in-place rewrite when `existing_id` is
/// given), posts its double-entry pair, applies the balance delta, and
/// creates the paired transfer row and PDC row where called for. Runs inside
/// the caller's transaction.
fn post_voucher(
    conn: &Connection,
    existing_id: Option<i64>,
    voucher_number: &str,
    input: &VoucherInput,
) -> Result<SavedVoucher> {
    let source = accounts::get_active_account(conn, input.account_id)?;
    let direction = input.voucher_type.direction();
    let cleared_status = if input.cheque_number.is_some() {
        ClearanceStatus::Pending
    } else {
        ClearanceStatus::Cleared
    };

    let destination = match input.voucher_type {
        VoucherType::Contra => {
            let to_id = input.to_account_id.ok_or_else(|| {
                RokarError::Validation("destination account is required for Contra".into())
            })?;
            if to_id == input.account_id {
                return Err(RokarError::Validation(
                    "source and destination accounts cannot be the same".into(),
                ));
            }
            Some(accounts::get_active_account(conn, to_id)?)
        }
        _ => None,
    };

    let party_name = match (&input.party_name, &destination) {
        (Some(party), _) if !party.trim().is_empty() => party.clone(),
        (_, Some(dest)) => format!("Transfer to {}", dest.account_name),
        _ => String::new(),
    };

    let voucher_id = match existing_id {
        Some(id) => {
            conn.execute(
                "UPDATE vouchers SET \
                   voucher_type = ?1, voucher_date = ?2, account_id = ?3, party_name = ?4, \
                   amount = ?5, direction = ?6, cheque_number = ?7, cheque_date = ?8, \
                   narration = ?9, cleared_status = ?10, cleared_date = NULL, \
                   paired_voucher_id = NULL, updated_at = datetime('now') \
                 WHERE id = ?11",
                rusqlite::params![
                    input.voucher_type,
                    input.voucher_date,
                    input.account_id,
                    party_name,
                    input.amount,
                    direction,
                    input.cheque_number,
                    input.cheque_date,
                    input.narration,
                    cleared_status,
                    id,
                ],
            )?;
            id
        }
        None => {
            conn.execute(
                "INSERT INTO vouchers \
                 (voucher_number, voucher_type, voucher_date, account_id, party_name, amount, \
                  direction, cheque_number, cheque_date, narration, cleared_status, created_by) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                rusqlite::params![
                    voucher_number,
                    input.voucher_type,
                    input.voucher_date,
                    input.account_id,
                    party_name,
                    input.amount,
                    direction,
                    input.cheque_number,
                    input.cheque_date,
                    input.narration,
                    cleared_status,
                    input.created_by,
                ],
            )?;
            conn.last_insert_rowid()
        }
    };

    let mut paired_voucher_id = None;
    match input.voucher_type {
        VoucherType::Payment => {
            post_entry(conn, voucher_id, LedgerType::Expense, &party_name, input.amount, 0.0)?;
            post_entry(conn, voucher_id, LedgerType::Bank, &source.account_name, 0.0, input.amount)?;
            accounts::apply_balance_delta(conn, source.id, -input.amount)?;
        }
        VoucherType::Receipt => {
            post_entry(conn, voucher_id, LedgerType::Bank, &source.account_name, input.amount, 0.0)?;
            post_entry(conn, voucher_id, LedgerType::Income, &party_name, 0.0, input.amount)?;
            accounts::apply_balance_delta(conn, source.id, input.amount)?;
        }
        VoucherType::Contra => {
            let dest = destination.as_ref().ok_or_else(|| {
                RokarError::Validation("destination account is required for Contra".into())
            })?;
            let in_party = format!("Transfer from {}", source.account_name);
            let in_narration = input
                .narration
                .clone()
                .unwrap_or_else(|| in_party.clone());
            conn.execute(
                "INSERT INTO vouchers \
                 (voucher_number, voucher_type, voucher_date, account_id, party_name, amount, \
                  direction, narration, cleared_status, created_by, paired_voucher_id) \
                 VALUES (?1, 'Contra', ?2, ?3, ?4, ?5, 'Credit', ?6, 'Cleared', ?7, ?8)",
                rusqlite::params![
                    format!("{voucher_number}{CONTRA_IN_SUFFIX}"),
                    input.voucher_date,
                    dest.id,
                    in_party,
                    input.amount,
                    in_narration,
                    input.created_by,
                    voucher_id,
                ],
            )?;
            let in_id = conn.last_insert_rowid();
            conn.execute(
                "UPDATE vouchers SET paired_voucher_id = ?1 WHERE id = ?2",
                rusqlite::params![in_id, voucher_id],
            )?;
            paired_voucher_id = Some(in_id);

            for vid in [voucher_id, in_id] {
                post_entry(conn, vid, LedgerType::Bank, &dest.account_name, input.amount, 0.0)?;
                post_entry(conn, vid, LedgerType::Bank, &source.account_name, 0.0, input.amount)?;
            }
            accounts::apply_balance_delta(conn, source.id, -input.amount)?;
            accounts::apply_balance_delta(conn, dest.id, input.amount)?;
        }
    }

    if input.is_pdc
        && input.cheque_number.is_some()
        && input.voucher_type != VoucherType::Contra
    {
        conn.execute(
            "INSERT INTO post_dated_cheques \
             (voucher_id, cheque_number, cheque_date, amount, party_name, bank_name) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                voucher_id,
                input.cheque_number,
                input.cheque_date,
                input.amount,
                party_name,
                input.cheque_bank,
            ],
        )?;
    }

    Ok(SavedVoucher {
        voucher_id,
        voucher_number: voucher_number.to_string(),
        paired_voucher_id,
    })
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn list_vouchers(conn: &Connection, filters: &VoucherFilters) -> Result<Vec<Voucher>> {
    let mut sql = format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE is_deleted = 0");
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(from) = &filters.from_date {
        params.push(Box::new(from.clone()));
        sql.push_str(&format!(" AND voucher_date >= ?{}", params.len()));
    }
    if let Some(to) = &filters.to_date {
        params.push(Box::new(to.clone()));
        sql.push_str(&format!(" AND voucher_date <= ?{}", params.len()));
    }
    if let Some(account_id) = filters.account_id {
        params.push(Box::new(account_id));
        sql.push_str(&format!(" AND account_id = ?{}", params.len()));
    }
    if let Some(voucher_type) = filters.voucher_type {
        params.push(Box::new(voucher_type));
        sql.push_str(&format!(" AND voucher_type = ?{}", params.len()));
    }
    if let Some(status) = filters.cleared_status {
        params.push(Box::new(status));
        sql.push_str(&format!(" AND cleared_status = ?{}", params.len()));
    }
    sql.push_str(" ORDER BY voucher_date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params.iter().map(|p| p.as_ref()).collect();
    let vouchers = stmt
        .query_map(param_refs.as_slice(), voucher_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(vouchers)
}

pub fn get_voucher_detail(conn: &Connection, id: i64) -> Result<VoucherDetail> {
    let voucher = get_live_voucher(conn, id)?;

    let mut stmt = conn.prepare(
        "SELECT id, voucher_id, ledger_type, ledger_name, debit_amount, credit_amount \
         FROM ledger_entries WHERE voucher_id = ?1 ORDER BY id",
    )?;
    let entries = stmt
        .query_map([id], |row| {
            Ok(LedgerEntry {
                id: row.get(0)?,
                voucher_id: row.get(1)?,
                ledger_type: row.get(2)?,
                ledger_name: row.get(3)?,
                debit_amount: row.get(4)?,
                credit_amount: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let pdc = conn
        .query_row(
            "SELECT id, voucher_id, cheque_number, cheque_date, amount, party_name, bank_name, \
                    status, deposit_date, cleared_date, notes \
             FROM post_dated_cheques WHERE voucher_id = ?1",
            [id],
            pdc_from_row,
        )
        .optional()?;

    Ok(VoucherDetail { voucher, entries, pdc })
}

pub(crate) fn pdc_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostDatedCheque> {
    Ok(PostDatedCheque {
        id: row.get(0)?,
        voucher_id: row.get(1)?,
        cheque_number: row.get(2)?,
        cheque_date: row.get(3)?,
        amount: row.get(4)?,
        party_name: row.get(5)?,
        bank_name: row.get(6)?,
        status: row.get(7)?,
        deposit_date: row.get(8)?,
        cleared_date: row.get(9)?,
        notes: row.get(10)?,
    })
}

/// Distinct party names from recent live vouchers, newest first. Feeds
/// party-name suggestions in the add/edit flows.
pub fn recent_parties(conn: &Connection, limit: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT party_name FROM vouchers \
         WHERE is_deleted = 0 AND party_name IS NOT NULL AND party_name != '' \
         GROUP BY party_name ORDER BY MAX(id) DESC LIMIT ?1",
    )?;
    let parties = stmt
        .query_map([limit], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(parties)
}
