use rusqlite::{Connection, TransactionBehavior};

use crate::accounts;
use crate::error::{Result, RokarError};
use crate::models::{ClearanceStatus, PostDatedCheque, Voucher, VoucherType};
use crate::vouchers::{get_live_voucher, pdc_from_row, record_audit};

/// Allowed lifecycle edges. Cleared, Bounced and Cancelled are terminal.
fn ensure_transition(current: ClearanceStatus, target: ClearanceStatus) -> Result<()> {
    use ClearanceStatus::*;
    if current.is_terminal() {
        return Err(RokarError::InvalidState(format!(
            "cheque is already settled as {current}"
        )));
    }
    let allowed = matches!(
        (current, target),
        (Pending, Deposited)
            | (Deposited, Cleared)
            | (Pending | Deposited, Bounced)
            | (Pending | Deposited, Cancelled)
    );
    if allowed {
        Ok(())
    } else {
        Err(RokarError::InvalidState(format!(
            "cheque cannot move from {current} to {target}"
        )))
    }
}

fn get_cheque_voucher(conn: &Connection, voucher_id: i64) -> Result<Voucher> {
    let voucher = get_live_voucher(conn, voucher_id)?;
    if voucher.cheque_number.is_none() {
        return Err(RokarError::Validation(format!(
            "voucher {} is not a cheque transaction",
            voucher.voucher_number
        )));
    }
    if voucher.voucher_type == VoucherType::Contra {
        return Err(RokarError::Validation(format!(
            "voucher {} is a transfer; cheque lifecycle does not apply",
            voucher.voucher_number
        )));
    }
    Ok(voucher)
}

fn append_note(narration: Option<&str>, note: &str) -> String {
    match narration {
        Some(n) if !n.trim().is_empty() => format!("{n} | {note}"),
        _ => note.to_string(),
    }
}

pub fn deposit_cheque(conn: &mut Connection, voucher_id: i64, deposit_date: &str) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let voucher = get_cheque_voucher(&tx, voucher_id)?;
    ensure_transition(voucher.cleared_status, ClearanceStatus::Deposited)?;

    tx.execute(
        "UPDATE vouchers SET cleared_status = 'Deposited', cleared_date = ?1, \
         updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![deposit_date, voucher_id],
    )?;
    tx.execute(
        "UPDATE post_dated_cheques SET status = 'Deposited', deposit_date = ?1, \
         updated_at = datetime('now') WHERE voucher_id = ?2",
        rusqlite::params![deposit_date, voucher_id],
    )?;
    tx.commit()?;
    Ok(())
}

pub fn clear_cheque(conn: &mut Connection, voucher_id: i64, cleared_date: &str) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let voucher = get_cheque_voucher(&tx, voucher_id)?;
    ensure_transition(voucher.cleared_status, ClearanceStatus::Cleared)?;

    tx.execute(
        "UPDATE vouchers SET cleared_status = 'Cleared', cleared_date = ?1, \
         updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![cleared_date, voucher_id],
    )?;
    tx.execute(
        "UPDATE post_dated_cheques SET status = 'Cleared', cleared_date = ?1, \
         updated_at = datetime('now') WHERE voucher_id = ?2",
        rusqlite::params![cleared_date, voucher_id],
    )?;
    tx.commit()?;
    Ok(())
}

/// A bounced cheque gives the money back: the voucher's balance delta is
/// compensated and the note lands in the narration.
pub fn bounce_cheque(
    conn: &mut Connection,
    voucher_id: i64,
    bounce_date: &str,
    reason: &str,
    operator: Option<&str>,
) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let voucher = get_cheque_voucher(&tx, voucher_id)?;
    ensure_transition(voucher.cleared_status, ClearanceStatus::Bounced)?;
    record_audit(&tx, &voucher, "bounce", operator)?;

    accounts::apply_balance_delta(
        &tx,
        voucher.account_id,
        -voucher.direction.signed(voucher.amount),
    )?;

    let narration = append_note(voucher.narration.as_deref(), &format!("Cheque bounced: {reason}"));
    tx.execute(
        "UPDATE vouchers SET cleared_status = 'Bounced', cleared_date = ?1, narration = ?2, \
         updated_at = datetime('now') WHERE id = ?3",
        rusqlite::params![bounce_date, narration, voucher_id],
    )?;
    tx.execute(
        "UPDATE post_dated_cheques SET status = 'Bounced', notes = ?1, \
         updated_at = datetime('now') WHERE voucher_id = ?2",
        rusqlite::params![reason, voucher_id],
    )?;
    tx.commit()?;
    Ok(())
}

pub fn cancel_cheque(
    conn: &mut Connection,
    voucher_id: i64,
    reason: &str,
    operator: Option<&str>,
) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let voucher = get_cheque_voucher(&tx, voucher_id)?;
    ensure_transition(voucher.cleared_status, ClearanceStatus::Cancelled)?;
    record_audit(&tx, &voucher, "cancel", operator)?;

    accounts::apply_balance_delta(
        &tx,
        voucher.account_id,
        -voucher.direction.signed(voucher.amount),
    )?;

    let narration = append_note(voucher.narration.as_deref(), &format!("Cancelled: {reason}"));
    tx.execute(
        "UPDATE vouchers SET cleared_status = 'Cancelled', narration = ?1, \
         updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![narration, voucher_id],
    )?;
    tx.execute(
        "UPDATE post_dated_cheques SET status = 'Cancelled', notes = ?1, \
         updated_at = datetime('now') WHERE voucher_id = ?2",
        rusqlite::params![reason, voucher_id],
    )?;
    tx.commit()?;
    Ok(())
}

/// The PDC register, optionally narrowed to one status.
pub fn list_cheques(
    conn: &Connection,
    status: Option<ClearanceStatus>,
) -> Result<Vec<PostDatedCheque>> {
    let base = "SELECT p.id, p.voucher_id, p.cheque_number, p.cheque_date, p.amount, \
                p.party_name, p.bank_name, p.status, p.deposit_date, p.cleared_date, p.notes \
                FROM post_dated_cheques p \
                JOIN vouchers v ON v.id = p.voucher_id AND v.is_deleted = 0";
    let cheques = match status {
        Some(status) => {
            let mut stmt =
                conn.prepare(&format!("{base} WHERE p.status = ?1 ORDER BY p.cheque_date, p.id"))?;
            let rows = stmt.query_map([status], pdc_from_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!("{base} ORDER BY p.cheque_date, p.id"))?;
            let rows = stmt.query_map([], pdc_from_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(cheques)
}
