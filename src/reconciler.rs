use rusqlite::{Connection, TransactionBehavior};

use crate::accounts;
use crate::error::{Result, RokarError};
use crate::models::{ClearanceStatus, ReconciliationRecord, Voucher};
use crate::vouchers::{voucher_from_row, VOUCHER_COLUMNS};

#[derive(Debug, Clone)]
pub struct ReconcileInput {
    pub account_id: i64,
    pub statement_date: String,
    pub statement_balance: f64,
    pub voucher_ids: Vec<i64>,
    pub operator: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub record: ReconciliationRecord,
    /// Signed sum of the selected vouchers, for the operator's eyes; the
    /// book balance already reflects every live voucher.
    pub selected_total: f64,
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReconciliationRecord> {
    Ok(ReconciliationRecord {
        id: row.get(0)?,
        account_id: row.get(1)?,
        statement_date: row.get(2)?,
        statement_balance: row.get(3)?,
        book_balance: row.get(4)?,
        difference: row.get(5)?,
        reconciled_by: row.get(6)?,
        reconciled_at: row.get(7)?,
        notes: row.get(8)?,
    })
}

const RECORD_COLUMNS: &str = "id, account_id, statement_date, statement_balance, book_balance, \
     difference, reconciled_by, reconciled_at, notes";

/// Live vouchers the account has not yet matched against a statement.
/// Bounced and cancelled vouchers never reach the bank, so they are not
/// offered for matching.
pub fn list_unreconciled(conn: &Connection, account_id: i64) -> Result<Vec<Voucher>> {
    accounts::get_account(conn, account_id)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {VOUCHER_COLUMNS} FROM vouchers \
         WHERE account_id = ?1 AND is_deleted = 0 AND reconciled = 0 \
           AND cleared_status NOT IN ('Bounced', 'Cancelled') \
         ORDER BY voucher_date, id"
    ))?;
    let vouchers = stmt
        .query_map([account_id], voucher_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(vouchers)
}

/// Commits one reconciliation: an append-only record of statement vs book
/// balance plus the reconciled flag on every selected voucher. Balances are
/// never touched, and a non-zero difference is recorded, not rejected.
pub fn reconcile(conn: &mut Connection, input: &ReconcileInput) -> Result<ReconcileOutcome> {
    if input.voucher_ids.is_empty() {
        return Err(RokarError::Validation(
            "select at least one voucher to reconcile".into(),
        ));
    }
    if input.statement_date.trim().is_empty() {
        return Err(RokarError::Validation("statement date is required".into()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let account = accounts::get_account(&tx, input.account_id)?;

    let mut selected_total = 0.0;
    for &id in &input.voucher_ids {
        let voucher: Voucher = tx
            .query_row(
                &format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE id = ?1 AND is_deleted = 0"),
                [id],
                voucher_from_row,
            )
            .map_err(|_| RokarError::NotFound(format!("voucher {id}")))?;
        if voucher.account_id != input.account_id {
            return Err(RokarError::Validation(format!(
                "voucher {} belongs to another account",
                voucher.voucher_number
            )));
        }
        if voucher.reconciled {
            return Err(RokarError::Conflict(format!(
                "voucher {} is already reconciled",
                voucher.voucher_number
            )));
        }
        if matches!(
            voucher.cleared_status,
            ClearanceStatus::Bounced | ClearanceStatus::Cancelled
        ) {
            return Err(RokarError::Validation(format!(
                "voucher {} was {} and has no statement effect",
                voucher.voucher_number, voucher.cleared_status
            )));
        }
        selected_total += voucher.direction.signed(voucher.amount);
    }

    let book_balance = account.current_balance;
    let difference = input.statement_balance - book_balance;

    tx.execute(
        "INSERT INTO reconciliations \
         (account_id, statement_date, statement_balance, book_balance, difference, \
          reconciled_by, notes) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            input.account_id,
            input.statement_date,
            input.statement_balance,
            book_balance,
            difference,
            input.operator,
            input.notes,
        ],
    )?;
    let record_id = tx.last_insert_rowid();

    for &id in &input.voucher_ids {
        tx.execute(
            "UPDATE vouchers SET reconciled = 1, reconciled_date = ?1, \
             updated_at = datetime('now') WHERE id = ?2",
            rusqlite::params![input.statement_date, id],
        )?;
    }

    let record = tx.query_row(
        &format!("SELECT {RECORD_COLUMNS} FROM reconciliations WHERE id = ?1"),
        [record_id],
        record_from_row,
    )?;
    tx.commit()?;

    Ok(ReconcileOutcome {
        record,
        selected_total,
    })
}

pub fn get_history(conn: &Connection, account_id: i64) -> Result<Vec<ReconciliationRecord>> {
    accounts::get_account(conn, account_id)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM reconciliations \
         WHERE account_id = ?1 ORDER BY statement_date DESC, id DESC"
    ))?;
    let records = stmt
        .query_map([account_id], record_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{create_account, get_account, AccountInput};
    use crate::db::{get_connection, init_db};
    use crate::models::{AccountType, VoucherType};
    use crate::vouchers::{create_voucher, VoucherInput};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_account(conn: &Connection, name: &str, opening: f64) -> i64 {
        create_account(
            conn,
            &AccountInput {
                account_name: name.to_string(),
                account_number: format!("{name}-01"),
                bank_name: "State Bank".to_string(),
                branch_name: None,
                ifsc_code: None,
                account_type: AccountType::Current,
                opening_balance: opening,
            },
        )
        .unwrap()
    }

    fn add_receipt(conn: &mut Connection, account_id: i64, amount: f64) -> i64 {
        create_voucher(
            conn,
            &VoucherInput {
                voucher_type: VoucherType::Receipt,
                voucher_date: "2025-04-10".to_string(),
                account_id,
                to_account_id: None,
                party_name: Some("Sales Revenue".to_string()),
                amount,
                cheque_number: None,
                cheque_date: None,
                cheque_bank: None,
                narration: None,
                is_pdc: false,
                created_by: None,
            },
        )
        .unwrap()
        .voucher_id
    }

    fn reconcile_input(account_id: i64, balance: f64, ids: Vec<i64>) -> ReconcileInput {
        ReconcileInput {
            account_id,
            statement_date: "2025-04-30".to_string(),
            statement_balance: balance,
            voucher_ids: ids,
            operator: Some("admin".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_reconcile_matching_statement() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 5_000.0);
        let ids = vec![
            add_receipt(&mut conn, a, 1_000.0),
            add_receipt(&mut conn, a, 1_500.0),
            add_receipt(&mut conn, a, 500.0),
        ];
        // current balance is 8 000
        let outcome = reconcile(&mut conn, &reconcile_input(a, 8_000.0, ids.clone())).unwrap();

        assert_eq!(outcome.record.book_balance, 8_000.0);
        assert_eq!(outcome.record.difference, 0.0);
        assert_eq!(outcome.selected_total, 3_000.0);
        assert_eq!(outcome.record.reconciled_by.as_deref(), Some("admin"));

        for id in ids {
            let (reconciled, date): (bool, Option<String>) = conn
                .query_row(
                    "SELECT reconciled, reconciled_date FROM vouchers WHERE id = ?1",
                    [id],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )
                .unwrap();
            assert!(reconciled);
            assert_eq!(date.as_deref(), Some("2025-04-30"));
        }
        // Balances untouched
        assert_eq!(get_account(&conn, a).unwrap().current_balance, 8_000.0);
    }

    #[test]
    fn test_nonzero_difference_is_recorded_not_rejected() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 5_000.0);
        let id = add_receipt(&mut conn, a, 1_000.0);
        let outcome = reconcile(&mut conn, &reconcile_input(a, 6_250.0, vec![id])).unwrap();
        assert_eq!(outcome.record.difference, 250.0);
    }

    #[test]
    fn test_reconciled_voucher_leaves_pending_list() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 5_000.0);
        let first = add_receipt(&mut conn, a, 1_000.0);
        let second = add_receipt(&mut conn, a, 2_000.0);

        assert_eq!(list_unreconciled(&conn, a).unwrap().len(), 2);
        reconcile(&mut conn, &reconcile_input(a, 8_000.0, vec![first])).unwrap();

        let pending = list_unreconciled(&conn, a).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second);
    }

    #[test]
    fn test_double_reconcile_conflicts() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 5_000.0);
        let id = add_receipt(&mut conn, a, 1_000.0);
        reconcile(&mut conn, &reconcile_input(a, 6_000.0, vec![id])).unwrap();
        assert!(matches!(
            reconcile(&mut conn, &reconcile_input(a, 6_000.0, vec![id])),
            Err(RokarError::Conflict(_))
        ));
    }

    #[test]
    fn test_reconcile_validations() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 5_000.0);
        let b = add_account(&conn, "Godown Savings", 0.0);
        let on_b = add_receipt(&mut conn, b, 100.0);

        assert!(matches!(
            reconcile(&mut conn, &reconcile_input(a, 5_000.0, vec![])),
            Err(RokarError::Validation(_))
        ));
        assert!(matches!(
            reconcile(&mut conn, &reconcile_input(a, 5_000.0, vec![on_b])),
            Err(RokarError::Validation(_))
        ));
        assert!(matches!(
            reconcile(&mut conn, &reconcile_input(a, 5_000.0, vec![9999])),
            Err(RokarError::NotFound(_))
        ));
    }

    #[test]
    fn test_failed_reconcile_marks_nothing() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 5_000.0);
        let good = add_receipt(&mut conn, a, 1_000.0);
        // Second id is unknown: the whole commit must roll back.
        assert!(reconcile(&mut conn, &reconcile_input(a, 6_000.0, vec![good, 9999])).is_err());

        let reconciled: bool = conn
            .query_row("SELECT reconciled FROM vouchers WHERE id = ?1", [good], |r| r.get(0))
            .unwrap();
        assert!(!reconciled);
        let records: i64 = conn
            .query_row("SELECT count(*) FROM reconciliations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(records, 0);
    }

    #[test]
    fn test_history_newest_first() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 5_000.0);
        let first = add_receipt(&mut conn, a, 1_000.0);
        let second = add_receipt(&mut conn, a, 500.0);

        let mut input = reconcile_input(a, 6_000.0, vec![first]);
        input.statement_date = "2025-03-31".to_string();
        reconcile(&mut conn, &input).unwrap();
        let mut input = reconcile_input(a, 6_500.0, vec![second]);
        input.statement_date = "2025-04-30".to_string();
        reconcile(&mut conn, &input).unwrap();

        let history = get_history(&conn, a).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].statement_date, "2025-04-30");
        assert_eq!(history[1].statement_date, "2025-03-31");
    }
}
