use rusqlite::Connection;

use crate::accounts;
use crate::error::Result;
use crate::models::{BankAccount, Direction, Voucher};
use crate::vouchers::{voucher_from_row, VOUCHER_COLUMNS};

// Vouchers that actually moved money: live rows minus bounced/cancelled
// cheques, whose effect was reversed.
const EFFECTIVE: &str = "is_deleted = 0 AND cleared_status NOT IN ('Bounced', 'Cancelled')";

// ---------------------------------------------------------------------------
// Account statement
// ---------------------------------------------------------------------------

pub struct StatementLine {
    pub voucher: Voucher,
    pub running_balance: f64,
}

pub struct Statement {
    pub account: BankAccount,
    pub opening_balance: f64,
    pub lines: Vec<StatementLine>,
    pub closing_balance: f64,
}

pub fn get_statement(
    conn: &Connection,
    account_id: i64,
    from_date: &str,
    to_date: &str,
) -> Result<Statement> {
    let account = accounts::get_account(conn, account_id)?;

    // Balance carried into the period: opening + everything before `from`.
    let (prior_credits, prior_debits): (f64, f64) = conn.query_row(
        &format!(
            "SELECT \
               COALESCE(SUM(CASE WHEN direction = 'Credit' THEN amount ELSE 0 END), 0), \
               COALESCE(SUM(CASE WHEN direction = 'Debit' THEN amount ELSE 0 END), 0) \
             FROM vouchers \
             WHERE account_id = ?1 AND voucher_date < ?2 AND {EFFECTIVE}"
        ),
        rusqlite::params![account_id, from_date],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let opening_balance = account.opening_balance + prior_credits - prior_debits;

    let mut stmt = conn.prepare(&format!(
        "SELECT {VOUCHER_COLUMNS} FROM vouchers \
         WHERE account_id = ?1 AND voucher_date BETWEEN ?2 AND ?3 AND {EFFECTIVE} \
         ORDER BY voucher_date, id"
    ))?;
    let vouchers = stmt
        .query_map(rusqlite::params![account_id, from_date, to_date], voucher_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut running = opening_balance;
    let lines: Vec<StatementLine> = vouchers
        .into_iter()
        .map(|voucher| {
            running += voucher.direction.signed(voucher.amount);
            StatementLine {
                voucher,
                running_balance: running,
            }
        })
        .collect();

    Ok(Statement {
        account,
        opening_balance,
        closing_balance: running,
        lines,
    })
}

// ---------------------------------------------------------------------------
// Cash flow
// ---------------------------------------------------------------------------

pub struct CategoryFlow {
    pub category: String,
    pub amount: f64,
    pub count: i64,
}

pub struct CashflowReport {
    pub total_receipts: f64,
    pub total_payments: f64,
    pub net_cashflow: f64,
    pub receipt_count: i64,
    pub payment_count: i64,
    pub expense_by_category: Vec<CategoryFlow>,
    pub income_by_category: Vec<CategoryFlow>,
}

fn type_totals(
    conn: &Connection,
    voucher_type: &str,
    from_date: &str,
    to_date: &str,
) -> Result<(f64, i64)> {
    let totals = conn.query_row(
        &format!(
            "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM vouchers \
             WHERE voucher_type = ?1 AND voucher_date BETWEEN ?2 AND ?3 AND {EFFECTIVE}"
        ),
        rusqlite::params![voucher_type, from_date, to_date],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(totals)
}

fn category_flows(
    conn: &Connection,
    ledger_type: &str,
    amount_column: &str,
    from_date: &str,
    to_date: &str,
) -> Result<Vec<CategoryFlow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT e.ledger_name, SUM(e.{amount_column}) AS amount, COUNT(*) \
         FROM ledger_entries e \
         JOIN vouchers v ON v.id = e.voucher_id \
         WHERE e.ledger_type = ?1 AND v.voucher_date BETWEEN ?2 AND ?3 \
           AND v.{EFFECTIVE} \
         GROUP BY e.ledger_name ORDER BY amount DESC"
    ))?;
    let flows = stmt
        .query_map(rusqlite::params![ledger_type, from_date, to_date], |row| {
            Ok(CategoryFlow {
                category: row.get(0)?,
                amount: row.get(1)?,
                count: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(flows)
}

pub fn get_cashflow(conn: &Connection, from_date: &str, to_date: &str) -> Result<CashflowReport> {
    let (total_receipts, receipt_count) = type_totals(conn, "Receipt", from_date, to_date)?;
    let (total_payments, payment_count) = type_totals(conn, "Payment", from_date, to_date)?;

    Ok(CashflowReport {
        total_receipts,
        total_payments,
        net_cashflow: total_receipts - total_payments,
        receipt_count,
        payment_count,
        expense_by_category: category_flows(conn, "Expense", "debit_amount", from_date, to_date)?,
        income_by_category: category_flows(conn, "Income", "credit_amount", from_date, to_date)?,
    })
}

// ---------------------------------------------------------------------------
// Daybook
// ---------------------------------------------------------------------------

pub struct DaybookReport {
    pub vouchers: Vec<Voucher>,
    pub total_receipts: f64,
    pub total_payments: f64,
    pub net: f64,
}

/// Everything recorded on one date, in entry order, with credit/debit totals.
pub fn get_daybook(conn: &Connection, date: &str) -> Result<DaybookReport> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VOUCHER_COLUMNS} FROM vouchers \
         WHERE voucher_date = ?1 AND is_deleted = 0 ORDER BY id"
    ))?;
    let vouchers = stmt
        .query_map([date], voucher_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total_receipts: f64 = vouchers
        .iter()
        .filter(|v| v.direction == Direction::Credit)
        .map(|v| v.amount)
        .sum();
    let total_payments: f64 = vouchers
        .iter()
        .filter(|v| v.direction == Direction::Debit)
        .map(|v| v.amount)
        .sum();

    Ok(DaybookReport {
        net: total_receipts - total_payments,
        total_receipts,
        total_payments,
        vouchers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{create_account, AccountInput};
    use crate::cheques::bounce_cheque;
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

    fn voucher(
        voucher_type: VoucherType,
        date: &str,
        account_id: i64,
        party: &str,
        amount: f64,
    ) -> VoucherInput {
        VoucherInput {
            voucher_type,
            voucher_date: date.to_string(),
            account_id,
            to_account_id: None,
            party_name: Some(party.to_string()),
            amount,
            cheque_number: None,
            cheque_date: None,
            cheque_bank: None,
            narration: None,
            is_pdc: false,
            created_by: None,
        }
    }

    #[test]
    fn test_statement_running_balance() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 10_000.0);
        // Before the period
        create_voucher(&mut conn, &voucher(VoucherType::Receipt, "2025-03-15", a, "Sales Revenue", 2_000.0)).unwrap();
        // Inside the period
        create_voucher(&mut conn, &voucher(VoucherType::Payment, "2025-04-05", a, "Rent", 4_000.0)).unwrap();
        create_voucher(&mut conn, &voucher(VoucherType::Receipt, "2025-04-12", a, "Sales Revenue", 1_000.0)).unwrap();
        // After the period
        create_voucher(&mut conn, &voucher(VoucherType::Payment, "2025-05-01", a, "Electricity", 300.0)).unwrap();

        let statement = get_statement(&conn, a, "2025-04-01", "2025-04-30").unwrap();
        assert_eq!(statement.opening_balance, 12_000.0);
        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.lines[0].running_balance, 8_000.0);
        assert_eq!(statement.lines[1].running_balance, 9_000.0);
        assert_eq!(statement.closing_balance, 9_000.0);
    }

    #[test]
    fn test_statement_skips_bounced_cheques() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 10_000.0);
        let mut input = voucher(VoucherType::Payment, "2025-04-05", a, "Sharma Traders", 4_000.0);
        input.cheque_number = Some("CHQ001".to_string());
        input.cheque_date = Some("2025-04-10".to_string());
        input.is_pdc = true;
        let v = create_voucher(&mut conn, &input).unwrap().voucher_id;
        bounce_cheque(&mut conn, v, "2025-04-11", "insufficient funds", None).unwrap();

        let statement = get_statement(&conn, a, "2025-04-01", "2025-04-30").unwrap();
        assert!(statement.lines.is_empty());
        assert_eq!(statement.closing_balance, 10_000.0);
    }

    #[test]
    fn test_cashflow_totals_and_categories() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 50_000.0);
        create_voucher(&mut conn, &voucher(VoucherType::Payment, "2025-04-05", a, "Rent", 4_000.0)).unwrap();
        create_voucher(&mut conn, &voucher(VoucherType::Payment, "2025-04-08", a, "Rent", 1_000.0)).unwrap();
        create_voucher(&mut conn, &voucher(VoucherType::Payment, "2025-04-09", a, "Electricity", 700.0)).unwrap();
        create_voucher(&mut conn, &voucher(VoucherType::Receipt, "2025-04-15", a, "Sales Revenue", 9_000.0)).unwrap();

        let report = get_cashflow(&conn, "2025-04-01", "2025-04-30").unwrap();
        assert_eq!(report.total_payments, 5_700.0);
        assert_eq!(report.total_receipts, 9_000.0);
        assert_eq!(report.net_cashflow, 3_300.0);
        assert_eq!(report.payment_count, 3);
        assert_eq!(report.receipt_count, 1);

        assert_eq!(report.expense_by_category.len(), 2);
        assert_eq!(report.expense_by_category[0].category, "Rent");
        assert_eq!(report.expense_by_category[0].amount, 5_000.0);
        assert_eq!(report.expense_by_category[0].count, 2);
        assert_eq!(report.income_by_category.len(), 1);
        assert_eq!(report.income_by_category[0].amount, 9_000.0);
    }

    #[test]
    fn test_cashflow_ignores_contra() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 50_000.0);
        let b = add_account(&conn, "Godown Savings", 0.0);
        let mut input = voucher(VoucherType::Contra, "2025-04-05", a, "", 2_000.0);
        input.to_account_id = Some(b);
        input.party_name = None;
        create_voucher(&mut conn, &input).unwrap();

        let report = get_cashflow(&conn, "2025-04-01", "2025-04-30").unwrap();
        assert_eq!(report.total_receipts, 0.0);
        assert_eq!(report.total_payments, 0.0);
        assert!(report.expense_by_category.is_empty());
        assert!(report.income_by_category.is_empty());
    }

    #[test]
    fn test_daybook() {
        let (_dir, mut conn) = test_db();
        let a = add_account(&conn, "Shop Current", 50_000.0);
        create_voucher(&mut conn, &voucher(VoucherType::Payment, "2025-04-05", a, "Rent", 4_000.0)).unwrap();
        create_voucher(&mut conn, &voucher(VoucherType::Receipt, "2025-04-05", a, "Sales Revenue", 6_500.0)).unwrap();
        create_voucher(&mut conn, &voucher(VoucherType::Payment, "2025-04-06", a, "Electricity", 300.0)).unwrap();

        let daybook = get_daybook(&conn, "2025-04-05").unwrap();
        assert_eq!(daybook.vouchers.len(), 2);
        assert_eq!(daybook.total_payments, 4_000.0);
        assert_eq!(daybook.total_receipts, 6_500.0);
        assert_eq!(daybook.net, 2_500.0);
    }
}
