use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS bank_accounts (
    id INTEGER PRIMARY KEY,
    account_name TEXT NOT NULL,
    account_number TEXT NOT NULL,
    bank_name TEXT NOT NULL,
    branch_name TEXT,
    ifsc_code TEXT,
    account_type TEXT NOT NULL DEFAULT 'Current'
        CHECK(account_type IN ('Savings', 'Current', 'Cash Credit', 'Overdraft')),
    opening_balance REAL NOT NULL DEFAULT 0,
    current_balance REAL NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS vouchers (
    id INTEGER PRIMARY KEY,
    voucher_number TEXT NOT NULL,
    voucher_type TEXT NOT NULL CHECK(voucher_type IN ('Payment', 'Receipt', 'Contra')),
    voucher_date TEXT NOT NULL,
    account_id INTEGER NOT NULL,
    party_name TEXT,
    amount REAL NOT NULL,
    direction TEXT NOT NULL CHECK(direction IN ('Debit', 'Credit')),
    cheque_number TEXT,
    cheque_date TEXT,
    narration TEXT,
    cleared_status TEXT NOT NULL DEFAULT 'Pending'
        CHECK(cleared_status IN ('Pending', 'Deposited', 'Cleared', 'Bounced', 'Cancelled')),
    cleared_date TEXT,
    reconciled INTEGER NOT NULL DEFAULT 0,
    reconciled_date TEXT,
    paired_voucher_id INTEGER,
    created_by TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    is_deleted INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (account_id) REFERENCES bank_accounts(id),
    FOREIGN KEY (paired_voucher_id) REFERENCES vouchers(id)
);

CREATE TABLE IF NOT EXISTS ledger_entries (
    id INTEGER PRIMARY KEY,
    voucher_id INTEGER NOT NULL,
    ledger_type TEXT NOT NULL CHECK(ledger_type IN ('Bank', 'Party', 'Expense', 'Income')),
    ledger_name TEXT NOT NULL,
    debit_amount REAL NOT NULL DEFAULT 0,
    credit_amount REAL NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (voucher_id) REFERENCES vouchers(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS post_dated_cheques (
    id INTEGER PRIMARY KEY,
    voucher_id INTEGER NOT NULL,
    cheque_number TEXT NOT NULL,
    cheque_date TEXT NOT NULL,
    amount REAL NOT NULL,
    party_name TEXT NOT NULL,
    bank_name TEXT,
    status TEXT NOT NULL DEFAULT 'Pending'
        CHECK(status IN ('Pending', 'Deposited', 'Cleared', 'Bounced', 'Cancelled')),
    deposit_date TEXT,
    cleared_date TEXT,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (voucher_id) REFERENCES vouchers(id)
);

CREATE TABLE IF NOT EXISTS reconciliations (
    id INTEGER PRIMARY KEY,
    account_id INTEGER NOT NULL,
    statement_date TEXT NOT NULL,
    statement_balance REAL NOT NULL,
    book_balance REAL NOT NULL,
    difference REAL NOT NULL,
    reconciled_by TEXT,
    reconciled_at TEXT DEFAULT (datetime('now')),
    notes TEXT,
    FOREIGN KEY (account_id) REFERENCES bank_accounts(id)
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    category_type TEXT NOT NULL CHECK(category_type IN ('Expense', 'Income')),
    description TEXT,
    is_default INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS voucher_audit (
    id INTEGER PRIMARY KEY,
    voucher_id INTEGER NOT NULL,
    action TEXT NOT NULL,
    previous TEXT NOT NULL,
    operator TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (voucher_id) REFERENCES vouchers(id)
);

CREATE INDEX IF NOT EXISTS idx_vouchers_date ON vouchers(voucher_date);
CREATE INDEX IF NOT EXISTS idx_vouchers_account ON vouchers(account_id);
CREATE INDEX IF NOT EXISTS idx_vouchers_number ON vouchers(voucher_number);
CREATE INDEX IF NOT EXISTS idx_vouchers_reconciled ON vouchers(reconciled);
CREATE INDEX IF NOT EXISTS idx_pdc_status ON post_dated_cheques(status);
CREATE INDEX IF NOT EXISTS idx_pdc_date ON post_dated_cheques(cheque_date);
CREATE INDEX IF NOT EXISTS idx_reconciliations_account ON reconciliations(account_id);
CREATE INDEX IF NOT EXISTS idx_reconciliations_date ON reconciliations(statement_date);
";

// (name, category_type, description)
const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    // Expenses
    ("Purchase of Goods", "Expense", "Purchase of trading/raw material goods"),
    ("Salary & Wages", "Expense", "Employee salaries and daily wages"),
    ("Rent", "Expense", "Office/Shop/Warehouse rent"),
    ("Electricity", "Expense", "Power and electricity bills"),
    ("Telephone & Internet", "Expense", "Communication expenses"),
    ("Transportation & Freight", "Expense", "Vehicle, fuel, and freight charges"),
    ("Packaging Material", "Expense", "Boxes, bags, and packaging supplies"),
    ("Loading & Unloading", "Expense", "Labour charges for loading/unloading"),
    ("Stationery & Printing", "Expense", "Office supplies and printing"),
    ("Bank Charges", "Expense", "Bank fees, charges, and commission"),
    ("Interest on Loan", "Expense", "Interest paid on business loans"),
    ("GST Payment", "Expense", "GST paid to government"),
    ("TDS Payment", "Expense", "TDS deducted and paid"),
    ("Professional Fees", "Expense", "CA, Legal, Consultant fees"),
    ("Repairs & Maintenance", "Expense", "Equipment and building maintenance"),
    ("Vehicle Maintenance", "Expense", "Vehicle servicing and repairs"),
    ("Insurance Premium", "Expense", "Business and vehicle insurance"),
    ("License & Registration", "Expense", "FSSAI, Trade License, GST registration"),
    ("Marketing & Advertising", "Expense", "Promotion and advertising costs"),
    ("Travelling & Conveyance", "Expense", "Business travel expenses"),
    ("Office Expenses", "Expense", "General office running expenses"),
    ("Security Charges", "Expense", "Watchman and security services"),
    ("Water Charges", "Expense", "Water supply bills"),
    ("Charitable Donations", "Expense", "Donations and CSR activities"),
    ("Miscellaneous Expenses", "Expense", "Other small expenses"),
    // Income
    ("Sales Revenue", "Income", "Revenue from sales of goods"),
    ("Cash Discount Received", "Income", "Discount received from suppliers"),
    ("Interest Received", "Income", "Interest from bank deposits/FD"),
    ("Commission Received", "Income", "Commission earned from business"),
    ("Scrap Sales", "Income", "Sale of scrap material"),
    ("Rental Income", "Income", "Income from property rent"),
    ("TDS Refund", "Income", "TDS refund received"),
    ("GST Refund", "Income", "GST refund from government"),
    ("Bank Interest", "Income", "Interest credited by bank"),
    ("Other Income", "Income", "Miscellaneous income"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    for cat in DEFAULT_CATEGORIES {
        conn.execute(
            "INSERT OR IGNORE INTO categories (name, category_type, description, is_default) \
             VALUES (?1, ?2, ?3, 1)",
            rusqlite::params![cat.0, cat.1, cat.2],
        )?;
    }

    // Every book starts with a cash-in-hand account.
    let cash_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM bank_accounts WHERE account_name = 'Cash')",
        [],
        |row| row.get(0),
    )?;
    if !cash_exists {
        conn.execute(
            "INSERT INTO bank_accounts \
             (account_name, account_number, bank_name, branch_name, ifsc_code, account_type, \
              opening_balance, current_balance) \
             VALUES ('Cash', 'CASH-001', 'Cash in Hand', 'N/A', 'N/A', 'Current', 0, 0)",
            [],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &[
            "bank_accounts",
            "vouchers",
            "ledger_entries",
            "post_dated_cheques",
            "reconciliations",
            "categories",
            "voucher_audit",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let cash_accounts: i64 = conn
            .query_row(
                "SELECT count(*) FROM bank_accounts WHERE account_name = 'Cash'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(cash_accounts, 1);
    }

    #[test]
    fn test_init_db_seeds_default_categories() {
        let (_dir, conn) = test_db();
        let expense: i64 = conn
            .query_row(
                "SELECT count(*) FROM categories WHERE category_type = 'Expense' AND is_default = 1",
                [],
                |r| r.get(0),
            )
            .unwrap();
        let income: i64 = conn
            .query_row(
                "SELECT count(*) FROM categories WHERE category_type = 'Income' AND is_default = 1",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(expense, 25);
        assert_eq!(income, 10);
    }

    #[test]
    fn test_init_db_seeds_cash_account() {
        let (_dir, conn) = test_db();
        let (number, bank): (String, String) = conn
            .query_row(
                "SELECT account_number, bank_name FROM bank_accounts WHERE account_name = 'Cash'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(number, "CASH-001");
        assert_eq!(bank, "Cash in Hand");
    }
}
