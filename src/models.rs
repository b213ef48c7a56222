use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;

/// Wires an enum to its TEXT column representation in both directions.
macro_rules! impl_sql_text {
    ($t:ty) => {
        impl FromSql for $t {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }

        impl ToSql for $t {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VoucherType {
    Payment,
    Receipt,
    Contra,
}

impl VoucherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherType::Payment => "Payment",
            VoucherType::Receipt => "Receipt",
            VoucherType::Contra => "Contra",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            VoucherType::Payment => "PAY",
            VoucherType::Receipt => "RCP",
            VoucherType::Contra => "CNT",
        }
    }

    /// Money direction on the owning (source) account.
    pub fn direction(&self) -> Direction {
        match self {
            VoucherType::Payment => Direction::Debit,
            VoucherType::Receipt => Direction::Credit,
            VoucherType::Contra => Direction::Debit,
        }
    }
}

impl FromStr for VoucherType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Payment" => Ok(VoucherType::Payment),
            "Receipt" => Ok(VoucherType::Receipt),
            "Contra" => Ok(VoucherType::Contra),
            other => Err(format!("unknown voucher type: {other}")),
        }
    }
}

impl_sql_text!(VoucherType);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "Debit",
            Direction::Credit => "Credit",
        }
    }

    /// Signed effect of this movement on the account balance.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            Direction::Debit => -amount,
            Direction::Credit => amount,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Debit" => Ok(Direction::Debit),
            "Credit" => Ok(Direction::Credit),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

impl_sql_text!(Direction);

/// Settlement state shared by vouchers and their post-dated cheques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClearanceStatus {
    Pending,
    Deposited,
    Cleared,
    Bounced,
    Cancelled,
}

impl ClearanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearanceStatus::Pending => "Pending",
            ClearanceStatus::Deposited => "Deposited",
            ClearanceStatus::Cleared => "Cleared",
            ClearanceStatus::Bounced => "Bounced",
            ClearanceStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClearanceStatus::Cleared | ClearanceStatus::Bounced | ClearanceStatus::Cancelled
        )
    }
}

impl FromStr for ClearanceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ClearanceStatus::Pending),
            "Deposited" => Ok(ClearanceStatus::Deposited),
            "Cleared" => Ok(ClearanceStatus::Cleared),
            "Bounced" => Ok(ClearanceStatus::Bounced),
            "Cancelled" => Ok(ClearanceStatus::Cancelled),
            other => Err(format!("unknown clearance status: {other}")),
        }
    }
}

impl_sql_text!(ClearanceStatus);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountType {
    Savings,
    Current,
    #[serde(rename = "Cash Credit")]
    CashCredit,
    Overdraft,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "Savings",
            AccountType::Current => "Current",
            AccountType::CashCredit => "Cash Credit",
            AccountType::Overdraft => "Overdraft",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Savings" => Ok(AccountType::Savings),
            "Current" => Ok(AccountType::Current),
            "Cash Credit" => Ok(AccountType::CashCredit),
            "Overdraft" => Ok(AccountType::Overdraft),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

impl_sql_text!(AccountType);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LedgerType {
    Bank,
    Party,
    Expense,
    Income,
}

impl LedgerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerType::Bank => "Bank",
            LedgerType::Party => "Party",
            LedgerType::Expense => "Expense",
            LedgerType::Income => "Income",
        }
    }
}

impl FromStr for LedgerType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Bank" => Ok(LedgerType::Bank),
            "Party" => Ok(LedgerType::Party),
            "Expense" => Ok(LedgerType::Expense),
            "Income" => Ok(LedgerType::Income),
            other => Err(format!("unknown ledger type: {other}")),
        }
    }
}

impl_sql_text!(LedgerType);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CategoryType {
    Expense,
    Income,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Expense => "Expense",
            CategoryType::Income => "Income",
        }
    }
}

impl FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Expense" => Ok(CategoryType::Expense),
            "Income" => Ok(CategoryType::Income),
            other => Err(format!("unknown category type: {other}")),
        }
    }
}

impl_sql_text!(CategoryType);

#[derive(Debug, Clone)]
pub struct BankAccount {
    pub id: i64,
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub branch_name: Option<String>,
    pub ifsc_code: Option<String>,
    pub account_type: AccountType,
    pub opening_balance: f64,
    pub current_balance: f64,
    pub is_active: bool,
}

/// One recorded money movement. A Contra transfer is two of these, linked
/// through `paired_voucher_id`.
#[derive(Debug, Clone, Serialize)]
pub struct Voucher {
    pub id: i64,
    pub voucher_number: String,
    pub voucher_type: VoucherType,
    pub voucher_date: String,
    pub account_id: i64,
    pub party_name: Option<String>,
    pub amount: f64,
    pub direction: Direction,
    pub cheque_number: Option<String>,
    pub cheque_date: Option<String>,
    pub narration: Option<String>,
    pub cleared_status: ClearanceStatus,
    pub cleared_date: Option<String>,
    pub reconciled: bool,
    pub reconciled_date: Option<String>,
    pub paired_voucher_id: Option<i64>,
    pub created_by: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub id: i64,
    pub voucher_id: i64,
    pub ledger_type: LedgerType,
    pub ledger_name: String,
    pub debit_amount: f64,
    pub credit_amount: f64,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct PostDatedCheque {
    pub id: i64,
    pub voucher_id: i64,
    pub cheque_number: String,
    pub cheque_date: String,
    pub amount: f64,
    pub party_name: String,
    pub bank_name: Option<String>,
    pub status: ClearanceStatus,
    pub deposit_date: Option<String>,
    pub cleared_date: Option<String>,
    pub notes: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ReconciliationRecord {
    pub id: i64,
    pub account_id: i64,
    pub statement_date: String,
    pub statement_balance: f64,
    pub book_balance: f64,
    pub difference: f64,
    pub reconciled_by: Option<String>,
    pub reconciled_at: String,
    pub notes: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub category_type: CategoryType,
    pub description: Option<String>,
    pub is_default: bool,
    pub is_active: bool,
}
