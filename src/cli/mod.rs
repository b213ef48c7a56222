pub mod accounts;
pub mod categories;
pub mod cheques;
pub mod demo;
pub mod init;
pub mod reconcile;
pub mod report;
pub mod status;
pub mod vouchers;

use clap::{Parser, Subcommand};

use crate::error::{Result, RokarError};

/// Shared by handlers that accept enum-ish values as plain strings.
pub(crate) fn parse_arg<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(RokarError::Validation)
}

pub(crate) fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[derive(Parser)]
#[command(name = "rokar", about = "Cash & bank ledger CLI for small retail businesses.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Rokar: choose a data directory and initialize the ledger.
    Init {
        /// Path for Rokar data (default: ~/Documents/rokar)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Operator name recorded on vouchers
        #[arg(long)]
        user: Option<String>,
    },
    /// Manage bank and cash accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Record and manage vouchers (Payment / Receipt / Contra).
    Voucher {
        #[command(subcommand)]
        command: VoucherCommands,
    },
    /// Track cheques through their clearing lifecycle.
    Cheque {
        #[command(subcommand)]
        command: ChequeCommands,
    },
    /// Match book entries against bank statements.
    Reconcile {
        #[command(subcommand)]
        command: ReconcileCommands,
    },
    /// Manage expense/income categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Load sample accounts and vouchers to explore Rokar.
    Demo,
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new bank account.
    Add {
        /// Account display name, e.g. 'Shop Current'
        name: String,
        /// Bank account number
        #[arg(long)]
        number: String,
        /// Bank name
        #[arg(long)]
        bank: String,
        /// Branch name
        #[arg(long)]
        branch: Option<String>,
        /// IFSC routing code
        #[arg(long)]
        ifsc: Option<String>,
        /// Account type: Savings, Current, Cash Credit, Overdraft
        #[arg(long = "type", default_value = "Current")]
        account_type: String,
        /// Opening balance
        #[arg(long, default_value = "0")]
        opening: f64,
    },
    /// List active accounts with balances.
    List,
    /// Show one account with recent vouchers and totals.
    Show {
        /// Account ID (shown in `rokar accounts list`)
        id: i64,
    },
    /// Update account details (never the balance).
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        number: String,
        #[arg(long)]
        bank: String,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        ifsc: Option<String>,
        #[arg(long = "type", default_value = "Current")]
        account_type: String,
    },
    /// Deactivate an account with no live vouchers.
    Deactivate {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum VoucherCommands {
    /// Record a voucher.
    Add {
        /// Voucher type: Payment, Receipt, Contra
        voucher_type: String,
        /// Source account ID
        #[arg(long)]
        account: i64,
        /// Amount (must be positive)
        #[arg(long)]
        amount: f64,
        /// Voucher date YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Destination account ID (Contra only)
        #[arg(long = "to-account")]
        to_account: Option<i64>,
        /// Party or category name
        #[arg(long)]
        party: Option<String>,
        /// Cheque number (voucher stays Pending until cleared)
        #[arg(long)]
        cheque: Option<String>,
        /// Cheque date YYYY-MM-DD
        #[arg(long = "cheque-date")]
        cheque_date: Option<String>,
        /// Drawee bank on the cheque
        #[arg(long = "cheque-bank")]
        cheque_bank: Option<String>,
        /// Free-text narration
        #[arg(long)]
        narration: Option<String>,
        /// Track as a post-dated cheque
        #[arg(long)]
        pdc: bool,
    },
    /// List vouchers with optional filters.
    List {
        #[arg(long = "from")]
        from_date: Option<String>,
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Filter by account ID
        #[arg(long)]
        account: Option<i64>,
        /// Filter by type: Payment, Receipt, Contra
        #[arg(long = "type")]
        voucher_type: Option<String>,
        /// Filter by status: Pending, Deposited, Cleared, Bounced, Cancelled
        #[arg(long)]
        status: Option<String>,
    },
    /// Show a voucher with its ledger entries and cheque record.
    Show {
        id: i64,
    },
    /// Rewrite a voucher (reverses and re-posts it).
    Edit {
        id: i64,
        voucher_type: String,
        #[arg(long)]
        account: i64,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "to-account")]
        to_account: Option<i64>,
        #[arg(long)]
        party: Option<String>,
        #[arg(long)]
        cheque: Option<String>,
        #[arg(long = "cheque-date")]
        cheque_date: Option<String>,
        #[arg(long = "cheque-bank")]
        cheque_bank: Option<String>,
        #[arg(long)]
        narration: Option<String>,
        #[arg(long)]
        pdc: bool,
    },
    /// Delete a voucher (reverses its balance effect).
    Delete {
        id: i64,
    },
    /// Preview the next voucher number for a type.
    NextNumber {
        /// Voucher type: Payment, Receipt, Contra
        voucher_type: String,
    },
    /// List recent party names.
    Parties,
}

#[derive(Subcommand)]
pub enum ChequeCommands {
    /// Mark a pending cheque as deposited.
    Deposit {
        /// Voucher ID carrying the cheque
        voucher_id: i64,
        /// Deposit date YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a deposited cheque as cleared.
    Clear {
        voucher_id: i64,
        #[arg(long)]
        date: Option<String>,
    },
    /// Bounce a cheque and reverse its balance effect.
    Bounce {
        voucher_id: i64,
        #[arg(long)]
        date: Option<String>,
        /// Bounce reason, e.g. 'insufficient funds'
        #[arg(long)]
        reason: String,
    },
    /// Cancel a cheque and reverse its balance effect.
    Cancel {
        voucher_id: i64,
        #[arg(long)]
        reason: String,
    },
    /// List post-dated cheques.
    List {
        /// Filter by status: Pending, Deposited, Cleared, Bounced, Cancelled
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReconcileCommands {
    /// Commit a reconciliation against a statement balance.
    Run {
        /// Account ID
        account_id: i64,
        /// Statement date YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Statement ending balance
        #[arg(long)]
        balance: f64,
        /// Voucher IDs to mark reconciled (comma-separated)
        #[arg(long, value_delimiter = ',')]
        vouchers: Vec<i64>,
        /// Free-text notes stored on the record
        #[arg(long)]
        notes: Option<String>,
    },
    /// List vouchers not yet reconciled for an account.
    Pending {
        account_id: i64,
    },
    /// Show reconciliation history for an account.
    History {
        account_id: i64,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category.
    Add {
        /// Category name, e.g. 'Festival Bonus'
        name: String,
        /// Category type: Expense or Income
        #[arg(long = "type")]
        category_type: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List active categories.
    List {
        /// Filter by type: Expense or Income
        #[arg(long = "type")]
        category_type: Option<String>,
    },
    /// Update a non-default category.
    Update {
        id: i64,
        name: String,
        #[arg(long = "type")]
        category_type: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete (deactivate) a non-default category.
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Account statement with running balance.
    Statement {
        account_id: i64,
        #[arg(long = "from")]
        from_date: String,
        #[arg(long = "to")]
        to_date: String,
    },
    /// Receipts vs payments with category breakdowns.
    Cashflow {
        #[arg(long = "from")]
        from_date: String,
        #[arg(long = "to")]
        to_date: String,
    },
    /// All vouchers recorded on one date.
    Daybook {
        /// Date YYYY-MM-DD (default: today)
        date: Option<String>,
    },
}
