mod accounts;
mod categories;
mod cheques;
mod cli;
mod db;
mod error;
mod fmt;
mod models;
mod reconciler;
mod reports;
mod settings;
mod vouchers;

use clap::Parser;

use cli::{
    AccountsCommands, CategoriesCommands, ChequeCommands, Cli, Commands, ReconcileCommands,
    ReportCommands, VoucherCommands,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, user } => cli::init::run(data_dir, user),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                name,
                number,
                bank,
                branch,
                ifsc,
                account_type,
                opening,
            } => cli::accounts::add(
                &name,
                &number,
                &bank,
                branch.as_deref(),
                ifsc.as_deref(),
                &account_type,
                opening,
            ),
            AccountsCommands::List => cli::accounts::list(),
            AccountsCommands::Show { id } => cli::accounts::show(id),
            AccountsCommands::Update {
                id,
                name,
                number,
                bank,
                branch,
                ifsc,
                account_type,
            } => cli::accounts::update(
                id,
                &name,
                &number,
                &bank,
                branch.as_deref(),
                ifsc.as_deref(),
                &account_type,
            ),
            AccountsCommands::Deactivate { id } => cli::accounts::deactivate(id),
        },
        Commands::Voucher { command } => match command {
            VoucherCommands::Add {
                voucher_type,
                account,
                amount,
                date,
                to_account,
                party,
                cheque,
                cheque_date,
                cheque_bank,
                narration,
                pdc,
            } => cli::vouchers::add(
                &voucher_type,
                account,
                amount,
                date,
                to_account,
                party,
                cheque,
                cheque_date,
                cheque_bank,
                narration,
                pdc,
            ),
            VoucherCommands::List {
                from_date,
                to_date,
                account,
                voucher_type,
                status,
            } => cli::vouchers::list(from_date, to_date, account, voucher_type, status),
            VoucherCommands::Show { id } => cli::vouchers::show(id),
            VoucherCommands::Edit {
                id,
                voucher_type,
                account,
                amount,
                date,
                to_account,
                party,
                cheque,
                cheque_date,
                cheque_bank,
                narration,
                pdc,
            } => cli::vouchers::edit(
                id,
                &voucher_type,
                account,
                amount,
                date,
                to_account,
                party,
                cheque,
                cheque_date,
                cheque_bank,
                narration,
                pdc,
            ),
            VoucherCommands::Delete { id } => cli::vouchers::delete(id),
            VoucherCommands::NextNumber { voucher_type } => {
                cli::vouchers::next_number(&voucher_type)
            }
            VoucherCommands::Parties => cli::vouchers::parties(),
        },
        Commands::Cheque { command } => match command {
            ChequeCommands::Deposit { voucher_id, date } => {
                cli::cheques::deposit(voucher_id, date)
            }
            ChequeCommands::Clear { voucher_id, date } => cli::cheques::clear(voucher_id, date),
            ChequeCommands::Bounce {
                voucher_id,
                date,
                reason,
            } => cli::cheques::bounce(voucher_id, date, &reason),
            ChequeCommands::Cancel { voucher_id, reason } => {
                cli::cheques::cancel(voucher_id, &reason)
            }
            ChequeCommands::List { status } => cli::cheques::list(status),
        },
        Commands::Reconcile { command } => match command {
            ReconcileCommands::Run {
                account_id,
                date,
                balance,
                vouchers,
                notes,
            } => cli::reconcile::run(account_id, &date, balance, vouchers, notes),
            ReconcileCommands::Pending { account_id } => cli::reconcile::pending(account_id),
            ReconcileCommands::History { account_id } => cli::reconcile::history(account_id),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::Add {
                name,
                category_type,
                description,
            } => cli::categories::add(&name, &category_type, description.as_deref()),
            CategoriesCommands::List { category_type } => {
                cli::categories::list(category_type.as_deref())
            }
            CategoriesCommands::Update {
                id,
                name,
                category_type,
                description,
            } => cli::categories::update(id, &name, &category_type, description.as_deref()),
            CategoriesCommands::Delete { id } => cli::categories::delete(id),
        },
        Commands::Report { command } => match command {
            ReportCommands::Statement {
                account_id,
                from_date,
                to_date,
            } => cli::report::statement(account_id, &from_date, &to_date),
            ReportCommands::Cashflow { from_date, to_date } => {
                cli::report::cashflow(&from_date, &to_date)
            }
            ReportCommands::Daybook { date } => cli::report::daybook(date),
        },
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
