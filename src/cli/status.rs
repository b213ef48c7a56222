use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("rokar.db");

    println!("Operator:   {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;

        let accounts: i64 = conn.query_row(
            "SELECT count(*) FROM bank_accounts WHERE is_active = 1",
            [],
            |r| r.get(0),
        )?;
        let vouchers: i64 = conn.query_row(
            "SELECT count(*) FROM vouchers WHERE is_deleted = 0",
            [],
            |r| r.get(0),
        )?;
        let pending_cheques: i64 = conn.query_row(
            "SELECT count(*) FROM post_dated_cheques p \
             JOIN vouchers v ON v.id = p.voucher_id AND v.is_deleted = 0 \
             WHERE p.status IN ('Pending', 'Deposited')",
            [],
            |r| r.get(0),
        )?;
        let unreconciled: i64 = conn.query_row(
            "SELECT count(*) FROM vouchers WHERE is_deleted = 0 AND reconciled = 0 \
             AND cleared_status NOT IN ('Bounced', 'Cancelled')",
            [],
            |r| r.get(0),
        )?;
        let position: f64 = conn.query_row(
            "SELECT COALESCE(SUM(current_balance), 0) FROM bank_accounts WHERE is_active = 1",
            [],
            |r| r.get(0),
        )?;

        println!();
        println!("Accounts:        {accounts}");
        println!("Vouchers:        {vouchers}");
        println!("Open cheques:    {pending_cheques}");
        println!("Unreconciled:    {unreconciled}");
        println!("Cash position:   {}", money(position));
    } else {
        println!();
        println!("Database not found. Run `rokar init` to set up.");
    }

    Ok(())
}
