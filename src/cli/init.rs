use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(data_dir: Option<String>, user: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(user) = user {
        settings.user_name = user;
    }

    let dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&dir)?;
    save_settings(&settings)?;

    let db_path = dir.join("rokar.db");
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    println!("Initialized ledger at {}", db_path.display());
    if !settings.user_name.is_empty() {
        println!("Operator: {}", settings.user_name);
    }
    println!("A 'Cash' account and the default categories are ready.");
    Ok(())
}
