use comfy_table::{Cell, Table};

use crate::categories;
use crate::cli::parse_arg;
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::get_data_dir;

pub fn add(name: &str, category_type: &str, description: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let id = categories::add_category(&conn, name, parse_arg(category_type)?, description)?;
    println!("Added category {id}: {name}");
    Ok(())
}

pub fn list(category_type: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    let filter = category_type.map(parse_arg).transpose()?;
    let categories = categories::list_categories(&conn, filter)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Description", "Default"]);
    for cat in &categories {
        table.add_row(vec![
            Cell::new(cat.id),
            Cell::new(&cat.name),
            Cell::new(cat.category_type),
            Cell::new(cat.description.as_deref().unwrap_or_default()),
            Cell::new(if cat.is_default { "Y" } else { "" }),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn update(id: i64, name: &str, category_type: &str, description: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    categories::update_category(&conn, id, name, parse_arg(category_type)?, description)?;
    println!("Updated category {id}: {name}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("rokar.db"))?;
    categories::delete_category(&conn, id)?;
    println!("Deleted category {id}");
    Ok(())
}
