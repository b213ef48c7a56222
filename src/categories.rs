use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, RokarError};
use crate::models::{Category, CategoryType};

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        category_type: row.get(2)?,
        description: row.get(3)?,
        is_default: row.get(4)?,
        is_active: row.get(5)?,
    })
}

const CATEGORY_COLUMNS: &str = "id, name, category_type, description, is_default, is_active";

pub fn list_categories(conn: &Connection, filter: Option<CategoryType>) -> Result<Vec<Category>> {
    let categories = match filter {
        Some(category_type) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories \
                 WHERE is_active = 1 AND category_type = ?1 ORDER BY name"
            ))?;
            let rows = stmt.query_map([category_type], category_from_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories \
                 WHERE is_active = 1 ORDER BY category_type, name"
            ))?;
            let rows = stmt.query_map([], category_from_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(categories)
}

pub fn add_category(
    conn: &Connection,
    name: &str,
    category_type: CategoryType,
    description: Option<&str>,
) -> Result<i64> {
    if name.trim().is_empty() {
        return Err(RokarError::Validation("category name is required".into()));
    }
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?1)",
        [name],
        |row| row.get(0),
    )?;
    if exists {
        return Err(RokarError::Conflict(format!(
            "category '{name}' already exists"
        )));
    }
    conn.execute(
        "INSERT INTO categories (name, category_type, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, category_type, description],
    )?;
    Ok(conn.last_insert_rowid())
}

fn get_category(conn: &Connection, id: i64) -> Result<Category> {
    conn.query_row(
        &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
        [id],
        category_from_row,
    )
    .optional()?
    .ok_or_else(|| RokarError::NotFound(format!("category {id}")))
}

pub fn update_category(
    conn: &Connection,
    id: i64,
    name: &str,
    category_type: CategoryType,
    description: Option<&str>,
) -> Result<()> {
    let category = get_category(conn, id)?;
    if category.is_default {
        return Err(RokarError::Conflict(format!(
            "default category '{}' cannot be edited",
            category.name
        )));
    }
    if name.trim().is_empty() {
        return Err(RokarError::Validation("category name is required".into()));
    }
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?1 AND id != ?2)",
        rusqlite::params![name, id],
        |row| row.get(0),
    )?;
    if taken {
        return Err(RokarError::Conflict(format!(
            "category '{name}' already exists"
        )));
    }
    conn.execute(
        "UPDATE categories SET name = ?1, category_type = ?2, description = ?3 \
         WHERE id = ?4 AND is_default = 0",
        rusqlite::params![name, category_type, description, id],
    )?;
    Ok(())
}

pub fn delete_category(conn: &Connection, id: i64) -> Result<()> {
    let category = get_category(conn, id)?;
    if category.is_default {
        return Err(RokarError::Conflict(format!(
            "default category '{}' cannot be deleted",
            category.name
        )));
    }
    conn.execute(
        "UPDATE categories SET is_active = 0 WHERE id = ?1 AND is_default = 0",
        [id],
    )?;
    Ok(())
}
