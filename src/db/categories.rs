use rusqlite::params;
use eyre::WrapErr;
use color_eyre::Result;
use super::entities::*;
use super::mappers::{map_category, map_post_category};
use super::{Pool, select_many, select_one};

pub fn all_categories(pool: &Pool) -> Result<Vec<Category>> {
  select_many(
    pool,
    "SELECT id, category_name FROM categories ORDER BY category_name ASC",
    [],
    map_category
  )
}

pub fn category_by_name(pool: &Pool, name: &str) -> Result<Option<Category>> {
  select_one(
    pool,
    "SELECT id, category_name FROM categories WHERE category_name = ?",
    params![name],
    map_category
  )
}

// Names are unique, inserting one twice gives back the
// SQLite constraint error untouched (wrapped with context).
pub fn create_category(pool: &Pool, name: &str) -> Result<Category> {
  let conn = pool.get()?;
  conn.execute(
    "INSERT INTO categories (category_name) VALUES (?)",
    params![name]
  ).with_context(|| format!("Inserting category {}", name))?;
  Ok(Category {
    id: conn.last_insert_rowid(),
    category_name: name.to_string()
  })
}

pub fn categories_for_post(pool: &Pool, post_id: i64) -> Result<Vec<Category>> {
  select_many(
    pool,
    "SELECT categories.id, categories.category_name \
    FROM post_categories, categories WHERE \
    post_categories.post_id = ? \
    AND post_categories.category_id = categories.id \
    ORDER BY categories.category_name ASC",
    params![post_id],
    map_category
  )
}

// Raw join rows, mostly useful to check what a
// cascade left behind.
pub fn post_category_links(pool: &Pool, category_id: i64) -> Result<Vec<PostCategory>> {
  select_many(
    pool,
    "SELECT id, post_id, category_id FROM post_categories \
    WHERE category_id = ? ORDER BY id ASC",
    params![category_id],
    map_post_category
  )
}

// Join rows go away with the category.
pub fn delete_category(pool: &Pool, id: i64) -> Result<bool> {
  let conn = pool.get()?;
  let deleted = conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
  Ok(deleted > 0)
}
