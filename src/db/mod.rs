use rusqlite::{params, Connection, OptionalExtension, Params, Row, TransactionBehavior};
use r2d2_sqlite::SqliteConnectionManager;
use eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::time::Duration;
pub mod entities;
mod mappers;
mod schema;
mod accounts;
mod authors;
mod categories;
mod comments;
mod posts;
pub use accounts::*;
pub use authors::*;
pub use categories::*;
pub use comments::*;
pub use posts::*;

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<SqliteConnectionManager>;

// How long a connection waits on another one holding
// the write lock before giving up with "database is locked".
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// SQLite leaves foreign keys off unless asked, on
// every single connection. Cascades rely on it.
fn init_connection(conn: &mut Connection) -> rusqlite::Result<()> {
  conn.busy_timeout(BUSY_TIMEOUT)?;
  conn.execute_batch("PRAGMA foreign_keys = ON;")
}

pub fn open_pool(db_path: &str, pool_size: u32) -> Result<Pool> {
  let manager = SqliteConnectionManager::file(db_path)
    .with_init(init_connection);
  Pool::builder()
    .max_size(pool_size)
    .build(manager)
    .with_context(|| format!("Opening database {}", db_path))
}

// Safe to run on every start, tables are only
// created when missing.
pub fn init_schema(pool: &Pool) -> Result<()> {
  let conn = pool.get()?;
  conn.execute_batch(schema::SCHEMA)
    .context("Creating database schema")?;
  info!("Database schema is ready");
  Ok(())
}

// Stole most of the signature from the rusqlite doc.
fn select_many<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Vec<T>>
  where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
  let conn = pool.get()?;
  let mut stmt = conn.prepare(query)?;
  let rows = stmt.query_map(params, mapper)?
    .collect::<rusqlite::Result<Vec<T>>>();
  rows.context("Generic select_many query")
}

fn select_one<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Option<T>>
  where
    P: Params,
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
  let conn = pool.get()?;
  conn.query_row(query, params, mapper)
    .optional()
    .context("Generic select_one query")
}

// Tables with a community rating column.
#[derive(Debug, Clone, Copy)]
enum RatedTable {
  Posts,
  Comments
}

impl RatedTable {
  fn name(&self) -> &'static str {
    match self {
      RatedTable::Posts => "posts",
      RatedTable::Comments => "comments"
    }
  }
}

// The delta is applied by SQLite itself so two likes
// landing at the same time can't overwrite each other.
// Returns the new rating, or None when the row doesn't
// exist.
fn apply_rating_delta(
  pool: &Pool,
  table: RatedTable,
  id: i64,
  delta: i32
) -> Result<Option<i32>> {
  let mut conn = pool.get()?;
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let updated = tx.execute(
    &format!("UPDATE {} SET rating = rating + ? WHERE id = ?", table.name()),
    params![delta, id]
  )?;
  if updated == 0 {
    return Ok(None);
  }
  let rating: i32 = tx.query_row(
    &format!("SELECT rating FROM {} WHERE id = ?", table.name()),
    params![id],
    |row| row.get(0)
  )?;
  tx.commit()
    .with_context(|| format!("Updating rating in {}", table.name()))?;
  Ok(Some(rating))
}

// In-memory database for tests. Every connection to
// ":memory:" is its own database, hence the single
// connection pool.
#[cfg(test)]
pub fn test_pool() -> Pool {
  let manager = SqliteConnectionManager::memory()
    .with_init(init_connection);
  let pool = Pool::builder()
    .max_size(1)
    .build(manager)
    .unwrap();
  init_schema(&pool).unwrap();
  pool
}

// Database file in a temporary directory, for tests that
// need several connections working at the same time.
// The directory is removed when the TempDir is dropped.
#[cfg(test)]
pub fn file_test_pool(pool_size: u32) -> (tempfile::TempDir, Pool) {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("news.db");
  let pool = open_pool(path.to_str().unwrap(), pool_size).unwrap();
  init_schema(&pool).unwrap();
  (dir, pool)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn schema_init_is_idempotent() {
    let pool = test_pool();
    init_schema(&pool).unwrap();
    let tables: Vec<String> = select_many(
      &pool,
      "SELECT name FROM sqlite_master WHERE type = 'table' \
        AND name NOT LIKE 'sqlite_%' ORDER BY name",
      [],
      |row| row.get(0)
    ).unwrap();
    assert_eq!(
      vec![
        "authors", "categories", "comments", "group_members",
        "post_categories", "posts", "user_groups", "users"
      ],
      tables
    );
  }

  #[test]
  fn foreign_keys_are_enforced() {
    let pool = test_pool();
    let enabled: i32 = select_one(&pool, "PRAGMA foreign_keys", [], |row| row.get(0))
      .unwrap()
      .unwrap();
    assert_eq!(1, enabled);
  }

  #[test]
  fn file_pool_connections_share_the_database() {
    let (_dir, pool) = file_test_pool(4);
    let conn = pool.get().unwrap();
    let enabled: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
    assert_eq!(1, enabled);
    // A second connection sees the schema created by the first.
    let count: i64 = select_one(
      &pool,
      "SELECT count(*) FROM sqlite_master WHERE name = 'posts'",
      [],
      |row| row.get(0)
    ).unwrap().unwrap();
    assert_eq!(1, count);
  }

  #[test]
  fn rating_delta_on_missing_row() {
    let pool = test_pool();
    let result = apply_rating_delta(&pool, RatedTable::Posts, 404, 1).unwrap();
    assert_eq!(None, result);
  }
}
