use rusqlite::{params, OptionalExtension, TransactionBehavior};
use eyre::{WrapErr, eyre};
use color_eyre::Result;
use log::{error, info};
use crate::utils::time_utils::current_timestamp;
use super::entities::*;
use super::mappers::{map_group, map_user};
use super::{Pool, select_one};

// Group every new user gets added to unless the
// config says otherwise.
pub const DEFAULT_GROUP: &'static str = "common";

const USER_FIELDS: &'static str = "id, username, email, date_joined";

pub fn user_by_id(pool: &Pool, id: i64) -> Result<Option<User>> {
  select_one(
    pool,
    &format!("SELECT {} FROM users WHERE id = ?", USER_FIELDS),
    params![id],
    map_user
  )
}

pub fn user_by_username(pool: &Pool, username: &str) -> Result<Option<User>> {
  select_one(
    pool,
    &format!("SELECT {} FROM users WHERE username = ?", USER_FIELDS),
    params![username],
    map_user
  )
}

// Plain registration, a duplicate username comes back
// as the SQLite constraint error.
pub fn create_user(pool: &Pool, username: &str, email: &str) -> Result<User> {
  let conn = pool.get()?;
  let date_joined = current_timestamp();
  conn.execute(
    "INSERT INTO users (username, email, date_joined) VALUES (?, ?, ?)",
    params![username, email, date_joined]
  ).with_context(|| format!("Inserting user {}", username))?;
  Ok(User {
    id: conn.last_insert_rowid(),
    username: username.to_string(),
    email: email.to_string(),
    date_joined
  })
}

// Cascades to the author profile, comments and
// group memberships.
pub fn delete_user(pool: &Pool, id: i64) -> Result<bool> {
  let conn = pool.get()?;
  let deleted = conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
  Ok(deleted > 0)
}

pub fn group_by_name(pool: &Pool, name: &str) -> Result<Option<Group>> {
  select_one(
    pool,
    "SELECT id, name FROM user_groups WHERE name = ?",
    params![name],
    map_group
  )
}

// Get-or-create the group then add the user to it,
// both in the same transaction. Adding someone who
// is already a member does nothing.
pub fn add_user_to_group(pool: &Pool, user_id: i64, group_name: &str) -> Result<Group> {
  let mut conn = pool.get()?;
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  tx.execute(
    "INSERT OR IGNORE INTO user_groups (name) VALUES (?)",
    params![group_name]
  )?;
  let group = tx.query_row(
    "SELECT id, name FROM user_groups WHERE name = ?",
    params![group_name],
    map_group
  ).optional()?
    .ok_or_else(|| eyre!("Group {} vanished right after creation", group_name))?;
  tx.execute(
    "INSERT OR IGNORE INTO group_members (group_id, user_id) VALUES (?, ?)",
    params![group.id, user_id]
  )?;
  tx.commit()
    .with_context(|| format!("Adding user {} to group {}", user_id, group_name))?;
  Ok(group)
}

pub fn membership_count(pool: &Pool, user_id: i64, group_name: &str) -> Result<i64> {
  let conn = pool.get()?;
  let count: i64 = conn.query_row(
    "SELECT count(*) FROM group_members, user_groups WHERE \
      group_members.group_id = user_groups.id \
      AND user_groups.name = ? AND group_members.user_id = ?",
    params![group_name, user_id],
    |row| row.get(0)
  )?;
  Ok(count)
}

// Runs once registration has stored the user and hands
// the same user back. A failing group assignment is
// logged and doesn't undo the signup.
pub fn on_user_signup(pool: &Pool, user: User, group_name: &str) -> User {
  match add_user_to_group(pool, user.id, group_name) {
    Ok(group) => info!("User {} added to group {}", user.username, group.name),
    Err(e) => error!(
      "Could not add user {} to group {} - {:?}", user.username, group_name, e
    )
  }
  user
}

pub fn signup(pool: &Pool, username: &str, email: &str, group_name: &str) -> Result<User> {
  let user = create_user(pool, username, email)?;
  Ok(on_user_signup(pool, user, group_name))
}
