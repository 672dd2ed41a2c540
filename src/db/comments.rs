use rusqlite::params;
use eyre::{WrapErr, eyre};
use color_eyre::Result;
use crate::censor::Blocklist;
use crate::utils::time_utils::current_timestamp;
use super::entities::*;
use super::mappers::map_comment;
use super::posts::SubmitError;
use super::{Pool, RatedTable, apply_rating_delta, select_many, select_one};

const COMMENT_SELECT: &'static str =
  "SELECT comments.id, comments.post_id, comments.user_id, users.username, \
  comments.text, comments.date_creation, comments.rating \
  FROM comments JOIN users ON users.id = comments.user_id";

pub fn comment_by_id(pool: &Pool, id: i64) -> Result<Option<Comment>> {
  select_one(
    pool,
    &format!("{} WHERE comments.id = ?", COMMENT_SELECT),
    params![id],
    map_comment
  )
}

// Oldest first, the way they're shown under a post.
pub fn comments_for_post(pool: &Pool, post_id: i64) -> Result<Vec<Comment>> {
  select_many(
    pool,
    &format!(
      "{} WHERE comments.post_id = ? ORDER BY comments.date_creation ASC, comments.id ASC",
      COMMENT_SELECT
    ),
    params![post_id],
    map_comment
  )
}

pub fn comments_by_user(pool: &Pool, user_id: i64) -> Result<Vec<Comment>> {
  select_many(
    pool,
    &format!(
      "{} WHERE comments.user_id = ? ORDER BY comments.date_creation ASC, comments.id ASC",
      COMMENT_SELECT
    ),
    params![user_id],
    map_comment
  )
}

pub fn insert_comment(pool: &Pool, post_id: i64, user_id: i64, text: &str) -> Result<Comment> {
  let id = {
    let conn = pool.get()?;
    conn.execute(
      "INSERT INTO comments (post_id, user_id, text, date_creation) VALUES (?, ?, ?, ?)",
      params![post_id, user_id, text, current_timestamp()]
    ).with_context(|| format!("Inserting comment on post {}", post_id))?;
    conn.last_insert_rowid()
  };
  comment_by_id(pool, id)?
    .ok_or_else(|| eyre!("Comment {} missing after insert", id))
}

pub fn submit_comment(
  pool: &Pool,
  blocklist: &Blocklist,
  post_id: i64,
  user_id: i64,
  text: &str
) -> Result<Comment, SubmitError> {
  blocklist.validate(text)?;
  Ok(insert_comment(pool, post_id, user_id, text)?)
}

pub fn add_to_comment_rating(pool: &Pool, comment_id: i64, delta: i32) -> Result<Option<i32>> {
  apply_rating_delta(pool, RatedTable::Comments, comment_id, delta)
}

pub fn like_comment(pool: &Pool, comment_id: i64) -> Result<Option<i32>> {
  add_to_comment_rating(pool, comment_id, 1)
}

pub fn dislike_comment(pool: &Pool, comment_id: i64) -> Result<Option<i32>> {
  add_to_comment_rating(pool, comment_id, -1)
}
