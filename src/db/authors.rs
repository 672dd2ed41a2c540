use rusqlite::{params, OptionalExtension, TransactionBehavior};
use std::convert::TryFrom;
use eyre::{WrapErr, eyre};
use color_eyre::Result;
use log::debug;
use super::entities::*;
use super::mappers::map_author;
use super::{Pool, select_many, select_one};

// Posts weigh three times as much as comments.
pub const POST_RATING_WEIGHT: i64 = 3;

const AUTHOR_SELECT: &'static str =
  "SELECT authors.id, authors.user_id, users.username, authors.rating_author \
  FROM authors JOIN users ON users.id = authors.user_id";

pub fn create_author(pool: &Pool, user_id: i64) -> Result<Author> {
  {
    let conn = pool.get()?;
    conn.execute(
      "INSERT INTO authors (user_id) VALUES (?)",
      params![user_id]
    ).with_context(|| format!("Creating author profile for user {}", user_id))?;
  }
  author_by_user_id(pool, user_id)?
    .ok_or_else(|| eyre!("Author for user {} missing after insert", user_id))
}

pub fn author_by_id(pool: &Pool, id: i64) -> Result<Option<Author>> {
  select_one(
    pool,
    &format!("{} WHERE authors.id = ?", AUTHOR_SELECT),
    params![id],
    map_author
  )
}

pub fn author_by_user_id(pool: &Pool, user_id: i64) -> Result<Option<Author>> {
  select_one(
    pool,
    &format!("{} WHERE authors.user_id = ?", AUTHOR_SELECT),
    params![user_id],
    map_author
  )
}

pub fn all_authors(pool: &Pool) -> Result<Vec<Author>> {
  select_many(
    pool,
    &format!("{} ORDER BY users.username ASC", AUTHOR_SELECT),
    [],
    map_author
  )
}

pub fn aggregate_rating(
  post_rating_sum: i64,
  own_comment_rating_sum: i64,
  received_comment_rating_sum: i64
) -> i64 {
  POST_RATING_WEIGHT * post_rating_sum
    + own_comment_rating_sum
    + received_comment_rating_sum
}

// Recompute and store rating_author. The three sums are
// read in one query and written back in the same
// transaction, any error leaves the stored value as it
// was. Callers re-read the author to get the new value.
// The write lock is taken upfront, a deferred transaction
// can't be upgraded while another connection commits a
// like and SQLite gives up without waiting.
pub fn update_rating(pool: &Pool, author_id: i64) -> Result<()> {
  let mut conn = pool.get()?;
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let sums: Option<(i64, i64, i64)> = tx.query_row(
    "SELECT \
      (SELECT COALESCE(SUM(posts.rating), 0) FROM posts \
        WHERE posts.author_id = authors.id), \
      (SELECT COALESCE(SUM(comments.rating), 0) FROM comments \
        WHERE comments.user_id = authors.user_id), \
      (SELECT COALESCE(SUM(comments.rating), 0) FROM comments \
        JOIN posts ON posts.id = comments.post_id \
        WHERE posts.author_id = authors.id) \
    FROM authors WHERE authors.id = ?",
    params![author_id],
    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?))
  ).optional()?;
  let (post_sum, own_sum, received_sum) = sums
    .ok_or_else(|| eyre!("Author {} does not exist", author_id))?;
  let rating = i32::try_from(aggregate_rating(post_sum, own_sum, received_sum))
    .with_context(|| format!("Rating of author {} is out of range", author_id))?;
  debug!(
    "Author {}: posts {}, own comments {}, comments received {} -> {}",
    author_id, post_sum, own_sum, received_sum, rating
  );
  tx.execute(
    "UPDATE authors SET rating_author = ? WHERE id = ?",
    params![rating, author_id]
  )?;
  tx.commit()
    .with_context(|| format!("Storing rating of author {}", author_id))
}

// Returns how many authors were updated.
pub fn update_all_ratings(pool: &Pool) -> Result<usize> {
  let ids: Vec<i64> = select_many(
    pool,
    "SELECT id FROM authors ORDER BY id ASC",
    [],
    |row| row.get(0)
  )?;
  for id in ids.iter() {
    update_rating(pool, *id)?;
  }
  Ok(ids.len())
}
