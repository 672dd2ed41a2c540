use rusqlite::params;
use eyre::{Report, WrapErr, eyre};
use color_eyre::Result;
use derive_more::Display;
use log::{debug, info};
use crate::censor::{Blocklist, ValidationError};
use crate::utils::time_utils::current_timestamp;
use super::entities::*;
use super::mappers::map_post;
use super::categories::categories_for_post;
use super::{Pool, RatedTable, apply_rating_delta, select_many, select_one};

pub const MAX_TITLE_LENGTH: usize = 128;

const POST_FIELDS: &'static str =
  "id, author_id, category_type, date_creation, title, text, rating";

// Everything that can go wrong when someone submits
// a post (or a comment).
#[derive(Debug, Display)]
pub enum SubmitError {
  #[display(fmt = "{}", _0)]
  Invalid(ValidationError),
  #[display(fmt = "Title is longer than {} characters", _0)]
  TitleTooLong(usize),
  #[display(fmt = "Database error: {}", _0)]
  Database(Report)
}

impl std::error::Error for SubmitError {}

impl From<ValidationError> for SubmitError {
  fn from(error: ValidationError) -> Self {
    SubmitError::Invalid(error)
  }
}

impl From<Report> for SubmitError {
  fn from(report: Report) -> Self {
    SubmitError::Database(report)
  }
}

// Title and text both go through the censor before
// anything touches the database.
pub fn validate_new_post(new_post: &NewPost, blocklist: &Blocklist) -> Result<(), SubmitError> {
  if new_post.title.chars().count() > MAX_TITLE_LENGTH {
    return Err(SubmitError::TitleTooLong(MAX_TITLE_LENGTH));
  }
  blocklist.validate(&new_post.title)?;
  blocklist.validate(&new_post.text)?;
  Ok(())
}

pub fn submit_post(
  pool: &Pool,
  blocklist: &Blocklist,
  new_post: &NewPost
) -> Result<Post, SubmitError> {
  validate_new_post(new_post, blocklist)?;
  let post = insert_post(pool, new_post)?;
  info!("Author {} published post {}", post.author_id, post.id);
  Ok(post)
}

// Inserts the post and its category links in a single
// transaction. No validation in here, use submit_post.
pub fn insert_post(pool: &Pool, new_post: &NewPost) -> Result<Post> {
  let post_id = {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    tx.execute(
      "INSERT INTO posts (author_id, category_type, date_creation, title, text) \
      VALUES (?, ?, ?, ?, ?)",
      params![
        new_post.author_id,
        new_post.category_type,
        current_timestamp(),
        new_post.title,
        new_post.text
      ]
    ).context("Inserting post")?;
    let post_id = tx.last_insert_rowid();
    {
      let mut stmt = tx.prepare(
        "INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?, ?)"
      )?;
      for category_id in new_post.category_ids.iter() {
        stmt.execute(params![post_id, category_id])
          .with_context(|| format!("Linking post to category {}", category_id))?;
      }
    }
    tx.commit()?;
    post_id
  };
  debug!("Inserted post {}", post_id);
  post_by_id(pool, post_id)?
    .ok_or_else(|| eyre!("Post {} missing after insert", post_id))
}

pub fn post_by_id(pool: &Pool, id: i64) -> Result<Option<Post>> {
  let post = select_one(
    pool,
    &format!("SELECT {} FROM posts WHERE id = ?", POST_FIELDS),
    params![id],
    map_post
  )?;
  match post {
    Some(mut post) => {
      post.categories = categories_for_post(pool, post.id)?;
      Ok(Some(post))
    },
    None => Ok(None)
  }
}

pub fn posts_by_author(pool: &Pool, author_id: i64) -> Result<Vec<Post>> {
  let mut posts = select_many(
    pool,
    &format!(
      "SELECT {} FROM posts WHERE author_id = ? ORDER BY date_creation DESC, id DESC",
      POST_FIELDS
    ),
    params![author_id],
    map_post
  )?;
  for post in posts.iter_mut() {
    post.categories = categories_for_post(pool, post.id)?;
  }
  Ok(posts)
}

// Comments and category links are cascaded.
pub fn delete_post(pool: &Pool, id: i64) -> Result<bool> {
  let conn = pool.get()?;
  let deleted = conn.execute("DELETE FROM posts WHERE id = ?", params![id])?;
  Ok(deleted > 0)
}

pub fn add_to_post_rating(pool: &Pool, post_id: i64, delta: i32) -> Result<Option<i32>> {
  apply_rating_delta(pool, RatedTable::Posts, post_id, delta)
}

pub fn like_post(pool: &Pool, post_id: i64) -> Result<Option<i32>> {
  add_to_post_rating(pool, post_id, 1)
}

pub fn dislike_post(pool: &Pool, post_id: i64) -> Result<Option<i32>> {
  add_to_post_rating(pool, post_id, -1)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{self, test_pool, file_test_pool};
  use std::thread;

  fn author_id(pool: &Pool) -> i64 {
    let user = db::create_user(pool, "writer", "").unwrap();
    db::create_author(pool, user.id).unwrap().id
  }

  fn new_post(author_id: i64, title: &str, text: &str, category_ids: Vec<i64>) -> NewPost {
    NewPost {
      author_id,
      category_type: PostType::News,
      title: title.to_string(),
      text: text.to_string(),
      category_ids
    }
  }

  #[test]
  fn submitted_post_starts_at_zero_with_categories() {
    let pool = test_pool();
    let author_id = author_id(&pool);
    let sport = db::create_category(&pool, "Sport").unwrap();
    let tech = db::create_category(&pool, "Tech").unwrap();
    let post = submit_post(
      &pool,
      &Blocklist::builtin(),
      &new_post(author_id, "Матч", "Новый матрас для чемпиона", vec![tech.id, sport.id])
    ).unwrap();
    assert_eq!(0, post.rating);
    assert_eq!(PostType::News, post.category_type);
    assert!(post.date_creation > 0);
    assert_eq!(vec![sport, tech], post.categories);
  }

  #[test]
  fn censored_text_is_not_persisted() {
    let pool = test_pool();
    let author_id = author_id(&pool);
    let result = submit_post(
      &pool,
      &Blocklist::builtin(),
      &new_post(author_id, "Заголовок", "Это был мат.", Vec::new())
    );
    match result {
      Err(SubmitError::Invalid(ValidationError::CensoredWord(word))) =>
        assert_eq!("мат", word),
      other => panic!("Expected a validation error, got {:?}", other)
    }
    assert!(posts_by_author(&pool, author_id).unwrap().is_empty());
  }

  #[test]
  fn censored_title_is_rejected() {
    let pool = test_pool();
    let author_id = author_id(&pool);
    let result = submit_post(
      &pool,
      &Blocklist::builtin(),
      &new_post(author_id, "бокс", "", Vec::new())
    );
    assert!(matches!(result, Err(SubmitError::Invalid(_))));
  }

  #[test]
  fn title_too_long_is_rejected() {
    let blocklist = Blocklist::builtin();
    let post = new_post(1, &"я".repeat(129), "", Vec::new());
    assert!(matches!(
      validate_new_post(&post, &blocklist),
      Err(SubmitError::TitleTooLong(128))
    ));
    let post = new_post(1, &"я".repeat(128), "", Vec::new());
    assert!(validate_new_post(&post, &blocklist).is_ok());
  }

  #[test]
  fn unknown_author_is_a_database_error() {
    let pool = test_pool();
    let result = submit_post(
      &pool,
      &Blocklist::builtin(),
      &new_post(12, "Title", "Text", Vec::new())
    );
    assert!(matches!(result, Err(SubmitError::Database(_))));
  }

  #[test]
  fn like_then_dislike_returns_to_zero() {
    let pool = test_pool();
    let author_id = author_id(&pool);
    let post = insert_post(&pool, &new_post(author_id, "T", "", Vec::new())).unwrap();
    assert_eq!(Some(1), like_post(&pool, post.id).unwrap());
    assert_eq!(Some(0), dislike_post(&pool, post.id).unwrap());
    assert_eq!(0, post_by_id(&pool, post.id).unwrap().unwrap().rating);
  }

  #[test]
  fn rating_can_go_negative() {
    let pool = test_pool();
    let author_id = author_id(&pool);
    let post = insert_post(&pool, &new_post(author_id, "T", "", Vec::new())).unwrap();
    dislike_post(&pool, post.id).unwrap();
    assert_eq!(Some(-2), dislike_post(&pool, post.id).unwrap());
  }

  #[test]
  fn concurrent_likes_are_all_counted() {
    let (_dir, pool) = file_test_pool(4);
    let author_id = author_id(&pool);
    let post = insert_post(&pool, &new_post(author_id, "T", "", Vec::new())).unwrap();
    let post_id = post.id;
    let workers: Vec<_> = (0..4).map(|_| {
      let pool = pool.clone();
      thread::spawn(move || {
        for _ in 0..250 {
          like_post(&pool, post_id).unwrap();
        }
      })
    }).collect();
    for worker in workers {
      worker.join().unwrap();
    }
    assert_eq!(1000, post_by_id(&pool, post_id).unwrap().unwrap().rating);
  }

  #[test]
  fn like_missing_post() {
    let pool = test_pool();
    assert_eq!(None, like_post(&pool, 77).unwrap());
  }

  #[test]
  fn deleting_category_drops_links_only() {
    let pool = test_pool();
    let author_id = author_id(&pool);
    let sport = db::create_category(&pool, "Sport").unwrap();
    let post = insert_post(&pool, &new_post(author_id, "T", "", vec![sport.id])).unwrap();
    assert!(db::delete_category(&pool, sport.id).unwrap());
    assert!(db::post_category_links(&pool, sport.id).unwrap().is_empty());
    let post = post_by_id(&pool, post.id).unwrap().unwrap();
    assert!(post.categories.is_empty());
  }

  #[test]
  fn deleting_post_drops_links_and_comments() {
    let pool = test_pool();
    let author_id = author_id(&pool);
    let sport = db::create_category(&pool, "Sport").unwrap();
    let post = insert_post(&pool, &new_post(author_id, "T", "", vec![sport.id])).unwrap();
    let reader = db::create_user(&pool, "reader", "").unwrap();
    db::insert_comment(&pool, post.id, reader.id, "hi").unwrap();
    assert_eq!(1, db::post_category_links(&pool, sport.id).unwrap().len());
    assert!(delete_post(&pool, post.id).unwrap());
    assert!(db::post_category_links(&pool, sport.id).unwrap().is_empty());
    assert!(db::comments_for_post(&pool, post.id).unwrap().is_empty());
    assert_eq!(1, db::all_categories(&pool).unwrap().len());
  }

  #[test]
  fn deleting_user_cascades_to_posts() {
    let pool = test_pool();
    let author_id = author_id(&pool);
    let post = insert_post(&pool, &new_post(author_id, "T", "", Vec::new())).unwrap();
    let user = db::user_by_username(&pool, "writer").unwrap().unwrap();
    db::delete_user(&pool, user.id).unwrap();
    assert!(post_by_id(&pool, post.id).unwrap().is_none());
    assert!(db::author_by_id(&pool, author_id).unwrap().is_none());
  }
}
