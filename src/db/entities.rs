use serde::{Deserialize, Serialize};
use std::fmt;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use crate::utils::text_utils;

// Plain datatypes that map straight onto the SQLite
// rows. DTOs for the API live in app::dtos.

// Length of the text excerpt shown by Post::preview:
pub const PREVIEW_LENGTH: usize = 124;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  pub date_joined: i64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
  pub id: i64,
  pub user_id: i64,
  // Joined from the users table, never written:
  pub username: String,
  // Cached aggregate, may be stale until the next
  // call to update_rating.
  pub rating_author: i32
}

impl fmt::Display for Author {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.username)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
  pub id: i64,
  pub category_name: String
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.category_name)
  }
}

// Stored as the two-letter codes the site has
// always used.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PostType {
  Article,
  News
}

impl PostType {
  pub fn code(&self) -> &'static str {
    match self {
      PostType::Article => "AR",
      PostType::News => "NW"
    }
  }

  pub fn from_code(code: &str) -> Option<PostType> {
    match code {
      "AR" => Some(PostType::Article),
      "NW" => Some(PostType::News),
      _ => None
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      PostType::Article => "Статья",
      PostType::News => "Новость"
    }
  }
}

impl Default for PostType {
  fn default() -> Self {
    PostType::Article
  }
}

impl ToSql for PostType {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(ToSqlOutput::from(self.code()))
  }
}

impl FromSql for PostType {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    let code = value.as_str()?;
    PostType::from_code(code).ok_or(FromSqlError::InvalidType)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub id: i64,
  pub author_id: i64,
  pub category_type: PostType,
  pub date_creation: i64,
  pub title: String,
  pub text: String,
  pub rating: i32,
  pub categories: Vec<Category>
}

impl Post {
  // Character based so multibyte text never gets
  // cut in the middle of a char.
  pub fn preview(&self) -> String {
    text_utils::preview(&self.text, PREVIEW_LENGTH)
  }

  pub fn absolute_url(&self, site_root: &str, posts_root: &str) -> String {
    format!("{}/{}/{}", site_root, posts_root, self.id)
  }
}

impl fmt::Display for Post {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.title, self.preview())
  }
}

// What gets submitted to create a post. The rating
// is not part of it: new posts always start at 0.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub author_id: i64,
  pub category_type: PostType,
  pub title: String,
  pub text: String,
  pub category_ids: Vec<i64>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCategory {
  pub id: i64,
  pub post_id: i64,
  pub category_id: i64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id: i64,
  pub post_id: i64,
  pub user_id: i64,
  // Joined from the users table:
  pub username: String,
  pub text: String,
  pub date_creation: i64,
  pub rating: i32
}

impl fmt::Display for Comment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.username)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
  pub id: i64,
  pub name: String
}
