use serde::{Deserialize, Serialize};
use derive_more::Display;
use crate::config::SiteInfo;
use crate::db::entities::*;
use crate::utils::time_utils;

// Entities are converted to DTOs with From (or a
// constructor when site info is needed) so the JSON
// shape stays independent from the tables.

pub use crate::db::entities::Category as CategoryDto;

/* --- Request bodies --- */
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPostForm {
  pub author_id: i64,
  // "AR" or "NW", defaults to an article.
  pub category_type: Option<String>,
  pub title: String,
  pub text: String,
  pub categories: Option<Vec<i64>>
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentForm {
  pub user_id: i64,
  pub text: String
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupForm {
  pub username: String,
  pub email: Option<String>
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthorForm {
  pub user_id: i64
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewCategoryForm {
  pub name: String
}
/* --- End request bodies --- */

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
  pub id: i64,
  pub author_id: i64,
  pub category_type: String,
  pub category_type_label: String,
  pub date: String,
  pub title: String,
  pub text: String,
  pub preview: String,
  pub rating: i32,
  pub url: String,
  pub categories: Vec<CategoryDto>
}

impl PostDto {
  pub fn new(post: Post, site_info: &SiteInfo) -> Self {
    Self {
      url: post.absolute_url(&site_info.root, &site_info.posts_root),
      preview: post.preview(),
      id: post.id,
      author_id: post.author_id,
      category_type: post.category_type.code().to_string(),
      category_type_label: post.category_type.label().to_string(),
      date: time_utils::timestamp_to_date_string(post.date_creation),
      title: post.title,
      text: post.text,
      rating: post.rating,
      categories: post.categories
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
  pub id: i64,
  pub post_id: i64,
  pub user_id: i64,
  pub username: String,
  pub text: String,
  pub date: String,
  pub rating: i32
}

impl From<Comment> for CommentDto {
  fn from(comment: Comment) -> Self {
    Self {
      id: comment.id,
      post_id: comment.post_id,
      user_id: comment.user_id,
      username: comment.username,
      text: comment.text,
      date: time_utils::timestamp_to_date_string(comment.date_creation),
      rating: comment.rating
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
  pub id: i64,
  pub user_id: i64,
  pub username: String,
  pub rating_author: i32
}

impl From<Author> for AuthorDto {
  fn from(author: Author) -> Self {
    Self {
      id: author.id,
      user_id: author.user_id,
      username: author.username,
      rating_author: author.rating_author
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
  pub id: i64,
  pub username: String,
  pub email: String,
  pub date_joined: String
}

impl From<User> for UserDto {
  fn from(user: User) -> Self {
    Self {
      id: user.id,
      username: user.username,
      email: user.email,
      date_joined: time_utils::timestamp_to_date_string(user.date_joined)
    }
  }
}

// Answer to like/dislike calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct RatingDto {
  pub id: i64,
  pub rating: i32
}

#[derive(Debug, Deserialize, Serialize)]
pub struct JsonStatus {
  pub status: String,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>
}

#[derive(Debug, Display)]
pub enum JsonStatusType {
  #[display(fmt = "success")]
  Success,
  #[display(fmt = "not found")]
  NotFound
}

impl JsonStatus {
  pub fn new_with_id(
    status: JsonStatusType,
    message: &str,
    id: i64
  ) -> Self {
    Self {
      status: status.to_string(),
      message: String::from(message),
      id: Some(id)
    }
  }
}
