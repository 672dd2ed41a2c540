use super::entities::*;
use rusqlite::{Row, Error};

// Column order has to match the SELECT lists
// used in the query modules.

pub fn map_user(row: &Row) -> Result<User, Error> {
  Ok(User {
    id: row.get(0)?,
    username: row.get(1)?,
    email: row.get(2)?,
    date_joined: row.get(3)?
  })
}

pub fn map_group(row: &Row) -> Result<Group, Error> {
  Ok(Group {
    id: row.get(0)?,
    name: row.get(1)?
  })
}

pub fn map_author(row: &Row) -> Result<Author, Error> {
  Ok(Author {
    id: row.get(0)?,
    user_id: row.get(1)?,
    username: row.get(2)?,
    rating_author: row.get(3)?
  })
}

pub fn map_category(row: &Row) -> Result<Category, Error> {
  Ok(Category {
    id: row.get(0)?,
    category_name: row.get(1)?
  })
}

pub fn map_post_category(row: &Row) -> Result<PostCategory, Error> {
  Ok(PostCategory {
    id: row.get(0)?,
    post_id: row.get(1)?,
    category_id: row.get(2)?
  })
}

// Categories are fetched separately.
pub fn map_post(row: &Row) -> Result<Post, Error> {
  Ok(Post {
    id: row.get(0)?,
    author_id: row.get(1)?,
    category_type: row.get(2)?,
    date_creation: row.get(3)?,
    title: row.get(4)?,
    text: row.get(5)?,
    rating: row.get(6)?,
    categories: Vec::new()
  })
}

pub fn map_comment(row: &Row) -> Result<Comment, Error> {
  Ok(Comment {
    id: row.get(0)?,
    post_id: row.get(1)?,
    user_id: row.get(2)?,
    username: row.get(3)?,
    text: row.get(4)?,
    date_creation: row.get(5)?,
    rating: row.get(6)?
  })
}
