use actix_web::{
  web,
  HttpResponse,
  Result
};
use crate::db::entities::*;
use crate::db;
use crate::utils::text_utils;
use log::info;
use super::dtos::*;
use super::error::{Error, map_db_error};
use super::AppState;

// Module with all the API handler functions.
// Database calls are synchronous and short, they run
// straight on the worker thread.

const MAX_USERNAME_LENGTH: usize = 150;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_COMMENT_LENGTH: usize = 2000;

pub async fn index() -> HttpResponse {
  HttpResponse::Ok().body("Nothing here")
}

// Default response when no route matched the request:
pub async fn not_found() -> Result<HttpResponse, Error> {
  Err(Error::NotFound(String::from("Endpoint doesn't exist")))
}

/* --- Categories --- */

pub async fn categories(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let categories = db::all_categories(&app_state.pool)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(categories))
}

// A duplicate name is whatever SQLite says it is, it
// ends up as a database error.
pub async fn create_category(
  app_state: web::Data<AppState>,
  form: web::Json<NewCategoryForm>
) -> Result<HttpResponse, Error> {
  let name = form.name.trim();
  if name.is_empty() {
    return Err(Error::BadRequest(String::from("Category name cannot be empty")));
  }
  let category: CategoryDto = db::create_category(&app_state.pool, name)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(category))
}

pub async fn delete_category(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  let deleted = db::delete_category(&app_state.pool, id)
    .map_err(map_db_error)?;
  Ok(deletion_response(deleted, "Category", id))
}

/* --- Posts --- */

pub async fn post(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  match db::post_by_id(&app_state.pool, id).map_err(map_db_error)? {
    Some(post) => Ok(HttpResponse::Ok().json(PostDto::new(post, &app_state.site_info))),
    None => Err(Error::NotFound("Post does not exist".to_string()))
  }
}

pub async fn submit_post(
  app_state: web::Data<AppState>,
  form: web::Json<NewPostForm>
) -> Result<HttpResponse, Error> {
  let form = form.into_inner();
  let category_type = match &form.category_type {
    Some(code) => PostType::from_code(code)
      .ok_or_else(|| Error::BadRequest(format!("Unknown post type {}", code)))?,
    None => PostType::default()
  };
  if db::author_by_id(&app_state.pool, form.author_id).map_err(map_db_error)?.is_none() {
    return Err(Error::NotFound("Author does not exist".to_string()));
  }
  let new_post = NewPost {
    author_id: form.author_id,
    category_type,
    title: form.title,
    text: form.text,
    category_ids: form.categories.unwrap_or_default()
  };
  let post = db::submit_post(&app_state.pool, &app_state.blocklist, &new_post)?;
  Ok(HttpResponse::Created().json(PostDto::new(post, &app_state.site_info)))
}

pub async fn delete_post(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  let deleted = db::delete_post(&app_state.pool, id)
    .map_err(map_db_error)?;
  Ok(deletion_response(deleted, "Post", id))
}

pub async fn like_post(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  rating_response(id, db::like_post(&app_state.pool, id), "Post")
}

pub async fn dislike_post(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  rating_response(id, db::dislike_post(&app_state.pool, id), "Post")
}

/* --- Comments --- */

pub async fn comments_for_post(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let post_id = path.into_inner().0;
  let comments: Vec<CommentDto> = db::comments_for_post(&app_state.pool, post_id)
    .map_err(map_db_error)?
    .into_iter()
    .map(CommentDto::from)
    .collect();
  Ok(HttpResponse::Ok().json(comments))
}

pub async fn submit_comment(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>,
  form: web::Json<NewCommentForm>
) -> Result<HttpResponse, Error> {
  let post_id = path.into_inner().0;
  let mut form = form.into_inner();
  // Chars, not bytes, see text_utils.
  text_utils::truncate_utf8(&mut form.text, MAX_COMMENT_LENGTH);
  if form.text.trim().is_empty() {
    return Err(Error::BadRequest(String::from("Comment cannot be empty")));
  }
  if db::post_by_id(&app_state.pool, post_id).map_err(map_db_error)?.is_none() {
    return Err(Error::NotFound("Post does not exist".to_string()));
  }
  if db::user_by_id(&app_state.pool, form.user_id).map_err(map_db_error)?.is_none() {
    return Err(Error::NotFound("User does not exist".to_string()));
  }
  let comment = db::submit_comment(
    &app_state.pool,
    &app_state.blocklist,
    post_id,
    form.user_id,
    &form.text
  )?;
  Ok(HttpResponse::Created().json(CommentDto::from(comment)))
}

pub async fn like_comment(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  rating_response(id, db::like_comment(&app_state.pool, id), "Comment")
}

pub async fn dislike_comment(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  rating_response(id, db::dislike_comment(&app_state.pool, id), "Comment")
}

/* --- Users and authors --- */

pub async fn signup(
  app_state: web::Data<AppState>,
  form: web::Json<SignupForm>
) -> Result<HttpResponse, Error> {
  let mut form = form.into_inner();
  text_utils::truncate_utf8(&mut form.username, MAX_USERNAME_LENGTH);
  let username = form.username.trim();
  if username.is_empty() {
    return Err(Error::BadRequest(String::from("Username cannot be empty")));
  }
  let mut email = form.email.unwrap_or_default();
  text_utils::truncate_utf8(&mut email, MAX_EMAIL_LENGTH);
  let user = db::signup(
    &app_state.pool,
    username,
    email.trim(),
    &app_state.default_group
  ).map_err(map_db_error)?;
  info!("New user registered: {}", user.username);
  Ok(HttpResponse::Created().json(UserDto::from(user)))
}

pub async fn create_author(
  app_state: web::Data<AppState>,
  form: web::Json<NewAuthorForm>
) -> Result<HttpResponse, Error> {
  let user_id = form.user_id;
  if db::user_by_id(&app_state.pool, user_id).map_err(map_db_error)?.is_none() {
    return Err(Error::NotFound("User does not exist".to_string()));
  }
  let author = db::create_author(&app_state.pool, user_id)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(AuthorDto::from(author)))
}

// Sorted by username, ratings as last recomputed.
pub async fn authors(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let authors: Vec<AuthorDto> = db::all_authors(&app_state.pool)
    .map_err(map_db_error)?
    .into_iter()
    .map(AuthorDto::from)
    .collect();
  Ok(HttpResponse::Ok().json(authors))
}

// The rating shown here is whatever was computed last.
pub async fn author(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  match db::author_by_id(&app_state.pool, id).map_err(map_db_error)? {
    Some(author) => Ok(HttpResponse::Ok().json(AuthorDto::from(author))),
    None => Err(Error::NotFound("Author does not exist".to_string()))
  }
}

pub async fn author_posts(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  let posts: Vec<PostDto> = db::posts_by_author(&app_state.pool, id)
    .map_err(map_db_error)?
    .into_iter()
    .map(|p| PostDto::new(p, &app_state.site_info))
    .collect();
  Ok(HttpResponse::Ok().json(posts))
}

// update_rating only stores the value, the author is
// read again to answer.
pub async fn update_author_rating(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  if db::author_by_id(&app_state.pool, id).map_err(map_db_error)?.is_none() {
    return Err(Error::NotFound("Author does not exist".to_string()));
  }
  db::update_rating(&app_state.pool, id).map_err(map_db_error)?;
  match db::author_by_id(&app_state.pool, id).map_err(map_db_error)? {
    Some(author) => Ok(HttpResponse::Ok().json(AuthorDto::from(author))),
    None => Err(Error::NotFound("Author does not exist".to_string()))
  }
}

/* --- Helpers --- */

fn rating_response(
  id: i64,
  rating: color_eyre::Result<Option<i32>>,
  what: &str
) -> Result<HttpResponse, Error> {
  match rating.map_err(map_db_error)? {
    Some(rating) => Ok(HttpResponse::Ok().json(RatingDto { id, rating })),
    None => Err(Error::NotFound(format!("{} does not exist", what)))
  }
}

fn deletion_response(deleted: bool, what: &str, id: i64) -> HttpResponse {
  if deleted {
    HttpResponse::Ok().json(
      JsonStatus::new_with_id(JsonStatusType::Success, &format!("{} deleted", what), id)
    )
  } else {
    HttpResponse::NotFound().json(
      JsonStatus::new_with_id(JsonStatusType::NotFound, &format!("{} does not exist", what), id)
    )
  }
}
