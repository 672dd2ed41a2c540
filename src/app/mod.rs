use actix_web::{middleware, web, App, HttpServer};
use color_eyre::Result;
use eyre::WrapErr;
use log::{debug, info};
// Have to add crate here because of the other crate
// named "config" that we use as a dependency.
use crate::config::{Config, SiteInfo};
use crate::censor::Blocklist;
use crate::db::{self, Pool};
mod handlers;
mod dtos;
mod error;

// Declare app state struct:
pub struct AppState {
  pub pool: Pool,
  // Built-in words plus the blocklist file, loaded once
  // at startup and only read afterwards.
  pub blocklist: Blocklist,
  pub default_group: String,
  pub site_info: SiteInfo
}

// Has to be async because of the .await at the end,
// main.rs runs it inside #[actix_web::main].
pub async fn run() -> Result<()> {
  let config = Config::from_env()?;
  debug!("Current config: {:?}", config);
  let pool = db::open_pool(&config.db_path, config.pool_size)?;
  db::init_schema(&pool)?;

  let blocklist = Blocklist::builtin()
    .merge(Blocklist::open(&config.blocklist_path)?);

  // Got to save these for later because "config" gets
  // moved into app_state as SiteInfo.
  let bind_address = config.bind_address.clone();
  let default_group = config.default_group.clone();

  let app_state = web::Data::new(
    AppState {
      pool,
      blocklist,
      default_group,
      site_info: config.into()
    }
  );

  info!("Listening on {}", bind_address);
  HttpServer::new(move|| {
    App::new()
      .app_data(app_state.clone())
      .app_data(web::PathConfig::default().error_handler(|_, _| {
        actix_web::error::ErrorBadRequest("Invalid path arguments")
      }))
      .app_data(web::JsonConfig::default().error_handler(|err, _| {
        actix_web::error::ErrorBadRequest(format!("Invalid request body - {}", err))
      }))
      .wrap(middleware::Logger::default())
      .configure(base_endpoints_config)
      .default_service(web::route().to(handlers::not_found))
  })
  .bind(bind_address)?
  .run()
  .await
  .context("Start Actix web server")
}

// Route configuration:
fn base_endpoints_config(cfg: &mut web::ServiceConfig) {
  cfg.route("/", web::get().to(handlers::index))
    .route("/categories", web::get().to(handlers::categories))
    .route("/categories", web::post().to(handlers::create_category))
    .route("/categories/{id}", web::delete().to(handlers::delete_category))
    .route("/posts", web::post().to(handlers::submit_post))
    .route("/posts/{id}", web::get().to(handlers::post))
    .route("/posts/{id}", web::delete().to(handlers::delete_post))
    .route("/posts/{id}/like", web::post().to(handlers::like_post))
    .route("/posts/{id}/dislike", web::post().to(handlers::dislike_post))
    .route("/posts/{id}/comments", web::get().to(handlers::comments_for_post))
    .route("/posts/{id}/comments", web::post().to(handlers::submit_comment))
    .route("/comments/{id}/like", web::post().to(handlers::like_comment))
    .route("/comments/{id}/dislike", web::post().to(handlers::dislike_comment))
    .route("/signup", web::post().to(handlers::signup))
    .route("/authors", web::get().to(handlers::authors))
    .route("/authors", web::post().to(handlers::create_author))
    .route("/authors/{id}", web::get().to(handlers::author))
    .route("/authors/{id}/posts", web::get().to(handlers::author_posts))
    .route("/authors/{id}/update-rating", web::post().to(handlers::update_author_rating));
}

#[cfg(test)]
mod tests {
  use super::*;
  use super::dtos::*;
  use actix_web::{http::StatusCode, test};
  use serde_json::json;

  fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState {
      pool: db::test_pool(),
      blocklist: Blocklist::builtin().merge(Blocklist::from_words(vec!["дурак"])),
      default_group: db::DEFAULT_GROUP.to_string(),
      site_info: SiteInfo {
        root: "https://news.example".to_string(),
        posts_root: "news".to_string()
      }
    })
  }

  // Returns the author id.
  fn seed_author(state: &AppState) -> i64 {
    let user = db::signup(&state.pool, "writer", "", &state.default_group).unwrap();
    db::create_author(&state.pool, user.id).unwrap().id
  }

  #[actix_web::test]
  async fn submit_post_then_like_and_dislike() {
    let state = test_state();
    let author_id = seed_author(&state);
    let app = test::init_service(
      App::new().app_data(state.clone()).configure(base_endpoints_config)
    ).await;

    let req = test::TestRequest::post()
      .uri("/posts")
      .set_json(json!({
        "authorId": author_id,
        "categoryType": "NW",
        "title": "Новости",
        "text": "Купили матрас"
      }))
      .to_request();
    let post: PostDto = test::call_and_read_body_json(&app, req).await;
    assert_eq!(0, post.rating);
    assert_eq!(format!("https://news.example/news/{}", post.id), post.url);

    let req = test::TestRequest::post()
      .uri(&format!("/posts/{}/like", post.id))
      .to_request();
    let rating: RatingDto = test::call_and_read_body_json(&app, req).await;
    assert_eq!(1, rating.rating);

    let req = test::TestRequest::post()
      .uri(&format!("/posts/{}/dislike", post.id))
      .to_request();
    let rating: RatingDto = test::call_and_read_body_json(&app, req).await;
    assert_eq!(0, rating.rating);
  }

  #[actix_web::test]
  async fn censored_post_is_a_bad_request() {
    let state = test_state();
    let author_id = seed_author(&state);
    let app = test::init_service(
      App::new().app_data(state.clone()).configure(base_endpoints_config)
    ).await;

    let req = test::TestRequest::post()
      .uri("/posts")
      .set_json(json!({
        "authorId": author_id,
        "title": "Заголовок",
        "text": "Какой дурак это писал"
      }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::BAD_REQUEST, resp.status());
    assert!(db::posts_by_author(&state.pool, author_id).unwrap().is_empty());
  }

  #[actix_web::test]
  async fn update_rating_returns_fresh_author() {
    let state = test_state();
    let author_id = seed_author(&state);
    let post = db::insert_post(&state.pool, &db::entities::NewPost {
      author_id,
      category_type: db::entities::PostType::Article,
      title: "T".to_string(),
      text: "".to_string(),
      category_ids: Vec::new()
    }).unwrap();
    db::add_to_post_rating(&state.pool, post.id, 2).unwrap();
    let app = test::init_service(
      App::new().app_data(state.clone()).configure(base_endpoints_config)
    ).await;

    let req = test::TestRequest::post()
      .uri(&format!("/authors/{}/update-rating", author_id))
      .to_request();
    let author: AuthorDto = test::call_and_read_body_json(&app, req).await;
    assert_eq!(6, author.rating_author);
  }

  #[actix_web::test]
  async fn signup_puts_user_in_default_group() {
    let state = test_state();
    let app = test::init_service(
      App::new().app_data(state.clone()).configure(base_endpoints_config)
    ).await;

    let req = test::TestRequest::post()
      .uri("/signup")
      .set_json(json!({ "username": "  reader  " }))
      .to_request();
    let user: UserDto = test::call_and_read_body_json(&app, req).await;
    assert_eq!("reader", user.username);
    assert_eq!(
      1,
      db::membership_count(&state.pool, user.id, db::DEFAULT_GROUP).unwrap()
    );
  }

  #[actix_web::test]
  async fn missing_post_is_not_found() {
    let state = test_state();
    let app = test::init_service(
      App::new().app_data(state.clone()).configure(base_endpoints_config)
    ).await;

    let req = test::TestRequest::post().uri("/posts/99/like").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());

    let req = test::TestRequest::get().uri("/posts/99").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
  }

  #[actix_web::test]
  async fn duplicate_category_is_propagated_as_database_error() {
    let state = test_state();
    let app = test::init_service(
      App::new().app_data(state.clone()).configure(base_endpoints_config)
    ).await;

    let req = test::TestRequest::post()
      .uri("/categories")
      .set_json(json!({ "name": "Sport" }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::CREATED, resp.status());

    let req = test::TestRequest::post()
      .uri("/categories")
      .set_json(json!({ "name": "Sport" }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, resp.status());
  }

  #[actix_web::test]
  async fn unknown_author_or_user_is_not_found() {
    let state = test_state();
    let author_id = seed_author(&state);
    let app = test::init_service(
      App::new().app_data(state.clone()).configure(base_endpoints_config)
    ).await;

    let req = test::TestRequest::post()
      .uri("/posts")
      .set_json(json!({ "authorId": 404, "title": "Title", "text": "Text" }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());

    let post = db::insert_post(&state.pool, &db::entities::NewPost {
      author_id,
      category_type: db::entities::PostType::News,
      title: "T".to_string(),
      text: "".to_string(),
      category_ids: Vec::new()
    }).unwrap();
    let req = test::TestRequest::post()
      .uri(&format!("/posts/{}/comments", post.id))
      .set_json(json!({ "userId": 404, "text": "Привет" }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
    assert!(db::comments_for_post(&state.pool, post.id).unwrap().is_empty());
  }

  #[actix_web::test]
  async fn authors_are_listed_by_username() {
    let state = test_state();
    seed_author(&state);
    let user = db::create_user(&state.pool, "columnist", "").unwrap();
    db::create_author(&state.pool, user.id).unwrap();
    let app = test::init_service(
      App::new().app_data(state.clone()).configure(base_endpoints_config)
    ).await;

    let req = test::TestRequest::get().uri("/authors").to_request();
    let authors: Vec<AuthorDto> = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = authors.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(vec!["columnist", "writer"], names);
  }
}
