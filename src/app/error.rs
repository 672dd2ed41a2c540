use actix_web::{
  error::ResponseError,
  http::StatusCode,
  HttpResponse
};
use derive_more::Display;
use eyre::Report;
use log::{error, warn};
use crate::db::SubmitError;

// The full error output only goes to the logs, clients
// get a short plain text message.
#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "Database Error")]
  DatabaseError(String),
  #[display(fmt = "Not Found: {}", _0)]
  NotFound(String),
  #[display(fmt = "Bad Request: {}", _0)]
  BadRequest(String)
}

impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST
    }
  }

  fn error_response(&self) -> HttpResponse {
    HttpResponse::build(self.status_code()).body(self.to_string())
  }
}

pub fn map_db_error(e: Report) -> Error {
  error!("Database error - {:?}", e);
  Error::DatabaseError(e.to_string())
}

impl From<SubmitError> for Error {
  fn from(e: SubmitError) -> Self {
    match e {
      SubmitError::Database(report) => map_db_error(report),
      invalid => {
        warn!("Refused submission - {}", invalid);
        Error::BadRequest(invalid.to_string())
      }
    }
  }
}
