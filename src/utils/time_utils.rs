use chrono::{Local, TimeZone};

// Very specific date format the site has always been using: dd/MM/yyyy HH:mm:ssZ
// chrono formatting reference:
// https://docs.rs/chrono/latest/chrono/format/strftime/index.html
const DATE_FORMAT_STANDARD: &'static str = "%d/%m/%Y %k:%M:%S%:z";

pub fn timestamp_to_date_string(timestamp: i64) -> String {
  match Local.timestamp_opt(timestamp, 0).single() {
    Some(d) => d.format(DATE_FORMAT_STANDARD).to_string(),
    None => String::new()
  }
}

pub fn current_timestamp() -> i64 {
  Local::now().timestamp()
}
