// Adding the context method to errors:
use eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::convert::From;

#[derive(Debug, Deserialize)]
pub struct Config {
  pub db_path: String,
  pub bind_address: String,
  pub pool_size: u32,
  // Newline-delimited list of censored words,
  // loaded once when the server starts.
  pub blocklist_path: String,
  // Every new user ends up in that group:
  pub default_group: String,
  // Used to generate absolute post URLs:
  pub site_root: String,
  pub site_posts_root: String
}

// Only the bits handlers need to build links,
// the rest of the config stays out of the app state.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
  pub root: String,
  pub posts_root: String
}

impl From<Config> for SiteInfo {
  fn from(config: Config) -> Self {
    Self {
      root: config.site_root,
      posts_root: config.site_posts_root
    }
  }
}

impl Config {

  pub fn from_env() -> Result<Config> {
    // Keys are lowercase versions of the environment
    // variables (DB_PATH -> db_path).
    // There is no default for db_path on purpose.
    config::Config::builder()
      .set_default("bind_address", "127.0.0.1:8080")?
      .set_default("pool_size", 8)?
      .set_default("blocklist_path", "./resources/bad_words.txt")?
      .set_default("default_group", "common")?
      // Should never have a trailing slash or THINGS WILL BREAK.
      .set_default("site_root", "http://localhost:8080")?
      .set_default("site_posts_root", "news")?
      .add_source(config::Environment::default().try_parsing(true))
      .build()
      .context("Reading configuration sources")?
      .try_deserialize()
      .context("Loading configuration from env")
  }

}
