#![allow(dead_code)]
mod censor;
mod config;
mod db;
mod utils;

use std::env;
use color_eyre::Result;
use eyre::eyre;
use dotenv::dotenv;
use log::info;
use getopts::Options;
use crate::censor::Blocklist;
use crate::config::Config;

// Copy pasted this from getopts doc.
fn print_usage(program: &str, opts: Options) {
  let brief = format!("Usage: {} [options]", program);
  print!("{}", opts.usage(&brief));
}

fn update_ratings(pool: &db::Pool) -> Result<()> {
  let count = db::update_all_ratings(pool)?;
  info!("Recomputed rating of {} authors", count);
  for author in db::all_authors(pool)? {
    println!("{}\t{}", author, author.rating_author);
  }
  Ok(())
}

fn check_text(config: &Config, text: &str) -> Result<()> {
  let blocklist = Blocklist::builtin()
    .merge(Blocklist::open(&config.blocklist_path)?);
  match censor::first_censored_word(text, &blocklist) {
    Some(word) => Err(eyre!("Text is censored because of \"{}\"", word)),
    None => {
      println!("Text is clean");
      Ok(())
    }
  }
}

/**
 * Maintenance binary: schema creation, categories
 * and author rating recomputation.
 */
fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();
  color_eyre::install()?;

  let args: Vec<String> = env::args().collect();
  let program = args[0].clone();
  let mut opts = Options::new();
  opts.optflag("i", "init-db", "Create missing database tables");
  opts.optopt("c", "add-category", "Create a category", "NAME");
  opts.optflag("r", "update-ratings", "Recompute the rating of every author");
  opts.optopt("k", "check", "Check text against the blocklist", "TEXT");
  opts.optflag("h", "help", "Program usage");
  let opt_matches = opts.parse(&args[1..])?;
  if opt_matches.opt_present("h") {
    print_usage(&program, opts);
    return Ok(());
  }

  let config = Config::from_env()?;

  if let Some(text) = opt_matches.opt_str("k") {
    return check_text(&config, &text);
  }

  let pool = db::open_pool(&config.db_path, 1)?;
  let mut did_something = false;
  if opt_matches.opt_present("i") {
    db::init_schema(&pool)?;
    did_something = true;
  }
  if let Some(name) = opt_matches.opt_str("c") {
    let category = db::create_category(&pool, &name)?;
    info!("Created category {} with id {}", category, category.id);
    did_something = true;
  }
  if opt_matches.opt_present("r") {
    update_ratings(&pool)?;
    did_something = true;
  }

  if !did_something {
    print_usage(&program, opts);
  }
  Ok(())
}
