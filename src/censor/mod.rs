/*
 * Profanity filter for submitted text.
 * Text is split on anything that isn't a word
 * character and every token is compared to the
 * blocklist. Only exact token matches count, so
 * "матрас" is fine even though "мат" is blocked.
 */

use std::collections::HashSet;
use std::fs;
use regex::Regex;
use lazy_static::lazy_static;
use color_eyre::Result;
use eyre::WrapErr;
use derive_more::Display;
use log::{debug, info};

// Words refused at field level even when no blocklist
// file has been loaded.
pub const BUILTIN_CENSORED_WORDS: [&'static str; 3] = ["мат", "шах", "бокс"];

#[derive(Debug, Display, PartialEq)]
pub enum ValidationError {
  #[display(fmt = "\"{}\" is a censored word", _0)]
  CensoredWord(String)
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Default)]
pub struct Blocklist {
  words: HashSet<String>
}

impl Blocklist {

  pub fn builtin() -> Self {
    Self::from_words(BUILTIN_CENSORED_WORDS.iter().copied())
  }

  pub fn from_words<I, S>(words: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>
  {
    Self {
      words: words.into_iter().map(Into::into).collect()
    }
  }

  // One word per line. Lines are trimmed, blank ones
  // are skipped.
  pub fn parse(contents: &str) -> Self {
    Self::from_words(
      contents.lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
    )
  }

  // Meant to be called once at startup, the result is
  // shared by every worker afterwards.
  pub fn open(path: &str) -> Result<Self> {
    let contents = fs::read_to_string(path)
      .with_context(|| format!("Could not read blocklist file {}", path))?;
    let blocklist = Self::parse(&contents);
    info!("Loaded {} censored words from {}", blocklist.len(), path);
    Ok(blocklist)
  }

  pub fn merge(mut self, other: Blocklist) -> Self {
    self.words.extend(other.words);
    self
  }

  pub fn contains(&self, word: &str) -> bool {
    self.words.contains(word)
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn validate(&self, text: &str) -> Result<(), ValidationError> {
    validate(text, self)
  }
}

// Tokens in the order they appear in the text.
// No case folding: "Мат" and "мат" are different tokens.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
  lazy_static! {
    static ref NON_WORD_REGEX: Regex = Regex::new(r"[^\w]+").unwrap();
  }
  NON_WORD_REGEX.split(text).filter(|t| !t.is_empty())
}

pub fn first_censored_word<'a>(text: &'a str, blocklist: &Blocklist) -> Option<&'a str> {
  tokens(text).find(|t| blocklist.contains(t))
}

pub fn is_clean(text: &str, blocklist: &Blocklist) -> bool {
  first_censored_word(text, blocklist).is_none()
}

pub fn validate(text: &str, blocklist: &Blocklist) -> Result<(), ValidationError> {
  match first_censored_word(text, blocklist) {
    Some(word) => {
      debug!("Rejected text containing censored word {}", word);
      Err(ValidationError::CensoredWord(word.to_string()))
    },
    None => Ok(())
  }
}
