// Everything in here counts chars and not bytes.
// String::truncate panics when the cut lands in the
// middle of a multibyte char, which happens a lot
// with cyrillic text.

pub fn preview(text: &str, max_chars: usize) -> String {
  let mut preview: String = text.chars().take(max_chars).collect();
  preview.push_str("...");
  preview
}

// Truncate in place to at most max_chars chars.
pub fn truncate_utf8(s: &mut String, max_chars: usize) {
  if let Some((idx, _)) = s.char_indices().nth(max_chars) {
    s.truncate(idx);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preview_always_appends_ellipsis() {
    assert_eq!("hello...", preview("hello", 124));
    assert_eq!("...", preview("", 124));
  }

  #[test]
  fn preview_counts_chars_not_bytes() {
    assert_eq!("приве...", preview("привет мир", 5));
  }

  #[test]
  fn truncate_utf8_on_multibyte_boundary() {
    let mut sut = String::from("шахматы");
    truncate_utf8(&mut sut, 3);
    assert_eq!("шах", sut);
  }

  #[test]
  fn truncate_utf8_shorter_string_untouched() {
    let mut sut = String::from("бокс");
    truncate_utf8(&mut sut, 10);
    assert_eq!("бокс", sut);
  }
}
