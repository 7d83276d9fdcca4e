use std::sync::LazyLock;

use regex::Regex;

/// Words (with inner apostrophes) and single punctuation marks.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[[:alpha:]]+(?:'[[:alpha:]]+)*|[.!?;,:]").expect("token pattern is valid")
});

/// Splits raw text into lowercase word and punctuation tokens.
///
/// Anything else (digits, quotes, dashes, brackets) is dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN.find_iter(&lower).map(|m| m.as_str().to_owned()).collect()
}
