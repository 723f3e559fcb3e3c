//! Cheap syntactic URL check run before any network I/O.
//!
//! Advisory only: a string that passes can still fail at fetch time.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*$",
    )
    .expect("Failed to compile URL pattern")
});

pub fn is_valid_url(url: &str) -> bool {
    URL_PATTERN.is_match(url)
}
