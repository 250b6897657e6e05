//! PII-safe formatting for log fields.
//!
//! Emails keep their first character and domain; long opaque runs (session
//! tokens, JWT segments, hashes) are replaced wholesale.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
});

// JWTs are dot-separated base64url segments; each segment is caught on its own.
static OPAQUE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\b[A-Za-z0-9+/_-]{20,}={0,2}").unwrap()
});

/// Redacts emails and opaque tokens from a string.
pub fn redact(input: &str) -> String {
    let emails_masked = EMAIL.replace_all(input, |caps: &regex::Captures| {
        let found = &caps[0];
        match found.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                format!("{}***@{domain}", &local[..1])
            }
            _ => found.to_string(),
        }
    });

    OPAQUE_TOKEN
        .replace_all(&emails_masked, "[REDACTED_TOKEN]")
        .into_owned()
}

/// Wrapper that redacts its contents whenever it is formatted.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_email_local_part() {
        assert_eq!(redact("ada@example.com"), "a***@example.com");
        assert_eq!(
            redact("from ada@example.com to bob@test.org"),
            "from a***@example.com to b***@test.org"
        );
    }

    #[test]
    fn masks_session_tokens() {
        assert_eq!(
            redact("token eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"),
            "token [REDACTED_TOKEN]"
        );
        assert_eq!(redact("short123"), "short123");
    }

    #[test]
    fn wrapper_redacts_in_display_and_debug() {
        let r = Redacted("grace@example.org");
        assert_eq!(format!("{r}"), "g***@example.org");
        assert_eq!(format!("{r:?}"), "g***@example.org");
    }
}
