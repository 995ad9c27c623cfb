//! Sensitive-data redaction for captured payloads
//!
//! Masks quoted values whose key looks secret-shaped before anything is
//! persisted. Deliberately conservative: over-masking (e.g. a key merely
//! ending in "key") is acceptable, a missed secret is not. Review the
//! pattern when new sensitive field names appear.
//!
//! The scan is purely textual. Structured payloads are not parsed, so a
//! secret value containing a quote character can escape the match. Known
//! limitation, kept in favor of never failing on malformed input.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Replacement token for masked values.
pub const MASK_TOKEN: &str = "***MASKED***";

static SENSITIVE_VALUE: OnceLock<Regex> = OnceLock::new();

fn sensitive_value() -> &'static Regex {
    SENSITIVE_VALUE.get_or_init(|| {
        Regex::new(
            r#"(?i)(["']?\w*(?:password|token|authorization|secret|key)["']?\s*:\s*)["'][^"']*["']"#,
        )
        .expect("sensitive-value pattern is valid")
    })
}

/// Mask secret-shaped values in a textual payload.
///
/// Idempotent: redacting an already-redacted payload returns it unchanged.
pub fn redact(payload: &str) -> Cow<'_, str> {
    sensitive_value().replace_all(payload, format!("${{1}}\"{MASK_TOKEN}\""))
}
