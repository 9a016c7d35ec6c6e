use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

/// Redacts credentials from text before it is logged or surfaced in errors.
#[derive(Clone)]
pub struct SecretScrubber {
    google_key_pattern: Regex,
    private_key_pattern: Regex,
    field_pattern: Regex,
    query_key_pattern: Regex,
    bearer_pattern: Regex,
}

static SHARED: LazyLock<SecretScrubber> = LazyLock::new(SecretScrubber::new);

impl SecretScrubber {
    pub fn new() -> Self {
        Self {
            // Google API keys: AIza followed by 35 key characters
            google_key_pattern: Regex::new(r"AIza[0-9A-Za-z_\-]{35}")
                .expect("google key pattern is valid"),
            private_key_pattern: Regex::new(
                r"-----BEGIN [A-Z ]*PRIVATE KEY-----[\s\S]*?-----END [A-Z ]*PRIVATE KEY-----",
            )
            .expect("private key pattern is valid"),
            field_pattern: Regex::new(
                r#"(["']?(?:api_key|apikey|api-key|private_key|token|secret)["']?\s*[:=]\s*)["']?[A-Za-z0-9\-_\.]{16,}["']?"#,
            )
            .expect("field pattern is valid"),
            query_key_pattern: Regex::new(r"([?&]key=)[^&\s]+").expect("query key pattern is valid"),
            bearer_pattern: Regex::new(r"Bearer\s+[A-Za-z0-9\-_\.]+").expect("bearer pattern is valid"),
        }
    }

    /// Process-wide instance.
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Replace every recognised secret in `message`.
    pub fn scrub(&self, message: &str) -> String {
        let scrubbed = self
            .private_key_pattern
            .replace_all(message, "[PRIVATE_KEY_REDACTED]");
        let scrubbed = self
            .google_key_pattern
            .replace_all(&scrubbed, "[API_KEY_REDACTED]");
        let scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]");
        let scrubbed = self
            .query_key_pattern
            .replace_all(&scrubbed, "${1}[REDACTED]");
        self.field_pattern
            .replace_all(&scrubbed, |caps: &Captures| format!("{}[REDACTED]", &caps[1]))
            .into_owned()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}

/// Scrub with the shared instance.
pub fn scrub(message: &str) -> String {
    SecretScrubber::shared().scrub(message)
}

/// Masked form of a key for display: first four characters and the length.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}... ({} chars)", key.chars().count())
}
