use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Server settings, read from the environment (and `.env` if present).
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub banned_words: Vec<String>,
    pub message_fresh_for: Duration,
    pub cleanup_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let stripe_secret_key = std::env::var("STRIPE_SECRET_KEY").unwrap_or_default();
        if stripe_secret_key.trim().is_empty() {
            bail!("STRIPE_SECRET_KEY is not set");
        }

        let mut banned_words = std::env::var("SOAPBOX_BANNED_WORDS")
            .map(|list| parse_inline_list(&list))
            .unwrap_or_default();
        if let Ok(path) = std::env::var("SOAPBOX_BANNED_WORDS_FILE") {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read banned words file '{}'", path))?;
            banned_words.extend(parse_word_file(&contents));
        }

        Ok(Self {
            host: std::env::var("SOAPBOX_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("SOAPBOX_PORT", 3000)?,
            db_path: std::env::var("SOAPBOX_DB_PATH")
                .unwrap_or_else(|_| "soapbox.db".into())
                .into(),
            stripe_secret_key,
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.into()),
            banned_words,
            message_fresh_for: Duration::from_secs(env_parse("SOAPBOX_MESSAGE_FRESH_SECS", 30)?),
            cleanup_interval: Duration::from_secs(env_parse("SOAPBOX_CLEANUP_INTERVAL_SECS", 3600)?),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_path", &self.db_path)
            .field("stripe_secret_key", &"[redacted]")
            .field("stripe_api_base", &self.stripe_api_base)
            .field("banned_words", &self.banned_words.len())
            .field("message_fresh_for", &self.message_fresh_for)
            .field("cleanup_interval", &self.cleanup_interval)
            .finish()
    }
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

/// `"spam, scam,,eggs"` -> `["spam", "scam", "eggs"]`
fn parse_inline_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// One word per line; blank lines and `#` comments are skipped.
fn parse_word_file(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty() && !w.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_list_skips_blanks() {
        assert_eq!(parse_inline_list("spam, scam,,eggs ,"), vec!["spam", "scam", "eggs"]);
        assert!(parse_inline_list("").is_empty());
    }

    #[test]
    fn word_file_skips_comments() {
        let contents = "# moderation list\nbadword1\n\n  badword2  \n# end\n";
        assert_eq!(parse_word_file(contents), vec!["badword1", "badword2"]);
    }

    #[test]
    fn debug_output_hides_stripe_key() {
        let config = Config {
            host: "0.0.0.0".into(),
            port: 3000,
            db_path: "soapbox.db".into(),
            stripe_secret_key: "sk_live_do_not_log".into(),
            stripe_api_base: DEFAULT_STRIPE_API_BASE.into(),
            banned_words: vec!["badword1".into()],
            message_fresh_for: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(3600),
        };

        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk_live_do_not_log"), "{}", printed);
        assert!(printed.contains("[redacted]"));
        assert!(printed.contains("api.stripe.com"));
    }
}
