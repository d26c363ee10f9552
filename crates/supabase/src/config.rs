//! Connection settings for the hosted backend.

use thiserror::Error;
use url::Url;

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";

/// Anon keys are JWTs; anything this short is a placeholder.
const MIN_ANON_KEY_LEN: usize = 51;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("SUPABASE_URL is not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("SUPABASE_URL must use https, got '{0}'")]
    InsecureUrl(String),

    #[error("SUPABASE_ANON_KEY looks malformed (expected more than 50 characters)")]
    InvalidKey,
}

/// Validated project URL and anon key.
#[derive(Clone)]
pub struct SupabaseConfig {
    url: Url,
    anon_key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl SupabaseConfig {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing(SUPABASE_URL_VAR));
        }
        let anon_key = anon_key.trim();
        if anon_key.is_empty() {
            return Err(ConfigError::Missing(SUPABASE_ANON_KEY_VAR));
        }

        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "https" {
            return Err(ConfigError::InsecureUrl(url.to_string()));
        }
        if anon_key.len() < MIN_ANON_KEY_LEN {
            return Err(ConfigError::InvalidKey);
        }

        Ok(Self {
            url: parsed,
            anon_key: anon_key.to_string(),
        })
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY` from the process
    /// environment. Loading `.env` is left to the binary.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(SUPABASE_URL_VAR).unwrap_or_default();
        let anon_key = std::env::var(SUPABASE_ANON_KEY_VAR).unwrap_or_default();
        Self::new(&url, &anon_key)
    }

    /// Project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> String {
        "k".repeat(MIN_ANON_KEY_LEN)
    }

    #[test]
    fn accepts_https_url_and_long_key() {
        let config = SupabaseConfig::new("https://abc.supabase.co/", &key()).unwrap();
        assert_eq!(config.base_url(), "https://abc.supabase.co");
    }

    #[test]
    fn rejects_missing_values() {
        assert_eq!(
            SupabaseConfig::new("", &key()).unwrap_err(),
            ConfigError::Missing(SUPABASE_URL_VAR)
        );
        assert_eq!(
            SupabaseConfig::new("https://abc.supabase.co", " ").unwrap_err(),
            ConfigError::Missing(SUPABASE_ANON_KEY_VAR)
        );
    }

    #[test]
    fn rejects_plain_http() {
        assert!(matches!(
            SupabaseConfig::new("http://abc.supabase.co", &key()),
            Err(ConfigError::InsecureUrl(_))
        ));
    }

    #[test]
    fn rejects_key_of_fifty_characters() {
        assert_eq!(
            SupabaseConfig::new("https://abc.supabase.co", &"k".repeat(50)).unwrap_err(),
            ConfigError::InvalidKey
        );
    }

    #[test]
    fn debug_output_omits_key() {
        let config = SupabaseConfig::new("https://abc.supabase.co", &key()).unwrap();
        assert!(!format!("{:?}", config).contains(&key()));
    }
}
