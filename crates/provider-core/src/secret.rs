use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Per-run credential that identifies this provider to the work broker.
///
/// Generated once at startup, sent to the directory at registration and
/// echoed in every work poll. The broker uses it to route analysis jobs
/// back to the process that registered.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSecret(String);

impl ProviderSecret {
    /// Generate a fresh secret from 32 bytes of OS entropy.
    pub fn generate() -> Self {
        use rand::Rng;
        let mut bytes = [0u8; 32];
        rand::rng().fill(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// The URL-safe base64 form carried in request bodies.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the secret out of debug output and logs.
impl fmt::Debug for ProviderSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderSecret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secret_is_43_url_safe_chars() {
        let secret = ProviderSecret::generate();
        assert_eq!(secret.as_str().len(), 43);
        assert!(
            secret
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "unexpected character in secret: {}",
            secret.as_str()
        );
    }

    #[test]
    fn secrets_are_unique_per_generation() {
        assert_ne!(ProviderSecret::generate(), ProviderSecret::generate());
    }

    #[test]
    fn debug_output_is_redacted() {
        let secret = ProviderSecret::generate();
        assert_eq!(format!("{secret:?}"), "ProviderSecret(..)");
    }
}
