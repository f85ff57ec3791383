use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub token_expiry: u64, // 24 hours
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        Self::new(secret, Self::expiry_from_env())
    }

    pub fn new(secret: String, token_expiry: u64) -> Result<Self> {
        if secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters"
            ));
        }

        Ok(Self {
            secret,
            token_expiry,
        })
    }

    fn expiry_from_env() -> u64 {
        env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        assert!(JwtConfig::new("too_short".to_string(), 60).is_err());
    }

    #[test]
    fn long_secret_is_accepted() {
        let config =
            JwtConfig::new("a_very_long_secret_key_that_is_at_least_32_chars".to_string(), 60)
                .unwrap();
        assert_eq!(config.token_expiry, 60);
    }
}
