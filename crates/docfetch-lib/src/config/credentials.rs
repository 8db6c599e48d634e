use std::fmt::{Debug, Formatter};

pub const ACCOUNT_ENV_VAR: &str = "EMAIL";
pub const SECRET_ENV_VAR: &str = "PASSWORD";

#[derive(Clone, Default)]
pub struct Credentials {
    pub account: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(account: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            secret: secret.into(),
        }
    }

    /// Reads `EMAIL` and `PASSWORD`, after loading a `.env` file if one exists. Missing values
    /// are left empty and surface later as a login failure.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let read = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", name);
                String::new()
            })
        };

        Self {
            account: read(ACCOUNT_ENV_VAR),
            secret: read(SECRET_ENV_VAR),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .finish()
    }
}
