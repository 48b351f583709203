use secrecy::{ExposeSecret, SecretString};

use super::AccessToken;

/// Environment variable holding the HMRC client id.
pub const ENV_UK_CLIENT_ID: &str = "VATCHECK_UK_CLIENT_ID";
/// Environment variable holding the HMRC client secret.
pub const ENV_UK_CLIENT_SECRET: &str = "VATCHECK_UK_CLIENT_SECRET";
/// Environment variable selecting the HMRC test environment (`1`/`true`).
pub const ENV_UK_TEST: &str = "VATCHECK_UK_TEST";

const HMRC_DOMAIN: &str = "api.service.hmrc.gov.uk";

/// HMRC API environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Live service.
    #[default]
    Production,
    /// HMRC sandbox, reached through the `test-` host prefix.
    Test,
}

impl Environment {
    /// Base URL of the HMRC API for this environment.
    pub fn hmrc_base_url(self) -> String {
        match self {
            Self::Production => format!("https://{HMRC_DOMAIN}"),
            Self::Test => format!("https://test-{HMRC_DOMAIN}"),
        }
    }

    pub fn is_test(self) -> bool {
        self == Self::Test
    }
}

/// Per-call validation options.
///
/// Validation never mutates the options it is given: a token refreshed during
/// a call comes back in [`ExistenceCheck::refreshed_token`](crate::ExistenceCheck::refreshed_token).
#[derive(Debug, Clone, Default)]
pub struct ValidatorOptions {
    /// HMRC OAuth client id.
    pub uk_client_id: Option<String>,
    /// HMRC OAuth client secret.
    pub uk_client_secret: Option<SecretString>,
    /// Previously obtained token, reused while it is not expired.
    pub uk_access_token: Option<AccessToken>,
    /// HMRC environment the token and lookups target.
    pub environment: Environment,
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read client credentials and environment from `VATCHECK_UK_*`
    /// variables. Missing variables leave the field unset.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        let environment = match var(ENV_UK_TEST).as_deref().map(str::to_ascii_lowercase) {
            Some(v) if v == "1" || v == "true" || v == "yes" => Environment::Test,
            _ => Environment::Production,
        };
        Self {
            uk_client_id: var(ENV_UK_CLIENT_ID),
            uk_client_secret: var(ENV_UK_CLIENT_SECRET).map(SecretString::new),
            uk_access_token: None,
            environment,
        }
    }

    pub fn with_uk_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.uk_client_id = Some(client_id.into());
        self.uk_client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    pub fn with_uk_access_token(mut self, token: AccessToken) -> Self {
        self.uk_access_token = Some(token);
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Client id and secret, if both are configured and non-empty.
    pub(crate) fn uk_credentials(&self) -> Option<(&str, &str)> {
        let id = self.uk_client_id.as_deref().filter(|s| !s.is_empty())?;
        let secret = self
            .uk_client_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|s| !s.is_empty())?;
        Some((id, secret))
    }
}
