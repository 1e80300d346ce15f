//! Google OAuth client.
//!
//! Implements the authorization-code flow: building the authorization URL,
//! exchanging the callback code for tokens, and resolving the signed-in
//! Google account via the userinfo endpoint.

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use crate::config::GoogleOAuthConfig;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors from the Google OAuth flow.
#[derive(Debug, thiserror::Error)]
pub enum GoogleAuthError {
    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token endpoint rejected the exchange.
    #[error("token exchange rejected: {0}")]
    TokenExchange(String),

    /// Userinfo response was missing a required claim.
    #[error("userinfo missing claim: {0}")]
    MissingClaim(&'static str),
}

/// The Google account behind a completed OAuth flow.
#[derive(Debug, Clone)]
pub struct GoogleUser {
    /// Stable Google subject identifier.
    pub sub: String,
    /// Account email.
    pub email: String,
    /// Display name, when Google provides one.
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

/// Client for Google's OAuth endpoints.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    /// Build the authorization URL the browser is redirected to.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{AUTHORIZATION_ENDPOINT}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code and resolve the Google account.
    ///
    /// # Errors
    ///
    /// Returns `GoogleAuthError` if the exchange fails or the userinfo
    /// response lacks an email claim.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleUser, GoogleAuthError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::TokenExchange(format!("{status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        self.fetch_user(&token.access_token).await
    }

    /// Resolve the account behind an access token.
    async fn fetch_user(&self, access_token: &str) -> Result<GoogleUser, GoogleAuthError> {
        let info: UserinfoResponse = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = info.email.ok_or(GoogleAuthError::MissingClaim("email"))?;

        Ok(GoogleUser {
            sub: info.sub,
            email,
            name: info.name,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let client = GoogleOAuthClient::new(&GoogleOAuthConfig {
            client_id: "client-123".to_owned(),
            client_secret: SecretString::from("shhh"),
        });

        let url = client.authorization_url("https://admin.example.com/auth/google/callback", "st4te");
        assert!(url.starts_with(AUTHORIZATION_ENDPOINT));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fadmin.example.com%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=st4te"));
    }
}
