//! Evernote account linking over OAuth 1.0a
//!
//! Provides:
//! - The provider seam and the reqwest-backed Evernote implementation (`client`)
//! - Request/authorize/access operations used by the redirect handler (`flow`)
//! - One-shot storage of authorizations awaiting their callback (`sessions`)

pub mod client;
pub mod flow;
pub mod sessions;

pub use client::EvernoteOAuthClient;
pub use flow::{
    callback_key, complete_authorization, get_access_token, get_oauth_data, start_authorization,
    LinkedAccount, OAuthData,
};
pub use sessions::{PendingAuthorization, PendingAuthorizations};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
pub(crate) mod mock;

/// Consumer credentials of one access type plus the target environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConsumer {
    pub key: String,
    pub secret: String,
    pub sandbox: bool,
}

/// Temporary credentials issued by the request-token step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

/// OAuth 1.0a service provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Obtain temporary credentials bound to `callback_url`.
    async fn get_request_token(
        &self,
        consumer: &OAuthConsumer,
        callback_url: &str,
    ) -> Result<RequestToken>;

    /// URL the user opens to grant access.
    fn get_authorize_url(&self, consumer: &OAuthConsumer, token: &RequestToken) -> Result<String>;

    /// Exchange verified temporary credentials for an access token.
    async fn get_access_token(
        &self,
        consumer: &OAuthConsumer,
        oauth_token: &str,
        oauth_token_secret: &str,
        verifier: &str,
    ) -> Result<String>;
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("no consumer credentials configured for access type '{0}'")]
    UnknownAccessType(String),

    #[error("no pending authorization for callback key {0}")]
    SessionNotFound(String),

    /// The user declined on the Evernote authorization page
    #[error("access was not granted")]
    AccessDenied,

    #[error("evernote oauth error: {message}")]
    Api {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl OAuthError {
    fn api(message: &str, source: anyhow::Error) -> Self {
        Self::Api {
            message: message.to_string(),
            source: source.into(),
        }
    }
}
