//! Recording mock implementation of OAuthProvider for testing without Evernote.

use super::{OAuthConsumer, OAuthProvider, RequestToken};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Returns fixed tokens and records every call's arguments.
#[derive(Default)]
pub struct MockOAuthProvider {
    pub request_token_calls: Mutex<Vec<(OAuthConsumer, String)>>,
    pub authorize_calls: Mutex<Vec<RequestToken>>,
    pub access_token_calls: Mutex<Vec<(OAuthConsumer, String, String, String)>>,
    pub fail_request_token: Option<String>,
    pub fail_authorize_url: Option<String>,
}

impl MockOAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OAuthProvider for MockOAuthProvider {
    async fn get_request_token(
        &self,
        consumer: &OAuthConsumer,
        callback_url: &str,
    ) -> Result<RequestToken> {
        self.request_token_calls
            .lock()
            .unwrap()
            .push((consumer.clone(), callback_url.to_string()));
        if let Some(message) = &self.fail_request_token {
            bail!("{}", message);
        }
        Ok(RequestToken {
            oauth_token: "test_oauth_token".to_string(),
            oauth_token_secret: "test_oauth_secret".to_string(),
        })
    }

    fn get_authorize_url(&self, _consumer: &OAuthConsumer, token: &RequestToken) -> Result<String> {
        self.authorize_calls.lock().unwrap().push(token.clone());
        if let Some(message) = &self.fail_authorize_url {
            bail!("{}", message);
        }
        Ok("auth_url".to_string())
    }

    async fn get_access_token(
        &self,
        consumer: &OAuthConsumer,
        oauth_token: &str,
        oauth_token_secret: &str,
        verifier: &str,
    ) -> Result<String> {
        self.access_token_calls.lock().unwrap().push((
            consumer.clone(),
            oauth_token.to_string(),
            oauth_token_secret.to_string(),
            verifier.to_string(),
        ));
        Ok("access_token".to_string())
    }
}
