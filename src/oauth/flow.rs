//! OAuth operations called by the redirect handler and the CLI.

use super::{
    OAuthConsumer, OAuthError, OAuthProvider, PendingAuthorization, PendingAuthorizations,
    RequestToken,
};
use crate::Config;
use serde::Serialize;
use sha1::{Digest, Sha1};

/// Access type used when the caller does not name one.
pub const DEFAULT_ACCESS: &str = "basic";

/// Pending authorizations older than this are dropped when a new one starts.
pub const PENDING_AUTHORIZATION_TTL_SECS: i64 = 3600;

/// Everything the bot needs to send a user to the Evernote authorize page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuthData {
    pub callback_key: String,
    pub oauth_token: String,
    pub oauth_token_secret: String,
    pub oauth_url: String,
}

/// A user whose Evernote account has been linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccount {
    pub user_id: i64,
    pub session_key: String,
    pub access_type: String,
    pub access_token: String,
}

/// `hex(sha1(key + secret + user_id))`
pub fn callback_key(key: &str, secret: &str, user_id: i64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.update(user_id.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

fn callback_url(host: &str, access: &str, callback_key: &str, session_key: &str) -> String {
    format!(
        "https://{host}/evernote/oauth?access={}&key={}&session_key={}",
        urlencoding::encode(access),
        urlencoding::encode(callback_key),
        urlencoding::encode(session_key)
    )
}

fn consumer(config: &Config, access: &str) -> Result<OAuthConsumer, OAuthError> {
    let credentials = config
        .access_credentials(access)
        .ok_or_else(|| OAuthError::UnknownAccessType(access.to_string()))?;
    Ok(OAuthConsumer {
        key: credentials.key.clone(),
        secret: credentials.secret.clone(),
        sandbox: config.sandbox,
    })
}

/// Obtain a request token and the URL the user must open to grant access.
pub async fn get_oauth_data(
    provider: &dyn OAuthProvider,
    user_id: i64,
    session_key: &str,
    config: &Config,
    access: Option<&str>,
) -> Result<OAuthData, OAuthError> {
    let access = access.unwrap_or(DEFAULT_ACCESS);
    let consumer = consumer(config, access)?;
    let callback_key = callback_key(&consumer.key, &consumer.secret, user_id);
    let url = callback_url(&config.host, access, &callback_key, session_key);

    let token = provider
        .get_request_token(&consumer, &url)
        .await
        .map_err(|e| OAuthError::api("Failed to obtain request token", e))?;
    let oauth_url = provider
        .get_authorize_url(&consumer, &token)
        .map_err(|e| OAuthError::api("Failed to build authorize URL", e))?;

    tracing::info!(user_id, access, "Issued OAuth request token");
    Ok(OAuthData {
        callback_key,
        oauth_token: token.oauth_token,
        oauth_token_secret: token.oauth_token_secret,
        oauth_url,
    })
}

/// Exchange a verified request token for an access token.
pub async fn get_access_token(
    provider: &dyn OAuthProvider,
    api_key: &str,
    api_secret: &str,
    sandbox: bool,
    oauth_token: &str,
    oauth_token_secret: &str,
    oauth_verifier: &str,
) -> Result<String, OAuthError> {
    let consumer = OAuthConsumer {
        key: api_key.to_string(),
        secret: api_secret.to_string(),
        sandbox,
    };
    provider
        .get_access_token(&consumer, oauth_token, oauth_token_secret, oauth_verifier)
        .await
        .map_err(|e| OAuthError::api("Failed to obtain access token", e))
}

/// `get_oauth_data` plus registration of the pending authorization.
///
/// Authorizations older than `PENDING_AUTHORIZATION_TTL_SECS` are purged first.
pub async fn start_authorization(
    provider: &dyn OAuthProvider,
    sessions: &PendingAuthorizations,
    user_id: i64,
    session_key: &str,
    config: &Config,
    access: Option<&str>,
) -> Result<OAuthData, OAuthError> {
    sessions.purge_older_than(chrono::Duration::seconds(PENDING_AUTHORIZATION_TTL_SECS));
    let data = get_oauth_data(provider, user_id, session_key, config, access).await?;
    sessions.insert(PendingAuthorization {
        callback_key: data.callback_key.clone(),
        session_key: session_key.to_string(),
        user_id,
        access_type: access.unwrap_or(DEFAULT_ACCESS).to_string(),
        request_token: RequestToken {
            oauth_token: data.oauth_token.clone(),
            oauth_token_secret: data.oauth_token_secret.clone(),
        },
        created_at: chrono::Utc::now(),
    });
    Ok(data)
}

/// Handle the OAuth redirect for `callback_key`.
///
/// The pending authorization is consumed even when access was denied.
pub async fn complete_authorization(
    provider: &dyn OAuthProvider,
    sessions: &PendingAuthorizations,
    config: &Config,
    callback_key: &str,
    verifier: Option<&str>,
    access: Option<&str>,
) -> Result<LinkedAccount, OAuthError> {
    let pending = sessions
        .take(callback_key)
        .ok_or_else(|| OAuthError::SessionNotFound(callback_key.to_string()))?;

    let Some(verifier) = verifier.filter(|v| !v.is_empty()) else {
        tracing::info!(user_id = pending.user_id, "User declined Evernote access");
        return Err(OAuthError::AccessDenied);
    };

    let access_type = access.unwrap_or(&pending.access_type).to_string();
    let consumer = consumer(config, &access_type)?;
    let access_token = get_access_token(
        provider,
        &consumer.key,
        &consumer.secret,
        consumer.sandbox,
        &pending.request_token.oauth_token,
        &pending.request_token.oauth_token_secret,
        verifier,
    )
    .await?;

    tracing::info!(user_id = pending.user_id, access = %access_type, "Linked Evernote account");
    Ok(LinkedAccount {
        user_id: pending.user_id,
        session_key: pending.session_key,
        access_type,
        access_token,
    })
}
