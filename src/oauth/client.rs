//! Evernote OAuth 1.0a client.
//!
//! Requests are signed with HMAC-SHA1 and sent as query parameters:
//! - request token and access token: `GET {base}/oauth`
//! - user authorization: `{base}/OAuth.action?oauth_token=…`

use super::{OAuthConsumer, OAuthProvider, RequestToken};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::HashMap;
use uuid::Uuid;

const PRODUCTION_URL: &str = "https://www.evernote.com";
const SANDBOX_URL: &str = "https://sandbox.evernote.com";

pub struct EvernoteOAuthClient {
    http_client: reqwest::Client,
    /// Replaces both production and sandbox hosts when set
    base_url: Option<String>,
}

impl Default for EvernoteOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EvernoteOAuthClient {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: None,
        }
    }

    /// Point every request at `base_url` instead of the Evernote hosts.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
        }
    }

    fn base_url(&self, sandbox: bool) -> &str {
        match (&self.base_url, sandbox) {
            (Some(url), _) => url.as_str(),
            (None, true) => SANDBOX_URL,
            (None, false) => PRODUCTION_URL,
        }
    }

    /// Send a signed GET to the `/oauth` endpoint and parse the form-encoded reply.
    async fn signed_request(
        &self,
        consumer: &OAuthConsumer,
        mut params: Vec<(String, String)>,
        token_secret: &str,
    ) -> Result<HashMap<String, String>> {
        let url = format!("{}/oauth", self.base_url(consumer.sandbox));

        params.extend([
            ("oauth_consumer_key".to_string(), consumer.key.clone()),
            ("oauth_nonce".to_string(), Uuid::new_v4().simple().to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            (
                "oauth_timestamp".to_string(),
                chrono::Utc::now().timestamp().to_string(),
            ),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]);
        let signature = sign("GET", &url, &params, &consumer.secret, token_secret)?;
        params.push(("oauth_signature".to_string(), signature));

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let response = self
            .http_client
            .get(format!("{url}?{query}"))
            .send()
            .await
            .context("Failed to reach Evernote OAuth endpoint")?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read Evernote OAuth response")?;
        if !status.is_success() {
            bail!("Evernote OAuth endpoint returned {}: {}", status, body);
        }
        Ok(parse_form(&body))
    }
}

#[async_trait]
impl OAuthProvider for EvernoteOAuthClient {
    async fn get_request_token(
        &self,
        consumer: &OAuthConsumer,
        callback_url: &str,
    ) -> Result<RequestToken> {
        let reply = self
            .signed_request(
                consumer,
                vec![("oauth_callback".to_string(), callback_url.to_string())],
                "",
            )
            .await?;
        tracing::debug!(sandbox = consumer.sandbox, "Obtained OAuth request token");
        Ok(RequestToken {
            oauth_token: field(&reply, "oauth_token")?,
            oauth_token_secret: field(&reply, "oauth_token_secret")?,
        })
    }

    fn get_authorize_url(&self, consumer: &OAuthConsumer, token: &RequestToken) -> Result<String> {
        if token.oauth_token.is_empty() {
            bail!("Cannot build authorize URL without an oauth_token");
        }
        Ok(format!(
            "{}/OAuth.action?oauth_token={}",
            self.base_url(consumer.sandbox),
            urlencoding::encode(&token.oauth_token)
        ))
    }

    async fn get_access_token(
        &self,
        consumer: &OAuthConsumer,
        oauth_token: &str,
        oauth_token_secret: &str,
        verifier: &str,
    ) -> Result<String> {
        let reply = self
            .signed_request(
                consumer,
                vec![
                    ("oauth_token".to_string(), oauth_token.to_string()),
                    ("oauth_verifier".to_string(), verifier.to_string()),
                ],
                oauth_token_secret,
            )
            .await?;
        tracing::debug!(
            shard = reply.get("edam_shard").map(String::as_str).unwrap_or(""),
            "Obtained OAuth access token"
        );
        field(&reply, "oauth_token")
    }
}

/// HMAC-SHA1 signature of a request, base64 encoded.
fn sign(
    method: &str,
    url: &str,
    params: &[(String, String)],
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (urlencoding::encode(k).into_owned(), urlencoding::encode(v).into_owned()))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method,
        urlencoding::encode(url),
        urlencoding::encode(&param_string)
    );
    let signing_key = format!(
        "{}&{}",
        urlencoding::encode(consumer_secret),
        urlencoding::encode(token_secret)
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(signing_key.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid OAuth signing key: {e}"))?;
    mac.update(base_string.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Parse an `application/x-www-form-urlencoded` body.
fn parse_form(body: &str) -> HashMap<String, String> {
    body.trim()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(raw)
}

fn field(reply: &HashMap<String, String>, name: &str) -> Result<String> {
    reply
        .get(name)
        .cloned()
        .with_context(|| format!("Evernote OAuth response is missing {name}"))
}
