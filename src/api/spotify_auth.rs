use crate::api::pkce::PkcePair;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Authorization-code-with-PKCE helper for Spotify:
/// 1. `AuthStore::begin_authorization` creates a verifier/challenge pair and a
///    random state, and returns the `/authorize` URL to open in a browser.
/// 2. Spotify redirects back with `code` and `state` query parameters.
/// 3. `AuthStore::complete_authorization` checks the state and yields the
///    form fields of the token exchange request (code + verifier).
///
/// Performing the exchange and storing tokens is left to the caller.
pub fn build_authorize_url(
    auth_base: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[String],
    code_challenge: &str,
    state: &str,
    show_dialog: bool,
) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/authorize", auth_base.trim_end_matches('/')))?;
    {
        let mut q = url.query_pairs_mut();
        q.append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("scope", &scopes.join(" "))
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("code_challenge_method", "S256")
            .append_pair("code_challenge", code_challenge)
            .append_pair("state", state);
        if show_dialog {
            q.append_pair("show_dialog", "true");
        }
    }
    Ok(url)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: Option<String>,
}

/// Pull `code` (and `state`) out of the URL Spotify redirected to.
pub fn parse_callback(redirect_url: &str) -> Result<CallbackParams> {
    let parsed = Url::parse(redirect_url.trim())
        .map_err(|e| anyhow!("invalid redirect url: {}", e))?;
    let mut code = None;
    let mut state = None;
    for (k, v) in parsed.query_pairs() {
        match k.as_ref() {
            "error" => return Err(anyhow!("authorization denied: {}", v)),
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            _ => {}
        }
    }
    let code = code.ok_or_else(|| anyhow!("no code in redirect URL"))?;
    Ok(CallbackParams { code, state })
}

/// An authorization attempt waiting for its redirect.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub state: String,
    pub verifier: String,
    pub authorize_url: Url,
}

/// Fields of the `authorization_code` token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExchangeRequest {
    pub code: String,
    pub code_verifier: String,
    pub redirect_uri: String,
    pub client_id: String,
}

impl TokenExchangeRequest {
    pub fn form_params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("grant_type", "authorization_code"),
            ("code", &self.code),
            ("redirect_uri", &self.redirect_uri),
            ("client_id", &self.client_id),
            ("code_verifier", &self.code_verifier),
        ]
    }
}

/// In-memory authentication state. Construct one per session and pass it
/// where it is needed; nothing here is persisted.
#[derive(Debug, Default)]
pub struct AuthStore {
    auth_token: Option<String>,
    current_user: Option<String>,
    pending: Option<PendingAuthorization>,
    redirect_uri: String,
    client_id: String,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt, replacing any attempt still pending.
    pub fn begin_authorization(&mut self, cfg: &Config) -> Result<Url> {
        let pair = PkcePair::generate(cfg.verifier_length)
            .context("generating PKCE verifier")?;
        let state = Uuid::new_v4().simple().to_string();
        let url = build_authorize_url(
            &cfg.auth_base(),
            &cfg.client_id,
            &cfg.redirect_uri,
            &cfg.scopes,
            &pair.challenge,
            &state,
            cfg.show_dialog,
        )?;
        if self.pending.is_some() {
            debug!("replacing pending authorization");
        }
        self.pending = Some(PendingAuthorization {
            state,
            verifier: pair.verifier,
            authorize_url: url.clone(),
        });
        self.redirect_uri = cfg.redirect_uri.clone();
        self.client_id = cfg.client_id.clone();
        info!("authorization started for client {}", cfg.client_id);
        Ok(url)
    }

    pub fn pending(&self) -> Option<&PendingAuthorization> {
        self.pending.as_ref()
    }

    /// Validate the redirect against the pending attempt and hand back the
    /// token request fields. The pending attempt is consumed either way.
    pub fn complete_authorization(&mut self, redirect_url: &str) -> Result<TokenExchangeRequest> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| anyhow!("no authorization in progress"))?;
        let params = parse_callback(redirect_url)?;
        if params.state.as_deref() != Some(pending.state.as_str()) {
            warn!("callback state does not match pending authorization");
            return Err(anyhow!("state mismatch in redirect URL"));
        }
        Ok(TokenExchangeRequest {
            code: params.code,
            code_verifier: pending.verifier,
            redirect_uri: self.redirect_uri.clone(),
            client_id: self.client_id.clone(),
        })
    }

    pub fn sign_in(&mut self, auth_token: String, current_user: Option<String>) {
        self.auth_token = Some(auth_token);
        self.current_user = current_user;
    }

    pub fn sign_out(&mut self) {
        self.auth_token = None;
        self.current_user = None;
        self.pending = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }
}

/// Interactive flow for the CLI: print the authorize URL, read the pasted
/// redirect URL and print the token request it resolves to.
pub fn run_interactive_authorization(cfg: &Config) -> Result<TokenExchangeRequest> {
    use std::io;

    cfg.validate()?;
    let mut store = AuthStore::new();
    let url = store.begin_authorization(cfg)?;

    println!(
        "Open this URL in your browser and authorize the application:\n\n{}\n",
        url
    );
    println!("After authorizing, you'll be redirected to your redirect URI. Copy the full redirect URL and paste it here.");
    println!("Paste redirect URL:");
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow!("no redirect URL provided"));
    }

    let req = store.complete_authorization(input)?;
    info!("authorization code received; token request ready");
    println!("POST {}/api/token with form fields:", cfg.auth_base().trim_end_matches('/'));
    for (k, v) in req.form_params() {
        println!("  {}={}", k, v);
    }
    Ok(req)
}
