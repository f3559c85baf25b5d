//! HTTP client for the account API.
//!
//! Each call runs as one sequenced operation on the shared [`AuthStore`]:
//! it begins (loading, error cleared), performs the request, and resolves
//! with an [`AuthOutcome`]. Results from superseded calls are dropped by the
//! store, and a superseded login never writes its token to the session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionStore;
use crate::state::{AuthOutcome, AuthStore, SessionUser};

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Body for the three registration endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewAccount {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    token: String,
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct CheckAuthBody {
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct AuthClient<S> {
    http: reqwest::Client,
    config: ClientConfig,
    session: S,
    store: Arc<AuthStore>,
}

impl<S: SessionStore> AuthClient<S> {
    pub fn new(config: ClientConfig, session: S) -> Self {
        Self::with_store(config, session, Arc::new(AuthStore::new()))
    }

    pub fn with_store(config: ClientConfig, session: S, store: Arc<AuthStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session,
            store,
        }
    }

    pub fn store(&self) -> &Arc<AuthStore> {
        &self.store
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Exchange credentials for a token, persist it and sign in.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let seq = self.store.begin();
        let req = self
            .http
            .post(self.config.url("/login"))
            .json(&Credentials { email, password });

        match send::<LoginBody>(req).await {
            Ok(body) => {
                self.store.resolve_with(seq, AuthOutcome::SignedIn(body.user.clone()), || {
                    self.session.save(&body.token)
                });
                Ok(body.user)
            }
            Err(e) => {
                self.store.resolve(seq, failed(&e, true));
                Err(e)
            }
        }
    }

    /// Re-derive the signed-in user from the stored token.
    pub async fn check_auth(&self) -> Result<SessionUser, ClientError> {
        let seq = self.store.begin();
        let result = match self.session.token() {
            None => Err(ClientError::NoSession),
            Some(token) => {
                let req = self.http.get(self.config.url("/check-auth")).bearer_auth(token);
                send::<CheckAuthBody>(req).await
            }
        };

        match result {
            Ok(body) => {
                let user = self.keep_known_profile(body.user);
                self.store.resolve(seq, AuthOutcome::SignedIn(user.clone()));
                Ok(user)
            }
            Err(e) => {
                self.store.resolve(seq, failed(&e, true));
                Err(e)
            }
        }
    }

    /// Tell the server, then drop the local credential.
    ///
    /// The token itself stays valid until it expires.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let seq = self.store.begin();
        let req = self.http.post(self.config.url("/logout"));

        match send::<serde_json::Value>(req).await {
            Ok(_) => {
                self.store.resolve_with(seq, AuthOutcome::SignedOut, || self.session.clear());
                Ok(())
            }
            Err(e) => {
                self.store.resolve(seq, failed(&e, false));
                Err(e)
            }
        }
    }

    /// Public bootstrap of an administrator. The new admin becomes the
    /// session user; no token is stored until they log in.
    pub async fn register_admin(&self, account: &NewAccount) -> Result<SessionUser, ClientError> {
        self.register("/register-admin", "admin", account, true).await
    }

    pub async fn register_operator(&self, account: &NewAccount) -> Result<SessionUser, ClientError> {
        self.register("/register-operator", "operator", account, false).await
    }

    /// Creates a FARMER.
    pub async fn register_user(&self, account: &NewAccount) -> Result<SessionUser, ClientError> {
        self.register("/register-user", "user", account, false).await
    }

    pub async fn list_users(&self) -> Result<Vec<SessionUser>, ClientError> {
        let seq = self.store.begin();
        let req = self.authorized(self.http.get(self.config.url("/users")));

        let result = send::<Vec<SessionUser>>(req).await;
        self.store.resolve(seq, settle(&result));
        result
    }

    async fn register(
        &self,
        path: &str,
        field: &str,
        account: &NewAccount,
        signs_in: bool,
    ) -> Result<SessionUser, ClientError> {
        let seq = self.store.begin();
        let req = self.authorized(self.http.post(self.config.url(path))).json(account);

        // The created account is keyed by role: `{"admin": {..}}`, `{"user": {..}}`.
        let result = send::<serde_json::Value>(req).await.and_then(|mut body| {
            body.get_mut(field)
                .map(serde_json::Value::take)
                .and_then(|v| serde_json::from_value::<SessionUser>(v).ok())
                .ok_or(ClientError::Unexpected)
        });
        let outcome = match &result {
            Ok(user) if signs_in => AuthOutcome::SignedIn(user.clone()),
            _ => settle(&result),
        };
        self.store.resolve(seq, outcome);
        result
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// `check-auth` only carries id and role; keep name and email from the
    /// login response when it is the same user.
    fn keep_known_profile(&self, mut user: SessionUser) -> SessionUser {
        if let Some(known) = self.store.snapshot().user() {
            if known.id == user.id {
                user.name = user.name.or_else(|| known.name.clone());
                user.email = user.email.or_else(|| known.email.clone());
            }
        }
        user
    }
}

fn unreachable(err: reqwest::Error) -> ClientError {
    tracing::debug!(error = %err, "request did not reach the server");
    ClientError::Unreachable
}

async fn send<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T, ClientError> {
    let resp = req.send().await.map_err(unreachable)?;
    let status = resp.status();
    if !status.is_success() {
        let message = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| ClientError::Unexpected.to_string());
        return Err(ClientError::Server {
            status: status.as_u16(),
            message,
        });
    }

    resp.json::<T>().await.map_err(|e| {
        tracing::warn!(error = %e, "unexpected response body");
        ClientError::Unexpected
    })
}

fn failed(err: &ClientError, sign_out: bool) -> AuthOutcome {
    AuthOutcome::Failed {
        message: err.to_string(),
        sign_out,
    }
}

fn settle<T>(result: &Result<T, ClientError>) -> AuthOutcome {
    match result {
        Ok(_) => AuthOutcome::Completed,
        Err(e) => failed(e, false),
    }
}
