//! Firebase Authentication provider.
//!
//! Talks to the Identity Toolkit REST API with email/password accounts:
//! - `accounts:signUp` for account creation (which also signs in)
//! - `accounts:signInWithPassword` for sign-in
//!
//! Sign-out is local: the tokens are dropped and `None` is published.
//! The ID token lives in memory only and is never logged or refreshed.
//!
//! Errors are reported in the web SDK's message format
//! (`Firebase: Error (auth/<code>).`) so users see familiar text.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

use super::{
    AuthProvider, Identity, ListenerRegistry, ProviderError, ProviderErrorKind, ProviderResult,
    SessionListener, Subscription,
};
use crate::config::FirebaseConfig;

/// Production Identity Toolkit endpoint.
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";

/// API key accepted by the local auth emulator.
const EMULATOR_API_KEY: &str = "fake-api-key";

const API_KEY_ENV: &str = "FIREBASE_API_KEY";
const ENDPOINT_ENV: &str = "KEYHOLE_IDENTITY_TOOLKIT_URL";
const EMULATOR_ENV: &str = "FIREBASE_AUTH_EMULATOR_HOST";

/// Resolved connection settings.
#[derive(Clone)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub project_id: String,
    pub identity_toolkit_url: String,
    pub request_timeout: Option<std::time::Duration>,
}

impl fmt::Debug for FirebaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseSettings")
            .field("api_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("identity_toolkit_url", &self.identity_toolkit_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl FirebaseSettings {
    /// Resolves settings from config and the process environment.
    ///
    /// # Errors
    /// Returns an error if no API key is available or an endpoint is not a URL.
    pub fn resolve(config: &FirebaseConfig) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolves settings with an explicit environment lookup.
    ///
    /// Endpoint precedence: `KEYHOLE_IDENTITY_TOOLKIT_URL` >
    /// `FIREBASE_AUTH_EMULATOR_HOST` > config > default.
    /// API key precedence: config > `FIREBASE_API_KEY` (> emulator placeholder).
    ///
    /// # Errors
    /// Returns an error if no API key is available or an endpoint is not a URL.
    pub fn resolve_with(
        config: &FirebaseConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env_nonempty = |name: &str| {
            env(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let emulator_host = env_nonempty(EMULATOR_ENV);
        let identity_toolkit_url = if let Some(url) = env_nonempty(ENDPOINT_ENV) {
            url
        } else if let Some(host) = &emulator_host {
            format!("http://{host}/identitytoolkit.googleapis.com")
        } else if let Some(url) = config
            .identity_toolkit_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
        {
            url.to_string()
        } else {
            DEFAULT_IDENTITY_TOOLKIT_URL.to_string()
        };
        url::Url::parse(&identity_toolkit_url)
            .with_context(|| format!("Invalid Identity Toolkit URL: {identity_toolkit_url}"))?;
        let identity_toolkit_url = identity_toolkit_url.trim_end_matches('/').to_string();

        let api_key = match config.api_key.trim() {
            "" => env_nonempty(API_KEY_ENV)
                .or_else(|| emulator_host.as_ref().map(|_| EMULATOR_API_KEY.to_string()))
                .with_context(|| {
                    format!("No Firebase API key available. Set {API_KEY_ENV} or api_key in [firebase].")
                })?,
            key => key.to_string(),
        };

        Ok(Self {
            api_key,
            project_id: config.project_id.clone(),
            identity_toolkit_url,
            request_timeout: config.request_timeout(),
        })
    }
}

/// Tokens issued for the signed-in user.
#[derive(Clone)]
struct SessionTokens {
    id_token: String,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("id_token", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Firebase Authentication client.
pub struct FirebaseAuth {
    settings: FirebaseSettings,
    http: reqwest::Client,
    registry: ListenerRegistry,
    tokens: Mutex<Option<SessionTokens>>,
}

impl FirebaseAuth {
    /// Creates a client for the given settings. Starts signed out.
    ///
    /// # Panics
    /// In test builds, panics if pointed at the production endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: FirebaseSettings) -> Result<Self> {
        #[cfg(test)]
        assert!(
            settings.identity_toolkit_url != DEFAULT_IDENTITY_TOOLKIT_URL,
            "Tests must not use the production Identity Toolkit API!\n\
             Point identity_toolkit_url at a mock server (e.g., wiremock)."
        );

        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "keyhole/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            settings,
            http,
            registry: ListenerRegistry::new(),
            tokens: Mutex::new(None),
        })
    }

    /// ID token of the signed-in user, for calling other Firebase services.
    pub fn id_token(&self) -> Option<String> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.id_token.clone())
    }

    fn set_tokens(&self, tokens: Option<SessionTokens>) {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = tokens;
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> ProviderResult<()> {
        let url = format!(
            "{}/v1/accounts:{endpoint}",
            self.settings.identity_toolkit_url
        );
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };

        tracing::debug!(endpoint, email, "identity toolkit request");
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_reqwest_error)?;
        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &body);
            tracing::warn!(endpoint, email, status = status.as_u16(), kind = ?err.kind, "identity toolkit rejected request");
            return Err(err);
        }

        let parsed: PasswordResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(endpoint, error = %e, "unreadable identity toolkit response");
            ProviderError::network("Firebase: Error (auth/network-request-failed).")
        })?;

        let identity = Identity::new(
            parsed.local_id,
            parsed.email.unwrap_or_else(|| email.to_string()),
        );
        self.set_tokens(Some(SessionTokens {
            id_token: parsed.id_token,
        }));
        tracing::info!(endpoint, email = %identity.email, "identity toolkit request succeeded");
        self.registry.publish(Some(identity));
        Ok(())
    }
}

impl fmt::Debug for FirebaseAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseAuth")
            .field("settings", &self.settings)
            .field("signed_in", &self.registry.current().is_some())
            .finish_non_exhaustive()
    }
}

impl AuthProvider for FirebaseAuth {
    fn name(&self) -> &str {
        "firebase"
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.registry.subscribe(listener)
    }

    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        self.password_call("signInWithPassword", email, password)
            .boxed()
    }

    fn create_account<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        self.password_call("signUp", email, password).boxed()
    }

    fn sign_out(&self) -> BoxFuture<'_, ProviderResult<()>> {
        async move {
            self.set_tokens(None);
            self.registry.publish(None);
            tracing::info!("signed out");
            Ok(())
        }
        .boxed()
    }
}

/// Maps an Identity Toolkit error code to a provider error.
///
/// Codes come from `error.message` in the REST error body, optionally
/// followed by ` : <detail>`.
pub fn map_error_code(raw: &str) -> ProviderError {
    let (code, detail) = match raw.split_once(" : ") {
        Some((code, detail)) => (code.trim(), Some(detail.trim())),
        None => (raw.trim(), None),
    };

    let sdk_error = |kind: ProviderErrorKind, auth_code: &str| {
        ProviderError::new(kind, format!("Firebase: Error (auth/{auth_code})."))
    };

    match code {
        "EMAIL_EXISTS" => sdk_error(ProviderErrorKind::EmailInUse, "email-already-in-use"),
        "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_LOGIN_CREDENTIALS" => {
            sdk_error(ProviderErrorKind::InvalidCredentials, "invalid-credential")
        }
        "WEAK_PASSWORD" => {
            let hint = detail.unwrap_or("Password should be at least 6 characters");
            ProviderError::new(
                ProviderErrorKind::WeakPassword,
                format!("Firebase: {hint} (auth/weak-password)."),
            )
        }
        "INVALID_EMAIL" => other("invalid-email"),
        "USER_DISABLED" => other("user-disabled"),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => other("too-many-requests"),
        "MISSING_PASSWORD" => other("missing-password"),
        "MISSING_EMAIL" => other("missing-email"),
        "OPERATION_NOT_ALLOWED" => other("operation-not-allowed"),
        unknown => other(&unknown.to_ascii_lowercase().replace('_', "-")),
    }
}

fn other(auth_code: &str) -> ProviderError {
    ProviderError::new(
        ProviderErrorKind::Other(auth_code.to_string()),
        format!("Firebase: Error (auth/{auth_code})."),
    )
}

fn error_from_body(status: u16, body: &str) -> ProviderError {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return map_error_code(&envelope.error.message);
    }
    if status >= 500 {
        ProviderError::network("Firebase: Error (auth/network-request-failed).")
    } else {
        other("internal-error")
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        tracing::warn!(error = %e, "identity toolkit request timed out");
    } else {
        tracing::warn!(error = %e, "identity toolkit request failed");
    }
    ProviderError::network("Firebase: Error (auth/network-request-failed).")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::mpsc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings_for(server: &MockServer) -> FirebaseSettings {
        FirebaseSettings {
            api_key: "test-key".to_string(),
            project_id: "demo-project".to_string(),
            identity_toolkit_url: server.uri(),
            request_timeout: Some(Duration::from_secs(5)),
        }
    }

    fn record(provider: &FirebaseAuth) -> (Subscription, mpsc::Receiver<Option<Identity>>) {
        let (tx, rx) = mpsc::channel();
        let sub = provider.subscribe(Box::new(move |identity| {
            let _ = tx.send(identity);
        }));
        (sub, rx)
    }

    fn error_body(message: &str) -> serde_json::Value {
        json!({
            "error": {
                "code": 400,
                "message": message,
                "errors": [{ "message": message, "domain": "global", "reason": "invalid" }]
            }
        })
    }

    #[tokio::test]
    async fn test_sign_in_publishes_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "email": "a@b.com",
                "password": "secret1",
                "returnSecureToken": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-1",
                "email": "a@b.com",
                "idToken": "id-token",
                "refreshToken": "refresh-token",
                "expiresIn": "3600",
                "registered": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = FirebaseAuth::new(settings_for(&server)).unwrap();
        let (_sub, rx) = record(&provider);

        provider.sign_in("a@b.com", "secret1").await.unwrap();

        let seen: Vec<_> = rx.try_iter().collect();
        assert_eq!(seen, vec![None, Some(Identity::new("uid-1", "a@b.com"))]);
        assert_eq!(provider.id_token().as_deref(), Some("id-token"));
    }

    #[tokio::test]
    async fn test_sign_up_hits_sign_up_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-2",
                "email": "new@b.com",
                "idToken": "id-token",
                "refreshToken": "refresh-token",
                "expiresIn": "3600"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = FirebaseAuth::new(settings_for(&server)).unwrap();

        provider.create_account("new@b.com", "secret1").await.unwrap();

        let (_sub, rx) = record(&provider);
        assert_eq!(
            rx.try_recv().unwrap(),
            Some(Identity::new("uid-2", "new@b.com"))
        );
    }

    #[tokio::test]
    async fn test_invalid_credentials_keep_session_signed_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(error_body("INVALID_LOGIN_CREDENTIALS")),
            )
            .mount(&server)
            .await;

        let provider = FirebaseAuth::new(settings_for(&server)).unwrap();
        let (_sub, rx) = record(&provider);

        let err = provider.sign_in("a@b.com", "wrong").await.unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::InvalidCredentials);
        assert_eq!(err.message, "Firebase: Error (auth/invalid-credential).");
        assert_eq!(rx.try_iter().count(), 1);
        assert!(provider.id_token().is_none());
    }

    #[tokio::test]
    async fn test_weak_password_keeps_backend_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            )))
            .mount(&server)
            .await;

        let provider = FirebaseAuth::new(settings_for(&server)).unwrap();

        let err = provider.create_account("a@b.com", "123").await.unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::WeakPassword);
        assert_eq!(
            err.message,
            "Firebase: Password should be at least 6 characters (auth/weak-password)."
        );
    }

    #[tokio::test]
    async fn test_server_error_without_json_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let provider = FirebaseAuth::new(settings_for(&server)).unwrap();

        let err = provider.sign_in("a@b.com", "secret1").await.unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::Network);
    }

    fn assert_network_failure(err: &ProviderError) {
        assert_eq!(err.kind, ProviderErrorKind::Network);
        assert_eq!(err.message, "Firebase: Error (auth/network-request-failed).");
    }

    #[tokio::test]
    async fn test_unreadable_success_body_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let provider = FirebaseAuth::new(settings_for(&server)).unwrap();
        let (_sub, rx) = record(&provider);

        let err = provider.sign_in("a@b.com", "secret1").await.unwrap_err();

        assert_network_failure(&err);
        assert_eq!(rx.try_iter().count(), 1);
        assert!(provider.id_token().is_none());
    }

    #[tokio::test]
    async fn test_slow_backend_times_out_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(json!({ "localId": "uid-1", "idToken": "id-token" })),
            )
            .mount(&server)
            .await;

        let settings = FirebaseSettings {
            request_timeout: Some(Duration::from_millis(100)),
            ..settings_for(&server)
        };
        let provider = FirebaseAuth::new(settings).unwrap();

        let err = provider.create_account("a@b.com", "secret1").await.unwrap_err();

        assert_network_failure(&err);
        assert!(provider.registry.current().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let settings = FirebaseSettings {
            api_key: "test-key".to_string(),
            project_id: "demo-project".to_string(),
            identity_toolkit_url: format!("http://{addr}"),
            request_timeout: Some(Duration::from_secs(5)),
        };

        let provider = FirebaseAuth::new(settings).unwrap();

        let err = provider.sign_in("a@b.com", "secret1").await.unwrap_err();

        assert_network_failure(&err);
    }

    #[tokio::test]
    async fn test_sign_out_clears_tokens_and_publishes_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-1",
                "email": "a@b.com",
                "idToken": "id-token",
                "refreshToken": "refresh-token"
            })))
            .mount(&server)
            .await;

        let provider = FirebaseAuth::new(settings_for(&server)).unwrap();
        provider.sign_in("a@b.com", "secret1").await.unwrap();
        let (_sub, rx) = record(&provider);

        provider.sign_out().await.unwrap();

        let seen: Vec<_> = rx.try_iter().collect();
        assert_eq!(seen, vec![Some(Identity::new("uid-1", "a@b.com")), None]);
        assert!(provider.id_token().is_none());
    }

    #[test]
    fn test_map_error_codes() {
        assert_eq!(
            map_error_code("EMAIL_EXISTS").kind,
            ProviderErrorKind::EmailInUse
        );
        assert_eq!(
            map_error_code("EMAIL_NOT_FOUND").kind,
            ProviderErrorKind::InvalidCredentials
        );
        assert_eq!(
            map_error_code("INVALID_PASSWORD").kind,
            ProviderErrorKind::InvalidCredentials
        );
        assert_eq!(
            map_error_code("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled").message,
            "Firebase: Error (auth/too-many-requests)."
        );
        for (code, auth_code) in [
            ("INVALID_EMAIL", "invalid-email"),
            ("USER_DISABLED", "user-disabled"),
            ("MISSING_PASSWORD", "missing-password"),
        ] {
            let err = map_error_code(code);
            assert_eq!(err.kind, ProviderErrorKind::Other(auth_code.to_string()));
            assert_eq!(err.message, format!("Firebase: Error (auth/{auth_code})."));
        }
        assert_eq!(
            map_error_code("SOMETHING_NEW").kind,
            ProviderErrorKind::Other("something-new".to_string())
        );
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_resolve_prefers_config_api_key() {
        let config = FirebaseConfig {
            api_key: "from-config".to_string(),
            ..Default::default()
        };
        let settings =
            FirebaseSettings::resolve_with(&config, env_from(&[(API_KEY_ENV, "from-env")]))
                .unwrap();
        assert_eq!(settings.api_key, "from-config");
        assert_eq!(settings.identity_toolkit_url, DEFAULT_IDENTITY_TOOLKIT_URL);
    }

    #[test]
    fn test_resolve_falls_back_to_env_api_key() {
        let settings = FirebaseSettings::resolve_with(
            &FirebaseConfig::default(),
            env_from(&[(API_KEY_ENV, "from-env")]),
        )
        .unwrap();
        assert_eq!(settings.api_key, "from-env");
    }

    #[test]
    fn test_resolve_without_api_key_fails() {
        let err = FirebaseSettings::resolve_with(&FirebaseConfig::default(), env_from(&[]))
            .unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_resolve_emulator_host() {
        let settings = FirebaseSettings::resolve_with(
            &FirebaseConfig::default(),
            env_from(&[(EMULATOR_ENV, "127.0.0.1:9099")]),
        )
        .unwrap();
        assert_eq!(
            settings.identity_toolkit_url,
            "http://127.0.0.1:9099/identitytoolkit.googleapis.com"
        );
        assert_eq!(settings.api_key, EMULATOR_API_KEY);
    }

    #[test]
    fn test_resolve_endpoint_env_wins_over_config() {
        let config = FirebaseConfig {
            api_key: "k".to_string(),
            identity_toolkit_url: Some("http://config.invalid".to_string()),
            ..Default::default()
        };
        let settings = FirebaseSettings::resolve_with(
            &config,
            env_from(&[(ENDPOINT_ENV, "http://localhost:8080/")]),
        )
        .unwrap();
        assert_eq!(settings.identity_toolkit_url, "http://localhost:8080");
    }

    #[test]
    fn test_resolve_rejects_invalid_url() {
        let config = FirebaseConfig {
            api_key: "k".to_string(),
            identity_toolkit_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(FirebaseSettings::resolve_with(&config, env_from(&[])).is_err());
    }

    #[test]
    fn test_settings_debug_redacts_api_key() {
        let settings = FirebaseSettings {
            api_key: "super-secret".to_string(),
            project_id: "p".to_string(),
            identity_toolkit_url: "http://localhost".to_string(),
            request_timeout: None,
        };
        assert!(!format!("{settings:?}").contains("super-secret"));
    }
}
