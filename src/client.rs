//! Identity Client
//!
//! High-level client for a hosted identity provider domain: redirect URIs,
//! token exchange and UserInfo.

use std::sync::Arc;

use base64::Engine;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::core::{
    DefaultPkceGenerator, FormParams, HttpRequest, HttpResponse, HttpTransport, PkceGenerator,
    ReqwestHttpTransport,
};
use crate::error::{parse_error_response, IdentityError, ProtocolError};
use crate::flows::{AuthorizationRequest, LogoutRequest};
use crate::types::{
    AccessTokenSource, AuthorizationOptions, GrantType, IdentityConfig, LogoutOptions, Outcome,
    PkceMethod, PkceParams, Rejection, Scope, TokenParams, TokenRecord, TokenResponse,
    UserIdentity, TOKEN_PATH, USER_INFO_PATH,
};

/// Client for one app client of a hosted identity provider domain.
pub struct IdentityClient<T: HttpTransport = ReqwestHttpTransport> {
    config: IdentityConfig,
    transport: Arc<T>,
}

impl IdentityClient<ReqwestHttpTransport> {
    /// Create a client backed by the default reqwest transport.
    ///
    /// No connection is opened until the first token or UserInfo call.
    pub fn new(config: IdentityConfig) -> Self {
        let transport = ReqwestHttpTransport::with_options(config.timeout, config.max_response_size);
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> IdentityClient<T> {
    /// Create a client with a custom transport.
    pub fn with_transport(config: IdentityConfig, transport: T) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    // ========== Redirects ==========

    /// Build the sign-in redirect URI.
    pub fn authorization_uri(
        &self,
        redirect_uri: impl Into<String>,
        options: AuthorizationOptions,
    ) -> String {
        let credentials = &self.config.credentials;
        AuthorizationRequest::new(
            credentials.client_id.as_str(),
            credentials.domain.as_str(),
            redirect_uri,
        )
        .with_options(options)
        .render()
    }

    /// Build the sign-out redirect URI.
    pub fn logout_uri(&self, options: LogoutOptions) -> String {
        let credentials = &self.config.credentials;
        LogoutRequest::new(credentials.client_id.as_str(), credentials.domain.as_str())
            .with_options(options)
            .render()
    }

    /// Generate PKCE parameters for an authorization code flow.
    pub fn generate_pkce(&self, method: PkceMethod) -> PkceParams {
        DefaultPkceGenerator::new().generate(method)
    }

    // ========== Token Endpoint ==========

    /// Exchange a grant for tokens.
    pub async fn exchange_token(
        &self,
        grant_type: GrantType,
        params: TokenParams,
    ) -> Result<Outcome<TokenRecord>, IdentityError> {
        self.exchange_token_with(grant_type, params, |_| {}).await
    }

    /// Exchange a grant for tokens, running `on_granted` on the record
    /// before it is returned. `on_granted` does not run on rejection.
    #[instrument(
        skip_all,
        fields(domain = %self.config.credentials.domain, grant_type = %grant_type)
    )]
    pub async fn exchange_token_with<F>(
        &self,
        grant_type: GrantType,
        params: TokenParams,
        on_granted: F,
    ) -> Result<Outcome<TokenRecord>, IdentityError>
    where
        F: FnOnce(&TokenRecord) + Send,
    {
        let credentials = &self.config.credentials;
        let body = FormParams::new()
            .required("client_id", credentials.client_id.as_str())
            .required("grant_type", grant_type.as_str())
            .optional("code", params.code)
            .optional("code_verifier", params.code_verifier)
            .optional("redirect_uri", params.redirect_uri)
            .optional("refresh_token", params.refresh_token)
            .optional("scope", params.scope.as_ref().map(Scope::to_param))
            .encode();

        let mut request = HttpRequest::post(self.config.endpoints().token_endpoint)
            .header("content-type", "application/x-www-form-urlencoded")
            .header("accept", "application/json")
            .body(body);
        if let Some(authorization) = self.basic_authorization() {
            request = request.header("authorization", authorization);
        }

        debug!(
            confidential = credentials.is_confidential(),
            path = TOKEN_PATH,
            "Requesting tokens"
        );
        let response = self.transport.send(request).await?;

        let outcome = decode::<TokenResponse>(response)?.map(TokenRecord::from_response);
        match &outcome {
            Outcome::Granted(record) => {
                debug!(expires_in = ?record.expires_in(), "Tokens issued");
                on_granted(record);
            }
            Outcome::Rejected(rejection) => log_rejection(TOKEN_PATH, rejection),
        }
        Ok(outcome)
    }

    /// Exchange an authorization code.
    pub async fn exchange_code(
        &self,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Outcome<TokenRecord>, IdentityError> {
        self.exchange_token(
            GrantType::AuthorizationCode,
            TokenParams::authorization_code(code, redirect_uri),
        )
        .await
    }

    /// Exchange an authorization code obtained with a PKCE challenge.
    pub async fn exchange_code_with_pkce(
        &self,
        code: impl Into<String>,
        code_verifier: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Outcome<TokenRecord>, IdentityError> {
        self.exchange_token(
            GrantType::AuthorizationCode,
            TokenParams::authorization_code(code, redirect_uri).with_code_verifier(code_verifier),
        )
        .await
    }

    /// Request a token for the client itself.
    pub async fn client_credentials(
        &self,
        scope: Option<Scope>,
    ) -> Result<Outcome<TokenRecord>, IdentityError> {
        self.exchange_token(
            GrantType::ClientCredentials,
            TokenParams::client_credentials(scope),
        )
        .await
    }

    /// Exchange a refresh token for fresh tokens.
    pub async fn refresh(
        &self,
        refresh_token: impl Into<String>,
    ) -> Result<Outcome<TokenRecord>, IdentityError> {
        self.exchange_token(
            GrantType::RefreshToken,
            TokenParams::refresh_token(refresh_token),
        )
        .await
    }

    // ========== UserInfo Endpoint ==========

    /// Fetch the claims of the user an access token was issued to.
    pub async fn user_info(
        &self,
        token: impl Into<AccessTokenSource>,
    ) -> Result<Outcome<UserIdentity>, IdentityError> {
        self.user_info_with(token, |_| {}).await
    }

    /// Fetch user claims, running `on_granted` on them before they are
    /// returned. `on_granted` does not run on rejection.
    #[instrument(skip_all, fields(domain = %self.config.credentials.domain))]
    pub async fn user_info_with<F>(
        &self,
        token: impl Into<AccessTokenSource>,
        on_granted: F,
    ) -> Result<Outcome<UserIdentity>, IdentityError>
    where
        F: FnOnce(&UserIdentity) + Send,
    {
        let source = token.into();
        // A record without an access token still goes to the provider, which rejects it.
        let access_token = source.access_token().unwrap_or_default();

        let request = HttpRequest::post(self.config.endpoints().userinfo_endpoint)
            .header("accept", "application/json")
            .header("authorization", format!("Bearer {}", access_token));

        debug!(path = USER_INFO_PATH, "Requesting user info");
        let response = self.transport.send(request).await?;

        let outcome = decode::<UserIdentity>(response)?;
        match &outcome {
            Outcome::Granted(identity) => {
                debug!(claims = identity.len(), "User info received");
                on_granted(identity);
            }
            Outcome::Rejected(rejection) => log_rejection(USER_INFO_PATH, rejection),
        }
        Ok(outcome)
    }

    /// `Basic base64url("{client_id}:{client_secret}")`, for confidential clients.
    fn basic_authorization(&self) -> Option<String> {
        let credentials = &self.config.credentials;
        credentials.client_secret.as_ref().map(|secret| {
            let pair = format!("{}:{}", credentials.client_id, secret.expose_secret());
            format!(
                "Basic {}",
                base64::engine::general_purpose::URL_SAFE.encode(pair)
            )
        })
    }
}

/// Split a response into a decoded body or a rejection.
fn decode<R: DeserializeOwned>(response: HttpResponse) -> Result<Outcome<R>, IdentityError> {
    if !response.is_success() {
        return Ok(Outcome::Rejected(Rejection {
            status: response.status,
            error: parse_error_response(&response.body),
        }));
    }

    serde_json::from_str(&response.body)
        .map(Outcome::Granted)
        .map_err(|e| {
            IdentityError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })
}

fn log_rejection(path: &str, rejection: &Rejection) {
    warn!(
        path,
        status = rejection.status,
        error = rejection.error_code().unwrap_or("unknown"),
        "Provider rejected request"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::identity_config;
    use crate::core::MockHttpTransport;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CLIENT_ID: &str = "client1";
    const DOMAIN: &str = "auth.example.com";
    const REDIRECT_URI: &str = "https://www.example.com/auth/callback";

    fn create_client(secret: Option<&str>) -> IdentityClient<MockHttpTransport> {
        let mut builder = identity_config().client_id(CLIENT_ID).domain(DOMAIN);
        if let Some(secret) = secret {
            builder = builder.client_secret(secret);
        }
        IdentityClient::with_transport(builder.build().unwrap(), MockHttpTransport::new())
    }

    fn token_payload() -> serde_json::Value {
        json!({
            "access_token": "eyJra1example",
            "id_token": "eyJra2example",
            "token_type": "Bearer",
            "expires_in": 7200
        })
    }

    fn user_payload() -> serde_json::Value {
        json!({
            "sub": "248289761001",
            "name": "Jane Doe",
            "given_name": "Jane",
            "family_name": "Doe",
            "preferred_username": "j.doe",
            "email": "janedoe@example.com",
            "phone_number": "+12065551212",
            "email_verified": "true",
            "phone_number_verified": "true"
        })
    }

    fn form_body(request: &HttpRequest) -> HashMap<String, String> {
        url::form_urlencoded::parse(request.body.as_deref().unwrap_or("").as_bytes())
            .into_owned()
            .collect()
    }

    fn assert_tokens(outcome: &Outcome<TokenRecord>) {
        let record = outcome.as_granted().expect("tokens granted");
        assert_eq!(record.access_token(), Some("eyJra1example"));
        assert_eq!(record.id_token(), Some("eyJra2example"));
        assert_eq!(record.token_type(), Some("Bearer"));
        assert_eq!(record.expires_in(), Some(7200));
        assert!(record.expires_at().is_some());
    }

    #[test]
    fn test_authorization_uri() {
        let client = create_client(None);
        let uri = client.authorization_uri(REDIRECT_URI, AuthorizationOptions::default());
        let parsed = url::Url::parse(&uri).unwrap();
        let params: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

        assert_eq!(parsed.host_str(), Some(DOMAIN));
        assert_eq!(parsed.path(), "/oauth2/authorize");
        assert_eq!(params.len(), 3);
        assert!(params.contains(&("client_id".to_string(), CLIENT_ID.to_string())));
        assert!(params.contains(&("redirect_uri".to_string(), REDIRECT_URI.to_string())));
        assert!(params.contains(&("response_type".to_string(), "code".to_string())));
    }

    #[test]
    fn test_authorization_uri_with_options() {
        let client = create_client(None);
        let pkce = client.generate_pkce(PkceMethod::S256);
        let uri = client.authorization_uri(
            REDIRECT_URI,
            AuthorizationOptions {
                scope: Some("openid email".into()),
                state: Some("STATE".to_string()),
                code_challenge: Some(pkce.code_challenge.clone()),
                code_challenge_method: Some(pkce.code_challenge_method),
                ..Default::default()
            },
        );
        let params: HashMap<String, String> =
            url::Url::parse(&uri).unwrap().query_pairs().into_owned().collect();

        assert_eq!(params["scope"], "openid email");
        assert_eq!(params["state"], "STATE");
        assert_eq!(params["code_challenge"], pkce.code_challenge);
        assert_eq!(params["code_challenge_method"], "S256");
    }

    #[test]
    fn test_logout_uri() {
        let client = create_client(Some("SECRET"));
        let uri = client.logout_uri(LogoutOptions::default());
        assert_eq!(uri, "https://auth.example.com/logout?client_id=client1");
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let client = create_client(None);
        client.transport.queue_json_response(200, &token_payload());

        let outcome = client.exchange_code("code1", REDIRECT_URI).await.unwrap();
        assert_tokens(&outcome);

        let request = client.transport.get_last_request().unwrap();
        assert_eq!(request.url, "https://auth.example.com/oauth2/token");
        assert_eq!(
            request.headers.get("content-type").unwrap(),
            "application/x-www-form-urlencoded"
        );

        let body = form_body(&request);
        assert_eq!(body.len(), 4);
        assert_eq!(body["client_id"], CLIENT_ID);
        assert_eq!(body["grant_type"], "authorization_code");
        assert_eq!(body["code"], "code1");
        assert_eq!(body["redirect_uri"], REDIRECT_URI);
    }

    #[tokio::test]
    async fn test_public_client_sends_no_authorization() {
        let client = create_client(None);
        client.transport.queue_json_response(200, &token_payload());

        client
            .exchange_token(GrantType::AuthorizationCode, TokenParams {
                code: Some("code1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let request = client.transport.get_last_request().unwrap();
        assert!(!request.headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_confidential_client_sends_basic_authorization() {
        let client = create_client(Some("SECRET"));
        client.transport.queue_json_response(200, &token_payload());

        client.exchange_code("code1", REDIRECT_URI).await.unwrap();

        let request = client.transport.get_last_request().unwrap();
        // base64url("client1:SECRET")
        assert_eq!(
            request.headers.get("authorization").unwrap(),
            "Basic Y2xpZW50MTpTRUNSRVQ="
        );
    }

    #[tokio::test]
    async fn test_basic_authorization_is_url_safe() {
        // Standard base64 of "client1:~~~" would contain '+'.
        let client = create_client(Some("~~~"));
        client.transport.queue_json_response(200, &token_payload());

        client.client_credentials(None).await.unwrap();

        let request = client.transport.get_last_request().unwrap();
        assert_eq!(
            request.headers.get("authorization").unwrap(),
            "Basic Y2xpZW50MTp-fn4="
        );
    }

    #[tokio::test]
    async fn test_exchange_code_with_pkce() {
        let client = create_client(None);
        client.transport.queue_json_response(200, &token_payload());

        let outcome = client
            .exchange_code_with_pkce("code1", "CODE_VERIFIER", REDIRECT_URI)
            .await
            .unwrap();
        assert_tokens(&outcome);

        let body = form_body(&client.transport.get_last_request().unwrap());
        assert_eq!(body.len(), 5);
        assert_eq!(body["code_verifier"], "CODE_VERIFIER");
        assert_eq!(body["grant_type"], "authorization_code");
    }

    #[tokio::test]
    async fn test_client_credentials() {
        let client = create_client(Some("SECRET"));
        client.transport.queue_json_response(200, &token_payload());

        let outcome = client
            .client_credentials(Some(vec!["openid", "email"].into()))
            .await
            .unwrap();
        assert_tokens(&outcome);

        let request = client.transport.get_last_request().unwrap();
        assert!(request.headers.contains_key("authorization"));
        let body = form_body(&request);
        assert_eq!(body.len(), 3);
        assert_eq!(body["client_id"], CLIENT_ID);
        assert_eq!(body["grant_type"], "client_credentials");
        assert_eq!(body["scope"], "openid email");
    }

    #[tokio::test]
    async fn test_refresh() {
        let client = create_client(Some("SECRET"));
        client.transport.queue_json_response(200, &token_payload());

        let outcome = client.refresh("eyJj3example").await.unwrap();
        assert_tokens(&outcome);

        let body = form_body(&client.transport.get_last_request().unwrap());
        assert_eq!(body.len(), 3);
        assert_eq!(body["grant_type"], "refresh_token");
        assert_eq!(body["refresh_token"], "eyJj3example");
    }

    #[tokio::test]
    async fn test_exchange_rejected() {
        let client = create_client(None);
        client
            .transport
            .queue_json_response(400, &json!({"error": "invalid_request"}));

        let outcome = client.exchange_code("code1", REDIRECT_URI).await.unwrap();

        assert!(outcome.is_rejected());
        let rejection = outcome.rejection().unwrap();
        assert_eq!(rejection.status, 400);
        assert_eq!(rejection.error_code(), Some("invalid_request"));
        assert!(outcome.ok().is_none());
    }

    #[tokio::test]
    async fn test_exchange_rejected_without_error_document() {
        let client = create_client(None);
        client.transport.queue_response(HttpResponse {
            status: 502,
            headers: HashMap::new(),
            body: "Bad Gateway".to_string(),
        });

        let outcome = client.refresh("eyJj3example").await.unwrap();
        assert_eq!(
            outcome.rejection(),
            Some(&Rejection {
                status: 502,
                error: None
            })
        );
    }

    #[tokio::test]
    async fn test_continuation_runs_only_on_success() {
        let client = create_client(None);
        client
            .transport
            .queue_json_response(200, &token_payload())
            .queue_json_response(400, &json!({"error": "invalid_grant"}));
        let calls = AtomicUsize::new(0);

        let granted = client
            .exchange_token_with(
                GrantType::AuthorizationCode,
                TokenParams::authorization_code("code1", REDIRECT_URI),
                |record| {
                    assert_eq!(record.access_token(), Some("eyJra1example"));
                    calls.fetch_add(1, Ordering::SeqCst);
                },
            )
            .await
            .unwrap();
        assert!(granted.is_granted());

        let rejected = client
            .exchange_token_with(
                GrantType::AuthorizationCode,
                TokenParams::authorization_code("code1", REDIRECT_URI),
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                },
            )
            .await
            .unwrap();
        assert!(rejected.is_rejected());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_on_success_is_an_error() {
        let client = create_client(None);
        client.transport.queue_response(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: "not json".to_string(),
        });

        let result = client.exchange_code("code1", REDIRECT_URI).await;
        assert!(matches!(
            result,
            Err(IdentityError::Protocol(ProtocolError::InvalidJson { .. }))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let client = create_client(None);

        let result = client.exchange_code("code1", REDIRECT_URI).await;
        assert!(matches!(result, Err(IdentityError::Network(_))));
    }

    #[tokio::test]
    async fn test_user_info_with_raw_token() {
        let client = create_client(None);
        client.transport.queue_json_response(200, &user_payload());

        let outcome = client.user_info("ACCESS_TOKEN").await.unwrap();
        let user = outcome.ok().unwrap();
        assert_eq!(user.sub(), Some("248289761001"));
        assert_eq!(user.name(), Some("Jane Doe"));
        assert_eq!(user.email(), Some("janedoe@example.com"));
        assert_eq!(user.phone_number_verified(), Some("true"));

        let request = client.transport.get_last_request().unwrap();
        assert_eq!(request.url, "https://auth.example.com/oauth2/userInfo");
        assert_eq!(request.headers.get("authorization").unwrap(), "Bearer ACCESS_TOKEN");
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_user_info_with_token_record() {
        let client = create_client(None);
        client
            .transport
            .queue_json_response(200, &token_payload())
            .queue_json_response(200, &user_payload())
            .queue_json_response(200, &user_payload());

        let record = client
            .exchange_code("code1", REDIRECT_URI)
            .await
            .unwrap()
            .ok()
            .unwrap();

        let user = client.user_info(&record).await.unwrap().ok().unwrap();
        assert_eq!(user.preferred_username(), Some("j.doe"));
        let from_record = client.transport.get_last_request().unwrap();

        client.user_info("eyJra1example").await.unwrap();
        let from_string = client.transport.get_last_request().unwrap();

        assert_eq!(
            from_record.headers.get("authorization").unwrap(),
            "Bearer eyJra1example"
        );
        assert_eq!(
            from_record.headers.get("authorization"),
            from_string.headers.get("authorization")
        );
    }

    #[tokio::test]
    async fn test_user_info_rejected() {
        let client = create_client(None);
        client
            .transport
            .queue_json_response(400, &json!({"error": "invalid_request"}));
        let calls = AtomicUsize::new(0);

        let outcome = client
            .user_info_with("ACCESS_TOKEN", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();

        assert_eq!(outcome.rejection().unwrap().error_code(), Some("invalid_request"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_user_info_continuation() {
        let client = create_client(None);
        client.transport.queue_json_response(200, &user_payload());
        let mut seen = None;

        client
            .user_info_with("ACCESS_TOKEN", |user| seen = user.sub().map(String::from))
            .await
            .unwrap();

        assert_eq!(seen.as_deref(), Some("248289761001"));
    }

    #[tokio::test]
    async fn test_user_info_without_access_token_is_rejected_by_provider() {
        let client = create_client(None);
        client
            .transport
            .queue_json_response(400, &json!({"error": "invalid_request"}));
        let record = TokenRecord::from_response(TokenResponse::default());

        let outcome = client.user_info(record).await.unwrap();

        assert_eq!(outcome.rejection().unwrap().status, 400);
        let requests = client.transport.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].headers.get("authorization").unwrap(), "Bearer ");
    }

    #[test]
    fn test_default_client_creation() {
        let config = identity_config()
            .client_id(CLIENT_ID)
            .domain(DOMAIN)
            .build()
            .unwrap();
        let client = IdentityClient::new(config);
        assert_eq!(client.config().credentials.client_id, CLIENT_ID);
    }
}
