//! Authorization Redirect
//!
//! RFC 6749 Section 4.1.1 authorization request against the hosted UI.

use std::fmt;

use crate::core::FormParams;
use crate::types::{
    AuthorizationOptions, PkceMethod, PkceParams, ProviderEndpoints, ResponseType, Scope,
};

/// Authorization redirect URI builder.
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
    client_id: String,
    domain: String,
    redirect_uri: String,
    options: AuthorizationOptions,
}

impl AuthorizationRequest {
    /// Create a request with the required fields; `response_type` is `code`.
    pub fn new(
        client_id: impl Into<String>,
        domain: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            domain: domain.into(),
            redirect_uri: redirect_uri.into(),
            options: AuthorizationOptions::default(),
        }
    }

    /// Replace all optional fields.
    pub fn with_options(mut self, options: AuthorizationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.options.response_type = Some(response_type);
        self
    }

    pub fn scope(mut self, scope: impl Into<Scope>) -> Self {
        self.options.scope = Some(scope.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.options.state = Some(state.into());
        self
    }

    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.options.nonce = Some(nonce.into());
        self
    }

    pub fn identity_provider(mut self, identity_provider: impl Into<String>) -> Self {
        self.options.identity_provider = Some(identity_provider.into());
        self
    }

    pub fn idp_identifier(mut self, idp_identifier: impl Into<String>) -> Self {
        self.options.idp_identifier = Some(idp_identifier.into());
        self
    }

    pub fn code_challenge(mut self, challenge: impl Into<String>, method: PkceMethod) -> Self {
        self.options.code_challenge = Some(challenge.into());
        self.options.code_challenge_method = Some(method);
        self
    }

    /// Attach the challenge half of generated PKCE parameters.
    pub fn pkce(self, pkce: &PkceParams) -> Self {
        self.code_challenge(pkce.code_challenge.clone(), pkce.code_challenge_method)
    }

    fn params(&self) -> FormParams {
        let options = &self.options;
        FormParams::new()
            .required("client_id", self.client_id.as_str())
            .optional(
                "code_challenge_method",
                options.code_challenge_method.map(|m| m.as_str()),
            )
            .optional("code_challenge", options.code_challenge.as_deref())
            .optional("identity_provider", options.identity_provider.as_deref())
            .optional("idp_identifier", options.idp_identifier.as_deref())
            .optional("nonce", options.nonce.as_deref())
            .required("redirect_uri", self.redirect_uri.as_str())
            .required(
                "response_type",
                options.response_type.unwrap_or_default().as_str(),
            )
            .optional("scope", options.scope.as_ref().map(Scope::to_param))
            .optional("state", options.state.as_deref())
    }

    /// Render `https://{domain}/oauth2/authorize?...`.
    pub fn render(&self) -> String {
        format!(
            "{}?{}",
            ProviderEndpoints::for_domain(&self.domain).authorization_endpoint,
            self.params().encode()
        )
    }
}

impl fmt::Display for AuthorizationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
