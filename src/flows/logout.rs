//! Logout Redirect
//!
//! Signs the user out of the hosted UI, optionally sending them to a
//! sign-out page or back through sign-in.

use std::fmt;

use crate::core::FormParams;
use crate::types::{LogoutOptions, ProviderEndpoints, ResponseType, Scope};

/// Logout redirect URI builder.
#[derive(Clone, Debug)]
pub struct LogoutRequest {
    client_id: String,
    domain: String,
    options: LogoutOptions,
}

impl LogoutRequest {
    pub fn new(client_id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            domain: domain.into(),
            options: LogoutOptions::default(),
        }
    }

    /// Replace all optional fields.
    pub fn with_options(mut self, options: LogoutOptions) -> Self {
        self.options = options;
        self
    }

    pub fn logout_uri(mut self, logout_uri: impl Into<String>) -> Self {
        self.options.logout_uri = Some(logout_uri.into());
        self
    }

    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.options.redirect_uri = Some(redirect_uri.into());
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

    fn params(&self) -> FormParams {
        let options = &self.options;
        FormParams::new()
            .required("client_id", self.client_id.as_str())
            .optional("logout_uri", options.logout_uri.as_deref())
            .optional("redirect_uri", options.redirect_uri.as_deref())
            .optional("response_type", options.response_type.map(|r| r.as_str()))
            .optional("scope", options.scope.as_ref().map(Scope::to_param))
            .optional("state", options.state.as_deref())
    }

    /// Render `https://{domain}/logout?...`.
    pub fn render(&self) -> String {
        format!(
            "{}?{}",
            ProviderEndpoints::for_domain(&self.domain).logout_endpoint,
            self.params().encode()
        )
    }
}

impl fmt::Display for LogoutRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn pairs(uri: &str) -> Vec<(String, String)> {
        Url::parse(uri).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn test_client_id_only() {
        let uri = LogoutRequest::new("client1", "auth.example.com").render();
        let parsed = Url::parse(&uri).unwrap();

        assert_eq!(parsed.scheme(), "https");
        assert_eq!(parsed.host_str(), Some("auth.example.com"));
        assert_eq!(parsed.path(), "/logout");
        assert!(uri.starts_with(&format!(
            "{}?",
            ProviderEndpoints::for_domain("auth.example.com").logout_endpoint
        )));
        assert_eq!(
            pairs(&uri),
            vec![("client_id".to_string(), "client1".to_string())]
        );
    }

    #[test]
    fn test_sign_out_page() {
        let uri = LogoutRequest::new("client1", "auth.example.com")
            .logout_uri("https://www.example.com/signed-out")
            .render();

        assert_eq!(
            uri,
            "https://auth.example.com/logout?client_id=client1\
             &logout_uri=https%3A%2F%2Fwww.example.com%2Fsigned-out"
        );
    }

    #[test]
    fn test_sign_back_in() {
        let uri = LogoutRequest::new("client1", "auth.example.com")
            .with_options(LogoutOptions {
                redirect_uri: Some("https://www.example.com/auth/callback".to_string()),
                response_type: Some(ResponseType::Code),
                scope: Some(vec!["openid", "profile"].into()),
                state: Some("STATE".to_string()),
                ..Default::default()
            })
            .render();

        let params = pairs(&uri);
        assert_eq!(params.len(), 5);
        assert!(params.contains(&(
            "redirect_uri".to_string(),
            "https://www.example.com/auth/callback".to_string()
        )));
        assert!(params.contains(&("response_type".to_string(), "code".to_string())));
        assert!(params.contains(&("scope".to_string(), "openid profile".to_string())));
        assert!(params.contains(&("state".to_string(), "STATE".to_string())));
        assert!(!uri.contains("logout_uri"));
    }
}
