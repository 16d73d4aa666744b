//! User Identity
//!
//! Claims returned by the OIDC UserInfo endpoint.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Value of a single claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimValue {
    /// Scalar claim. Booleans and numbers keep their JSON spelling.
    Text(String),
    /// Object claim, e.g. `address`.
    Nested(UserIdentity),
    /// Array claim.
    List(Vec<ClaimValue>),
}

impl ClaimValue {
    /// Convert a JSON value. `null` has no claim value.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::Text(s)),
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            Value::Number(n) => Some(Self::Text(n.to_string())),
            Value::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(map) => Some(Self::Nested(UserIdentity::from(map))),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&UserIdentity> {
        match self {
            Self::Nested(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ClaimValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Identity of the signed-in user.
///
/// Lookups never fail: a claim the provider did not return is `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct UserIdentity {
    claims: BTreeMap<String, ClaimValue>,
}

impl UserIdentity {
    /// Look up any claim.
    pub fn get(&self, claim: &str) -> Option<&ClaimValue> {
        self.claims.get(claim)
    }

    /// Look up a scalar claim.
    pub fn text(&self, claim: &str) -> Option<&str> {
        self.get(claim).and_then(ClaimValue::as_text)
    }

    /// Look up an object claim.
    pub fn nested(&self, claim: &str) -> Option<&UserIdentity> {
        self.get(claim).and_then(ClaimValue::as_nested)
    }

    pub fn contains(&self, claim: &str) -> bool {
        self.claims.contains_key(claim)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Iterate claims in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.claims.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn sub(&self) -> Option<&str> {
        self.text("sub")
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn given_name(&self) -> Option<&str> {
        self.text("given_name")
    }

    pub fn family_name(&self) -> Option<&str> {
        self.text("family_name")
    }

    pub fn preferred_username(&self) -> Option<&str> {
        self.text("preferred_username")
    }

    pub fn email(&self) -> Option<&str> {
        self.text("email")
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.text("phone_number")
    }

    pub fn email_verified(&self) -> Option<&str> {
        self.text("email_verified")
    }

    pub fn phone_number_verified(&self) -> Option<&str> {
        self.text("phone_number_verified")
    }
}

impl From<Map<String, Value>> for UserIdentity {
    fn from(map: Map<String, Value>) -> Self {
        let claims = map
            .into_iter()
            .filter_map(|(name, value)| ClaimValue::from_json(value).map(|v| (name, v)))
            .collect();
        Self { claims }
    }
}
