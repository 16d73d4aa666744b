//! Form Parameters
//!
//! Ordered `(key, optional value)` pairs serialized as
//! `application/x-www-form-urlencoded`. Absent values produce no key at all.

use url::form_urlencoded;

/// Ordered parameter list for query strings and form bodies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormParams {
    pairs: Vec<(&'static str, Option<String>)>,
}

impl FormParams {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter that is always present.
    pub fn required(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((key, Some(value.into())));
        self
    }

    /// Append a parameter that is emitted only when `value` is `Some`.
    pub fn optional(mut self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        self.pairs.push((key, value.map(Into::into)));
        self
    }

    /// Iterate over the present pairs, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
    }

    /// Number of present pairs.
    pub fn len(&self) -> usize {
        self.present().count()
    }

    /// Whether no pair is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode the present pairs.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.present())
            .finish()
    }
}
