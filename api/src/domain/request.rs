use std::{slice, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Clone, Copy, Serialize, Debug, Deserialize, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
}
impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
    ];
}
impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported http method '{0}'")]
pub struct HttpMethodParseError(pub String);

impl FromStr for HttpMethod {
    type Err = HttpMethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            "PATCH" => Ok(HttpMethod::PATCH),
            _ => Err(HttpMethodParseError(s.to_string())),
        }
    }
}

/// A single header or query parameter row.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}
impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered key/value rows. Keys may repeat; order is preserved.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug, Default)]
pub struct KeyValues(pub Vec<KeyValue>);
impl KeyValues {
    /// Drops every row whose key is empty, keeping the order of the rest.
    pub fn without_empty_keys(&self) -> KeyValues {
        self.into_iter()
            .filter(|kv| !kv.key.is_empty())
            .map(|kv| (kv.key.clone(), kv.value.clone()))
            .collect()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl FromIterator<(String, String)> for KeyValues {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        KeyValues(iter.into_iter().map(|(k, v)| KeyValue::new(k, v)).collect())
    }
}

impl<'a> IntoIterator for &'a KeyValues {
    type Item = &'a KeyValue;
    type IntoIter = slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Editable form state for a request that has not been submitted yet.
///
/// The method is kept as free text so that an unsupported verb can be
/// rejected at submission time rather than at input time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub method: String,
    pub url: String,
    pub headers: KeyValues,
    pub params: KeyValues,
    pub body: String,
}
impl Default for RequestDraft {
    fn default() -> Self {
        Self::empty(HttpMethod::default())
    }
}
impl RequestDraft {
    pub fn empty(method: HttpMethod) -> Self {
        Self {
            method: method.to_string(),
            url: "".into(),
            headers: KeyValues::default(),
            params: KeyValues::default(),
            body: "".into(),
        }
    }

    /// Validates the draft and produces a request with a fresh id and timestamp.
    pub fn finalize(&self) -> Result<Request, ValidationError> {
        let method = HttpMethod::from_str(&self.method)
            .map_err(|e| ValidationError::InvalidMethod(e.0))?;
        Url::parse(self.url.trim()).map_err(|e| ValidationError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Request {
            id: Uuid::new_v4(),
            url: self.url.trim().to_string(),
            method,
            headers: self.headers.without_empty_keys(),
            params: self.params.without_empty_keys(),
            body: self.body.clone(),
            created_at: Utc::now(),
        })
    }
}
impl From<&Request> for RequestDraft {
    fn from(request: &Request) -> Self {
        Self {
            method: request.method.to_string(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            params: request.params.clone(),
            body: request.body.clone(),
        }
    }
}

/// A finalized request. Header and param rows never carry an empty key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    pub url: String,
    pub method: HttpMethod,
    pub headers: KeyValues,
    pub params: KeyValues,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
