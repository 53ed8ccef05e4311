//! Query parameters and their merge with client defaults.
//!
//! Every request carries a [`Query`], a multi-map from parameter name to an
//! ordered list of values (`tag=1&tag=2`). Before a request goes out, the
//! per-call query is merged with the client's default query by [`resolve`]:
//! a key present in the per-call query replaces the default values for that
//! key entirely, keys only present in the defaults are carried over as-is.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{NekosError, Result};
use crate::pagination::PaginationParams;

/// Largest page size the API accepts.
pub const MAX_LIMIT: u32 = 100;

/// URL query multi-map.
///
/// Keys are kept sorted so the encoded form is deterministic; the order of
/// values within a key is the order they were added in.
///
/// # Example
///
/// ```
/// use nekosapi::{Query, Rating};
///
/// let query = Query::new().rating(Rating::Safe).tag(5).tag(12);
/// assert_eq!(query.encode(), "rating=safe&tag=5&tag=12");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    params: BTreeMap<String, Vec<String>>,
}

impl Query {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The `rating=safe` preset.
    #[must_use]
    pub fn safe() -> Self {
        Self::new().rating(Rating::Safe)
    }

    /// Append a value to `key`, keeping any values already present.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().push(value.into());
    }

    /// Replace every value of `key`, returning the previous ones.
    pub fn insert<I, V>(&mut self, key: impl Into<String>, values: I) -> Option<Vec<String>>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.params
            .insert(key.into(), values.into_iter().map(Into::into).collect())
    }

    /// Remove `key` and return its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.params.remove(key)
    }

    /// Values of `key`, in insertion order.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.params.get(key).map(Vec::as_slice)
    }

    /// First value of `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over keys in sorted order together with their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Encode as `application/x-www-form-urlencoded`, without a leading `?`.
    ///
    /// Keys with no values produce nothing.
    pub fn encode(&self) -> String {
        encode_pairs(self.iter())
    }

    /// Builder form of [`Query::append`].
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.append(key, value.to_string());
        self
    }

    /// Filter by rating. May be repeated.
    #[must_use]
    pub fn rating(self, rating: Rating) -> Self {
        self.param("rating", rating.as_str())
    }

    /// Filter by tag id. May be repeated.
    #[must_use]
    pub fn tag(self, id: u64) -> Self {
        self.param("tag", id)
    }

    /// Filter by character id. May be repeated.
    #[must_use]
    pub fn character(self, id: u64) -> Self {
        self.param("character", id)
    }

    /// Filter by artist id.
    #[must_use]
    pub fn artist(mut self, id: u64) -> Self {
        self.insert("artist", [id.to_string()]);
        self
    }

    /// Free text search.
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.insert("search", [text]);
        self
    }

    /// Page size, between 1 and [`MAX_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`NekosError::InvalidParameter`] if `limit` is out of range.
    pub fn limit(mut self, limit: u32) -> Result<Self> {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(NekosError::InvalidParameter {
                name: "limit",
                value: limit.to_string(),
                reason: "must be between 1 and 100",
            });
        }
        self.insert("limit", [limit.to_string()]);
        Ok(self)
    }

    /// Number of items to skip.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.insert("offset", [offset.to_string()]);
        self
    }

    /// Apply `limit` and `offset` from pagination params, leaving unset ones alone.
    ///
    /// # Errors
    ///
    /// Returns [`NekosError::InvalidParameter`] if the limit is out of range.
    pub fn with_pagination(self, params: PaginationParams) -> Result<Self> {
        let query = match params.limit {
            Some(limit) => self.limit(limit)?,
            None => self,
        };
        Ok(match params.offset {
            Some(offset) => query.offset(offset),
            None => query,
        })
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.append(key, value);
        }
        query
    }
}

impl From<BTreeMap<String, Vec<String>>> for Query {
    fn from(params: BTreeMap<String, Vec<String>>) -> Self {
        Self { params }
    }
}

impl From<HashMap<String, Vec<String>>> for Query {
    fn from(params: HashMap<String, Vec<String>>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }
}

/// Merge a per-request query with the client defaults and encode the result.
///
/// For each key, the request's values win outright if the key is present
/// there (even with an empty list); otherwise the default values are used.
/// Neither input is modified: the merge only borrows from both.
///
/// ```
/// use nekosapi::{query::resolve, Query};
///
/// let defaults = Query::new().param("oh", "my").param("oh", "god");
/// let request = Query::new().param("oh", "hello").param("oh", "there");
/// assert_eq!(resolve(Some(&request), Some(&defaults)), "oh=hello&oh=there");
/// ```
pub fn resolve(request: Option<&Query>, defaults: Option<&Query>) -> String {
    match (request, defaults) {
        (None, None) => String::new(),
        (Some(query), None) | (None, Some(query)) => query.encode(),
        (Some(request), Some(defaults)) => {
            let mut merged: BTreeMap<&str, &[String]> = defaults.iter().collect();
            merged.extend(request.iter());
            encode_pairs(merged)
        }
    }
}

fn encode_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in pairs {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// Content rating of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Safe,
    Suggestive,
    Borderline,
    Explicit,
}

impl Rating {
    /// Wire name of the rating.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Safe => "safe",
            Rating::Suggestive => "suggestive",
            Rating::Borderline => "borderline",
            Rating::Explicit => "explicit",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image report sent to `POST /images/report`.
///
/// The API identifies the reported image either by id or by its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Id(u64),
    Url(String),
}

impl From<Report> for Query {
    fn from(report: Report) -> Self {
        match report {
            Report::Id(id) => Query::new().param("id", id),
            Report::Url(url) => Query::new().param("url", url),
        }
    }
}
