//! Pagination utilities for Nekos API responses.

use serde::{Deserialize, Serialize};

/// A page of results from the Nekos API.
///
/// Every list endpoint answers with this envelope: the items on the page
/// and the total number of items matching the query on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// The items on this page.
    #[serde(default)]
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    #[serde(default)]
    pub count: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
        }
    }
}

impl<T> Page<T> {
    /// Create a new page from items and the server-reported total.
    #[must_use]
    pub fn new(items: Vec<T>, count: u64) -> Self {
        Self { items, count }
    }

    /// Whether items remain after this page, given the offset it started at.
    #[must_use]
    pub fn has_more(&self, offset: u64) -> bool {
        !self.items.is_empty() && offset + (self.items.len() as u64) < self.count
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Pagination parameters for list requests.
///
/// `limit` must be between 1 and 100 (the API defaults to 100), `offset`
/// defaults to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl PaginationParams {
    /// Pagination params for a specific window.
    #[must_use]
    pub fn new(limit: u32, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}
