//! List trait for fetching collections of entities.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::client::NekosClient;
use crate::endpoints::Route;
use crate::error::Result;
use crate::pagination::Page;
use crate::query::{Query, MAX_LIMIT};

/// Maximum pages to fetch in `list_all` (safety limit).
const MAX_PAGES: u32 = 1000;

/// List/filter entities with pagination support.
///
/// The query is merged with the client's default query; `limit` and
/// `offset` select the window.
///
/// # Example
///
/// ```no_run
/// use nekosapi::{Character, List, NekosClient, Query};
///
/// # async fn example() -> nekosapi::Result<()> {
/// let client = NekosClient::from_env()?;
///
/// // Fetch a single page
/// let page = Character::list(&client, Some(&Query::new().limit(10)?)).await?;
/// println!("{} of {}", page.len(), page.count);
///
/// // Fetch everything
/// let all = Character::list_all(&client, &Query::new()).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait List: DeserializeOwned + Send + Sized {
    /// Route listing the entities.
    const ROUTE: Route;

    /// List entities matching the query (single page).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the answer doesn't decode.
    async fn list(client: &NekosClient, query: Option<&Query>) -> Result<Page<Self>> {
        client.get(&Self::ROUTE.path(), query).await
    }

    /// List entities matching the query, aborting when `cancel` fires.
    async fn list_with_cancel(
        client: &NekosClient,
        cancel: &CancellationToken,
        query: Option<&Query>,
    ) -> Result<Page<Self>> {
        client
            .get_with_cancel(cancel, &Self::ROUTE.path(), query)
            .await
    }

    /// List all entities matching the query, walking `offset` in pages of 100.
    ///
    /// Stops once the server-reported count is reached or a page comes back
    /// empty. Any `limit`/`offset` in `query` is overridden.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(client: &NekosClient, query: &Query) -> Result<Vec<Self>> {
        let mut all_items = Vec::new();
        let mut offset = 0;

        for _ in 0..MAX_PAGES {
            let page_query = query.clone().limit(MAX_LIMIT)?.offset(offset);
            let page = Self::list(client, Some(&page_query)).await?;

            let has_more = page.has_more(offset);
            offset += page.len() as u64;
            all_items.extend(page.items);

            if !has_more {
                return Ok(all_items);
            }
        }

        tracing::warn!(
            "Reached pagination limit of {} pages, stopping",
            MAX_PAGES
        );
        Ok(all_items)
    }
}
