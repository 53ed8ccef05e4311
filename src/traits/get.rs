//! Get trait for fetching single entities.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::client::NekosClient;
use crate::endpoints::Route;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// Implementors only name the route for a given id; fetching and decoding
/// are shared.
///
/// # Example
///
/// ```no_run
/// use nekosapi::{Get, Image, NekosClient};
///
/// # async fn example() -> nekosapi::Result<()> {
/// let client = NekosClient::from_env()?;
/// let image = Image::get(&client, 42).await?;
/// println!("{}", image.image_url);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Get: DeserializeOwned + Send + Sized {
    /// The ID type for this entity.
    type Id: Send + 'static;

    /// Route serving the entity with this id.
    fn route(id: Self::Id) -> Route;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the answer doesn't decode.
    async fn get(client: &NekosClient, id: Self::Id) -> Result<Self> {
        client.get(&Self::route(id).path(), None).await
    }

    /// Fetch the entity by ID, aborting when `cancel` fires.
    async fn get_with_cancel(
        client: &NekosClient,
        cancel: &CancellationToken,
        id: Self::Id,
    ) -> Result<Self> {
        client
            .get_with_cancel(cancel, &Self::route(id).path(), None)
            .await
    }
}
