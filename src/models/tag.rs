//! Tag model and trait implementations.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::client::NekosClient;
use crate::endpoints::Route;
use crate::error::Result;
use crate::models::Image;
use crate::pagination::Page;
use crate::query::Query;
use crate::traits::{Get, List};

/// An image tag.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Numeric tag ID.
    pub id: u64,

    #[serde(default)]
    pub id_v2: Option<String>,

    pub name: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub description: String,

    /// Grouping the tag belongs to.
    #[serde(default)]
    pub sub: Option<String>,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub is_nsfw: bool,
}

impl Tag {
    /// Get images with this tag.
    pub async fn images(&self, client: &NekosClient, query: Option<&Query>) -> Result<Page<Image>> {
        get_tag_images(client, self.id, query).await
    }
}

impl Get for Tag {
    type Id = u64;

    fn route(id: u64) -> Route {
        Route::TagById(id)
    }
}

impl List for Tag {
    const ROUTE: Route = Route::Tags;
}

/// Get images with a tag.
#[tracing::instrument(skip(client))]
pub async fn get_tag_images(
    client: &NekosClient,
    tag_id: u64,
    query: Option<&Query>,
) -> Result<Page<Image>> {
    client.get(&Route::TagImages(tag_id).path(), query).await
}
