//! Artist model and trait implementations.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::client::NekosClient;
use crate::endpoints::Route;
use crate::error::Result;
use crate::models::Image;
use crate::pagination::Page;
use crate::query::Query;
use crate::traits::{Get, List};

/// An artist credited for images.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    /// Numeric artist ID.
    pub id: u64,

    #[serde(default)]
    pub id_v2: Option<String>,

    pub name: String,

    /// Other names the artist is known by.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Profile picture URL.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Links to the artist's pages.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub links: Vec<String>,

    /// Whether reposting the artist's work is allowed.
    #[serde(default)]
    pub policy_repost: Option<String>,
    /// Whether the artist must be credited.
    #[serde(default)]
    pub policy_credit: Option<String>,
    /// Whether the artist's work may be used for AI training.
    #[serde(default)]
    pub policy_ai: Option<String>,
}

impl Artist {
    /// Get images by this artist.
    pub async fn images(&self, client: &NekosClient, query: Option<&Query>) -> Result<Page<Image>> {
        get_artist_images(client, self.id, query).await
    }
}

impl Get for Artist {
    type Id = u64;

    fn route(id: u64) -> Route {
        Route::ArtistById(id)
    }
}

impl List for Artist {
    const ROUTE: Route = Route::Artists;
}

/// Get images by an artist.
#[tracing::instrument(skip(client))]
pub async fn get_artist_images(
    client: &NekosClient,
    artist_id: u64,
    query: Option<&Query>,
) -> Result<Page<Image>> {
    client
        .get(&Route::ArtistImages(artist_id).path(), query)
        .await
}
