//! Character model and trait implementations.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::client::NekosClient;
use crate::endpoints::Route;
use crate::error::Result;
use crate::models::Image;
use crate::pagination::Page;
use crate::query::Query;
use crate::traits::{Get, List};

/// A character appearing in images.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Numeric character ID.
    pub id: u64,

    #[serde(default)]
    pub id_v2: Option<String>,

    pub name: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Known ages of the character.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub ages: Vec<u32>,

    /// Height in centimeters.
    #[serde(default)]
    pub height: Option<u32>,
    /// Weight in kilograms.
    #[serde(default)]
    pub weight: Option<u32>,

    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub occupations: Vec<String>,
}

impl Character {
    /// Get images of this character.
    pub async fn images(&self, client: &NekosClient, query: Option<&Query>) -> Result<Page<Image>> {
        get_character_images(client, self.id, query).await
    }
}

impl Get for Character {
    type Id = u64;

    fn route(id: u64) -> Route {
        Route::CharacterById(id)
    }
}

impl List for Character {
    const ROUTE: Route = Route::Characters;
}

/// Get images of a character.
#[tracing::instrument(skip(client))]
pub async fn get_character_images(
    client: &NekosClient,
    character_id: u64,
    query: Option<&Query>,
) -> Result<Page<Image>> {
    client
        .get(&Route::CharacterImages(character_id).path(), query)
        .await
}
