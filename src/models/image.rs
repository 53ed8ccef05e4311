//! Image model and trait implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, TimestampSecondsWithFrac};

use crate::client::NekosClient;
use crate::endpoints::Route;
use crate::error::Result;
use crate::models::{Artist, Character, Tag};
use crate::pagination::Page;
use crate::query::{Query, Rating, Report};
use crate::traits::{Get, List};

/// An image and its metadata.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Numeric image ID.
    pub id: u64,

    /// Image ID in the older string format.
    #[serde(default)]
    pub id_v2: Option<String>,

    /// URL of the full-size image.
    pub image_url: String,

    /// URL of a smaller sample of the image.
    #[serde(default)]
    pub sample_url: Option<String>,

    /// Size of the full image in bytes.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub image_size: u64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub image_width: u32,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub image_height: u32,

    #[serde(default)]
    pub sample_size: Option<u64>,
    #[serde(default)]
    pub sample_width: Option<u32>,
    #[serde(default)]
    pub sample_height: Option<u32>,

    /// Where the image was originally posted.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_id: Option<u64>,

    pub rating: Rating,

    #[serde(default)]
    pub verification: Verification,

    #[serde(default)]
    pub hash_md5: Option<String>,
    #[serde(default)]
    pub hash_perceptual: Option<String>,

    #[serde(default)]
    pub color_dominant: Option<Color>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub color_palette: Vec<Color>,

    /// Duration in seconds, for animated images.
    #[serde(default)]
    pub duration: Option<f64>,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub is_original: bool,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub is_screenshot: bool,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub is_flagged: bool,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub is_animated: bool,

    #[serde(default)]
    pub artist: Option<Artist>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Creation time, sent by the API as fractional epoch seconds.
    #[serde_as(as = "Option<TimestampSecondsWithFrac<f64>>")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde_as(as = "Option<TimestampSecondsWithFrac<f64>>")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Moderation state of an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    #[default]
    Unverified,
    Verified,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// An RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub fn red(&self) -> u8 {
        self.0[0]
    }

    pub fn green(&self) -> u8 {
        self.0[1]
    }

    pub fn blue(&self) -> u8 {
        self.0[2]
    }

    /// CSS-style hex notation, e.g. `#ff8000`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

impl Image {
    /// Whether the API has a sample for this image.
    pub fn has_sample(&self) -> bool {
        self.sample_url.is_some()
    }

    /// Get the artist of this image.
    pub async fn fetch_artist(&self, client: &NekosClient) -> Result<Artist> {
        get_image_artist(client, self.id).await
    }

    /// Get the characters appearing in this image.
    pub async fn fetch_characters(&self, client: &NekosClient) -> Result<Page<Character>> {
        get_image_characters(client, self.id, None).await
    }

    /// Get the tags of this image.
    pub async fn fetch_tags(&self, client: &NekosClient) -> Result<Page<Tag>> {
        get_image_tags(client, self.id, None).await
    }
}

impl Get for Image {
    type Id = u64;

    fn route(id: u64) -> Route {
        Route::ImageById(id)
    }
}

impl List for Image {
    const ROUTE: Route = Route::Images;
}

/// Get random images matching the query.
#[tracing::instrument(skip(client))]
pub async fn get_random_images(client: &NekosClient, query: Option<&Query>) -> Result<Page<Image>> {
    client.get(&Route::RandomImages.path(), query).await
}

/// Report an image. The answer body is ignored.
#[tracing::instrument(skip(client))]
pub async fn report_image(client: &NekosClient, report: Report) -> Result<()> {
    let route = Route::ReportImage;
    client
        .send(route.method(), &route.path(), Some(&Query::from(report)))
        .await
}

/// Get the artist of an image.
#[tracing::instrument(skip(client))]
pub async fn get_image_artist(client: &NekosClient, image_id: u64) -> Result<Artist> {
    client.get(&Route::ImageArtist(image_id).path(), None).await
}

/// Get the characters appearing in an image.
#[tracing::instrument(skip(client))]
pub async fn get_image_characters(
    client: &NekosClient,
    image_id: u64,
    query: Option<&Query>,
) -> Result<Page<Character>> {
    client
        .get(&Route::ImageCharacters(image_id).path(), query)
        .await
}

/// Get the tags of an image.
#[tracing::instrument(skip(client))]
pub async fn get_image_tags(
    client: &NekosClient,
    image_id: u64,
    query: Option<&Query>,
) -> Result<Page<Tag>> {
    client.get(&Route::ImageTags(image_id).path(), query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_json(id: u64, image_url: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "id_v2": "aBcD1234",
            "image_url": image_url,
            "sample_url": null,
            "image_size": 2048,
            "image_width": 640,
            "image_height": 480,
            "source": "https://example.com/post/1",
            "rating": "safe",
            "verification": "verified",
            "hash_md5": "d41d8cd98f00b204e9800998ecf8427e",
            "color_dominant": [255, 128, 0],
            "color_palette": [[0, 0, 0], [255, 255, 255]],
            "is_original": true,
            "is_animated": false,
            "artist": null,
            "characters": [],
            "tags": [{"id": 1, "name": "catgirl", "description": "Girls with cat ears", "is_nsfw": false}],
            "created_at": 1700000000.5,
            "updated_at": 1700000100.0
        })
    }

    #[test]
    fn test_image_deserialize() {
        let image: Image = serde_json::from_value(image_json(7, "https://cdn.example/7.webp"))
            .expect("Failed to deserialize");
        assert_eq!(image.id, 7);
        assert_eq!(image.rating, Rating::Safe);
        assert_eq!(image.verification, Verification::Verified);
        assert_eq!(image.color_dominant.map(|c| c.to_hex()).as_deref(), Some("#ff8000"));
        assert_eq!(image.color_palette.len(), 2);
        assert_eq!(image.tags[0].name, "catgirl");
        assert!(image.is_original);
        assert!(!image.has_sample());

        let created = image.created_at.expect("created_at");
        assert_eq!(created.timestamp(), 1_700_000_000);
        assert_eq!(created.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_image_minimal() {
        let json = r#"{"id": 1, "image_url": "https://cdn.example/1.png", "rating": "explicit"}"#;
        let image: Image = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(image.rating, Rating::Explicit);
        assert_eq!(image.verification, Verification::Unverified);
        assert!(image.artist.is_none());
        assert!(image.created_at.is_none());
        assert!(image.color_palette.is_empty());
    }

    #[test]
    fn test_image_null_fields_default() {
        let json = r#"{
            "id": 2, "image_url": "u", "rating": "safe",
            "image_size": null, "image_width": null, "image_height": null,
            "color_palette": null, "is_animated": null, "characters": null, "tags": null
        }"#;
        let image: Image = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!((image.image_size, image.image_width, image.image_height), (0, 0, 0));
        assert!(image.color_palette.is_empty());
        assert!(!image.is_animated);
        assert!(image.characters.is_empty() && image.tags.is_empty());
    }

    #[test]
    fn test_unknown_verification() {
        let json = r#"{"id": 1, "image_url": "u", "rating": "safe", "verification": "pending"}"#;
        let image: Image = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(image.verification, Verification::Unknown);
    }

    #[test]
    fn test_image_rejects_wrong_shape() {
        let json = r#"{"id": "seven", "image_url": "u", "rating": "safe"}"#;
        assert!(serde_json::from_str::<Image>(json).is_err());
    }

    #[test]
    fn test_color_channels() {
        let color = Color([1, 2, 3]);
        assert_eq!((color.red(), color.green(), color.blue()), (1, 2, 3));
        assert_eq!(color.to_hex(), "#010203");
    }

    #[test]
    fn test_image_routes() {
        assert_eq!(<Image as Get>::route(3), Route::ImageById(3));
        assert_eq!(<Image as List>::ROUTE, Route::Images);
    }
}
