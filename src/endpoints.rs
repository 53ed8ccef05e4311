//! Nekos API route table.
//!
//! Paths are relative to the client domain, which already carries the `/v3`
//! prefix.

use reqwest::Method;

/// Default API domain.
pub const DEFAULT_DOMAIN: &str = "https://api.nekosapi.com/v3";

/// Endpoints of the Nekos API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET /images` - multiple images.
    Images,
    /// `GET /images/random` - multiple random images.
    RandomImages,
    /// `POST /images/report` - no content.
    ReportImage,
    /// `GET /images/tags` - multiple tags.
    Tags,
    /// `GET /images/tags/{id}` - single tag.
    TagById(u64),
    /// `GET /images/tags/{id}/images` - multiple images.
    TagImages(u64),
    /// `GET /images/{id}` - single image.
    ImageById(u64),
    /// `GET /images/{id}/artist` - single artist.
    ImageArtist(u64),
    /// `GET /images/{id}/characters` - multiple characters.
    ImageCharacters(u64),
    /// `GET /images/{id}/tags` - multiple tags.
    ImageTags(u64),
    /// `GET /artists` - multiple artists.
    Artists,
    /// `GET /artists/{id}` - single artist.
    ArtistById(u64),
    /// `GET /artists/{id}/images` - multiple images.
    ArtistImages(u64),
    /// `GET /characters` - multiple characters.
    Characters,
    /// `GET /characters/{id}` - single character.
    CharacterById(u64),
    /// `GET /characters/{id}/images` - multiple images.
    CharacterImages(u64),
}

impl Route {
    /// Path of the route, to be appended to the client domain.
    pub fn path(&self) -> String {
        match *self {
            Route::Images => "/images".to_string(),
            Route::RandomImages => "/images/random".to_string(),
            Route::ReportImage => "/images/report".to_string(),
            Route::Tags => "/images/tags".to_string(),
            Route::TagById(id) => format!("/images/tags/{id}"),
            Route::TagImages(id) => format!("/images/tags/{id}/images"),
            Route::ImageById(id) => format!("/images/{id}"),
            Route::ImageArtist(id) => format!("/images/{id}/artist"),
            Route::ImageCharacters(id) => format!("/images/{id}/characters"),
            Route::ImageTags(id) => format!("/images/{id}/tags"),
            Route::Artists => "/artists".to_string(),
            Route::ArtistById(id) => format!("/artists/{id}"),
            Route::ArtistImages(id) => format!("/artists/{id}/images"),
            Route::Characters => "/characters".to_string(),
            Route::CharacterById(id) => format!("/characters/{id}"),
            Route::CharacterImages(id) => format!("/characters/{id}/images"),
        }
    }

    /// HTTP method the route expects.
    pub fn method(&self) -> Method {
        match self {
            Route::ReportImage => Method::POST,
            _ => Method::GET,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}
