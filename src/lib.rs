//! Nekos API client library.
//!
//! A Rust library for the [Nekos API](https://nekosapi.com) v3: image,
//! artist, character and tag metadata, plus binary image downloads.
//!
//! # Quick Start
//!
//! ```no_run
//! use nekosapi::{Get, Image, List, MemorySink, NekosClient, Query, Rating};
//!
//! #[tokio::main]
//! async fn main() -> nekosapi::Result<()> {
//!     // Only safe images unless a call asks otherwise
//!     let client = NekosClient::from_env()?.with_default_query(Query::safe());
//!
//!     // Search images
//!     let query = Query::new().tag(5).limit(10)?;
//!     let page = Image::list(&client, Some(&query)).await?;
//!     println!("Showing {} of {} images", page.len(), page.count);
//!
//!     // This call overrides the default rating
//!     let spicy = Query::new().rating(Rating::Suggestive);
//!     let random = nekosapi::get_random_images(&client, Some(&spicy)).await?;
//!
//!     // Download one into memory
//!     if let Some(image) = random.items.first() {
//!         let mut sink = MemorySink::new();
//!         client.save_image(image, &mut sink).await?;
//!         println!("Downloaded {} bytes", sink.bytes().len());
//!
//!         let same = Image::get(&client, image.id).await?;
//!         assert_eq!(same.id, image.id);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Query defaults
//!
//! Every request merges its [`Query`] with the client's default query. A key
//! given on the call replaces the default values for that key; keys only set
//! in the defaults are sent as-is. See [`query::resolve`].
//!
//! # Cancellation
//!
//! Dropping a request future aborts it. The `_with_cancel` variants take a
//! [`CancellationToken`] and return [`NekosError::Cancelled`] once it fires.
//!
//! # Configuration
//!
//! - `NEKOS_API_URL` (optional) - API domain (defaults to `https://api.nekosapi.com/v3`)

mod client;
mod download;
mod error;
mod models;
mod pagination;
mod traits;

pub mod endpoints;
pub mod query;

// Re-export core types
pub use client::NekosClient;
pub use download::{FileSink, ImageSink, MemorySink};
pub use endpoints::Route;
pub use error::{NekosError, Result};
pub use pagination::{Page, PaginationParams};
pub use query::{Query, Rating, Report};
pub use tokio_util::sync::CancellationToken;

// Re-export traits
pub use traits::{Get, List};

// Re-export models
pub use models::{Artist, Character, Color, Image, Tag, Verification};

// Re-export convenience functions
pub use models::{get_artist_images, get_character_images, get_tag_images};
pub use models::{
    get_image_artist, get_image_characters, get_image_tags, get_random_images, report_image,
};
