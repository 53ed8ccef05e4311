//! Nekos API model types.

mod artist;
mod character;
mod image;
mod tag;

pub use artist::*;
pub use character::*;
pub use image::*;
pub use tag::*;
