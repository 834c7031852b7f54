//! Route handler modules for the mood-web API.

pub mod comments;
pub mod entries;
pub mod health;
pub mod images;
pub mod moods;
pub mod page;
