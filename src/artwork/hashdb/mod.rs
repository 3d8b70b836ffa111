//! Hash-database source: exact identification by CRC-32 against a
//! remote game database, with its own rate-limiting and retry
//! discipline.
//!
//! - `dto` - exact jeuInfos API shapes
//! - `client` - rate-limited, retrying HTTP client
//! - `adapter` - DTO-to-domain conversion, selection policies, and the
//!   [`crate::artwork::source::ArtworkSource`] impl

pub mod adapter;
pub mod client;
pub mod dto;

pub use adapter::{select_media_url, HashDbSource, SOURCE_ID};
pub use client::{HashDbClient, HashDbCredentials};
