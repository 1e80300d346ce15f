//! Core types for Pet Haven.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod pet;
pub mod profile;
pub mod species;

pub use email::{Email, EmailError};
pub use id::*;
pub use pet::{ColorVariant, Pet, PriceType, legacy_media_mirror};
pub use profile::{Profile, ProfileRole};
pub use species::Species;
