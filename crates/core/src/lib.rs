//! Pet Haven Core - Shared types library.
//!
//! This crate provides common types used across all Pet Haven components:
//! - `storefront` - Public-facing pet listing site
//! - `admin` - Back-office for inventory and account management
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain logic - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, plus the pet
//!   and profile domain records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
