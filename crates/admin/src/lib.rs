//! Pet Haven Admin library.
//!
//! This crate provides the back-office functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Security
//!
//! This crate contains HIGH PRIVILEGE access:
//! - Full inventory management (create/update/delete listings)
//! - Object-store write credentials (media uploads)
//! - Account management (approve/reject/delete admin accounts)
//!
//! Only expose it on a private network or behind an authenticating proxy.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
