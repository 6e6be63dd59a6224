//! services/api/src/lib.rs
//!
//! The document chat service: format adapters, completion backends and the HTTP layer
//! around the `doc_chat_core` crate.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
