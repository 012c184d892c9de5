//! # Item Store Core
//!
//! Runtime-agnostic logic for the item store service: the [`Item`](models::Item)
//! model, input validation, the error taxonomy, the [`ItemStore`](store::ItemStore)
//! abstraction and the [`ItemService`](service::ItemService) operations.
//!
//! This crate contains no tokio, sqlx, or HTTP dependencies. Storage backends
//! and transports live in the `item-store` crate.

pub mod error;
pub mod models;
pub mod service;
pub mod store;
