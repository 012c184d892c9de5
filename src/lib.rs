//! # Item Store
//!
//! A small HTTP service exposing create/read/update/delete operations over a
//! single `items` table, with a health check that reports store connectivity.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌─────────────┐   ┌────────────┐
//! │   HTTP   │──▶│ ItemService │──▶│  ItemStore  │──▶│ PostgreSQL │
//! │  (axum)  │   │ (validate)  │   │  (PgStore)  │   │  (PgPool)  │
//! └──────────┘   └─────────────┘   └─────────────┘   └────────────┘
//! ```
//!
//! The domain types, [`ItemService`](item_store_core::service::ItemService)
//! and the in-memory store live in the `item-store-core` crate.
//!
//! ## Quick Start
//!
//! ```bash
//! itemd init                    # create the items table
//! itemd serve                   # listen on $PORT (default 3001)
//! itemd serve --memory          # no database, data lost on exit
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Defaults, TOML file and environment overrides |
//! | [`logging`] | Tracing subscriber setup |
//! | [`db`] | Connection pool |
//! | [`migrate`] | Schema creation |
//! | [`pg_store`] | PostgreSQL `ItemStore` |
//! | [`server`] | HTTP API |

pub mod config;
pub mod db;
pub mod logging;
pub mod migrate;
pub mod pg_store;
pub mod server;
