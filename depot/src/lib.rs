//! # Depot - embedded in-process record store
//!
//! Depot keeps records (schemaless [Document]s) in named, in-memory
//! collections and tells interested code about every change as it happens.
//!
//! ## Key Features
//!
//! - **Embedded**: lives inside the calling process, nothing to run or connect to
//! - **Identifiers**: records get a collection-unique `id` unless they bring one
//! - **Watchers**: `*`, `add`, `remove` and `update` callbacks run synchronously
//!   on the mutating call, in a fixed order
//! - **Clean API**: handles over shared state, cloned freely across threads
//!
//! ## Quick Start
//!
//! ```rust
//! use depot::collection::CollectionEventListener;
//! use depot::{doc, Depot};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let depot = Depot::new();
//! let items = depot.create_collection("items")?;
//!
//! items.watch("*", CollectionEventListener::new(|event| {
//!     println!("{} on {}: {}", event.event_kind(), event.originator(), event.item());
//!     Ok(())
//! }))?;
//!
//! let mut record = items.insert(doc! { name: "a", qty: 2 })?;
//! record.put("qty", 3)?;
//! items.update(record)?;
//!
//! assert_eq!(items.find(&doc! { "id": 0 }).map(|r| r.get("qty")), Some(3.into()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - collections, documents and watchers
//! - [`common`] - field values, reserved names and utilities
//! - [`errors`] - error types and result definitions
//! - [`depot`] - the collection registry
//! - [`depot_builder`] - fluent depot construction
//! - [`depot_config`] - depot configuration

pub mod collection;
pub mod common;
pub mod depot;
pub mod depot_builder;
pub mod depot_config;
pub mod errors;

pub use collection::Document;
pub use common::Value;
pub use depot::Depot;
pub use depot_builder::DepotBuilder;
pub use depot_config::DepotConfig;
pub use errors::{DepotError, DepotResult, ErrorKind};
