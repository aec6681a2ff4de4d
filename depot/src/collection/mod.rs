//! Collections and their parts.
//!
//! A [Collection] owns three things behind one handle: an id allocator that
//! stamps every insert with an ordinal, an id-keyed record store, and an
//! event hub that runs watchers synchronously after each mutation.

mod collection_config;
mod depot_collection;
mod document;
mod event;
mod event_hub;
mod id_allocator;
mod record_store;

pub use collection_config::*;
pub use depot_collection::*;
pub use document::*;
pub use event::*;

pub(crate) use event_hub::EventHub;
pub(crate) use id_allocator::IdAllocator;
pub(crate) use record_store::RecordStore;
