//! Static data sync layer
//!
//! Keeps a local SQLite mirror of the realm and champion documents and warms
//! an image cache with the champion art they reference.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │   Remote    │────▶│ SyncOrchestrator │────▶│   Storage   │
//! │ (realm,     │     │  (version check, │     │  (SQLite    │
//! │  champions) │     │   reset, insert) │     │   mirror)   │
//! └─────────────┘     └──────────────────┘     └─────────────┘
//!                        │            │
//!                        ▼            ▼
//!                 ┌─────────────┐  ┌─────────────┐
//!                 │  Notifier   │  │ ImageCache  │
//!                 │ (observers) │  │  (batches)  │
//!                 └─────────────┘  └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`orchestrator`]: The sync state machine
//! - [`version`]: Realm version parsing and the refresh decision
//! - [`remote`]: Remote data source trait
//! - [`client`]: HTTP implementation of the remote data source
//! - [`storage`]: Storage gateway trait
//! - [`store`]: SQLite implementation of the storage gateway
//! - [`image_cache`]: Bounded-batch image prefetching
//! - [`assets`]: Asset cache trait and on-disk implementation
//! - [`notifier`]: Change notification for observers
//! - [`types`]: Wire documents, stored records and asset URLs
//! - [`error`]: Error types

pub mod assets;
pub mod client;
pub mod error;
pub mod image_cache;
pub mod notifier;
pub mod orchestrator;
pub mod remote;
pub mod storage;
pub mod store;
pub mod types;
pub mod version;
