//! # giveaway-admin
//!
//! Admin back end for a prize-giveaway platform.
//!
//! Administrators log in, manage giveaway events and their prizes, and watch
//! user registrations arrive live. Event images are kept in a blob store;
//! the entries table can be exported as CSV.
//!
//! ## Architecture
//!
//! ```text
//! Admin panel (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)        ── RequireActiveAdmin (auth/)
//!     ├── WS Handler (ws/)            ── LiveViews per connection
//!     │
//!     ├── Event / Prize / Entry / Auth services (service/)
//!     ├── Live views: tables, counts, markers (realtime/)
//!     ├── ChangeBus (domain/)         ◄── LISTEN table_changes
//!     │
//!     ├── AdminStore + RangedQuery (store/) ── PostgreSQL
//!     └── BlobStore (storage/)        ── local media directory
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod realtime;
pub mod service;
pub mod storage;
pub mod store;
pub mod ws;
