//! WebSocket layer: connection handling, message routing, live views.
//!
//! The WebSocket endpoint at `/ws` carries the live entries table and the
//! dashboard counts. Clients open and navigate views with commands; the
//! server pushes snapshots as the change feed moves.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
