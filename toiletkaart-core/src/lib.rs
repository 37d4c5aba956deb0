//! Core types and classification engine for the toiletkaart public toilet map.

/// Visibility classification of facilities for a UI snapshot.
pub mod classify;
/// Predicate set deciding which facilities match the active filters.
pub mod filter;
/// Time-of-day parsing and the open/closed window check.
pub mod hours;
/// Domain models and identifiers shared by all providers.
pub mod model;
/// Registry for plugging municipality datasets into the service.
pub mod plugin;
/// Traits describing the provider interfaces.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;

pub use classify::*;
pub use filter::*;
pub use hours::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;
