//! Transport contract for the clinic core.
//!
//! The core never talks to storage directly. It fetches collections and
//! records by entity name and submits mutations through a [`Transport`], then
//! relies on cache invalidation for freshness.
//!
//! # Architecture
//!
//! - `transport.rs` - The `Transport` trait
//! - `response.rs` - Response envelope and operations
//! - `memory.rs` - In-memory backend with unique constraints
//! - `cache.rs` - Query cache with write invalidation
//! - `decode.rs` - Typed decoding of record collections
//! - `error.rs` - Error types with status codes

mod cache;
mod decode;
mod error;
mod memory;
mod response;
mod transport;

pub use cache::CachingClient;
pub use decode::{decode_records, encode_record};
pub use error::{Result, TransportError};
pub use memory::InMemoryTransport;
pub use response::{ApiResponse, Operation};
pub use transport::Transport;
