//! Decoders and encoders for binary cave survey formats.
//!
//! Flowstone reads Survex `.3d` image files into a [`graph::StationGraph`] of
//! stations and legs, and reads and writes PocketTopo `.top` files as
//! [`pockettopo::Document`] values.
//!
//! Start with [`survex::load`] or [`pockettopo::load`]. Both decode from a
//! slice; `load_reader` variants drain a reader first. Decoding either
//! succeeds completely or fails with an [`Error`] naming the byte offset and
//! the record being decoded.
//!
//! The library logs through [`tracing`] and never installs a subscriber.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `serde`: derive `Serialize` and `Deserialize` for the data model.

pub mod cursor;
pub mod error;
pub mod graph;
pub mod pockettopo;
pub mod survex;

pub use error::Error;
