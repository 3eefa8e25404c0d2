//! Core wire types for the gRPC codec.
//!
//! This crate holds the pieces of the codec that know nothing about message
//! encodings or headers:
//!
//! ## Modules
//!
//! - `error`: gRPC status codes and the codec error type
//! - `frame`: Length-prefixed message framing
//! - `limits`: Message size limits

mod error;
mod frame;
mod limits;

pub use error::*;
pub use frame::*;
pub use limits::*;
