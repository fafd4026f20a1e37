//! Storage layer
//!
//! Byte-level persistence for databases and the error taxonomy shared by
//! the whole core.
//!
//! ## Files
//!
//! Each database lives in its own file. The codec decides the byte format;
//! the logical layout (name, then dictionary) is the same for all codecs.

pub mod codec;
pub mod error;

pub use codec::{Codec, RecordMap};
pub use error::{ErrorKind, FlushFailure, StorageError, StorageResult};
