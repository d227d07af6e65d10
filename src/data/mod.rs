//! Data acquisition: the remote snapshot source and name normalization.

pub mod csse;
pub mod normalize;

pub use csse::CsseClient;
