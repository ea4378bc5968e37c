//! RAW container access
//!
//! The [`RawBackend`] trait is the narrow surface the batch driver consumes;
//! [`RawLoaderBackend`] implements it with rawloader.

mod backend;
mod rawloader_backend;
pub mod preview;
pub mod types;

pub use backend::RawBackend;
pub use rawloader_backend::{RawContainer, RawLoaderBackend};
pub use types::{
    CameraMetadata, HistogramScale, PpmEncoding, PropertyList, RenderOptions, SensorBlock,
};
