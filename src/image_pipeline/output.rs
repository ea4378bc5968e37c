//! Output writing module
//!
//! Encoders for every artifact the driver can produce: TIFF and DNG through
//! the tiff crate, PPM, CSV histograms and JSON metadata dumps.

mod writer;
mod standard_tiff_writer;
pub mod histogram;
pub mod metadata;
pub mod ppm_writer;

pub use writer::{DngInfo, TiffWriter};
pub use standard_tiff_writer::StandardTiffWriter;
pub use histogram::write_histogram;
pub use metadata::write_metadata;
pub use ppm_writer::write_ppm;
