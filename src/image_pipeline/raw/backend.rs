use std::io::Read;
use std::path::Path;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::{HistogramScale, PpmEncoding, RenderOptions};

/// Decoding and output library the batch driver runs on.
///
/// `load_*` calls materialize one block of the container; the `dump_*` calls
/// write one artifact to `dest` from blocks loaded earlier. A dump never
/// touches any path other than `dest`.
pub trait RawBackend {
    type Container;

    fn open_container(&self, input: &mut dyn Read) -> Result<Self::Container>;

    fn load_embedded_preview(&self, container: &mut Self::Container) -> Result<()>;
    fn load_property_list(&self, container: &mut Self::Container) -> Result<()>;
    fn load_camera_metadata(&self, container: &mut Self::Container) -> Result<()>;
    fn load_undecoded_sensor_block(&self, container: &mut Self::Container) -> Result<()>;
    fn load_decoded_sensor_block(&self, container: &mut Self::Container) -> Result<()>;

    fn dump_preview(&self, container: &Self::Container, dest: &Path) -> Result<()>;
    fn dump_metadata(
        &self,
        container: &Self::Container,
        max_matrix_elements: usize,
        dest: &Path,
    ) -> Result<()>;
    fn dump_raw_block(&self, container: &Self::Container, dest: &Path) -> Result<()>;
    fn dump_tiff(&self, container: &Self::Container, options: &RenderOptions, dest: &Path)
        -> Result<()>;
    fn dump_dng(&self, container: &Self::Container, options: &RenderOptions, dest: &Path)
        -> Result<()>;
    fn dump_ppm(
        &self,
        container: &Self::Container,
        options: &RenderOptions,
        encoding: PpmEncoding,
        dest: &Path,
    ) -> Result<()>;
    fn dump_histogram(
        &self,
        container: &Self::Container,
        options: &RenderOptions,
        scale: HistogramScale,
        dest: &Path,
    ) -> Result<()>;
}
