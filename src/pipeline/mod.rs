// The two extraction pipelines, selected by document type
pub mod raster;
pub mod vector;

pub use raster::RasterPipeline;
pub use vector::VectorPipeline;
