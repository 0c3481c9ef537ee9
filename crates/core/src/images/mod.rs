//! In-process raster image conversion.

mod convert;

pub use convert::{convert_image, ImageConvertError, ImageOutputFormat};
