pub mod binning;
pub mod scale;
pub mod types;
pub mod zoom_transform;

pub use binning::{XBin, bin_by_x};
pub use scale::LinearScale;
pub use types::{PrimitiveValue, ValueRange, Viewport, format_number};
pub use zoom_transform::ZoomTransform;
