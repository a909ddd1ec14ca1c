pub mod decode;
pub mod hit;
pub mod raster;
pub mod scene;

pub use decode::decode_image;
pub use scene::{RenderNode, RetainedScene};
