//! PDF backend for the paginated snapshot exporter.
//!
//! The snapshot is stored once as an image XObject. Each page references it
//! through a shared resources dictionary and shifts it so its band lands at
//! the top of the page, clipped to the page box.

mod helpers;
mod renderer;

pub use helpers::{band_content, compress, image_xobject};
pub use renderer::LopdfRenderer;
