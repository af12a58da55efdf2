//! Core rendering abstractions for the paginated snapshot exporter.
//!
//! This crate provides:
//! - `RenderSnapshot`, a decoded raster ready for embedding
//! - `plan_pages`, which splits a tall snapshot into top-aligned page bands
//! - the `DocumentRenderer` trait implemented by PDF backends
//! - `render_document`, which drives a renderer through a plan

mod error;
mod paginate;
mod snapshot;
mod traits;
pub mod utils;

pub use error::RenderError;
pub use paginate::{plan_pages, DEFAULT_MAX_PAGES, HEIGHT_TOLERANCE};
pub use snapshot::{RenderSnapshot, SnapshotData};
pub use traits::{render_document, DocumentInfo, DocumentRenderer, ImageHandle};
