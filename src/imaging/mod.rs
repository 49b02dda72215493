//! Image processing in pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Convert → AVIF** | `AvifEncoder` (rav1e) |
//! | **Convert → WebP** | `WebPEncoder` (lossless) |
//! | **Favicon** | `resize_to_fill` + PNG |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions deciding which files to write

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use operations::{create_favicons, create_variants, get_dimensions, is_convertible};
pub use params::Quality;
pub use rust_backend::RustBackend;
