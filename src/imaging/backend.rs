//! Image processing backend trait.
//!
//! The [`ImageBackend`] trait defines the three operations the build needs:
//! identify, convert and resize_square.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and statically
//! linked. Tests use the recording `MockBackend` below.

use super::params::{ConvertParams, IconParams};
use crate::types::Dimensions;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Re-encode an image into the format named by the output extension.
    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError>;

    /// Produce a square PNG icon.
    fn resize_square(&self, params: &IconParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        /// Dimensions keyed by file name; unknown files fail to identify.
        pub dimensions: HashMap<String, Dimensions>,
        /// File names whose conversion fails.
        pub failing: Vec<String>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Convert {
            source: String,
            output: String,
            quality: u32,
        },
        ResizeSquare {
            source: String,
            output: String,
            size: u32,
        },
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(entries: &[(&str, u32, u32)]) -> Self {
            Self {
                dimensions: entries
                    .iter()
                    .map(|(name, width, height)| {
                        (
                            name.to_string(),
                            Dimensions {
                                width: *width,
                                height: *height,
                            },
                        )
                    })
                    .collect(),
                ..Self::default()
            }
        }

        pub fn failing_on(mut self, name: &str) -> Self {
            self.failing.push(name.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.dimensions
                .get(&file_name(path))
                .copied()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock dimensions".to_string()))
        }

        fn convert(&self, params: &ConvertParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Convert {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                quality: params.quality.value(),
            });
            if self.failing.contains(&file_name(&params.source)) {
                return Err(BackendError::ProcessingFailed("mock failure".to_string()));
            }
            Ok(())
        }

        fn resize_square(&self, params: &IconParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::ResizeSquare {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                size: params.size,
            });
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(&[("image.jpg", 800, 600)]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_identify_unknown_fails() {
        let backend = MockBackend::new();
        assert!(backend.identify(Path::new("/x/missing.png")).is_err());
    }

    #[test]
    fn mock_records_convert() {
        let backend = MockBackend::new().failing_on("bad.png");

        backend
            .convert(&ConvertParams {
                source: "/source.jpg".into(),
                output: "/source.avif".into(),
                quality: Quality::new(70),
            })
            .unwrap();
        let failed = backend.convert(&ConvertParams {
            source: "/bad.png".into(),
            output: "/bad.webp".into(),
            quality: Quality::default(),
        });
        assert!(failed.is_err());

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Convert { quality: 70, .. }));
    }
}
