//! Compiled Filters
//!
//! A filter is a Halide pipeline compiled ahead of time into a shared
//! library. Each pipeline is exported as a C function taking an input and an
//! output buffer descriptor:
//!
//! ```text
//! int brighter(halide_buffer_t *input, halide_buffer_t *output);
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut loader = FilterLoader::new();
//! let brighter = loader.load("brighter", "brighter")?;
//!
//! let input = Buffer::new(800, 600, 3, Type::U8, &mut pixels);
//! let mut output = Buffer::new(800, 600, 3, Type::U8, &mut result);
//! brighter.run(&input, &mut output)?;
//! ```

mod loader;

pub use loader::{library_filename, Filter, FilterLoader};

use thiserror::Error;

/// Errors raised while loading or running a filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Load error: {0}")]
    LoadError(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Filter not found: {0}")]
    NotFound(String),

    /// The pipeline ran and returned a non-zero status
    #[error("Pipeline returned error code {0}")]
    Pipeline(i32),
}

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;
