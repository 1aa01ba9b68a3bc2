//! halide-runtime - Buffer descriptors for the Halide runtime
//!
//! Wraps caller-owned image data in the `halide_buffer_t` structure expected
//! by ahead-of-time compiled Halide pipelines, and loads those pipelines from
//! shared libraries.
//!
//! # Example
//!
//! ```rust
//! use halide_runtime::{Buffer, Type};
//!
//! let (width, height, channels) = (800, 600, 3);
//! let mut pixels = vec![0u8; width * height * channels];
//!
//! let buf = Buffer::new(width as i32, height as i32, channels as i32, Type::U8, &mut pixels);
//!
//! // channel, x, y
//! let strides: Vec<i32> = buf.dims().iter().map(|d| d.stride).collect();
//! assert_eq!(strides, vec![1, 3, 2400]);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Caller data    │  &mut [T], channel-interleaved
//! └────────┬────────┘
//!          │ Buffer::new
//!          ▼
//! ┌─────────────────┐
//! │ halide_buffer_t │  #[repr(C)], matches HalideRuntime.h
//! └────────┬────────┘
//!          │ Filter::run
//!          ▼
//! ┌─────────────────┐
//! │ Compiled filter │  shared library, loaded with libloading
//! └─────────────────┘
//! ```

#![warn(clippy::all)]

pub mod buffer;
pub mod config;
pub mod filter;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod runtime;
pub mod types;

pub use buffer::Buffer;
pub use config::{ConfigError, ConfigResult, FilterEntry, FiltersConfig, GpuConfig, RuntimeConfig};
pub use filter::{library_filename, Filter, FilterError, FilterLoader, FilterResult};
#[cfg(feature = "gpu")]
pub use gpu::{set_gpu_device, Device};
pub use types::{Kind, Type, UnknownType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
