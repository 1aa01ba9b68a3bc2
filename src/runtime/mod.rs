//! Halide Runtime ABI
//!
//! `#[repr(C)]` mirrors of the structures declared in `HalideRuntime.h`.
//! Compiled filters read these structures directly, so field order and
//! widths follow the header exactly. Any change to the header's buffer
//! layout needs a matching change here and in the layout tests.
//!
//! ```text
//! halide_buffer_t (56 bytes on 64-bit targets)
//! ┌────────┬──────────────────┬──────┬───────┬──────┬────────────┬─────┬─────────┐
//! │ device │ device_interface │ host │ flags │ type │ dimensions │ dim │ padding │
//! │   u64  │      *const      │ *mut │  u64  │ 4 B  │    i32     │*mut │  *mut   │
//! └────────┴──────────────────┴──────┴───────┴──────┴────────────┴─────┴─────────┘
//! ```

#![allow(non_camel_case_types)]

use std::os::raw::c_void;

/// Type code of a buffer element, as encoded in `halide_type_t::code`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum halide_type_code_t {
    /// Signed integers
    halide_type_int = 0,
    /// Unsigned integers
    halide_type_uint = 1,
    /// IEEE floating point numbers
    halide_type_float = 2,
    /// Opaque pointer type (void *)
    halide_type_handle = 3,
    /// Floating point numbers in the bfloat format
    halide_type_bfloat = 4,
}

impl halide_type_code_t {
    /// Decode a raw type code byte.
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::halide_type_int),
            1 => Some(Self::halide_type_uint),
            2 => Some(Self::halide_type_float),
            3 => Some(Self::halide_type_handle),
            4 => Some(Self::halide_type_bfloat),
            _ => None,
        }
    }
}

/// Element type tag: type code, bit width and vector lane count.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct halide_type_t {
    /// A `halide_type_code_t` stored as a byte
    pub code: u8,
    /// Number of bits of precision of a single scalar value
    pub bits: u8,
    /// Number of elements in a vector; 1 for scalars
    pub lanes: u16,
}

/// Per-axis metadata. `stride` counts elements, not bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct halide_dimension_t {
    pub min: i32,
    pub extent: i32,
    pub stride: i32,
    /// Per-dimension flags; unused by this crate and always zero
    pub flags: u32,
}

impl halide_dimension_t {
    /// A dimension starting at index 0.
    pub const fn new(extent: i32, stride: i32) -> Self {
        Self {
            min: 0,
            extent,
            stride,
            flags: 0,
        }
    }
}

/// Opaque table of device entry points owned by the runtime.
#[repr(C)]
pub struct halide_device_interface_t {
    _private: [u8; 0],
}

/// The raw buffer descriptor consumed by compiled filters.
///
/// The descriptor does not own `host` or `dim`. See [`crate::Buffer`] for the
/// owning wrapper that keeps `dim` alive.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct halide_buffer_t {
    /// Device-side allocation handle, 0 when the data lives on the host
    pub device: u64,
    /// Interface used to manage `device`, null when there is none
    pub device_interface: *const halide_device_interface_t,
    /// Host-side data pointer
    pub host: *mut u8,
    /// Buffer flags (host dirty, device dirty, ...); zero on construction
    pub flags: u64,
    /// Element type
    pub type_: halide_type_t,
    /// Number of entries in `dim`
    pub dimensions: i32,
    /// Array of `dimensions` entries, innermost axis first
    pub dim: *mut halide_dimension_t,
    /// Reserved by the runtime
    pub padding: *mut c_void,
}

#[cfg(feature = "gpu")]
extern "C" {
    pub fn halide_opencl_device_interface() -> *const halide_device_interface_t;
    pub fn halide_opengl_device_interface() -> *const halide_device_interface_t;
    pub fn halide_cuda_device_interface() -> *const halide_device_interface_t;
    pub fn halide_set_gpu_device(n: i32);
}
