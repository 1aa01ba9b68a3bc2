//! Buffer Descriptors
//!
//! [`Buffer`] wraps caller-owned image data in a `halide_buffer_t` that can be
//! passed as an argument to compiled filters.
//!
//! Data is assumed to be channel-interleaved: the channel index varies
//! fastest, then x, then y.
//!
//! ```text
//! channels == 1            channels > 1
//! dim[0]  x  (w, 1)        dim[0]  c  (channels, 1)
//! dim[1]  y  (h, w)        dim[1]  x  (w, channels)
//!                          dim[2]  y  (h, channels * w)
//! ```
//!
//! Nothing is validated. Extents, pointers and element types are the
//! caller's responsibility; misuse surfaces inside the runtime.

use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use tracing::trace;

use crate::runtime::{halide_buffer_t, halide_dimension_t, halide_type_t};
use crate::types::Type;

/// A buffer descriptor together with the dimension array it points into.
///
/// The dimension array is a leaked heap allocation reclaimed in `Drop`, so
/// `raw.dim` and `dims` share one raw pointer that stays valid when the
/// `Buffer` is moved. The host data is borrowed for `'a` and never freed here.
pub struct Buffer<'a> {
    raw: halide_buffer_t,
    dims: NonNull<[halide_dimension_t]>,
    _data: PhantomData<&'a mut [u8]>,
}

/// Build the dimension list for an interleaved `width x height x channels` image
fn interleaved_dims(width: i32, height: i32, channels: i32) -> Box<[halide_dimension_t]> {
    let mut dims = Vec::with_capacity(3);

    if channels > 1 {
        dims.push(halide_dimension_t::new(channels, 1));
    }
    dims.push(halide_dimension_t::new(width, channels));
    // Wraps like the C int arithmetic the runtime itself uses.
    dims.push(halide_dimension_t::new(height, channels.wrapping_mul(width)));

    dims.into_boxed_slice()
}

impl<'a> Buffer<'a> {
    /// Describe `data` as a `width x height` image with `channels` interleaved
    /// channels of type `t`.
    ///
    /// `data` should hold at least `width * height * channels * t.bytes()`
    /// bytes; this is not checked.
    pub fn new<T>(width: i32, height: i32, channels: i32, t: Type, data: &'a mut [T]) -> Self {
        // Safety: the slice is valid and exclusively borrowed for 'a.
        unsafe { Self::from_raw_parts(width, height, channels, t, data.as_mut_ptr() as *mut u8) }
    }

    /// Describe raw memory at `data`.
    ///
    /// # Safety
    ///
    /// `data` must point to storage laid out as described for as long as the
    /// returned buffer is handed to the runtime. The lifetime is unbounded, so
    /// nothing ties the buffer to the storage.
    pub unsafe fn from_raw_parts(
        width: i32,
        height: i32,
        channels: i32,
        t: Type,
        data: *mut u8,
    ) -> Self {
        let dims = interleaved_dims(width, height, channels);
        trace!(width, height, channels, ty = %t, dims = dims.len(), "buffer descriptor");
        Self::with_dims(t.into(), data, dims)
    }

    fn with_dims(type_: halide_type_t, host: *mut u8, dims: Box<[halide_dimension_t]>) -> Self {
        let count = dims.len();
        let dims = NonNull::from(Box::leak(dims));
        let raw = halide_buffer_t {
            device: 0,
            device_interface: ptr::null(),
            host,
            flags: 0,
            type_,
            dimensions: count as i32,
            dim: dims.as_ptr() as *mut halide_dimension_t,
            padding: ptr::null_mut(),
        };

        Self {
            raw,
            dims,
            _data: PhantomData,
        }
    }

    /// Number of dimensions (2 or 3 for interleaved images)
    pub fn dimensions(&self) -> usize {
        self.dims.len()
    }

    /// Per-axis extents and strides, innermost first
    pub fn dims(&self) -> &[halide_dimension_t] {
        // Safety: `dims` is owned by this buffer until drop; writers go
        // through `as_mut_raw`, which needs `&mut self`.
        unsafe { self.dims.as_ref() }
    }

    /// Element type, or `None` when the tag was decoded from a foreign
    /// descriptor with a type code this crate does not model
    pub fn elem_type(&self) -> Option<Type> {
        Type::try_from(self.raw.type_).ok()
    }

    /// Host data pointer, exactly as supplied
    pub fn host(&self) -> *mut u8 {
        self.raw.host
    }

    pub fn flags(&self) -> u64 {
        self.raw.flags
    }

    fn spatial(&self) -> &[halide_dimension_t] {
        let dims = self.dims();
        if dims.len() > 2 {
            &dims[1..]
        } else {
            dims
        }
    }

    pub fn width(&self) -> i32 {
        self.spatial().first().map_or(0, |d| d.extent)
    }

    pub fn height(&self) -> i32 {
        self.spatial().get(1).map_or(0, |d| d.extent)
    }

    pub fn channels(&self) -> i32 {
        match self.dims() {
            [c, _, _] => c.extent,
            _ => 1,
        }
    }

    /// Total number of elements described, saturating at `usize::MAX`
    pub fn len(&self) -> usize {
        self.dims()
            .iter()
            .map(|d| d.extent.max(0) as usize)
            .fold(1, usize::saturating_mul)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw descriptor, for passing to a compiled filter
    pub fn as_raw(&self) -> &halide_buffer_t {
        &self.raw
    }

    /// The raw descriptor, for filters that write into this buffer.
    ///
    /// Replacing `dim` or `dimensions` through this reference is not supported.
    pub fn as_mut_raw(&mut self) -> &mut halide_buffer_t {
        &mut self.raw
    }
}

impl<'a> From<&'a halide_buffer_t> for Buffer<'a> {
    /// Copy a descriptor produced elsewhere, duplicating its dimension list.
    fn from(buf: &'a halide_buffer_t) -> Self {
        let count = buf.dimensions.max(0) as usize;
        let dims: Box<[halide_dimension_t]> = if buf.dim.is_null() || count == 0 {
            Vec::new().into_boxed_slice()
        } else {
            // Safety: a well-formed descriptor points to `dimensions` entries.
            unsafe { std::slice::from_raw_parts(buf.dim, count) }.into()
        };

        let mut copy = Self::with_dims(buf.type_, buf.host, dims);
        copy.raw.device = buf.device;
        copy.raw.device_interface = buf.device_interface;
        copy.raw.flags = buf.flags;
        copy
    }
}

impl<'a> Clone for Buffer<'a> {
    /// Deep-copies the dimension list; the host data is shared.
    fn clone(&self) -> Self {
        let mut copy = Self::with_dims(self.raw.type_, self.raw.host, self.dims().into());
        copy.raw.device = self.raw.device;
        copy.raw.device_interface = self.raw.device_interface;
        copy.raw.flags = self.raw.flags;
        copy
    }
}

impl std::fmt::Debug for Buffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("host", &self.raw.host)
            .field("type", &self.raw.type_)
            .field("flags", &self.raw.flags)
            .field("dims", &self.dims())
            .finish()
    }
}

impl Drop for Buffer<'_> {
    fn drop(&mut self) {
        // Safety: `dims` came from `Box::leak` in `with_dims` and is freed
        // only here.
        unsafe { drop(Box::from_raw(self.dims.as_ptr())) }
    }
}
