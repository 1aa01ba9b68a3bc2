//! GPU Devices
//!
//! Attaches a runtime device interface to a buffer so a filter compiled for
//! a GPU target can manage the device-side copy. Only available with the
//! `gpu` feature; the Halide runtime must be linked in.

use crate::buffer::Buffer;
use crate::runtime::{self, halide_device_interface_t};

/// A device interface owned by the runtime
#[derive(Debug, Clone, Copy)]
pub struct Device(*const halide_device_interface_t);

impl Device {
    pub fn opencl() -> Device {
        unsafe { Device(runtime::halide_opencl_device_interface()) }
    }

    pub fn opengl() -> Device {
        unsafe { Device(runtime::halide_opengl_device_interface()) }
    }

    pub fn cuda() -> Device {
        unsafe { Device(runtime::halide_cuda_device_interface()) }
    }

    pub fn as_ptr(&self) -> *const halide_device_interface_t {
        self.0
    }
}

/// Select the GPU device used by subsequent pipeline runs
pub fn set_gpu_device(i: i32) {
    unsafe {
        runtime::halide_set_gpu_device(i);
    }
}

impl Buffer<'_> {
    /// Attach a device allocation handle and its interface
    pub fn set_device(&mut self, device: u64, handle: Device) {
        let raw = self.as_mut_raw();
        raw.device = device;
        raw.device_interface = handle.0;
    }
}
