//! Buffer Layout Tests
//!
//! Checks descriptors through the public API the way a compiled filter
//! would read them: by walking the raw `halide_buffer_t`.

use halide_runtime::runtime::{halide_buffer_t, halide_dimension_t};
use halide_runtime::{Buffer, Kind, Type};

/// Read the dimension array through the raw descriptor
fn raw_dims(raw: &halide_buffer_t) -> Vec<(i32, i32)> {
    let dims: &[halide_dimension_t] =
        unsafe { std::slice::from_raw_parts(raw.dim, raw.dimensions as usize) };
    dims.iter().map(|d| (d.extent, d.stride)).collect()
}

/// Byte offset of element (c, x, y) as the runtime computes it
fn element_offset(raw: &halide_buffer_t, c: i32, x: i32, y: i32) -> isize {
    let dims: &[halide_dimension_t] =
        unsafe { std::slice::from_raw_parts(raw.dim, raw.dimensions as usize) };
    let index = if dims.len() == 3 {
        c * dims[0].stride + x * dims[1].stride + y * dims[2].stride
    } else {
        x * dims[0].stride + y * dims[1].stride
    };
    index as isize * ((raw.type_.bits as isize + 7) / 8)
}

// ============================================================================
// Concrete Shapes
// ============================================================================

#[test]
fn test_gray_u8() {
    let mut data = vec![0u8; 12];
    let buf = Buffer::new(4, 3, 1, Type::U8, &mut data);
    let raw = buf.as_raw();

    assert_eq!(raw.dimensions, 2);
    assert_eq!(raw.flags, 0);
    assert_eq!(raw_dims(raw), vec![(4, 1), (3, 4)]);
}

#[test]
fn test_rgb_u8() {
    let mut data = vec![0u8; 36];
    let buf = Buffer::new(4, 3, 3, Type::U8, &mut data);
    let raw = buf.as_raw();

    assert_eq!(raw.dimensions, 3);
    assert_eq!(raw.flags, 0);
    assert_eq!(raw_dims(raw), vec![(3, 1), (4, 3), (3, 12)]);
}

#[test]
fn test_rgba_f32() {
    let mut data = vec![0f32; 16];
    let buf = Buffer::new(2, 2, 4, Type::F32, &mut data);
    let raw = buf.as_raw();

    assert_eq!(raw.dimensions, 3);
    assert_eq!(raw.flags, 0);
    assert_eq!(raw_dims(raw), vec![(4, 1), (2, 4), (2, 8)]);
    assert_eq!(raw.type_.code, Kind::Float as u8);
    assert_eq!(raw.type_.bits, 32);
}

// ============================================================================
// Addressing
// ============================================================================

#[test]
fn test_interleaved_addressing() {
    let (width, height, channels) = (5usize, 4usize, 3usize);
    let mut data: Vec<u16> = (0..(width * height * channels) as u16).collect();
    let expected = data.clone();
    let buf = Buffer::new(
        width as i32,
        height as i32,
        channels as i32,
        Type::U16,
        &mut data,
    );
    let raw = buf.as_raw();

    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let offset = element_offset(raw, c as i32, x as i32, y as i32);
                let value = unsafe { *(raw.host.offset(offset) as *const u16) };
                assert_eq!(value, expected[(y * width + x) * channels + c]);
            }
        }
    }
}

#[test]
fn test_writes_through_descriptor() {
    let mut data = vec![0u8; 6 * 2];
    {
        let mut buf = Buffer::new(6, 2, 1, Type::U8, &mut data);
        let raw = buf.as_mut_raw();
        let offset = element_offset(raw, 0, 5, 1);
        unsafe { *raw.host.offset(offset) = 42 };
    }
    assert_eq!(data[11], 42);
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn test_descriptors_in_collection() {
    let mut frames: Vec<Vec<u8>> = (0..4).map(|i| vec![i as u8; 8 * 8 * 3]).collect();
    let buffers: Vec<Buffer> = frames
        .iter_mut()
        .map(|frame| Buffer::new(8, 8, 3, Type::U8, frame))
        .collect();

    for buf in &buffers {
        assert_eq!(raw_dims(buf.as_raw()), vec![(3, 1), (8, 3), (8, 24)]);
    }
}

#[test]
fn test_descriptors_across_threads() {
    let handles: Vec<_> = (1..=4)
        .map(|channels| {
            std::thread::spawn(move || {
                let mut data = vec![0u8; 16 * 16 * channels as usize];
                let buf = Buffer::new(16, 16, channels, Type::U8, &mut data);
                raw_dims(buf.as_raw())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let channels = i as i32 + 1;
        let dims = handle.join().unwrap();
        assert_eq!(dims.last(), Some(&(16, 16 * channels)));
        assert_eq!(dims.len(), if channels > 1 { 3 } else { 2 });
    }
}
