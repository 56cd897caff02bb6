//! Pixel buffers and postage-stamp utilities.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. `OwnedImage` is the
//! owned contiguous counterpart. Both are generic over the element type:
//! science pixels are `f32`, mask pixels `i32`, and CLI stamps `u8`.

use crate::util::{FpfsError, FpfsResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod resize;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> FpfsResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> FpfsResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(FpfsError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }
}

/// Owned contiguous image buffer.
#[derive(Clone, Debug)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Copy + Default> OwnedImage<T> {
    /// Creates an image from a contiguous buffer of exactly `width * height`
    /// elements.
    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> FpfsResult<Self> {
        if width == 0 || height == 0 {
            return Err(FpfsError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(FpfsError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(FpfsError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(FpfsError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a zero-filled image.
    pub fn zeros(width: usize, height: usize) -> FpfsResult<Self> {
        if width == 0 || height == 0 {
            return Err(FpfsError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(FpfsError::InvalidDimensions { width, height })?;
        Ok(Self {
            data: vec![T::default(); needed],
            width,
            height,
        })
    }

    /// Creates an image by evaluating `f(x, y)` at every pixel.
    pub fn from_fn<F: FnMut(usize, usize) -> T>(
        width: usize,
        height: usize,
        mut f: F,
    ) -> FpfsResult<Self> {
        let mut img = Self::zeros(width, height)?;
        for y in 0..height {
            for x in 0..width {
                img.data[y * width + x] = f(x, y);
            }
        }
        Ok(img)
    }

    /// Copies a (possibly strided) view into an owned contiguous buffer.
    pub fn from_view(view: ImageView<'_, T>) -> FpfsResult<Self> {
        let width = view.width();
        let height = view.height();
        let needed = width
            .checked_mul(height)
            .ok_or(FpfsError::InvalidDimensions { width, height })?;
        let mut data = vec![T::default(); needed];
        for y in 0..height {
            let row = view.row(y).ok_or(FpfsError::BufferTooSmall {
                needed,
                got: view.as_slice().len(),
            })?;
            let start = y * width;
            data[start..start + width].copy_from_slice(row);
        }
        Self::from_vec(data, width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the backing buffer in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Sets the element at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> FpfsResult<usize> {
    if width == 0 || height == 0 {
        return Err(FpfsError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(FpfsError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(FpfsError::InvalidDimensions { width, height })?;
    Ok(needed)
}
