//! Item transforms applied to every decoded image.
//!
//! The sampler is generic over [`ItemTransform`]. Any
//! `Fn(DynamicImage) -> Result<T>` closure qualifies; [`TensorTransform`] is
//! the stock resize-and-normalize transform feeding [`PairedBatcher`](super::PairedBatcher).

use image::imageops::FilterType;
use image::DynamicImage;

use crate::utils::error::Result;
use crate::IMAGE_SIZE;

/// Maps a decoded image to a processed item
pub trait ItemTransform: Send + Sync {
    type Output;

    fn apply(&self, image: DynamicImage) -> Result<Self::Output>;
}

impl<F, T> ItemTransform for F
where
    F: Fn(DynamicImage) -> Result<T> + Send + Sync,
{
    type Output = T;

    fn apply(&self, image: DynamicImage) -> Result<T> {
        self(image)
    }
}

/// Image data as a flattened CHW float array
#[derive(Clone, Debug, PartialEq)]
pub struct ImageTensor {
    /// Values in [0, 1], length `channels * height * width`
    pub data: Vec<f32>,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl ImageTensor {
    pub fn shape(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }
}

/// Resize to a square and convert to CHW floats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorTransform {
    pub image_size: usize,
    /// Single luminance channel instead of RGB
    pub grayscale: bool,
}

impl Default for TensorTransform {
    fn default() -> Self {
        Self {
            image_size: IMAGE_SIZE,
            grayscale: false,
        }
    }
}

impl TensorTransform {
    pub fn new(image_size: usize) -> Self {
        Self {
            image_size,
            grayscale: false,
        }
    }

    pub fn grayscale(image_size: usize) -> Self {
        Self {
            image_size,
            grayscale: true,
        }
    }

    pub fn channels(&self) -> usize {
        if self.grayscale {
            1
        } else {
            3
        }
    }
}

impl ItemTransform for TensorTransform {
    type Output = ImageTensor;

    fn apply(&self, image: DynamicImage) -> Result<ImageTensor> {
        let size = self.image_size;
        let resized = image.resize_exact(size as u32, size as u32, FilterType::Triangle);
        let plane = size * size;

        let data = if self.grayscale {
            resized
                .to_luma8()
                .pixels()
                .map(|p| p[0] as f32 / 255.0)
                .collect()
        } else {
            let rgb = resized.to_rgb8();
            let mut data = vec![0.0f32; 3 * plane];

            // HWC -> CHW
            for (i, pixel) in rgb.pixels().enumerate() {
                data[i] = pixel[0] as f32 / 255.0;
                data[plane + i] = pixel[1] as f32 / 255.0;
                data[2 * plane + i] = pixel[2] as f32 / 255.0;
            }
            data
        };

        Ok(ImageTensor {
            data,
            channels: self.channels(),
            height: size,
            width: size,
        })
    }
}
