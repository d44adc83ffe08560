//! Pixel statistics shared by the frame and thumbnail scanners.

pub mod color;
pub mod filters;

use std::path::Path;

use image::{GrayImage, Luma, RgbImage};

use crate::{error::Result, types::Rect};

pub use color::{clustered_red_percentage, red_mask, red_percentage, to_hsv};
pub use filters::{canny_edge_density, laplacian_variance};

/// Decode an image file into 8-bit RGB
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// BT.601 luma, matching what OpenCV produces for `BGR2GRAY`
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000) as u8
}

pub fn to_gray(img: &RgbImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        Luma([luma(p[0], p[1], p[2])])
    })
}

pub fn crop(gray: &GrayImage, rect: Rect) -> GrayImage {
    image::imageops::crop_imm(gray, rect.x, rect.y, rect.width, rect.height).to_image()
}

/// Mean brightness and population standard deviation (contrast)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayStats {
    pub mean: f64,
    pub std_dev: f64,
}

pub fn gray_stats(gray: &GrayImage) -> GrayStats {
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return GrayStats {
            mean: 0.0,
            std_dev: 0.0,
        };
    }

    let n = pixels.len() as f64;
    let mean = pixels.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = pixels
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    GrayStats {
        mean,
        std_dev: variance.sqrt(),
    }
}

pub fn mean_brightness(gray: &GrayImage) -> f64 {
    gray_stats(gray).mean
}

/// Mean brightness of the left and right halves; the split column goes right
pub fn half_means(gray: &GrayImage) -> (f64, f64) {
    let (w, h) = gray.dimensions();
    let half = w / 2;
    let left = crop(gray, Rect::new(0, 0, half, h));
    let right = crop(gray, Rect::new(half, 0, w - half, h));
    (mean_brightness(&left), mean_brightness(&right))
}

/// Share of pixels strictly darker than `level`
pub fn dark_pixel_ratio(gray: &GrayImage, level: u8) -> f64 {
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    pixels.iter().filter(|&&v| v < level).count() as f64 / pixels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_gray_stats_of_half_black_half_white() {
        let img = RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let stats = gray_stats(&to_gray(&img));
        assert!((stats.mean - 127.5).abs() < 1e-9);
        assert!((stats.std_dev - 127.5).abs() < 1e-9);

        let (left, right) = half_means(&to_gray(&img));
        assert_eq!(left, 0.0);
        assert_eq!(right, 255.0);
    }

    #[test]
    fn test_dark_pixel_ratio() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([[10, 20, 30, 40][x as usize]]));
        assert_eq!(dark_pixel_ratio(&gray, 30), 0.5);
    }

    #[test]
    fn test_empty_image_stats_are_zero() {
        let stats = gray_stats(&GrayImage::new(0, 0));
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, 0.0);
    }
}
