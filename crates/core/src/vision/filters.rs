use image::GrayImage;
use imageproc::{edges, filter};

/// Variance of the 3x3 Laplacian response, a measure of texture complexity
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let n = gray.width() as usize * gray.height() as usize;
    if n == 0 {
        return 0.0;
    }

    let response = filter::laplacian_filter(gray);
    let mean = response.pixels().map(|p| p[0] as f64).sum::<f64>() / n as f64;
    response
        .pixels()
        .map(|p| {
            let d = p[0] as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64
}

/// Share of pixels that are Canny edges, hysteresis between `low` and `high`
pub fn canny_edge_density(gray: &GrayImage, low: f32, high: f32) -> f64 {
    let n = gray.width() as usize * gray.height() as usize;
    if n == 0 {
        return 0.0;
    }

    let edges = edges::canny(gray, low, high);
    edges.pixels().filter(|p| p[0] > 0).count() as f64 / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn checkerboard(size: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 { Luma([0]) } else { Luma([255]) }
        })
    }

    #[test]
    fn test_flat_image_has_no_texture_or_edges() {
        let flat = GrayImage::from_pixel(16, 16, Luma([90]));
        assert_eq!(laplacian_variance(&flat), 0.0);
        assert_eq!(canny_edge_density(&flat, 50.0, 150.0), 0.0);
    }

    #[test]
    fn test_empty_image_measures_zero() {
        let empty = GrayImage::new(0, 0);
        assert_eq!(laplacian_variance(&empty), 0.0);
        assert_eq!(canny_edge_density(&empty, 50.0, 150.0), 0.0);
    }

    #[test]
    fn test_checkerboard_has_high_texture_variance() {
        assert!(laplacian_variance(&checkerboard(16)) > 600.0);
    }

    #[test]
    fn test_step_edge_stays_near_the_step() {
        // mid-grey column between black and white gives one clear ridge
        let step = GrayImage::from_fn(20, 20, |x, _| match x {
            0..10 => Luma([0]),
            10 => Luma([128]),
            _ => Luma([255]),
        });
        let edges = edges::canny(&step, 50.0, 150.0);

        let mut count = 0;
        for (x, _, p) in edges.enumerate_pixels() {
            if p[0] > 0 {
                count += 1;
                assert!((9..=11).contains(&x), "unexpected edge at column {}", x);
            }
        }
        assert!(count > 0);
        assert!(canny_edge_density(&step, 50.0, 150.0) < 0.3);
    }
}
