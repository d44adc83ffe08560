use image::{GrayImage, Luma, RgbImage};
use imageproc::{
    map,
    region_labelling::{self, Connectivity},
};

use crate::config::RedHsvRange;

/// 8-bit HSV with hue on the 0-180 scale, as OpenCV stores it
pub fn to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;

    let s = if v == 0.0 { 0.0 } else { diff * 255.0 / v };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    ((h / 2.0).round() as u8, s.round() as u8, v as u8)
}

pub fn is_red(r: u8, g: u8, b: u8, range: &RedHsvRange) -> bool {
    let (h, s, v) = to_hsv(r, g, b);
    if s < range.saturation_min || v < range.value_min {
        return false;
    }
    h <= range.low_hue_max || (range.high_hue_min..=180).contains(&h)
}

/// Binary mask of blood-like red pixels, 255 where red
pub fn red_mask(img: &RgbImage, range: &RedHsvRange) -> GrayImage {
    map::map_colors(img, |p| {
        if is_red(p[0], p[1], p[2], range) { Luma([255]) } else { Luma([0]) }
    })
}

/// Percentage (0-100) of pixels inside the red bands
pub fn red_percentage(img: &RgbImage, range: &RedHsvRange) -> f64 {
    let total = img.width() as usize * img.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let red = red_mask(img, range).pixels().filter(|p| p[0] > 0).count();
    red as f64 / total as f64 * 100.0
}

/// Areas of the 8-connected foreground regions of `mask`
pub fn connected_regions(mask: &GrayImage) -> Vec<usize> {
    let labels = region_labelling::connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let mut areas: Vec<usize> = Vec::new();
    for label in labels.pixels().map(|p| p[0] as usize).filter(|&l| l > 0) {
        if areas.len() < label {
            areas.resize(label, 0);
        }
        areas[label - 1] += 1;
    }
    areas
}

/// Percentage of the image covered by red regions large enough to count as
/// a cluster. Scattered red speckle does not contribute.
pub fn clustered_red_percentage(
    img: &RgbImage,
    range: &RedHsvRange,
    min_region_fraction: f64,
) -> f64 {
    let total = img.width() as usize * img.height() as usize;
    if total == 0 {
        return 0.0;
    }

    let min_area = ((total as f64 * min_region_fraction).ceil() as usize).max(1);
    let clustered: usize = connected_regions(&red_mask(img, range))
        .into_iter()
        .filter(|&area| area >= min_area)
        .sum();

    clustered as f64 / total as f64 * 100.0
}

/// Mean of each RGB channel
pub fn channel_means(img: &RgbImage) -> (f64, f64, f64) {
    let total = img.width() as f64 * img.height() as f64;
    if total == 0.0 {
        return (0.0, 0.0, 0.0);
    }

    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for p in img.pixels() {
        r += p[0] as u64;
        g += p[1] as u64;
        b += p[2] as u64;
    }
    (r as f64 / total, g as f64 / total, b as f64 / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const DEEP_RED: Rgb<u8> = Rgb([150, 0, 0]);
    const GRASS: Rgb<u8> = Rgb([40, 120, 40]);

    /// 100x100 image whose first `red_pixels` pixels (row-major) are red
    fn image_with_red(red_pixels: u32) -> RgbImage {
        RgbImage::from_fn(100, 100, |x, y| {
            if y * 100 + x < red_pixels { DEEP_RED } else { GRASS }
        })
    }

    #[test]
    fn test_hsv_matches_opencv_scale() {
        assert_eq!(to_hsv(255, 0, 0), (0, 255, 255));
        assert_eq!(to_hsv(0, 255, 0), (60, 255, 255));
        assert_eq!(to_hsv(0, 0, 255), (120, 255, 255));
        assert_eq!(to_hsv(128, 128, 128), (0, 0, 128));
        // magenta-red wraps to the top band
        assert_eq!(to_hsv(255, 0, 40).0, 175);
    }

    #[test]
    fn test_grey_and_dim_pixels_are_not_red() {
        let range = RedHsvRange::default();
        assert!(!is_red(200, 190, 190, &range));
        assert!(!is_red(40, 0, 0, &range));
        assert!(is_red(150, 0, 0, &range));
    }

    #[test]
    fn test_five_percent_red_is_measured() {
        let pct = red_percentage(&image_with_red(500), &RedHsvRange::default());
        assert!((pct - 5.0).abs() < 1e-9);
        assert!(pct > 2.0);
    }

    #[test]
    fn test_one_percent_red_stays_below_threshold() {
        let pct = red_percentage(&image_with_red(100), &RedHsvRange::default());
        assert!((pct - 1.0).abs() < 1e-9);
        assert!(pct <= 2.0);
    }

    #[test]
    fn test_connected_regions_use_eight_neighbours() {
        // two diagonal pixels join, the isolated one stays separate
        let on = [(0, 0), (1, 1), (3, 2)];
        let mask = GrayImage::from_fn(4, 3, |x, y| {
            if on.contains(&(x, y)) { Luma([255]) } else { Luma([0]) }
        });
        let mut areas = connected_regions(&mask);
        areas.sort();
        assert_eq!(areas, vec![1, 2]);
    }

    #[test]
    fn test_clustered_red_ignores_speckle() {
        let range = RedHsvRange::default();

        let block = image_with_red(500);
        let pct = clustered_red_percentage(&block, &range, 0.001);
        assert!((pct - 5.0).abs() < 1e-9);

        // isolated red dots on a 4px grid: 6.25% red, no clusters
        let speckle = RgbImage::from_fn(100, 100, |x, y| {
            if x % 4 == 0 && y % 4 == 0 { DEEP_RED } else { GRASS }
        });
        assert!(red_percentage(&speckle, &range) > 2.0);
        assert_eq!(clustered_red_percentage(&speckle, &range, 0.001), 0.0);
    }

    #[test]
    fn test_channel_means() {
        let img = RgbImage::from_pixel(3, 3, Rgb([90, 30, 60]));
        assert_eq!(channel_means(&img), (90.0, 30.0, 60.0));
    }
}
