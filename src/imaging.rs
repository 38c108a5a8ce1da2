// Edge detection and thresholding over rasterized pages
use image::GrayImage;
use imageproc::edges::canny;

/// Canny hysteresis thresholds over the gradient magnitude.
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 100.0;

/// Cutoff for the binarizing pass; edge maps are already two-valued, so any
/// mid-range value works.
pub const BINARIZE_CUTOFF: u8 = 128;

/// Edge map of a grayscale page. Edge pixels come back as 255.
pub fn edge_map(gray: &GrayImage) -> GrayImage {
    canny(gray, CANNY_LOW, CANNY_HIGH)
}

/// Binary threshold: pixels above the cutoff become white, the rest black.
pub fn binarize(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > BINARIZE_CUTOFF { 255 } else { 0 };
    }
    out
}

/// Fraction of set pixels in an edge map, in [0,1].
pub fn edge_density(edges: &GrayImage) -> f32 {
    let total = edges.width() as u64 * edges.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let set = edges.pixels().filter(|p| p.0[0] > 0).count();
    set as f32 / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Checkerboard test pattern; dense gradients everywhere.
    fn checkerboard(width: u32, height: u32, cell: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        })
    }

    #[test]
    fn blank_page_has_zero_density() {
        let blank = GrayImage::from_pixel(64, 64, Luma([255u8]));
        let edges = edge_map(&blank);
        assert_eq!(edge_density(&edges), 0.0);
    }

    #[test]
    fn step_edge_is_detected_but_sparse() {
        let img = GrayImage::from_fn(64, 64, |x, _| if x < 32 { Luma([0u8]) } else { Luma([255u8]) });
        let density = edge_density(&edge_map(&img));
        assert!(density > 0.0, "step edge should produce edge pixels");
        assert!(density < 0.25, "a single edge should stay sparse, got {density}");
    }

    #[test]
    fn checkerboard_is_denser_than_step_edge() {
        let busy = edge_density(&edge_map(&checkerboard(64, 64, 4)));
        let step = GrayImage::from_fn(64, 64, |x, _| if x < 32 { Luma([0u8]) } else { Luma([255u8]) });
        let sparse = edge_density(&edge_map(&step));
        assert!(busy > sparse);
    }

    #[test]
    fn binarize_output_is_two_valued() {
        let img = GrayImage::from_fn(16, 16, |x, y| Luma([(x * 16 + y) as u8]));
        let binary = binarize(&img);
        assert!(binary.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn empty_image_density_is_zero() {
        let empty = GrayImage::new(0, 0);
        assert_eq!(edge_density(&empty), 0.0);
    }
}
