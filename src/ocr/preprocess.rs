use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};

/// VIN plates are short strips; tesseract wants characters at least
/// ~30 px tall, so small crops are upscaled toward this height.
const MIN_OCR_HEIGHT: u32 = 600;
const MAX_OCR_WIDTH: u32 = 4000;
const MAX_UPSCALE: u32 = 4;
/// Mean luma below this is treated as a dark plate with light characters
/// (stamped or etched metal).
const DARK_PLATE_MEAN: f32 = 110.0;

/// Variants tried in order: Otsu-binarized, contrast-stretched gray, and
/// for dark plates the inverted binarization so characters come out dark
/// on light.
pub(super) fn preprocess_for_ocr_variants(image: DynamicImage) -> Vec<DynamicImage> {
    let gray = flatten_on_white(&image);
    let (width, height) = gray.dimensions();

    let scale = ocr_scale(width, height);
    let gray = if scale > 1 {
        imageops::resize(&gray, width * scale, height * scale, FilterType::CatmullRom)
    } else {
        gray
    };

    let stretched = contrast_stretch(&gray);
    let threshold = otsu_threshold(&stretched);
    let binarized = threshold_image(&stretched, threshold);

    let mut variants = Vec::with_capacity(3);
    if mean_luma(&stretched) < DARK_PLATE_MEAN {
        let mut inverted = binarized.clone();
        imageops::invert(&mut inverted);
        variants.push(DynamicImage::ImageLuma8(binarized));
        variants.push(DynamicImage::ImageLuma8(stretched));
        variants.push(DynamicImage::ImageLuma8(inverted));
    } else {
        variants.push(DynamicImage::ImageLuma8(binarized));
        variants.push(DynamicImage::ImageLuma8(stretched));
    }
    variants
}

/// Integer upscale that brings the plate toward [`MIN_OCR_HEIGHT`]
/// without exceeding [`MAX_OCR_WIDTH`].
fn ocr_scale(width: u32, height: u32) -> u32 {
    let wanted = MIN_OCR_HEIGHT.div_ceil(height.max(1)).clamp(1, MAX_UPSCALE);
    (1..=wanted)
        .rev()
        .find(|scale| width.saturating_mul(*scale) <= MAX_OCR_WIDTH)
        .unwrap_or(1)
}

// Transparent sticker scans read as black otherwise.
fn flatten_on_white(image: &DynamicImage) -> GrayImage {
    let luma_alpha = image.to_luma_alpha8();
    GrayImage::from_fn(luma_alpha.width(), luma_alpha.height(), |x, y| {
        let [value, alpha] = luma_alpha.get_pixel(x, y).0;
        let alpha = u32::from(alpha);
        let blended = (u32::from(value) * alpha + 255 * (255 - alpha)) / 255;
        Luma([blended as u8])
    })
}

fn contrast_stretch(image: &GrayImage) -> GrayImage {
    let (low, high) = image.pixels().fold((u8::MAX, u8::MIN), |(low, high), pixel| {
        (low.min(pixel[0]), high.max(pixel[0]))
    });
    if high <= low {
        return image.clone();
    }
    let range = u32::from(high - low);
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        pixel[0] = (u32::from(pixel[0] - low) * 255 / range) as u8;
    }
    output
}

/// Threshold maximizing between-class variance over the luma histogram.
fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 127;
    }
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, count)| level as f64 * *count as f64)
        .sum();

    let mut best = (0u8, f64::MIN);
    let mut background = 0u64;
    let mut weighted_background = 0f64;
    for (level, count) in histogram.iter().enumerate() {
        background += count;
        if background == 0 {
            continue;
        }
        let foreground = total - background;
        if foreground == 0 {
            break;
        }
        weighted_background += level as f64 * *count as f64;
        let mean_background = weighted_background / background as f64;
        let mean_foreground = (weighted_total - weighted_background) / foreground as f64;
        let variance = background as f64
            * foreground as f64
            * (mean_background - mean_foreground).powi(2);
        if variance > best.1 {
            best = (level as u8, variance);
        }
    }
    best.0
}

fn threshold_image(image: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let value = image.get_pixel(x, y)[0];
        Luma([if value > threshold { 255 } else { 0 }])
    })
}

fn mean_luma(image: &GrayImage) -> f32 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 255.0;
    }
    let sum: u64 = image.pixels().map(|pixel| u64::from(pixel[0])).sum();
    sum as f32 / count as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(width: u32, dark_until: u32, dark: u8, light: u8) -> DynamicImage {
        let gray = GrayImage::from_fn(width, 1, |x, _| {
            Luma([if x < dark_until { dark } else { light }])
        });
        DynamicImage::ImageLuma8(gray)
    }

    #[test]
    fn scale_targets_plate_height_within_width_cap() {
        assert_eq!(ocr_scale(800, 200), 3);
        assert_eq!(ocr_scale(800, 100), 4);
        assert_eq!(ocr_scale(1500, 100), 2);
        assert_eq!(ocr_scale(3000, 1000), 1);
        assert_eq!(ocr_scale(4000, 1), 1);
    }

    #[test]
    fn otsu_splits_two_levels() {
        let gray = GrayImage::from_fn(10, 1, |x, _| Luma([if x < 5 { 30 } else { 220 }]));
        let threshold = otsu_threshold(&gray);
        assert!((30..220).contains(&threshold));
    }

    #[test]
    fn light_label_yields_binarized_and_stretched() {
        let variants = preprocess_for_ocr_variants(strip(4000, 2000, 100, 140));
        assert_eq!(variants.len(), 2);

        let binarized = variants[0].to_luma8();
        assert_eq!(binarized.dimensions(), (4000, 1));
        assert!(binarized.pixels().all(|pixel| pixel[0] == 0 || pixel[0] == 255));
        assert_eq!(binarized.get_pixel(0, 0)[0], 0);
        assert_eq!(binarized.get_pixel(3999, 0)[0], 255);

        let stretched = variants[1].to_luma8();
        assert_eq!(stretched.get_pixel(0, 0)[0], 0);
        assert_eq!(stretched.get_pixel(3999, 0)[0], 255);
    }

    #[test]
    fn dark_plate_adds_inverted_variant() {
        let variants = preprocess_for_ocr_variants(strip(4000, 3000, 40, 200));
        assert_eq!(variants.len(), 3);
        let inverted = variants[2].to_luma8();
        assert_eq!(inverted.get_pixel(0, 0)[0], 255);
        assert_eq!(inverted.get_pixel(3999, 0)[0], 0);
    }

    #[test]
    fn transparent_pixels_become_white() {
        let clear = image::RgbaImage::from_pixel(2, 1, image::Rgba([0, 0, 0, 0]));
        let gray = flatten_on_white(&DynamicImage::ImageRgba8(clear));
        assert!(gray.pixels().all(|pixel| pixel[0] == 255));
    }
}
