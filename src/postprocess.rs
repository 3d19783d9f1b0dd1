use image::DynamicImage;

use crate::config::PostProcessConfig;

/// Contrast and sharpness adjustment for generated images. Explicitly
/// configurable and disabled by default.
pub fn apply(config: &PostProcessConfig, image: DynamicImage) -> DynamicImage {
    if !config.enabled {
        return image;
    }

    log::debug!(
        "Post-processing image (contrast {}, sharpen sigma {})",
        config.contrast,
        config.sharpen_sigma
    );

    image
        .adjust_contrast(config.contrast)
        .unsharpen(config.sharpen_sigma, config.sharpen_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([100, 150, 200])))
    }

    #[test]
    fn disabled_config_returns_the_image_untouched() {
        let original = sample_image();
        let result = apply(&PostProcessConfig::default(), original.clone());
        assert_eq!(original.to_rgb8().into_raw(), result.to_rgb8().into_raw());
    }

    #[test]
    fn enabled_config_preserves_dimensions() {
        let config = PostProcessConfig::new().with_enabled(true);
        let result = apply(&config, sample_image());
        assert_eq!(result.width(), 4);
        assert_eq!(result.height(), 4);
    }
}
