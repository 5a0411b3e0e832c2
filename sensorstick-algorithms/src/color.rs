//! Color space conversion

use serde::{Deserialize, Serialize};

/// Color space used when building color histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Rgb,
    #[default]
    Hsv,
}

impl ColorSpace {
    /// Convert an 8-bit RGB triple into this color space, every channel in 0..=255
    pub fn convert(&self, rgb: [u8; 3]) -> [f32; 3] {
        match self {
            ColorSpace::Rgb => [rgb[0] as f32, rgb[1] as f32, rgb[2] as f32],
            ColorSpace::Hsv => {
                let hsv = rgb_to_hsv(rgb);
                [hsv[0] * 255.0, hsv[1] * 255.0, hsv[2] * 255.0]
            }
        }
    }
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorSpace::Rgb => write!(f, "rgb"),
            ColorSpace::Hsv => write!(f, "hsv"),
        }
    }
}

/// Convert an 8-bit RGB triple to HSV with every component in [0, 1]
///
/// Hue wraps to 0 for achromatic colors.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [f32; 3] {
    let r = rgb[0] as f32 / 255.0;
    let g = rgb[1] as f32 / 255.0;
    let b = rgb[2] as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta <= 0.0 {
        0.0
    } else if max == r {
        (g - b) / delta
    } else if max == g {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };

    [(h / 6.0).rem_euclid(1.0), s, max]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_primary_hues() {
        assert_relative_eq!(rgb_to_hsv([255, 0, 0])[0], 0.0);
        assert_relative_eq!(rgb_to_hsv([0, 255, 0])[0], 1.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(rgb_to_hsv([0, 0, 255])[0], 2.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_magenta_wraps() {
        let hsv = rgb_to_hsv([255, 0, 255]);
        assert_relative_eq!(hsv[0], 5.0 / 6.0, epsilon = 1e-6);
        assert_relative_eq!(hsv[1], 1.0);
        assert_relative_eq!(hsv[2], 1.0);
    }

    #[test]
    fn test_gray_is_achromatic() {
        let hsv = rgb_to_hsv([128, 128, 128]);
        assert_eq!(hsv[0], 0.0);
        assert_eq!(hsv[1], 0.0);
        assert_relative_eq!(hsv[2], 128.0 / 255.0);
    }

    #[test]
    fn test_black() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_convert_scales_to_byte_range() {
        let rgb = ColorSpace::Rgb.convert([10, 20, 30]);
        assert_eq!(rgb, [10.0, 20.0, 30.0]);

        let hsv = ColorSpace::Hsv.convert([255, 255, 255]);
        assert_relative_eq!(hsv[2], 255.0);
        assert_eq!(ColorSpace::default(), ColorSpace::Hsv);
    }
}
