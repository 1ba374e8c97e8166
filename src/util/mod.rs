mod stats;

pub use stats::{Stats, TraceStatistics};

use crate::geometry::FloatType;

pub type Color = rgb::RGB<FloatType>;

pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
};

pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
};

/// Componentwise product of two colors.
pub fn modulate(a: Color, b: Color) -> Color {
    Color::new(a.r * b.r, a.g * b.g, a.b * b.b)
}

/// Saturates every channel to the 0-1 range. Does not renormalize.
/// NaN channels become zero.
pub fn clamp_color(color: Color) -> Color {
    fn saturate(x: FloatType) -> FloatType {
        if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
    }
    Color::new(saturate(color.r), saturate(color.g), saturate(color.b))
}

/// Maps a 0-1 rgb color to pixel type compatible with module image.
/// Channels are clamped, scaled to 255 and truncated.
pub fn color_to_image(color: Color) -> image::Rgb<u8> {
    let color = clamp_color(color);
    image::Rgb([
        (color.r * 255.0) as u8,
        (color.g * 255.0) as u8,
        (color.b * 255.0) as u8,
    ])
}

/// Maps a 8bit image pixel to a 0-1 rgb color.
pub fn image_to_color(pixel: image::Rgb<u8>) -> Color {
    let [r, g, b] = pixel.0.map(|channel| channel as FloatType / 255.0);
    Color::new(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use test_case::test_case;
    use test_strategy::proptest;

    #[test]
    fn modulate_is_componentwise() {
        let c = modulate(Color::new(0.5, 1.0, 2.0), Color::new(2.0, 0.25, 0.0));
        assert!(c == Color::new(1.0, 0.25, 0.0));
    }

    #[test]
    fn clamp_saturates_without_renormalizing() {
        let c = clamp_color(Color::new(4.0, 0.5, -3.0));
        assert!(c == Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn clamp_removes_nan() {
        let c = clamp_color(Color::new(FloatType::NAN, 0.25, 1.0));
        assert!(c == Color::new(0.0, 0.25, 1.0));
    }

    #[proptest]
    fn clamped_channels_are_in_unit_range(r: f64, g: f64, b: f64) {
        let c = clamp_color(Color::new(r, g, b));
        for channel in [c.r, c.g, c.b] {
            assert!((0.0..=1.0).contains(&channel));
        }
    }

    #[test_case(BLACK, [0, 0, 0])]
    #[test_case(WHITE, [255, 255, 255])]
    #[test_case(Color::new(0.5, 2.0, -1.0), [127, 255, 0])]
    #[test_case(Color::new(0.5, 0.999, 0.1), [127, 254, 25] ; "truncates")]
    fn color_conversion(color: Color, expected: [u8; 3]) {
        assert!(color_to_image(color).0 == expected);
    }

    #[test]
    fn image_pixel_conversion() {
        let c = image_to_color(image::Rgb([255, 0, 51]));
        assert!(c.r == 1.0);
        assert!(c.g == 0.0);
        assert!((c.b - 0.2).abs() < 1e-12);
    }
}
