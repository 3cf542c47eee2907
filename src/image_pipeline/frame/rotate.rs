use image::imageops;

use crate::image_pipeline::frame::types::ColorImage;

/// Rotates `image` clockwise by `quarter_turns * 90` degrees.
///
/// Turns are taken modulo 4; zero returns the image untouched.
pub fn rotate_clockwise(image: ColorImage, quarter_turns: u8) -> ColorImage {
    match quarter_turns % 4 {
        1 => imageops::rotate90(&image),
        2 => imageops::rotate180(&image),
        3 => imageops::rotate270(&image),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> ColorImage {
        ColorImage::from_fn(width, height, |x, y| {
            Rgb([(x * 13) as u8, (y * 29) as u8, ((x + y) * 7) as u8])
        })
    }

    #[test]
    fn test_four_quarter_turns_round_trip() {
        let original = gradient(7, 5);
        let mut image = original.clone();
        for _ in 0..4 {
            image = rotate_clockwise(image, 1);
        }
        assert_eq!(image.dimensions(), original.dimensions());
        assert_eq!(image.as_raw(), original.as_raw());
    }

    #[test]
    fn test_zero_turns_is_noop() {
        let original = gradient(4, 3);
        assert_eq!(rotate_clockwise(original.clone(), 0).as_raw(), original.as_raw());
    }

    #[test]
    fn test_quarter_turn_is_clockwise() {
        let original = gradient(4, 3);
        let rotated = rotate_clockwise(original.clone(), 1);
        assert_eq!(rotated.dimensions(), (3, 4));
        // top-left of the source lands in the top-right corner
        assert_eq!(rotated.get_pixel(2, 0), original.get_pixel(0, 0));
        // bottom-left of the source lands in the top-left corner
        assert_eq!(rotated.get_pixel(0, 0), original.get_pixel(0, 2));
    }

    #[test]
    fn test_half_turn_equals_two_quarter_turns() {
        let original = gradient(6, 4);
        let twice = rotate_clockwise(rotate_clockwise(original.clone(), 1), 1);
        assert_eq!(rotate_clockwise(original, 2).as_raw(), twice.as_raw());
    }
}
