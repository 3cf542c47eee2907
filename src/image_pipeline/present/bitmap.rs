use image::{Rgba, RgbaImage};

use crate::image_pipeline::frame::ColorImage;

/// 32-bit RGBA bitmap, the layout UI toolkits take directly.
pub type Bitmap = RgbaImage;

/// Pixel-for-pixel copy of `image` with an opaque alpha channel.
pub fn to_displayable(image: &ColorImage) -> Bitmap {
    Bitmap::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Rgba([r, g, b, u8::MAX])
    })
}
