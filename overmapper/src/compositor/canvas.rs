//! Rectangle fills on the output canvas.

use image::{Rgba, RgbaImage};

use crate::geometry::PixelRect;

/// The output pixel buffer.
pub type Canvas = RgbaImage;

/// How a fill combines with the pixels already on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Overwrite the destination.
    Replace,
    /// Straight-alpha source-over compositing.
    Over,
}

/// Fill `rect` with `color`, clipped to the canvas bounds.
pub fn fill_rect(canvas: &mut Canvas, rect: &PixelRect, color: Rgba<u8>, mode: BlendMode) {
    let x1 = rect.x1.min(canvas.width());
    let y1 = rect.y1.min(canvas.height());

    for y in rect.y0..y1 {
        for x in rect.x0..x1 {
            let pixel = canvas.get_pixel_mut(x, y);
            match mode {
                BlendMode::Replace => *pixel = color,
                BlendMode::Over => *pixel = blend_over(*pixel, color),
            }
        }
    }
}

/// Composite `src` over `dst` with straight (non-premultiplied) alpha.
///
/// Integer arithmetic in place of `image::Pixel::blend`, whose float path can
/// round an opaque destination down to alpha 254.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as u32;
    let da = dst[3] as u32;
    match sa {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    // Output alpha scaled by 255 * 255
    let dst_weight = da * (255 - sa);
    let alpha = sa * 255 + dst_weight;

    let channel = |s: u8, d: u8| {
        let num = s as u32 * sa * 255 + d as u32 * dst_weight;
        ((num + alpha / 2) / alpha) as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        ((alpha + 127) / 255) as u8,
    ])
}
