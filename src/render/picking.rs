//! Helpers for the hit-test ("picking") layer.
//!
//! Shapes are drawn with one flat, unique color per shape on a hidden canvas;
//! reading back the pixel under the pointer identifies the shape. Anti-aliasing
//! would blend colors, so every shape drawn there must be aliased.

/// Square mask of side `2 * radius + 1`, row-major, `1` where the disc covers
/// the cell.
///
/// A cell is covered when its center is within `radius + 1/4` pixel of the
/// disc center (`dx² + dy² <= (radius + 0.25)²`), which yields a single pixel
/// at radius 0, a plus at radius 1 and a rounded 5x5 blob at radius 2.
///
/// A plain `distance <= radius` test is not used: at radius 2 it leaves a
/// single cell on the top and bottom rows (`0 0 1 0 0`) instead of the
/// rounded blob (`0 1 1 1 0`) the picking layer draws.
#[must_use]
pub fn aliased_disc_shape(radius: u32) -> Vec<u8> {
    let radius = i64::from(radius);
    let side = 2 * radius + 1;
    let threshold = (radius as f64 + 0.25).powi(2);

    let mut mask = Vec::with_capacity((side * side) as usize);
    for y in 0..side {
        for x in 0..side {
            let dx = (x - radius) as f64;
            let dy = (y - radius) as f64;
            mask.push(u8::from(dx * dx + dy * dy <= threshold));
        }
    }
    mask
}

/// Reserved for "nothing under the pointer".
const EMPTY_PICK: u32 = 0;

/// Encodes a shape index as an opaque RGBA color. Index `n` maps to color
/// value `n + 1`, keeping transparent black free for empty pixels.
#[must_use]
pub fn picking_color(index: u32) -> Option<[u8; 4]> {
    let value = index.checked_add(1).filter(|value| *value <= 0x00FF_FFFF)?;
    let [_, red, green, blue] = value.to_be_bytes();
    Some([red, green, blue, 255])
}

/// Decodes a color read back from the picking layer.
///
/// Pixels that are not fully opaque were blended and are ignored.
#[must_use]
pub fn picking_index(rgba: [u8; 4]) -> Option<u32> {
    let [red, green, blue, alpha] = rgba;
    if alpha != 255 {
        return None;
    }
    let value = u32::from_be_bytes([0, red, green, blue]);
    (value != EMPTY_PICK).then(|| value - 1)
}
