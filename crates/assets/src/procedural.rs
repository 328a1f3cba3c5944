//! Procedural stand-ins for the grass, sand and tree artwork.

use crate::TextureImage;

const TILE: u32 = 32;

/// Cheap integer hash for per-pixel variation. Deterministic across runs.
fn speckle(x: u32, y: u32, salt: u32) -> u8 {
    let mut h = x.wrapping_mul(0x27d4_eb2d) ^ y.wrapping_mul(0x1656_67b1) ^ salt;
    h ^= h >> 15;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    (h & 0xff) as u8
}

fn generate(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> TextureImage {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            rgba.extend_from_slice(&pixel(x, y));
        }
    }
    TextureImage::new(width, height, rgba)
}

pub fn grass() -> TextureImage {
    generate(TILE, TILE, |x, y| {
        let n = speckle(x, y, 1) / 6;
        [48 + n / 2, 140 + n, 52 + n / 3, 255]
    })
}

pub fn sand() -> TextureImage {
    generate(TILE, TILE, |x, y| {
        let n = speckle(x, y, 2) / 8;
        [220 - n, 196 - n, 140 - n, 255]
    })
}

/// 32x64 tree sprite: round canopy over a trunk, transparent elsewhere.
pub fn tree() -> TextureImage {
    let (w, h) = (TILE, TILE * 2);
    generate(w, h, |x, y| {
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        let (cx, cy, r) = (w as f32 / 2.0, h as f32 * 0.35, w as f32 * 0.45);
        let in_canopy = (fx - cx).powi(2) + (fy - cy).powi(2) <= r * r;
        let in_trunk = (fx - cx).abs() <= 3.0 && fy >= cy && fy < h as f32;
        if in_canopy {
            let n = speckle(x, y, 3) / 5;
            [30 + n / 3, 110 + n, 40, 255]
        } else if in_trunk {
            [110, 72, 38, 255]
        } else {
            [0, 0, 0, 0]
        }
    })
}
