//! Placeholder images for prompts whose generation failed.
//!
//! The placeholder is a palette gradient with the word "FALLBACK" drawn in
//! a blocky 5x7 bitmap font, encoded as PNG. It needs no font files.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::ImageGenError;

pub const PLACEHOLDER_SIZE: u32 = 512;

/// Visible marker text drawn on every placeholder.
pub const FALLBACK_MARKER: &str = "FALLBACK";

/// Pixel size of one bitmap font cell.
const GLYPH_SCALE: u32 = 8;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_SPACING: u32 = 1;

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const DEFAULT_TOP: Rgb<u8> = Rgb([0x0F, 0x0F, 0x10]);
const DEFAULT_BOTTOM: Rgb<u8> = Rgb([0x12, 0x13, 0x1A]);
const DEFAULT_ACCENT: Rgb<u8> = Rgb([0x00, 0xD4, 0xAA]);
const DEFAULT_HIGHLIGHT: Rgb<u8> = Rgb([0xFF, 0x6B, 0x35]);

/// Row bitmaps, most significant of the low five bits is the leftmost pixel.
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01111, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b01111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        _ => return None,
    };
    Some(rows)
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(value: &str) -> Option<Rgb<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

fn palette_color(palette: &[String], index: usize, default: Rgb<u8>) -> Rgb<u8> {
    palette
        .get(index)
        .and_then(|c| parse_hex_color(c))
        .unwrap_or(default)
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

/// Width in pixels of `text` rendered in the bitmap font.
pub fn text_width(text: &str) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    (n * GLYPH_WIDTH + (n - 1) * GLYPH_SPACING) * GLYPH_SCALE
}

/// Top-left corner at which the marker text is drawn.
pub fn marker_origin() -> (u32, u32) {
    let x = (PLACEHOLDER_SIZE - text_width(FALLBACK_MARKER)) / 2;
    let y = (PLACEHOLDER_SIZE - GLYPH_HEIGHT * GLYPH_SCALE) / 2;
    (x, y)
}

fn draw_text(img: &mut RgbImage, text: &str, origin: (u32, u32), color: Rgb<u8>) {
    let (mut x, y) = origin;
    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = x + col * GLYPH_SCALE;
                    let py = y + row as u32 * GLYPH_SCALE;
                    for dy in 0..GLYPH_SCALE {
                        for dx in 0..GLYPH_SCALE {
                            if px + dx < img.width() && py + dy < img.height() {
                                img.put_pixel(px + dx, py + dy, color);
                            }
                        }
                    }
                }
            }
        }
        x += (GLYPH_WIDTH + GLYPH_SPACING) * GLYPH_SCALE;
    }
}

/// Render the placeholder as raw pixels.
pub fn render_placeholder_image(palette: &[String]) -> RgbImage {
    let top = palette_color(palette, 0, DEFAULT_TOP);
    let bottom = palette_color(palette, 1, DEFAULT_BOTTOM);
    let accent = palette_color(palette, 2, DEFAULT_ACCENT);
    let highlight = palette_color(palette, 3, DEFAULT_HIGHLIGHT);

    let size = PLACEHOLDER_SIZE;
    let mut img = RgbImage::from_fn(size, size, |_, y| {
        let t = y as f32 / (size - 1) as f32;
        Rgb([
            lerp(top[0], bottom[0], t),
            lerp(top[1], bottom[1], t),
            lerp(top[2], bottom[2], t),
        ])
    });

    // Accent stripes above and below the marker.
    for x in 0..size {
        for y in 40..48 {
            img.put_pixel(x, y, accent);
        }
        for y in size - 48..size - 40 {
            img.put_pixel(x, y, highlight);
        }
    }

    draw_text(&mut img, FALLBACK_MARKER, marker_origin(), TEXT_COLOR);
    img
}

/// Render the placeholder and encode it as PNG bytes.
pub fn render_placeholder(palette: &[String]) -> Result<Vec<u8>, ImageGenError> {
    let img = DynamicImage::ImageRgb8(render_placeholder_image(palette));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
