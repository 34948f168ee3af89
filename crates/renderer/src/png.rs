//! PNG encoding for rendered figures.
//!
//! Two encodings, selected automatically:
//! - indexed (color type 3) when the figure has at most 256 unique
//!   colors, which map figures with a discrete colormap usually do;
//! - RGBA (color type 6) otherwise.

use std::collections::HashMap;
use std::io::Write;

use map_common::{MapError, MapResult};

/// Maximum palette entries for an indexed PNG.
const MAX_PALETTE_SIZE: usize = 256;

/// Encode RGBA pixels as a PNG, choosing indexed or RGBA form.
pub fn encode(pixels: &[u8], width: usize, height: usize) -> MapResult<Vec<u8>> {
    if pixels.len() != width * height * 4 {
        return Err(MapError::Render(format!(
            "pixel buffer is {} bytes, expected {}",
            pixels.len(),
            width * height * 4
        )));
    }

    match extract_palette(pixels) {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices),
        None => encode_rgba(pixels, width, height),
    }
}

/// Pack RGBA bytes into a u32 for fast hashing.
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Try to build a palette; None when more than 256 unique colors.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<(u8, u8, u8, u8)> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk[0], chunk[1], chunk[2], chunk[3]);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2], chunk[3]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> MapResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let mut plte = Vec::with_capacity(palette.len() * 3);
    for &(r, g, b, _) in palette {
        plte.extend_from_slice(&[r, g, b]);
    }
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when some palette entry is not fully opaque.
    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> MapResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    data
}

/// Prefix each scanline with filter byte 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], bytes_per_row: usize, height: usize) -> MapResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (1 + bytes_per_row));
    for y in 0..height {
        raw.push(0); // filter type: none
        let start = y * bytes_per_row;
        raw.extend_from_slice(&data[start..start + bytes_per_row]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| MapError::Render(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| MapError::Render(format!("IDAT compression failed: {}", e)))
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn test_indexed_for_few_colors() {
        let pixels = [
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            0, 255, 0, 255, //
            255, 0, 0, 255, //
        ];
        let png = encode(&pixels, 2, 2).unwrap();
        assert_eq!(&png[0..8], &SIGNATURE);
        // color type lives at byte 25 of IHDR
        assert_eq!(png[25], 3);
    }

    #[test]
    fn test_rgba_fallback_for_many_colors() {
        let mut pixels = Vec::with_capacity(300 * 4);
        for i in 0..300u32 {
            pixels.extend_from_slice(&[(i % 256) as u8, (i / 2 % 256) as u8, (i / 3 % 256) as u8, 255]);
        }
        let png = encode(&pixels, 300, 1).unwrap();
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_transparency_emits_trns() {
        let pixels = [
            255, 0, 0, 255, //
            0, 0, 0, 0, //
        ];
        let png = encode(&pixels, 2, 1).unwrap();
        assert!(png.windows(4).any(|w| w == b"tRNS"));
    }

    #[test]
    fn test_wrong_buffer_size_rejected() {
        assert!(encode(&[0u8; 7], 2, 1).is_err());
    }

    #[test]
    fn test_indexed_smaller_than_rgba_for_map_like_figure() {
        // Quantized two-tone figure, the common case for mesh plots.
        let mut pixels = Vec::with_capacity(64 * 64 * 4);
        for y in 0..64 {
            for x in 0..64 {
                if (x / 8 + y / 8) % 2 == 0 {
                    pixels.extend_from_slice(&[10, 40, 200, 255]);
                } else {
                    pixels.extend_from_slice(&[200, 40, 10, 255]);
                }
            }
        }
        let auto = encode(&pixels, 64, 64).unwrap();
        let rgba = encode_rgba(&pixels, 64, 64).unwrap();
        assert!(auto.len() < rgba.len());
    }
}
