// SPDX-License-Identifier: GPL-3.0-or-later

//! Signature checks and header probing for downloaded image data.

use std::io::Cursor;

use image::ImageReader;
use tracing::trace;

const MIN_SIGNATURE_LEN: usize = 4;

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, 0x50, 0x4E, 0x47])
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

fn is_gif(data: &[u8]) -> bool {
    data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a")
}

fn is_bmp(data: &[u8]) -> bool {
    data.starts_with(b"BM")
}

/// True when `data` starts with a JPEG, PNG, GIF, BMP or WebP signature.
pub fn is_valid_image_data(data: &[u8]) -> bool {
    if data.len() < MIN_SIGNATURE_LEN {
        return false;
    }
    is_jpeg(data) || is_png(data) || is_webp(data) || is_gif(data) || is_bmp(data)
}

pub fn detect_mime_type(data: &[u8]) -> &'static str {
    if data.len() < MIN_SIGNATURE_LEN {
        return "application/octet-stream";
    }
    if is_jpeg(data) {
        "image/jpeg"
    } else if is_png(data) {
        "image/png"
    } else if is_webp(data) {
        "image/webp"
    } else if is_gif(data) {
        "image/gif"
    } else if is_bmp(data) {
        "image/bmp"
    } else {
        "application/octet-stream"
    }
}

/// Read width and height from the image header; `(0, 0)` when undeterminable.
pub fn probe_dimensions(data: &[u8]) -> (u32, u32) {
    let dimensions = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(image::ImageError::from)
        .and_then(|reader| reader.into_dimensions());

    match dimensions {
        Ok(dimensions) => dimensions,
        Err(err) => {
            trace!(target: "downloader", error = %err, "could not read image dimensions");
            (0, 0)
        }
    }
}
