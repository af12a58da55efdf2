use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// A solid-colour PNG of the given pixel size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([14, 165, 233]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn png_base64(width: u32, height: u32) -> String {
    STANDARD.encode(png(width, height))
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([249, 115, 22]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

/// A tiny payload that is valid base64 but not a PDF; the relay passes
/// attachments through untouched.
pub const FAKE_PDF_BASE64: &str = "JVBERi0xLjcKJSVFT0YK";
