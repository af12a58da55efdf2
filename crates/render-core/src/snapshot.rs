use crate::error::RenderError;
use image::{DynamicImage, GenericImageView, ImageFormat};
use wayfare_types::Size;

/// Image payload in a form a PDF backend can embed without further decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotData {
    /// The original gray or RGB JPEG stream, embeddable as-is with
    /// `DCTDecode`.
    Jpeg { data: Vec<u8>, components: u8 },
    /// Uncompressed 8-bit RGB rows, top to bottom.
    Rgb8(Vec<u8>),
}

/// A rasterized rendering of the itinerary content block.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    width: u32,
    height: u32,
    data: SnapshotData,
}

impl RenderSnapshot {
    /// Decodes PNG or JPEG bytes.
    ///
    /// Gray and RGB JPEG input is kept in its compressed form. Anything else,
    /// CMYK JPEG included, is decoded to RGB and flattened onto a white
    /// background, since the exported pages have no transparency.
    pub fn decode(bytes: &[u8]) -> Result<Self, RenderError> {
        if bytes.is_empty() {
            return Err(RenderError::TemplateNotFound);
        }

        let format = image::guess_format(bytes)?;
        let image = image::load_from_memory_with_format(bytes, format)?;
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSnapshot(format!(
                "snapshot has empty dimensions {}x{}",
                width, height
            )));
        }

        let data = snapshot_data(format, bytes, &image);

        log::debug!("Decoded {:?} snapshot {}x{}", format, width, height);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a snapshot from raw RGB8 pixels.
    pub fn from_rgb8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(RenderError::InvalidSnapshot(format!(
                "expected {} bytes for a {}x{} RGB image, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: SnapshotData::Rgb8(pixels),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    pub fn data(&self) -> &SnapshotData {
        &self.data
    }
}

fn snapshot_data(format: ImageFormat, bytes: &[u8], image: &DynamicImage) -> SnapshotData {
    match (format, jpeg_components(bytes)) {
        (ImageFormat::Jpeg, Some(components @ (1 | 3))) => SnapshotData::Jpeg {
            data: bytes.to_vec(),
            components,
        },
        _ => SnapshotData::Rgb8(flatten_onto_white(image)),
    }
}

/// Component count from the first JPEG frame header, if one is found.
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        // SOF0..SOF15, minus DHT, JPG and DAC
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            return bytes.get(pos + 9).copied();
        }
        if marker == 0xDA {
            return None;
        }
        pos += 2 + length;
    }
    None
}

fn flatten_onto_white(image: &DynamicImage) -> Vec<u8> {
    let rgba = image.to_rgba8();
    let mut out = Vec::with_capacity(rgba.width() as usize * rgba.height() as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u16;
        for channel in [r, g, b] {
            let blended = (channel as u16 * alpha + 255 * (255 - alpha)) / 255;
            out.push(blended as u8);
        }
    }
    out
}
