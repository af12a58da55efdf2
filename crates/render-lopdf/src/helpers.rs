use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Object, Stream, dictionary};
use std::io::Write;
use wayfare_render_core::utils::{band_transform, flip_y};
use wayfare_render_core::{RenderError, RenderSnapshot, SnapshotData};
use wayfare_types::{PagePlan, PageSlice};

/// Zlib-compresses `bytes` for a `FlateDecode` stream.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Builds the image XObject stream for a snapshot.
pub fn image_xobject(snapshot: &RenderSnapshot) -> Result<Stream, RenderError> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => snapshot.width() as i64,
        "Height" => snapshot.height() as i64,
        "BitsPerComponent" => 8,
    };

    let content = match snapshot.data() {
        SnapshotData::Jpeg { data, components } => {
            let color_space = if *components == 1 { "DeviceGray" } else { "DeviceRGB" };
            dict.set("ColorSpace", color_space);
            dict.set("Filter", "DCTDecode");
            data.clone()
        }
        SnapshotData::Rgb8(pixels) => {
            dict.set("ColorSpace", "DeviceRGB");
            dict.set("Filter", "FlateDecode");
            compress(pixels)?
        }
    };

    Ok(Stream::new(dict, content).with_compression(false))
}

/// Content stream for one page: clip to the slice's visible area, then draw
/// the whole scaled image shifted so `slice` is at the top.
pub fn band_content(image_name: &str, plan: &PagePlan, slice: &PageSlice) -> Content {
    let clip = slice.visible_area(plan.page.width);
    let matrix: Vec<Object> = band_transform(plan, slice)
        .iter()
        .map(|v| (*v).into())
        .collect();

    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "re",
                vec![
                    clip.x.into(),
                    flip_y(clip.bottom(), plan.page.height).into(),
                    clip.width.into(),
                    clip.height.into(),
                ],
            ),
            Operation::new("W", vec![]),
            Operation::new("n", vec![]),
            Operation::new("cm", matrix),
            Operation::new("Do", vec![image_name.into()]),
            Operation::new("Q", vec![]),
        ],
    }
}
