//! Single-page PDF wrapping of a raster.
//!
//! The raster is JPEG-compressed and embedded as a `DCTDecode` image
//! XObject. The page is sized in points equal to the pixel dimensions and
//! the image is drawn over the whole page.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::Serialize;

use super::jpeg::encode_jpeg;
use super::types::{validate, EncodeError};
use crate::decode::PixelBuffer;

/// Resource name of the page image.
const IMAGE_NAME: &str = "Im0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

/// Page geometry chosen for a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentLayout {
    pub page_width: u32,
    pub page_height: u32,
    pub orientation: PageOrientation,
}

/// Landscape when wider than tall, portrait otherwise (squares included).
pub fn document_layout(width: u32, height: u32) -> DocumentLayout {
    let orientation = if width > height {
        PageOrientation::Landscape
    } else {
        PageOrientation::Portrait
    };
    DocumentLayout {
        page_width: width,
        page_height: height,
        orientation,
    }
}

/// Build a one-page PDF showing `image` edge to edge.
///
/// `raster_quality` is the normalized JPEG quality of the embedded image.
pub fn encode_pdf(image: &PixelBuffer, raster_quality: f32) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let layout = document_layout(image.width, image.height);
    let jpeg = encode_jpeg(image, raster_quality)?;

    let width = layout.page_width as i64;
    let height = layout.page_height as i64;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0i64.into(),
                    0i64.into(),
                    height.into(),
                    0i64.into(),
                    0i64.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| EncodeError::Document(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0i64.into(), 0i64.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| EncodeError::Document(e.to_string()))?;

    tracing::debug!(
        width = layout.page_width,
        height = layout.page_height,
        orientation = ?layout.orientation,
        bytes = bytes.len(),
        "built pdf"
    );

    Ok(bytes)
}
