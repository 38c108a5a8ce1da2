// Page rasterization: composite embedded page images onto a white canvas
use image::{imageops, DynamicImage, GrayImage, Luma};
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::debug;

use crate::error::{Result, TriageError};
use crate::extract::{page_resources, resolve_dict, PdfFile};

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Upper bound on either raster dimension; anything larger is a broken
/// MediaBox, not a real page.
const MAX_RASTER_DIM: u32 = 10_000;

/// Renders one page of a loaded document to a grayscale raster. Implementors
/// fail with `TriageError::Render`; callers treat that as a per-page event.
pub trait PageRasterAdapter: Send + Sync {
    fn render(&self, pdf: &PdfFile, page_number: u32, dpi: u32) -> Result<GrayImage>;
}

/// Default backend: scales the page MediaBox to the target DPI and pastes
/// every decodable image XObject onto a white canvas. A page without
/// embedded images comes back blank, which is a valid signal, not an error.
pub struct EmbeddedImageRasterizer;

impl PageRasterAdapter for EmbeddedImageRasterizer {
    fn render(&self, pdf: &PdfFile, page_number: u32, dpi: u32) -> Result<GrayImage> {
        let page = pdf.page_dict(page_number).map_err(|e| TriageError::Render {
            page: page_number,
            reason: e.to_string(),
        })?;
        let (width_pt, height_pt) = page_dimensions(pdf.doc(), page);
        let scale = dpi as f32 / POINTS_PER_INCH;
        let width = (width_pt * scale).round().max(1.0) as u32;
        let height = (height_pt * scale).round().max(1.0) as u32;
        if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
            return Err(TriageError::Render {
                page: page_number,
                reason: format!("page raster {width}x{height} exceeds limit"),
            });
        }

        let mut canvas = GrayImage::from_pixel(width, height, Luma([255u8]));
        for embedded in page_images(pdf.doc(), page) {
            // Embedded scans carry their own resolution; stretch to the page.
            let scaled = imageops::resize(
                &embedded.to_luma8(),
                width,
                height,
                imageops::FilterType::Triangle,
            );
            imageops::overlay(&mut canvas, &scaled, 0, 0);
        }
        Ok(canvas)
    }
}

/// MediaBox dimensions in points, following the Parent chain for inherited
/// boxes. Falls back to US Letter.
fn page_dimensions(doc: &Document, page: &Dictionary) -> (f32, f32) {
    let mut current = page;
    loop {
        if let Ok(media_box) = current.get(b"MediaBox") {
            if let Some(dims) = media_box_dimensions(doc, media_box) {
                return dims;
            }
        }
        match current.get(b"Parent") {
            Ok(Object::Reference(id)) => match doc.get_dictionary(*id) {
                Ok(parent) => current = parent,
                Err(_) => break,
            },
            _ => break,
        }
    }
    (612.0, 792.0)
}

fn media_box_dimensions(doc: &Document, media_box: &Object) -> Option<(f32, f32)> {
    let array = match media_box {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(array)) => array,
            _ => return None,
        },
        Object::Array(array) => array,
        _ => return None,
    };
    let mut bounds = Vec::with_capacity(4);
    for object in array {
        match object {
            Object::Integer(i) => bounds.push(*i as f32),
            Object::Real(f) => bounds.push(*f),
            _ => {}
        }
    }
    if bounds.len() != 4 {
        return None;
    }
    let width = bounds[2] - bounds[0];
    let height = bounds[3] - bounds[1];
    (width > 0.0 && height > 0.0).then_some((width, height))
}

/// Every decodable image XObject on the page. Undecodable entries are
/// skipped, matching per-page recovery elsewhere.
fn page_images(doc: &Document, page: &Dictionary) -> Vec<DynamicImage> {
    let mut images = Vec::new();
    let Some(resources) = page_resources(doc, page) else {
        return images;
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve_dict(doc, o))
    else {
        return images;
    };
    for (name, entry) in xobjects.iter() {
        let stream = match entry {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(Object::Stream(stream)) => stream,
                _ => continue,
            },
            Object::Stream(stream) => stream,
            _ => continue,
        };
        if !is_image_xobject(doc, &stream.dict) {
            continue;
        }
        match decode_image(doc, stream) {
            Some(image) => images.push(image),
            None => debug!(
                xobject = %String::from_utf8_lossy(name),
                "skipping undecodable image xobject"
            ),
        }
    }
    images
}

fn is_image_xobject(doc: &Document, dict: &Dictionary) -> bool {
    match dict.get(b"Subtype") {
        Ok(Object::Name(name)) => name == b"Image",
        Ok(Object::Reference(id)) => {
            matches!(doc.get_object(*id), Ok(Object::Name(name)) if name == b"Image")
        }
        _ => false,
    }
}

fn decode_image(doc: &Document, stream: &Stream) -> Option<DynamicImage> {
    match primary_filter(doc, &stream.dict).as_deref() {
        // JPEG/JPEG2000 payloads are complete images as-is
        Some("DCTDecode") | Some("JPXDecode") => image::load_from_memory(&stream.content).ok(),
        _ => {
            let data = stream.decompressed_content().ok()?;
            let width = dict_u32(doc, &stream.dict, b"Width")?;
            let height = dict_u32(doc, &stream.dict, b"Height")?;
            let bpc = dict_u32(doc, &stream.dict, b"BitsPerComponent").unwrap_or(8);
            if bpc != 8 {
                return None;
            }
            match color_components(doc, &stream.dict) {
                1 => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
                3 => image::RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
                _ => None,
            }
        }
    }
}

fn primary_filter(doc: &Document, dict: &Dictionary) -> Option<String> {
    let filter = dict.get(b"Filter").ok()?;
    let resolved = match filter {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match resolved {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Array(array) => array.first().and_then(|o| match o {
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }),
        _ => None,
    }
}

fn color_components(doc: &Document, dict: &Dictionary) -> usize {
    let Ok(space) = dict.get(b"ColorSpace") else {
        return 1;
    };
    let resolved = match space {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(object) => object,
            Err(_) => return 0,
        },
        other => other,
    };
    match resolved {
        Object::Name(name) if name == b"DeviceGray" => 1,
        Object::Name(name) if name == b"DeviceRGB" => 3,
        _ => 0,
    }
}

fn dict_u32(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<u32> {
    let value = dict.get(key).ok()?;
    let resolved = match value {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match resolved {
        Object::Integer(i) if *i >= 0 => Some(*i as u32),
        _ => None,
    }
}
