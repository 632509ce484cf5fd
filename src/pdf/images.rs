use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, Rgb, RgbImage};
use lopdf::{dictionary, Stream};
use qrcode::QrCode;

use crate::error::RenderError;

const JPEG_QUALITY: u8 = 90;
const QR_MODULE_SCALE: u32 = 8;
const QR_QUIET_ZONE: u32 = 4;

/// A raster ready to be added to a document as an image XObject.
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub stream: Stream,
}

/// Re-encodes a decoded raster as a baseline JPEG image XObject.
pub fn encode_raster(image: &DynamicImage) -> Result<RasterImage, RenderError> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    encoder.encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;

    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    );

    Ok(RasterImage {
        width,
        height,
        stream,
    })
}

/// Rasterizes the payload as a QR code with a quiet-zone border.
pub fn qr_raster(payload: &str) -> Result<RasterImage, RenderError> {
    let code = QrCode::new(payload.as_bytes()).map_err(RenderError::Qr)?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let side = (modules + 2 * QR_QUIET_ZONE) * QR_MODULE_SCALE;
    let mut canvas = RgbImage::from_pixel(side, side, Rgb([255, 255, 255]));

    for (index, color) in colors.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let index = index as u32;
        let left = (index % modules + QR_QUIET_ZONE) * QR_MODULE_SCALE;
        let top = (index / modules + QR_QUIET_ZONE) * QR_MODULE_SCALE;
        for dy in 0..QR_MODULE_SCALE {
            for dx in 0..QR_MODULE_SCALE {
                canvas.put_pixel(left + dx, top + dy, Rgb([0, 0, 0]));
            }
        }
    }

    encode_raster(&DynamicImage::ImageRgb8(canvas))
}

/// Placement of an image scaled into a bounding box, top-left coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Aspect-preserving fit, centered within the box on both axes.
pub fn contain(
    image_width: u32,
    image_height: u32,
    box_x: f32,
    box_y: f32,
    box_width: f32,
    box_height: f32,
) -> FitBox {
    let scale = (box_width / image_width as f32).min(box_height / image_height as f32);
    let width = image_width as f32 * scale;
    let height = image_height as f32 * scale;
    FitBox {
        x: box_x + (box_width - width) / 2.0,
        y: box_y + (box_height - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contain_letterboxes_a_wide_image() {
        let fit = contain(1000, 500, 290.0, 150.0, 500.0, 500.0);
        assert_eq!(fit.width, 500.0);
        assert_eq!(fit.height, 250.0);
        assert_eq!(fit.x, 290.0);
        assert_eq!(fit.y, 275.0);
    }

    #[test]
    fn contain_pillarboxes_a_tall_image() {
        let fit = contain(500, 1000, 0.0, 0.0, 200.0, 200.0);
        assert_eq!(fit.width, 100.0);
        assert_eq!(fit.height, 200.0);
        assert_eq!(fit.x, 50.0);
        assert_eq!(fit.y, 0.0);
    }

    #[test]
    fn contain_keeps_an_exact_fit_untouched() {
        let fit = contain(500, 500, 40.0, 870.0, 200.0, 200.0);
        assert_eq!(fit.width, 200.0);
        assert_eq!(fit.height, 200.0);
        assert_eq!(fit.x, 40.0);
        assert_eq!(fit.y, 870.0);
    }

    #[test]
    fn qr_raster_is_square_with_quiet_zone() {
        let raster = qr_raster("http://localhost:3023/download/x.pdf").unwrap();
        assert_eq!(raster.width, raster.height);
        assert_eq!(raster.width % QR_MODULE_SCALE, 0);
        // Smallest QR version is 21 modules; plus 4 quiet modules per side.
        assert!(raster.width >= (21 + 2 * QR_QUIET_ZONE) * QR_MODULE_SCALE);
    }

    #[test]
    fn encode_raster_keeps_pixel_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 7, Rgb([10, 20, 30])));
        let raster = encode_raster(&image).unwrap();
        assert_eq!(raster.width, 12);
        assert_eq!(raster.height, 7);
        assert_eq!(
            raster.stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"DCTDecode"
        );
    }
}
