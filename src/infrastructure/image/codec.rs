//! Layer decoding and final encoding.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, Rgba, RgbaImage};

use super::svg::{BASE_DENSITY, optimal_density, rasterize};
use crate::domain::entities::{
    Background, LayerOptions, MediaType, RawLayer, ResizeFit, Rotation,
};
use crate::domain::errors::RenderError;

const FILTER: FilterType = FilterType::Lanczos3;

/// Encoding of a rendered picture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[allow(missing_docs)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl OutputFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => MediaType::Png.mime(),
            Self::Jpeg => MediaType::Jpeg.mime(),
            Self::Webp => MediaType::Webp.mime(),
            Self::Gif => MediaType::Gif.mime(),
        }
    }
}

/// Decodes raster or SVG bytes.
///
/// SVG renders at `options.density`, else at the density filling the
/// target box, else at its natural size.
///
/// # Errors
///
/// Returns `RenderError::Render` for unknown or corrupt input.
pub fn decode(bytes: &[u8], options: &LayerOptions) -> Result<DynamicImage, RenderError> {
    match MediaType::sniff(bytes) {
        Some(MediaType::Svg) => {
            let density = options
                .density
                .or_else(|| optimal_density(bytes, options.width, options.height, BASE_DENSITY))
                .unwrap_or(BASE_DENSITY);
            Ok(DynamicImage::ImageRgba8(rasterize(bytes, density)?))
        }
        Some(media) => {
            let format = media
                .raster_format()
                .ok_or_else(|| RenderError::render(format!("cannot decode {media}")))?;
            Ok(image::load_from_memory_with_format(bytes, format)?)
        }
        None => Err(RenderError::render("unsupported image format")),
    }
}

/// Decodes a layer and applies rotation, resizing and background flattening.
///
/// # Errors
///
/// Returns `RenderError::Render` for unknown or corrupt input.
pub fn decode_layer(bytes: &[u8], options: &LayerOptions) -> Result<RawLayer, RenderError> {
    let image = rotate(decode(bytes, options)?, options.rotation);
    let image = resize(image, options);
    let pixels = match options.background {
        Some(background) => flatten(&image.to_rgba8(), background),
        None => image.into_rgba8(),
    };

    Ok(RawLayer {
        pixels,
        x: options.x,
        y: options.y,
        background: options.background,
    })
}

fn rotate(image: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => image,
        Rotation::Quarter => image.rotate90(),
        Rotation::Half => image.rotate180(),
        Rotation::ThreeQuarters => image.rotate270(),
    }
}

/// Resizes into the target box according to the fit mode.
///
/// With one dimension given the other follows the aspect ratio.
fn resize(image: DynamicImage, options: &LayerOptions) -> DynamicImage {
    let (iw, ih) = image.dimensions();
    let (width, height) = match (options.width, options.height) {
        (None, None) => return image,
        (Some(width), Some(height)) => (width, height),
        (Some(width), None) => (width, proportional(ih, width, iw)),
        (None, Some(height)) => (proportional(iw, height, ih), height),
    };
    let (width, height) = (width.max(1), height.max(1));

    let scale_x = f64::from(width) / f64::from(iw);
    let scale_y = f64::from(height) / f64::from(ih);
    let enlarges = match options.fit {
        ResizeFit::Cover | ResizeFit::Outside => scale_x.max(scale_y) > 1.0,
        ResizeFit::Contain | ResizeFit::Inside => scale_x.min(scale_y) > 1.0,
        ResizeFit::Fill => scale_x > 1.0 || scale_y > 1.0,
    };
    if options.without_enlargement && enlarges {
        return image;
    }

    match options.fit {
        ResizeFit::Cover => image.resize_to_fill(width, height, FILTER),
        ResizeFit::Inside => image.resize(width, height, FILTER),
        ResizeFit::Fill => image.resize_exact(width, height, FILTER),
        ResizeFit::Outside => {
            let scale = scale_x.max(scale_y);
            image.resize_exact(scaled(iw, scale), scaled(ih, scale), FILTER)
        }
        ResizeFit::Contain => {
            let fitted = image.resize(width, height, FILTER);
            let fill = options.background.unwrap_or(Background::TRANSPARENT);
            let mut canvas = RgbaImage::from_pixel(width, height, Rgba(fill.rgba()));
            let x = (width - fitted.width()) / 2;
            let y = (height - fitted.height()) / 2;
            imageops::replace(&mut canvas, &fitted.to_rgba8(), i64::from(x), i64::from(y));
            DynamicImage::ImageRgba8(canvas)
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn proportional(side: u32, target: u32, reference: u32) -> u32 {
    (f64::from(side) * f64::from(target) / f64::from(reference)).round() as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled(side: u32, scale: f64) -> u32 {
    ((f64::from(side) * scale).ceil() as u32).max(1)
}

/// Draws the image over a solid background.
fn flatten(pixels: &RgbaImage, background: Background) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(pixels.width(), pixels.height(), Rgba(background.rgba()));
    imageops::overlay(&mut canvas, pixels, 0, 0);
    canvas
}

/// Encodes a rendered picture; JPEG drops the alpha channel.
///
/// # Errors
///
/// Returns `RenderError::Render` if the encoder fails.
pub fn encode(pixels: &RgbaImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            pixels.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        }
        OutputFormat::Gif => {
            pixels.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Gif)?;
        }
        OutputFormat::Webp => {
            image::codecs::webp::WebPEncoder::new_lossless(&mut bytes).write_image(
                pixels.as_raw(),
                pixels.width(),
                pixels.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(pixels.clone()).into_rgb8();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(width, height, Rgba(color))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn options(width: Option<u32>, height: Option<u32>, fit: ResizeFit) -> LayerOptions {
        LayerOptions {
            width,
            height,
            fit,
            ..LayerOptions::default()
        }
    }

    #[test_case(ResizeFit::Cover, (50, 50) ; "cover crops")]
    #[test_case(ResizeFit::Contain, (50, 50) ; "contain pads")]
    #[test_case(ResizeFit::Inside, (50, 25) ; "inside fits")]
    #[test_case(ResizeFit::Outside, (100, 50) ; "outside covers")]
    #[test_case(ResizeFit::Fill, (50, 50) ; "fill stretches")]
    fn test_resize_fit(fit: ResizeFit, expected: (u32, u32)) -> Result<(), RenderError> {
        let layer = decode_layer(&png(200, 100, [0, 0, 255, 255]), &options(Some(50), Some(50), fit))?;
        assert_eq!(layer.pixels.dimensions(), expected);
        Ok(())
    }

    #[test]
    fn test_single_dimension_keeps_ratio() -> Result<(), RenderError> {
        let bytes = png(200, 100, [0, 0, 255, 255]);

        let by_width = decode_layer(&bytes, &options(Some(50), None, ResizeFit::Cover))?;
        let by_height = decode_layer(&bytes, &options(None, Some(50), ResizeFit::Cover))?;

        assert_eq!(by_width.pixels.dimensions(), (50, 25));
        assert_eq!(by_height.pixels.dimensions(), (100, 50));
        Ok(())
    }

    #[test]
    fn test_no_target_keeps_size() -> Result<(), RenderError> {
        let layer = decode_layer(&png(7, 3, [1, 2, 3, 255]), &LayerOptions::default())?;
        assert_eq!(layer.pixels.dimensions(), (7, 3));
        Ok(())
    }

    #[test]
    fn test_without_enlargement() -> Result<(), RenderError> {
        let bytes = png(20, 10, [0, 0, 0, 255]);
        let mut opts = options(Some(40), Some(40), ResizeFit::Inside);
        opts.without_enlargement = true;

        assert_eq!(decode_layer(&bytes, &opts)?.pixels.dimensions(), (20, 10));

        opts.width = Some(10);
        opts.height = Some(10);
        assert_eq!(decode_layer(&bytes, &opts)?.pixels.dimensions(), (10, 5));
        Ok(())
    }

    #[test]
    fn test_contain_pads_with_background() -> Result<(), RenderError> {
        let mut opts = options(Some(50), Some(50), ResizeFit::Contain);
        opts.background = Some(Background([10, 20, 30, 255]));

        let layer = decode_layer(&png(200, 100, [0, 0, 255, 255]), &opts)?;

        assert_eq!(layer.pixels.get_pixel(25, 0).0, [10, 20, 30, 255]);
        assert_eq!(layer.pixels.get_pixel(25, 25).0, [0, 0, 255, 255]);
        Ok(())
    }

    #[test]
    fn test_rotation_happens_before_resize() -> Result<(), RenderError> {
        let opts = LayerOptions {
            rotation: Rotation::Quarter,
            width: Some(10),
            ..LayerOptions::default()
        };

        let layer = decode_layer(&png(40, 20, [0, 0, 0, 255]), &opts)?;

        assert_eq!(layer.pixels.dimensions(), (10, 20));
        Ok(())
    }

    #[test]
    fn test_background_flattens_transparency() -> Result<(), RenderError> {
        let opts = LayerOptions {
            background: Some(Background([255, 255, 255, 255])),
            x: -3,
            y: 4,
            ..LayerOptions::default()
        };

        let layer = decode_layer(&png(2, 2, [0, 0, 0, 0]), &opts)?;

        assert_eq!(layer.pixels.get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!((layer.x, layer.y), (-3, 4));
        assert_eq!(layer.background, opts.background);
        Ok(())
    }

    #[test]
    fn test_svg_rendered_at_target_density() -> Result<(), RenderError> {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="#00ff00"/></svg>"##;

        let layer = decode_layer(svg, &options(Some(100), Some(100), ResizeFit::Cover))?;

        assert_eq!(layer.pixels.dimensions(), (100, 100));
        assert_eq!(layer.pixels.get_pixel(50, 50).0, [0, 255, 0, 255]);
        Ok(())
    }

    #[test]
    fn test_explicit_density_wins() -> Result<(), RenderError> {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"/>"#;
        let opts = LayerOptions {
            density: Some(BASE_DENSITY * 3.0),
            ..LayerOptions::default()
        };

        assert_eq!(decode(svg, &opts)?.dimensions(), (30, 30));
        Ok(())
    }

    #[test]
    fn test_garbage_is_render_error() {
        let result = decode_layer(b"definitely not an image", &LayerOptions::default());
        assert!(matches!(result, Err(RenderError::Render(_))));
    }

    #[test]
    fn test_truncated_png_is_render_error() {
        let bytes = png(4, 4, [0, 0, 0, 255]);
        let result = decode_layer(&bytes[..20], &LayerOptions::default());
        assert!(matches!(result, Err(RenderError::Render(_))));
    }

    #[test_case(OutputFormat::Png, MediaType::Png ; "png")]
    #[test_case(OutputFormat::Jpeg, MediaType::Jpeg ; "jpeg")]
    #[test_case(OutputFormat::Webp, MediaType::Webp ; "webp")]
    #[test_case(OutputFormat::Gif, MediaType::Gif ; "gif")]
    fn test_encode_formats(format: OutputFormat, expected: MediaType) -> Result<(), RenderError> {
        let pixels = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255]));

        let bytes = encode(&pixels, format, 80)?;

        assert_eq!(MediaType::sniff(&bytes), Some(expected));
        assert_eq!(format.mime(), expected.mime());
        Ok(())
    }
}
