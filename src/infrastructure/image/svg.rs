//! SVG sizing and rasterization.

use image::RgbaImage;
use resvg::{tiny_skia, usvg};

use crate::domain::entities::parse_xml;
use crate::domain::errors::RenderError;

/// Density at which an SVG renders at its own size.
pub const BASE_DENSITY: f32 = 72.0;

/// Intrinsic size of an SVG document, in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgSize {
    pub width: f32,
    pub height: f32,
}

/// Reads the size from the root's `width`, `height` and `viewBox`.
///
/// A missing dimension is derived from the `viewBox` ratio. Percentages
/// count as missing. Returns `None` for anything that is not a well-formed
/// SVG with a positive size.
#[must_use]
pub fn svg_size(bytes: &[u8]) -> Option<SvgSize> {
    let text = std::str::from_utf8(bytes).ok()?;
    let document = parse_xml(text).ok()?;
    let root = document.root_element();
    if root.tag_name().name() != "svg" {
        return None;
    }

    let width = root.attribute("width").and_then(parse_length);
    let height = root.attribute("height").and_then(parse_length);
    let view_box = root.attribute("viewBox").and_then(parse_view_box);

    let (width, height) = match (width, height, view_box) {
        (Some(width), Some(height), _) => (width, height),
        (Some(width), None, Some((vw, vh))) => (width, (width * vh / vw).floor()),
        (None, Some(height), Some((vw, vh))) => ((height * vw / vh).floor(), height),
        (None, None, Some((vw, vh))) => (vw, vh),
        _ => return None,
    };

    (width > 0.0 && height > 0.0).then_some(SvgSize { width, height })
}

/// Density that renders `svg` at least as large as the target box.
///
/// Never below `base_density`. Returns `None` when there is no target or
/// the SVG has no usable size.
#[must_use]
pub fn optimal_density(
    svg: &[u8],
    width: Option<u32>,
    height: Option<u32>,
    base_density: f32,
) -> Option<f32> {
    let size = svg_size(svg)?;

    #[allow(clippy::cast_precision_loss)]
    let scale = [
        width.map(|width| width as f32 / size.width),
        height.map(|height| height as f32 / size.height),
    ]
    .into_iter()
    .flatten()
    .reduce(f32::max)?;

    Some((scale * base_density).max(base_density))
}

/// Renders an SVG at `density`, where [`BASE_DENSITY`] is its natural size.
///
/// # Errors
///
/// Returns `RenderError::Render` for unparseable SVG or an empty canvas.
pub fn rasterize(svg: &[u8], density: f32) -> Result<RgbaImage, RenderError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(svg, &options)
        .map_err(|e| RenderError::render(format!("invalid svg: {e}")))?;

    let scale = density / BASE_DENSITY;
    let size = tree
        .size()
        .to_int_size()
        .scale_by(scale)
        .ok_or_else(|| RenderError::render("svg scales to an empty canvas"))?;
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| RenderError::render("failed to allocate svg canvas"))?;

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let rgba = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();

    RgbaImage::from_raw(size.width(), size.height(), rgba)
        .ok_or_else(|| RenderError::render("svg canvas size mismatch"))
}

/// Leading number of a length such as `100`, `12.5px` or `3em`.
fn parse_length(value: &str) -> Option<f32> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }

    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

fn parse_view_box(value: &str) -> Option<(f32, f32)> {
    let numbers: Vec<f32> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    match numbers[..] {
        [_, _, width, height] if width > 0.0 && height > 0.0 => Some((width, height)),
        _ => None,
    }
}
