//! Compositor layers.

use std::path::PathBuf;
use std::str::FromStr;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{LayerSpecError, RenderError};

/// How a layer is fitted into its target box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFit {
    /// Scale to fill the box, cropping the overflow around the centre.
    #[default]
    Cover,
    /// Scale to fit inside the box and pad the rest.
    Contain,
    /// Largest size that fits inside the box, keeping aspect ratio.
    Inside,
    /// Smallest size that covers the box, keeping aspect ratio.
    Outside,
    /// Stretch to the exact box, ignoring aspect ratio.
    Fill,
}

impl FromStr for ResizeFit {
    type Err = LayerSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cover" | "crop" => Ok(Self::Cover),
            "contain" | "embed" => Ok(Self::Contain),
            "inside" | "max" => Ok(Self::Inside),
            "outside" | "min" => Ok(Self::Outside),
            "fill" | "ignoreaspectratio" => Ok(Self::Fill),
            _ => Err(LayerSpecError::UnknownFit(s.to_string())),
        }
    }
}

/// Quarter-turn rotation, clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarters,
}

impl Rotation {
    /// Accepts any multiple of 90, including negative ones.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRotation` for angles that are not quarter turns.
    pub fn from_degrees(degrees: i64) -> Result<Self, LayerSpecError> {
        if degrees % 90 != 0 {
            return Err(LayerSpecError::InvalidRotation(degrees));
        }

        Ok(match degrees.rem_euclid(360) {
            90 => Self::Quarter,
            180 => Self::Half,
            270 => Self::ThreeQuarters,
            _ => Self::None,
        })
    }
}

/// Solid RGBA colour used to flatten transparency and to extend canvases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background(pub [u8; 4]);

impl Background {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);

    #[must_use]
    pub const fn rgba(self) -> [u8; 4] {
        self.0
    }
}

impl FromStr for Background {
    type Err = LayerSpecError;

    /// Parses `#rgb`, `#rrggbb` and `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LayerSpecError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let mut rgba = [0, 0, 0, 255];
                for (slot, index) in rgba.iter_mut().zip(0..3) {
                    let digit = channel(&hex[index..=index])?;
                    *slot = digit * 17;
                }
                Ok(Self(rgba))
            }
            6 | 8 => {
                let mut rgba = [0, 0, 0, 255];
                for (slot, index) in rgba.iter_mut().zip((0..hex.len()).step_by(2)) {
                    *slot = channel(&hex[index..index + 2])?;
                }
                Ok(Self(rgba))
            }
            _ => Err(invalid()),
        }
    }
}

/// Where a layer's encoded bytes come from.
pub enum LayerSource<'a> {
    /// Bytes already in memory.
    Bytes(Bytes),
    /// A file read when the layer is decoded.
    Path(PathBuf),
    /// Bytes still being produced, such as a download in flight.
    Pending(BoxFuture<'a, Result<Bytes, RenderError>>),
}

impl std::fmt::Debug for LayerSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Decode and placement options of a layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayerOptions {
    /// Target width; no resize when both dimensions are absent.
    pub width: Option<u32>,
    /// Target height.
    pub height: Option<u32>,
    /// Horizontal position, may be negative.
    pub x: i64,
    /// Vertical position, may be negative.
    pub y: i64,
    /// Resize mode.
    pub fit: ResizeFit,
    /// Never scale the image up when resizing.
    pub without_enlargement: bool,
    /// Flatten colour, reused when the layer's canvas is extended.
    pub background: Option<Background>,
    /// Rotation applied before resizing.
    pub rotation: Rotation,
    /// Explicit SVG rasterization density, skipping the automatic one.
    pub density: Option<f32>,
}

/// One input of the compositor.
#[derive(Debug)]
pub struct ImageLayer<'a> {
    source: LayerSource<'a>,
    options: LayerOptions,
}

impl<'a> ImageLayer<'a> {
    #[must_use]
    pub fn new(source: LayerSource<'a>) -> Self {
        Self {
            source,
            options: LayerOptions::default(),
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(LayerSource::Bytes(bytes.into()))
    }

    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(LayerSource::Path(path.into()))
    }

    /// A layer whose bytes are produced by a future, polled alongside the
    /// other layers.
    #[must_use]
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Bytes, RenderError>> + Send + 'a,
    {
        Self::new(LayerSource::Pending(Box::pin(future)))
    }

    #[must_use]
    pub fn with_options(mut self, options: LayerOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn at(mut self, x: i64, y: i64) -> Self {
        self.options.x = x;
        self.options.y = y;
        self
    }

    #[must_use]
    pub fn sized(mut self, width: u32, height: u32) -> Self {
        self.options.width = Some(width);
        self.options.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_fit(mut self, fit: ResizeFit) -> Self {
        self.options.fit = fit;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Background) -> Self {
        self.options.background = Some(background);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.options.rotation = rotation;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &LayerOptions {
        &self.options
    }

    /// Splits the layer into its source and options.
    #[must_use]
    pub fn into_parts(self) -> (LayerSource<'a>, LayerOptions) {
        (self.source, self.options)
    }
}

/// A decoded layer: RGBA pixels placed at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLayer {
    /// Pixel buffer.
    pub pixels: RgbaImage,
    /// Horizontal position.
    pub x: i64,
    /// Vertical position.
    pub y: i64,
    /// Fill used when this layer's canvas is extended.
    pub background: Option<Background>,
}

impl RawLayer {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> i64 {
        self.x + i64::from(self.width())
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> i64 {
        self.y + i64::from(self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("cover", ResizeFit::Cover ; "cover")]
    #[test_case("contain", ResizeFit::Contain ; "contain")]
    #[test_case("inside", ResizeFit::Inside ; "inside")]
    #[test_case("outside", ResizeFit::Outside ; "outside")]
    #[test_case("fill", ResizeFit::Fill ; "fill")]
    #[test_case("ignoreAspectRatio", ResizeFit::Fill ; "legacy name")]
    fn test_resize_fit_from_str(input: &str, expected: ResizeFit) {
        assert_eq!(input.parse::<ResizeFit>(), Ok(expected));
    }

    #[test]
    fn test_unknown_fit_is_rejected() {
        assert_eq!(
            "squash".parse::<ResizeFit>(),
            Err(LayerSpecError::UnknownFit("squash".into()))
        );
    }

    #[test_case("#fff", [255, 255, 255, 255] ; "short")]
    #[test_case("#36393e", [0x36, 0x39, 0x3e, 255] ; "long")]
    #[test_case("#36393e80", [0x36, 0x39, 0x3e, 0x80] ; "with alpha")]
    fn test_background_from_str(input: &str, expected: [u8; 4]) {
        assert_eq!(input.parse::<Background>(), Ok(Background(expected)));
    }

    #[test_case("fff" ; "missing hash")]
    #[test_case("#ffff" ; "bad length")]
    #[test_case("#gggggg" ; "not hex")]
    #[test_case("#ééé" ; "not ascii")]
    fn test_background_rejects(input: &str) {
        assert!(input.parse::<Background>().is_err());
    }

    #[test_case(0, Rotation::None ; "zero")]
    #[test_case(90, Rotation::Quarter ; "quarter")]
    #[test_case(-90, Rotation::ThreeQuarters ; "negative quarter")]
    #[test_case(540, Rotation::Half ; "more than a turn")]
    fn test_rotation_from_degrees(degrees: i64, expected: Rotation) {
        assert_eq!(Rotation::from_degrees(degrees), Ok(expected));
    }

    #[test]
    fn test_rotation_rejects_partial_turns() {
        assert_eq!(
            Rotation::from_degrees(45),
            Err(LayerSpecError::InvalidRotation(45))
        );
    }

    #[test]
    fn test_raw_layer_edges() {
        let layer = RawLayer {
            pixels: RgbaImage::new(50, 20),
            x: -10,
            y: 5,
            background: None,
        };

        assert_eq!(layer.right(), 40);
        assert_eq!(layer.bottom(), 25);
    }
}
