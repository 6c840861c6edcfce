//! Textual layer descriptions, as given on the command line.

use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::entities::{LayerOptions, Rotation};
use crate::domain::errors::LayerSpecError;

/// Where a described layer reads its image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// Local file.
    Path(PathBuf),
    /// Page or image URL, run through the image fetcher.
    Url(String),
}

/// A layer parsed from `key=value` pairs separated by commas.
///
/// `path=base.png,width=256,height=256,fit=contain,background=#fff`
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    /// Image origin.
    pub source: SpecSource,
    /// Decode and placement options.
    pub options: LayerOptions,
}

impl FromStr for LayerSpec {
    type Err = LayerSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut source = None;
        let mut options = LayerOptions::default();

        for pair in s.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| LayerSpecError::invalid_value(pair, ""))?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                "path" => source = Some(SpecSource::Path(PathBuf::from(value))),
                "url" => source = Some(SpecSource::Url(value.to_string())),
                "x" => options.x = number(key, value)?,
                "y" => options.y = number(key, value)?,
                "width" => options.width = Some(number(key, value)?),
                "height" => options.height = Some(number(key, value)?),
                "fit" => options.fit = value.parse()?,
                "background" => options.background = Some(value.parse()?),
                "rotate" => options.rotation = Rotation::from_degrees(number(key, value)?)?,
                "density" => {
                    let density: f32 = number(key, value)?;
                    if !(density.is_finite() && density > 0.0) {
                        return Err(LayerSpecError::invalid_value(key, value));
                    }
                    options.density = Some(density);
                }
                "without_enlargement" => options.without_enlargement = number(key, value)?,
                _ => return Err(LayerSpecError::UnknownKey(key.to_string())),
            }
        }

        Ok(Self {
            source: source.ok_or(LayerSpecError::MissingSource)?,
            options,
        })
    }
}

fn number<T: FromStr>(key: &str, value: &str) -> Result<T, LayerSpecError> {
    value
        .parse()
        .map_err(|_| LayerSpecError::invalid_value(key, value))
}
