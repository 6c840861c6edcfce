//! Image formats the pipeline can decode, detected from content.

use serde::{Deserialize, Serialize};

/// A decodable image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum MediaType {
    Png,
    Jpeg,
    Gif,
    Webp,
    Tiff,
    Svg,
}

impl MediaType {
    /// Every supported format, in `Accept` header order.
    pub const ALL: [Self; 6] = [
        Self::Png,
        Self::Jpeg,
        Self::Gif,
        Self::Webp,
        Self::Tiff,
        Self::Svg,
    ];

    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Tiff => "image/tiff",
            Self::Svg => "image/svg+xml",
        }
    }

    /// Raster codec for the format, `None` for SVG.
    #[must_use]
    pub const fn raster_format(self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::Webp => Some(image::ImageFormat::WebP),
            Self::Tiff => Some(image::ImageFormat::Tiff),
            Self::Svg => None,
        }
    }

    /// Detects the format from magic bytes, or an `<svg>` document root.
    ///
    /// Content-Type headers are not consulted.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if let Ok(format) = image::guess_format(bytes) {
            return match format {
                image::ImageFormat::Png => Some(Self::Png),
                image::ImageFormat::Jpeg => Some(Self::Jpeg),
                image::ImageFormat::Gif => Some(Self::Gif),
                image::ImageFormat::WebP => Some(Self::Webp),
                image::ImageFormat::Tiff => Some(Self::Tiff),
                _ => None,
            };
        }

        is_svg(bytes).then_some(Self::Svg)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime())
    }
}

/// Whether `bytes` is a well-formed XML document rooted at `<svg>`.
#[must_use]
pub fn is_svg(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };

    parse_xml(text).is_ok_and(|document| document.root_element().tag_name().name() == "svg")
}

/// Parses XML, allowing the DTDs some SVG exporters emit.
///
/// # Errors
///
/// Returns the parser error for malformed documents.
pub fn parse_xml(text: &str) -> Result<roxmltree::Document<'_>, roxmltree::Error> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    roxmltree::Document::parse_with_options(text, options)
}

/// `Accept` header value: `accepted` formats first, then anything else.
#[must_use]
pub fn accept_header(accepted: &[MediaType]) -> String {
    accepted
        .iter()
        .map(|media| media.mime())
        .chain(["image/*;q=0.8", "text/html;q=0.5", "*/*;q=0.1"])
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR", Some(MediaType::Png) ; "png")]
    #[test_case(b"\xff\xd8\xff\xe0\0\x10JFIF", Some(MediaType::Jpeg) ; "jpeg")]
    #[test_case(b"GIF89a\x01\0\x01\0", Some(MediaType::Gif) ; "gif")]
    #[test_case(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>", Some(MediaType::Svg) ; "svg")]
    #[test_case(b"<?xml version=\"1.0\"?>\n<svg viewBox=\"0 0 1 1\"></svg>", Some(MediaType::Svg) ; "svg with prolog")]
    #[test_case(b"<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<svg/>", Some(MediaType::Svg) ; "svg with doctype")]
    #[test_case(b"<html><body><svg/></body></html>", None ; "html embedding svg")]
    #[test_case(b"<svg><unclosed></svg>", None ; "malformed svg")]
    #[test_case(b"plain text", None ; "text")]
    fn test_sniff(bytes: &[u8], expected: Option<MediaType>) {
        assert_eq!(MediaType::sniff(bytes), expected);
    }

    #[test]
    fn test_accept_header_order() {
        let accept = accept_header(&MediaType::ALL);

        assert!(accept.starts_with("image/png, image/jpeg"));
        assert!(accept.contains("image/svg+xml, image/*;q=0.8"));
        assert!(accept.ends_with("text/html;q=0.5, */*;q=0.1"));
    }

    #[test]
    fn test_accept_header_lists_only_accepted() {
        let accept = accept_header(&[MediaType::Webp]);

        assert_eq!(accept, "image/webp, image/*;q=0.8, text/html;q=0.5, */*;q=0.1");
    }

    #[test]
    fn test_media_type_names() -> Result<(), toml::de::Error> {
        #[derive(Deserialize)]
        struct Formats {
            accepted: Vec<MediaType>,
        }

        let formats: Formats = toml::from_str(r#"accepted = ["png", "svg"]"#)?;

        assert_eq!(formats.accepted, vec![MediaType::Png, MediaType::Svg]);
        Ok(())
    }
}
