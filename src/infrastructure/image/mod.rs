//! Image decoding, SVG rasterization and layer compositing.

pub mod codec;
pub mod compositor;
pub mod layer_spec;
pub mod svg;

pub use codec::{OutputFormat, decode, decode_layer, encode};
pub use compositor::{compose, render, render_encoded};
pub use layer_spec::{LayerSpec, SpecSource};
pub use svg::{BASE_DENSITY, SvgSize, optimal_density, rasterize, svg_size};
