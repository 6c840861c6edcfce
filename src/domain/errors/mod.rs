//! Domain error types.

mod fetch_error;
mod http_error;
mod layer_spec_error;
mod render_error;

pub use fetch_error::FetchImageError;
pub use http_error::HttpError;
pub use layer_spec_error::LayerSpecError;
pub use render_error::RenderError;
