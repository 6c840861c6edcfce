//! Layered compositor.
//!
//! Every layer decodes concurrently. Finished layers that sit next to each
//! other in the stack are merged as soon as they are both available, so a
//! slow download only holds back the layers around it.

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use image::imageops;
use image::{Rgba, RgbaImage};
use tracing::{debug, trace};

use super::codec::{OutputFormat, decode_layer, encode};
use crate::domain::entities::{Background, ImageLayer, LayerOptions, LayerSource, RawLayer};
use crate::domain::errors::RenderError;

const MAX_CANVAS_SIDE: u32 = 16_384;

enum Slot {
    Pending(usize),
    Decoded(RawLayer),
}

/// Decodes and stacks `layers`, the first one at the bottom.
///
/// # Errors
///
/// Returns the first layer failure, or `RenderError::Render` when there is
/// nothing to render or the merged canvas would be too large.
pub async fn render(layers: Vec<ImageLayer<'_>>) -> Result<RawLayer, RenderError> {
    if layers.is_empty() {
        return Err(RenderError::render("no layers to render"));
    }

    let mut slots = Vec::with_capacity(layers.len());
    let mut decodes = FuturesUnordered::new();
    for (index, layer) in layers.into_iter().enumerate() {
        let (source, options) = layer.into_parts();
        slots.push(Slot::Pending(index));
        decodes.push(async move { (index, decode_source(source, options).await) });
    }

    while let Some((index, result)) = decodes.next().await {
        let layer = result?;
        trace!(index, width = layer.width(), height = layer.height(), "Layer decoded");

        if let Some(slot) = slots
            .iter_mut()
            .find(|slot| matches!(slot, Slot::Pending(id) if *id == index))
        {
            *slot = Slot::Decoded(layer);
        }
        slots = tokio::task::spawn_blocking(move || merge_runs(slots)).await??;
    }

    match slots.pop() {
        Some(Slot::Decoded(layer)) if slots.is_empty() => Ok(layer),
        _ => Err(RenderError::render("layers left unmerged")),
    }
}

/// Renders `layers` and encodes the result.
///
/// # Errors
///
/// Same as [`render`], plus encoder failures.
pub async fn render_encoded(
    layers: Vec<ImageLayer<'_>>,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, RenderError> {
    let layer = render(layers).await?;
    tokio::task::spawn_blocking(move || encode(&layer.pixels, format, quality)).await?
}

async fn decode_source(
    source: LayerSource<'_>,
    options: LayerOptions,
) -> Result<RawLayer, RenderError> {
    let bytes = match source {
        LayerSource::Bytes(bytes) => bytes,
        LayerSource::Path(path) => Bytes::from(tokio::fs::read(&path).await?),
        LayerSource::Pending(future) => future.await?,
    };

    tokio::task::spawn_blocking(move || decode_layer(&bytes, &options)).await?
}

/// Replaces every run of adjacent decoded layers with their composition.
fn merge_runs(slots: Vec<Slot>) -> Result<Vec<Slot>, RenderError> {
    let mut merged = Vec::with_capacity(slots.len());
    let mut run = Vec::new();

    for slot in slots {
        match slot {
            Slot::Decoded(layer) => run.push(layer),
            pending @ Slot::Pending(_) => {
                flush_run(&mut run, &mut merged)?;
                merged.push(pending);
            }
        }
    }
    flush_run(&mut run, &mut merged)?;

    Ok(merged)
}

/// Only the run holding the bottom layer (always the first slot) may extend
/// its canvas with a background; any other run extends with transparency.
fn flush_run(run: &mut Vec<RawLayer>, merged: &mut Vec<Slot>) -> Result<(), RenderError> {
    if run.len() > 1 {
        let bottom = merged.is_empty();
        debug!(layers = run.len(), bottom, "Merging adjacent layers");
        let layers = std::mem::take(run);
        let layer = if bottom {
            compose(layers)?
        } else {
            compose_overlays(layers)?
        };
        merged.push(Slot::Decoded(layer));
    } else if let Some(layer) = run.pop() {
        merged.push(Slot::Decoded(layer));
    }
    Ok(())
}

/// Draws `layers` in order onto a canvas spanning all of them.
///
/// The first layer's canvas is extended with its background, or with
/// transparency when it has none. The result sits at the top-left corner
/// of the bounding box and keeps the first layer's background.
///
/// # Errors
///
/// Returns `RenderError::Render` for an empty input or an oversized canvas.
pub fn compose(layers: Vec<RawLayer>) -> Result<RawLayer, RenderError> {
    let background = layers.first().and_then(|layer| layer.background);
    compose_with_fill(layers, background)
}

/// Stacks a run that will later be drawn over lower layers.
fn compose_overlays(layers: Vec<RawLayer>) -> Result<RawLayer, RenderError> {
    compose_with_fill(layers, None)
}

fn compose_with_fill(
    layers: Vec<RawLayer>,
    background: Option<Background>,
) -> Result<RawLayer, RenderError> {
    let mut layers = layers.into_iter();
    let base = layers
        .next()
        .ok_or_else(|| RenderError::render("nothing to compose"))?;
    let overlays: Vec<RawLayer> = layers.collect();

    let left = overlays.iter().map(|layer| layer.x).fold(base.x, i64::min);
    let top = overlays.iter().map(|layer| layer.y).fold(base.y, i64::min);
    let right = overlays
        .iter()
        .map(RawLayer::right)
        .fold(base.right(), i64::max);
    let bottom = overlays
        .iter()
        .map(RawLayer::bottom)
        .fold(base.bottom(), i64::max);

    let width = canvas_side(right - left)?;
    let height = canvas_side(bottom - top)?;

    let fill = background.unwrap_or(Background::TRANSPARENT);
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(fill.rgba()));
    imageops::replace(&mut canvas, &base.pixels, base.x - left, base.y - top);
    for layer in &overlays {
        imageops::overlay(&mut canvas, &layer.pixels, layer.x - left, layer.y - top);
    }

    Ok(RawLayer {
        pixels: canvas,
        x: left,
        y: top,
        background,
    })
}

fn canvas_side(length: i64) -> Result<u32, RenderError> {
    u32::try_from(length)
        .ok()
        .filter(|side| *side <= MAX_CANVAS_SIDE)
        .ok_or_else(|| RenderError::render(format!("canvas side {length} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FetchImageError;
    use std::io::Cursor;
    use std::time::Duration;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn png(width: u32, height: u32, color: [u8; 4]) -> Bytes {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(width, height, Rgba(color))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        Bytes::from(bytes)
    }

    fn raw(width: u32, height: u32, color: [u8; 4], x: i64, y: i64) -> RawLayer {
        RawLayer {
            pixels: RgbaImage::from_pixel(width, height, Rgba(color)),
            x,
            y,
            background: None,
        }
    }

    #[tokio::test]
    async fn test_overlay_outside_base_extends_canvas() -> Result<(), RenderError> {
        let layers = vec![
            ImageLayer::from_bytes(png(100, 100, RED)),
            ImageLayer::from_bytes(png(50, 50, BLUE)).at(-10, -10),
        ];

        let result = render(layers).await?;

        assert_eq!(result.pixels.dimensions(), (110, 110));
        assert_eq!((result.x, result.y), (-10, -10));
        assert_eq!(result.pixels.get_pixel(0, 0).0, BLUE);
        assert_eq!(result.pixels.get_pixel(109, 109).0, RED);
        assert_eq!(result.pixels.get_pixel(105, 5).0, [0, 0, 0, 0]);
        Ok(())
    }

    #[tokio::test]
    async fn test_later_layers_win_regardless_of_decode_order() -> Result<(), RenderError> {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, RenderError>(png(10, 10, GREEN))
        };
        let layers = vec![
            ImageLayer::from_bytes(png(10, 10, RED)),
            ImageLayer::pending(slow),
            ImageLayer::from_bytes(png(5, 5, BLUE)),
        ];

        let result = render(layers).await?;

        assert_eq!(result.pixels.dimensions(), (10, 10));
        assert_eq!(result.pixels.get_pixel(0, 0).0, BLUE);
        assert_eq!(result.pixels.get_pixel(7, 7).0, GREEN);
        Ok(())
    }

    async fn render_three_with_delays(
        base_delay: u64,
        overlay_delay: u64,
    ) -> Result<RawLayer, RenderError> {
        let delayed = |bytes: Bytes, millis: u64| async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok::<_, RenderError>(bytes)
        };
        let layers = vec![
            ImageLayer::pending(delayed(png(10, 10, RED), base_delay)),
            ImageLayer::pending(delayed(png(2, 2, BLUE), overlay_delay))
                .with_background(Background(GREEN)),
            ImageLayer::pending(delayed(png(2, 2, WHITE), overlay_delay)).at(8, 8),
        ];
        render(layers).await
    }

    #[tokio::test]
    async fn test_overlay_background_does_not_depend_on_decode_order() -> Result<(), RenderError>
    {
        let base_first = render_three_with_delays(0, 50).await?;
        let base_last = render_three_with_delays(50, 0).await?;

        assert_eq!(base_first.pixels.get_pixel(5, 5).0, RED);
        assert_eq!(base_last.pixels.get_pixel(5, 5).0, RED);
        assert_eq!(base_last.pixels.get_pixel(0, 0).0, BLUE);
        assert_eq!(base_last.pixels.get_pixel(9, 9).0, WHITE);
        assert_eq!(base_first.pixels, base_last.pixels);
        assert_eq!(base_first.background, base_last.background);
        Ok(())
    }

    #[test]
    fn test_merge_runs_above_pending_base_extend_transparent() -> Result<(), RenderError> {
        let mut overlay = raw(2, 2, BLUE, 0, 0);
        overlay.background = Some(Background(GREEN));
        let slots = vec![
            Slot::Pending(0),
            Slot::Decoded(overlay),
            Slot::Decoded(raw(2, 2, RED, 8, 8)),
        ];

        let merged = merge_runs(slots)?;

        let Some(Slot::Decoded(run)) = merged.get(1) else {
            panic!("expected a merged run");
        };
        assert_eq!(run.pixels.get_pixel(5, 5).0, [0, 0, 0, 0]);
        assert_eq!(run.background, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_base_background_fills_extension() -> Result<(), RenderError> {
        let layers = vec![
            ImageLayer::from_bytes(png(4, 4, RED)).with_background(Background(GREEN)),
            ImageLayer::from_bytes(png(2, 2, BLUE)).at(6, 0),
        ];

        let result = render(layers).await?;

        assert_eq!(result.pixels.dimensions(), (8, 4));
        assert_eq!(result.pixels.get_pixel(5, 3).0, GREEN);
        assert_eq!(result.background, Some(Background(GREEN)));
        Ok(())
    }

    #[tokio::test]
    async fn test_single_layer_is_returned_as_is() -> Result<(), RenderError> {
        let result = render(vec![ImageLayer::from_bytes(png(3, 2, RED)).at(5, 7)]).await?;

        assert_eq!(result.pixels.dimensions(), (3, 2));
        assert_eq!((result.x, result.y), (5, 7));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_layers() {
        let result = render(Vec::new()).await;
        assert!(matches!(result, Err(RenderError::Render(_))));
    }

    #[tokio::test]
    async fn test_corrupt_layer_is_render_error() {
        let layers = vec![
            ImageLayer::from_bytes(png(4, 4, RED)),
            ImageLayer::from_bytes(Bytes::from_static(b"corrupt")),
        ];

        let result = render(layers).await;

        assert!(matches!(result, Err(RenderError::Render(_))));
    }

    #[tokio::test]
    async fn test_pending_failure_keeps_classification() {
        let layers = vec![
            ImageLayer::from_bytes(png(4, 4, RED)),
            ImageLayer::pending(async {
                Err::<Bytes, _>(RenderError::from(FetchImageError::NoImagesFound))
            }),
        ];

        let result = render(layers).await;

        assert!(matches!(
            result,
            Err(RenderError::Fetch(FetchImageError::NoImagesFound))
        ));
    }

    #[tokio::test]
    async fn test_layer_from_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("base.png");
        std::fs::write(&path, png(6, 6, GREEN))?;

        let result = render(vec![ImageLayer::from_path(&path)]).await?;
        assert_eq!(result.pixels.get_pixel(3, 3).0, GREEN);

        let missing = render(vec![ImageLayer::from_path(dir.path().join("nope.png"))]).await;
        assert!(matches!(missing, Err(RenderError::Io(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_render_encoded() -> Result<(), RenderError> {
        let bytes = render_encoded(
            vec![ImageLayer::from_bytes(png(4, 4, RED))],
            OutputFormat::Jpeg,
            90,
        )
        .await?;

        assert_eq!(
            crate::domain::entities::MediaType::sniff(&bytes),
            Some(crate::domain::entities::MediaType::Jpeg)
        );
        Ok(())
    }

    #[test]
    fn test_merge_runs_only_joins_neighbours() -> Result<(), RenderError> {
        let slots = vec![
            Slot::Decoded(raw(2, 2, RED, 0, 0)),
            Slot::Decoded(raw(2, 2, BLUE, 2, 0)),
            Slot::Pending(2),
            Slot::Decoded(raw(1, 1, GREEN, 0, 0)),
        ];

        let merged = merge_runs(slots)?;

        assert_eq!(merged.len(), 3);
        assert!(matches!(&merged[0], Slot::Decoded(layer) if layer.width() == 4));
        assert!(matches!(merged[1], Slot::Pending(2)));
        assert!(matches!(&merged[2], Slot::Decoded(layer) if layer.width() == 1));
        Ok(())
    }

    #[test]
    fn test_compose_rejects_huge_canvas() {
        let layers = vec![raw(1, 1, RED, 0, 0), raw(1, 1, RED, 1 << 40, 0)];
        assert!(matches!(compose(layers), Err(RenderError::Render(_))));
    }

    #[test]
    fn test_compose_empty() {
        assert!(matches!(compose(Vec::new()), Err(RenderError::Render(_))));
    }
}
