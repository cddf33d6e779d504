//! Mask rasterization.
//!
//! Masks are single-channel 8-bit images the size of the source camera
//! image. In mono encoding every masked pixel is 255; in color encoding each
//! instance gets its own gray level (1, 2, ...), saturating at 255.

use image::{imageops, GrayImage, Luma};
use rdepth_models::{BoundingBox, MaskRegion, Point, SegMaskMode};
use tracing::debug;

/// Pixel value used for instance `index` under `mode`.
pub fn instance_value(mode: SegMaskMode, index: usize) -> u8 {
    match mode {
        SegMaskMode::Color => (index + 1).min(u8::MAX as usize) as u8,
        SegMaskMode::Mono | SegMaskMode::None => u8::MAX,
    }
}

/// Fill an axis-aligned rectangle, clipped to the image.
pub fn fill_rect(mask: &mut GrayImage, rect: &BoundingBox, value: u8) {
    let (width, height) = mask.dimensions();
    let Some((x0, y0, x1, y1)) = clip_rect(rect, width, height) else {
        return;
    };

    for y in y0..y1 {
        for x in x0..x1 {
            mask.put_pixel(x, y, Luma([value]));
        }
    }
}

/// Fill a polygon using the even-odd rule at pixel centers.
pub fn fill_polygon(mask: &mut GrayImage, points: &[Point], value: u8) {
    if points.len() < 3 {
        return;
    }
    let (width, height) = mask.dimensions();
    let Some(bounds) = BoundingBox::enclosing(points) else {
        return;
    };
    let Some((x0, y0, x1, y1)) = clip_rect(&bounds, width, height) else {
        return;
    };

    for y in y0..y1 {
        for x in x0..x1 {
            if contains_point(points, x as f64 + 0.5, y as f64 + 0.5) {
                mask.put_pixel(x, y, Luma([value]));
            }
        }
    }
}

/// Rasterize mask regions into a new image.
pub fn rasterize_regions(
    width: u32,
    height: u32,
    regions: &[MaskRegion],
    mode: SegMaskMode,
) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for (index, region) in regions.iter().enumerate() {
        let value = instance_value(mode, index);
        match region {
            MaskRegion::Rect { rect } => fill_rect(&mut mask, rect, value),
            MaskRegion::Polygon { points } => fill_polygon(&mut mask, points, value),
        }
    }
    mask
}

/// Count non-zero pixels.
pub fn foreground_pixels(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|p| p.0[0] != 0).count() as u64
}

/// Returns true if any non-zero pixel lies inside `rect`.
pub fn covers_rect(mask: &GrayImage, rect: &BoundingBox) -> bool {
    let (width, height) = mask.dimensions();
    let frame = BoundingBox::new(0.0, 0.0, width as f64, height as f64);
    if !rect.intersects(&frame) {
        return false;
    }
    let Some((x0, y0, x1, y1)) = clip_rect(rect, width, height) else {
        return false;
    };

    (y0..y1).any(|y| (x0..x1).any(|x| mask.get_pixel(x, y).0[0] != 0))
}

/// Bounding rectangle of the non-zero pixels, if any.
pub fn foreground_bounds(mask: &GrayImage) -> Option<BoundingBox> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    bounds.map(|(x0, y0, x1, y1)| {
        BoundingBox::new(
            x0 as f64,
            y0 as f64,
            (x1 - x0 + 1) as f64,
            (y1 - y0 + 1) as f64,
        )
    })
}

/// Options applied when merging model instance masks into one raster.
#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    pub mode: SegMaskMode,
    /// Instances with fewer foreground pixels are dropped; 0 keeps all
    pub min_object_area: u32,
    /// Replace each instance by its bounding rectangle
    pub boxify: bool,
}

/// Merge per-instance binary masks into one raster of the given size.
///
/// Instance masks of a different size are rescaled with nearest-neighbour
/// sampling before merging.
pub fn compose_instances(
    width: u32,
    height: u32,
    instances: &[GrayImage],
    options: ComposeOptions,
) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let mut kept = 0usize;

    for instance in instances {
        let resized;
        let instance = if instance.dimensions() != (width, height) {
            resized = imageops::resize(instance, width, height, imageops::FilterType::Nearest);
            &resized
        } else {
            instance
        };

        let area = foreground_pixels(instance);
        if area == 0 || area < options.min_object_area as u64 {
            debug!(area, min_area = options.min_object_area, "Dropping small instance mask");
            continue;
        }

        let value = instance_value(options.mode, kept);
        kept += 1;

        if options.boxify {
            if let Some(rect) = foreground_bounds(instance) {
                fill_rect(&mut mask, &rect, value);
            }
        } else {
            for (x, y, pixel) in instance.enumerate_pixels() {
                if pixel.0[0] != 0 {
                    mask.put_pixel(x, y, Luma([value]));
                }
            }
        }
    }

    mask
}

fn clip_rect(rect: &BoundingBox, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if !(rect.x.is_finite() && rect.y.is_finite() && rect.width.is_finite() && rect.height.is_finite()) {
        return None;
    }
    let x0 = rect.x.floor().max(0.0).min(width as f64) as u32;
    let y0 = rect.y.floor().max(0.0).min(height as f64) as u32;
    let x1 = rect.x2().ceil().max(0.0).min(width as f64) as u32;
    let y1 = rect.y2().ceil().max(0.0).min(height as f64) as u32;
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

fn contains_point(points: &[Point], x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > y) != (pj.y > y) && x < (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
