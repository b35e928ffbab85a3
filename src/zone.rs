//! Polygonal regions of interest and per-frame zone membership.

mod polygon;
mod registry;

use serde::Serialize;

use crate::color::Color;
use crate::detection::Detection;
use crate::tracker::Rect;

pub use polygon::Polygon;
pub use registry::ZoneRegistry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    /// 1-based id in configuration order
    pub id: usize,
    pub name: String,
    pub polygon: Polygon,
    pub color: Color,
}

impl Zone {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.polygon.contains(x, y)
    }

    /// Membership of every detection, by its bottom-center anchor.
    pub fn trigger(&self, detections: &[Detection], resolution: (u32, u32)) -> Vec<bool> {
        detections
            .iter()
            .map(|d| {
                let (x, y) = anchor(&d.bbox, resolution);
                self.contains(x, y)
            })
            .collect()
    }

    /// Indices of the detections inside this zone.
    pub fn detections_in_zone(&self, detections: &[Detection], resolution: (u32, u32)) -> Vec<usize> {
        self.trigger(detections, resolution)
            .into_iter()
            .enumerate()
            .filter_map(|(i, inside)| inside.then_some(i))
            .collect()
    }
}

/// Representative point of a box: bottom-center, clipped to the frame.
pub fn anchor(rect: &Rect, resolution: (u32, u32)) -> (f32, f32) {
    let (x, y) = rect.bottom_center();
    (
        x.clamp(0.0, resolution.0 as f32),
        y.clamp(0.0, resolution.1 as f32),
    )
}
