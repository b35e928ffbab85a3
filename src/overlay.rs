//! Annotation capability per visual variant.
//!
//! Annotators do not touch pixels: they turn a [`FrameReport`] into drawing
//! primitives that the rendering collaborator replays on the frame.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::alert::flash_visible;
use crate::color::{self, Color};
use crate::config::PipelineConfig;
use crate::integration::FrameReport;
use crate::tracker::Rect;
use crate::zone::{Zone, ZoneRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotatorKind {
    Zone,
    Mask,
    Box,
    Label,
    Alert,
}

impl AnnotatorKind {
    /// Every variant, in drawing order.
    pub const ALL: [AnnotatorKind; 5] = [
        AnnotatorKind::Zone,
        AnnotatorKind::Mask,
        AnnotatorKind::Box,
        AnnotatorKind::Label,
        AnnotatorKind::Alert,
    ];
}

/// A drawing primitive in frame coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Overlay {
    Polygon { points: Vec<[i32; 2]>, color: Color },
    Rectangle { rect: Rect, color: Color },
    /// Fill the mask of the detection at this index
    Mask { detection: usize, color: Color },
    Label { anchor: (f32, f32), text: String, color: Color },
    Text { position: (i32, i32), text: String, color: Color },
}

/// How detection colors are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLookup {
    /// Color of the zone the detection is in
    Zone,
    /// Palette entry by detection index
    Index,
}

impl ColorLookup {
    fn color(self, zone: &Zone, detection: usize) -> Color {
        match self {
            ColorLookup::Zone => zone.color,
            ColorLookup::Index => color::by_index(detection),
        }
    }
}

pub trait Annotator {
    fn annotate(&self, frame: &FrameReport, overlays: &mut Vec<Overlay>);
}

/// Zone outlines.
pub struct ZoneAnnotator {
    zones: Arc<ZoneRegistry>,
}

impl Annotator for ZoneAnnotator {
    fn annotate(&self, _frame: &FrameReport, overlays: &mut Vec<Overlay>) {
        overlays.extend(self.zones.iter().map(|zone| Overlay::Polygon {
            points: zone.polygon.points().to_vec(),
            color: zone.color,
        }));
    }
}

/// Boxes around detections inside a zone.
pub struct BoxAnnotator {
    zones: Arc<ZoneRegistry>,
    lookup: ColorLookup,
}

impl Annotator for BoxAnnotator {
    fn annotate(&self, frame: &FrameReport, overlays: &mut Vec<Overlay>) {
        for (zone, report) in zone_reports(&self.zones, frame) {
            for &i in &report.detections {
                overlays.push(Overlay::Rectangle {
                    rect: frame.detections[i].bbox,
                    color: self.lookup.color(zone, i),
                });
            }
        }
    }
}

/// Instance masks of detections inside a zone.
pub struct MaskAnnotator {
    zones: Arc<ZoneRegistry>,
    lookup: ColorLookup,
}

impl Annotator for MaskAnnotator {
    fn annotate(&self, frame: &FrameReport, overlays: &mut Vec<Overlay>) {
        for (zone, report) in zone_reports(&self.zones, frame) {
            for &i in &report.detections {
                if frame.detections[i].mask.is_some() {
                    overlays.push(Overlay::Mask {
                        detection: i,
                        color: self.lookup.color(zone, i),
                    });
                }
            }
        }
    }
}

/// Track id labels next to detections inside a zone.
pub struct LabelAnnotator {
    zones: Arc<ZoneRegistry>,
    lookup: ColorLookup,
}

impl Annotator for LabelAnnotator {
    fn annotate(&self, frame: &FrameReport, overlays: &mut Vec<Overlay>) {
        for (zone, report) in zone_reports(&self.zones, frame) {
            for &i in &report.detections {
                let rect = frame.detections[i].bbox;
                let text = frame
                    .track_for(i)
                    .map_or_else(|| "ID:  ".to_string(), |t| t.label());
                overlays.push(Overlay::Label {
                    anchor: (rect.x, rect.y),
                    text,
                    color: self.lookup.color(zone, i),
                });
            }
        }
    }
}

/// Flashing warning for overloaded zones.
pub struct AlertAnnotator {
    origin: Instant,
}

impl AlertAnnotator {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Annotate as if `elapsed` time had passed since the annotator was created.
    pub fn annotate_at(&self, frame: &FrameReport, overlays: &mut Vec<Overlay>, elapsed: Duration) {
        if !flash_visible(elapsed) {
            return;
        }
        for report in frame.zones.iter().filter(|z| z.overloaded) {
            overlays.push(Overlay::Text {
                position: (20, 20),
                text: format!("Assistance required in zone {}!", report.zone_id),
                color: Color::RED,
            });
        }
    }
}

impl Default for AlertAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator for AlertAnnotator {
    fn annotate(&self, frame: &FrameReport, overlays: &mut Vec<Overlay>) {
        self.annotate_at(frame, overlays, self.origin.elapsed());
    }
}

fn zone_reports<'a>(
    zones: &'a ZoneRegistry,
    frame: &'a FrameReport,
) -> impl Iterator<Item = (&'a Zone, &'a crate::integration::ZoneReport)> {
    frame
        .zones
        .iter()
        .filter_map(move |report| zones.get(report.zone_id).map(|zone| (zone, report)))
}

/// Instantiate the configured annotators, in the given order.
pub fn build_annotators(
    kinds: &[AnnotatorKind],
    colorful: bool,
    zones: Arc<ZoneRegistry>,
) -> Vec<Box<dyn Annotator>> {
    let lookup = if colorful {
        ColorLookup::Index
    } else {
        ColorLookup::Zone
    };
    kinds
        .iter()
        .map(|kind| -> Box<dyn Annotator> {
            let zones = Arc::clone(&zones);
            match kind {
                AnnotatorKind::Zone => Box::new(ZoneAnnotator { zones }),
                AnnotatorKind::Mask => Box::new(MaskAnnotator { zones, lookup }),
                AnnotatorKind::Box => Box::new(BoxAnnotator { zones, lookup }),
                AnnotatorKind::Label => Box::new(LabelAnnotator { zones, lookup }),
                AnnotatorKind::Alert => Box::new(AlertAnnotator::new()),
            }
        })
        .collect()
}

/// Annotators selected by `config.annotators`, colored per `config.colorful`.
pub fn annotators_from_config(
    config: &PipelineConfig,
    zones: Arc<ZoneRegistry>,
) -> Vec<Box<dyn Annotator>> {
    build_annotators(&config.annotators, config.colorful, zones)
}

/// Run every annotator over a frame report.
pub fn render(annotators: &[Box<dyn Annotator>], frame: &FrameReport) -> Vec<Overlay> {
    let mut overlays = Vec::new();
    for annotator in annotators {
        annotator.annotate(frame, &mut overlays);
    }
    overlays
}
