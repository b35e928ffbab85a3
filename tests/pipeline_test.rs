use std::sync::Arc;

use zonetrack_rs::overlay::{AnnotatorKind, Overlay, annotators_from_config, render};
use zonetrack_rs::{
    Detection, FramePipeline, Letterbox, PipelineConfig, RawDetectionBuilder, RawFrame,
    ZoneRegistry,
};

const LEFT_HALF: &str = r#"{
    "left": {"points": [[0, 0], [0, 480], [320, 480], [320, 0]]},
    "right": {"points": [[320, 0], [320, 480], [640, 480], [640, 0]]}
}"#;

fn pipeline(json: &str, resolution: (u32, u32), config: PipelineConfig) -> FramePipeline {
    let zones = Arc::new(ZoneRegistry::from_json_str(json, resolution).unwrap());
    FramePipeline::new(&config, zones).unwrap()
}

/// `n` people side by side, all standing in the left half.
fn crowd(n: usize) -> Vec<Detection> {
    (0..n)
        .map(|i| {
            let x = 10.0 + 70.0 * i as f32;
            Detection::new(x, 200.0, x + 50.0, 400.0, 0.9 - 0.01 * i as f32)
        })
        .collect()
}

#[test]
fn test_representative_point_decides_membership() {
    let square = r#"{"square": {"points": [[0, 0], [0, 10], [10, 10], [10, 0]]}}"#;
    let mut pipeline = pipeline(square, (20, 20), PipelineConfig::default());

    // Bottom-centers at (5, 5) and (15, 15).
    let report = pipeline.process_detections(vec![
        Detection::new(3.0, 1.0, 7.0, 5.0, 0.9),
        Detection::new(13.0, 11.0, 17.0, 15.0, 0.8),
    ]);

    assert_eq!(report.zones.len(), 1);
    assert_eq!(report.zones[0].detections, vec![0]);
    assert_eq!(report.zones[0].count, 1);
}

#[test]
fn test_sustained_crowd_raises_alert() {
    let config = PipelineConfig {
        object_limit: 3,
        last_frames: 5,
        ..PipelineConfig::default()
    };

    let mut busy = pipeline(LEFT_HALF, (640, 480), config.clone());
    let mut quiet = pipeline(LEFT_HALF, (640, 480), config);
    for _ in 0..5 {
        let report = busy.process_detections(crowd(4));
        assert_eq!(report.zones[0].count, 4);
        assert_eq!(report.zones[1].count, 0);
        quiet.process_detections(crowd(1));
    }

    assert_eq!(busy.occupancy().mean(1), 4);
    assert_eq!(quiet.occupancy().mean(1), 1);

    let report = busy.process_detections(crowd(4));
    assert_eq!(report.zones[0].mean, 4);
    assert!(report.zones[0].overloaded);
    assert!(!report.zones[1].overloaded);

    let report = quiet.process_detections(crowd(1));
    assert_eq!(report.zones[0].mean, 1);
    assert!(!report.zones[0].overloaded);
}

#[test]
fn test_empty_frames_drain_the_window() {
    let config = PipelineConfig {
        last_frames: 5,
        ..PipelineConfig::default()
    };
    let mut pipeline = pipeline(LEFT_HALF, (640, 480), config);
    for _ in 0..5 {
        pipeline.process_detections(crowd(4));
    }

    // [4, 4, 4, 4, 0]
    let report = pipeline.process_detections(Vec::new());
    assert!(report.tracks.is_empty());
    assert_eq!(report.zones[0].count, 0);
    assert_eq!(report.zones[0].mean, 3);
    assert!(!report.zones[0].overloaded);

    let window = pipeline.occupancy().window(1).unwrap();
    assert_eq!(window.len(), 5);
    assert_eq!(window.iter().collect::<Vec<_>>(), vec![4, 4, 4, 4, 0]);
}

#[test]
fn test_zone_reports_link_tracks() {
    let mut pipeline = pipeline(LEFT_HALF, (640, 480), PipelineConfig::default());
    let detections = vec![
        Detection::new(400.0, 200.0, 450.0, 400.0, 0.6),
        Detection::new(10.0, 200.0, 60.0, 400.0, 0.9),
    ];

    let report = pipeline.process_detections(detections);
    // Ids follow detection order, output follows confidence.
    assert_eq!(report.tracks[0].detection, Some(1));
    assert_eq!(report.tracks[0].track_id, 2);
    assert_eq!(report.track_for(0).map(|t| t.track_id), Some(1));

    assert_eq!(report.zones[0].detections, vec![1]);
    assert_eq!(report.zones[0].track_ids, vec![Some(2)]);
    assert_eq!(report.zones[1].detections, vec![0]);
    assert_eq!(report.zones[1].track_ids, vec![Some(1)]);
}

#[test]
fn test_raw_frame_is_filtered_and_unmapped() {
    // 1280x720 frame letterboxed into a 640x640 input: gain 0.5, 140 px pad top and bottom.
    let resolution = (1280, 720);
    let zones = r#"{"all": {"points": [[0, 0], [0, 720], [1280, 720], [1280, 0]]}}"#;
    let mut pipeline = pipeline(zones, resolution, PipelineConfig::default());

    let letterbox = Letterbox::fit(resolution, (640, 640));
    let frame = RawFrame::new(
        vec![
            RawDetectionBuilder::new().tlbr(100.0, 200.0, 150.0, 300.0).score(0.9).build(),
            // Duplicate of the first box.
            RawDetectionBuilder::new().tlbr(101.0, 200.0, 151.0, 300.0).score(0.8).build(),
            // Below the confidence threshold.
            RawDetectionBuilder::new().tlbr(300.0, 200.0, 350.0, 300.0).score(0.1).build(),
            // Wrong category.
            RawDetectionBuilder::new().tlbr(400.0, 200.0, 450.0, 300.0).score(0.9).class_id(2).build(),
        ],
        letterbox,
    );

    let report = pipeline.process_frame(&frame);
    assert_eq!(report.detections.len(), 1);
    let bbox = report.detections[0].bbox;
    assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (200.0, 120.0, 100.0, 200.0));
    assert_eq!(report.zones[0].count, 1);
}

#[test]
fn test_runs_are_reproducible() {
    let config = PipelineConfig {
        last_frames: 4,
        ..PipelineConfig::default()
    };
    let run = || {
        let mut pipeline = pipeline(LEFT_HALF, (640, 480), config.clone());
        (0..12)
            .map(|i| {
                let report = pipeline.process_detections(crowd(i % 4));
                let ids: Vec<u64> = report.tracks.iter().map(|t| t.track_id).collect();
                let means: Vec<usize> = report.zones.iter().map(|z| z.mean).collect();
                (ids, means)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_overlays_for_configured_annotators() {
    let config = PipelineConfig {
        annotators: vec![AnnotatorKind::Zone, AnnotatorKind::Box, AnnotatorKind::Label],
        ..PipelineConfig::default()
    };
    let zones = Arc::new(ZoneRegistry::from_json_str(LEFT_HALF, (640, 480)).unwrap());
    let mut pipeline = FramePipeline::new(&config, Arc::clone(&zones)).unwrap();
    let annotators = annotators_from_config(&config, zones);

    let report = pipeline.process_detections(crowd(2));
    let overlays = render(&annotators, &report);

    let polygons = overlays.iter().filter(|o| matches!(o, Overlay::Polygon { .. })).count();
    let boxes = overlays.iter().filter(|o| matches!(o, Overlay::Rectangle { .. })).count();
    let labels: Vec<&str> = overlays
        .iter()
        .filter_map(|o| match o {
            Overlay::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(polygons, 2);
    assert_eq!(boxes, 2);
    assert_eq!(labels, vec!["ID: 1", "ID: 2"]);
}
