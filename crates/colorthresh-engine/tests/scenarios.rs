use colorthresh_engine::colorspace;
use colorthresh_engine::{Direction, Edge, Frame, ThresholdEngine, BACKGROUND, FOREGROUND};

fn engine_with_channel0_window(low: i32, high: i32) -> ThresholdEngine {
    let mut engine = ThresholdEngine::new();
    engine.set_bound(0, Edge::Low, low).unwrap();
    engine.set_bound(0, Edge::High, high).unwrap();
    engine.set_bound(1, Edge::Low, 0).unwrap();
    engine.set_bound(1, Edge::High, 255).unwrap();
    engine.set_bound(2, Edge::Low, 0).unwrap();
    engine.set_bound(2, Edge::High, 255).unwrap();
    engine
}

#[test]
fn uniform_frame_inside_window_is_all_foreground() {
    let engine = engine_with_channel0_window(100, 200);
    let frame = Frame::uniform(16, 9, [150, 128, 128]).unwrap();

    let out = engine.process_frame(&frame).unwrap();
    assert!(out.mask.iter().all(|&px| px == FOREGROUND));
}

#[test]
fn uniform_frame_on_high_edge_is_all_background() {
    let engine = engine_with_channel0_window(100, 200);
    let frame = Frame::uniform(16, 9, [200, 128, 128]).unwrap();

    let out = engine.process_frame(&frame).unwrap();
    assert!(out.mask.iter().all(|&px| px == BACKGROUND));
}

#[test]
fn uniform_frame_on_low_edge_is_all_background() {
    let engine = engine_with_channel0_window(100, 200);
    let frame = Frame::uniform(4, 4, [100, 128, 128]).unwrap();

    let out = engine.process_frame(&frame).unwrap();
    assert!(out.mask.iter().all(|&px| px == BACKGROUND));
}

#[test]
fn inverted_pair_empties_the_channel() {
    let engine = engine_with_channel0_window(200, 100);
    let frame = Frame::uniform(4, 4, [150, 128, 128]).unwrap();

    let out = engine.process_frame(&frame).unwrap();
    assert!(out.mask.iter().all(|&px| px == BACKGROUND));
}

#[test]
fn backward_cycle_from_start_lands_on_last_entry() {
    let mut engine = ThresholdEngine::new();
    engine.cycle_representation(Direction::Backward);
    assert_eq!(
        engine.config().representation_index(),
        colorspace::count() - 1
    );
}

#[test]
fn cycling_a_full_lap_returns_to_start() {
    let mut engine = ThresholdEngine::new();
    for direction in [Direction::Forward, Direction::Backward] {
        for _ in 0..colorspace::count() {
            engine.cycle_representation(direction);
        }
        assert_eq!(engine.config().representation_index(), 0);
        assert_eq!(engine.current_representation_name(), "RGB");
    }
}

#[test]
fn retained_frame_reflects_bound_change() {
    let frame = Frame::uniform(8, 8, [150, 40, 40]).unwrap();
    let mut engine = ThresholdEngine::new();

    let first = engine.process_frame(&frame).unwrap();
    assert!(first.mask.iter().all(|&px| px == FOREGROUND));

    engine.set_bound(0, Edge::High, 150).unwrap();
    let second = engine.process_frame(&frame).unwrap();
    assert_ne!(first.mask, second.mask);
    assert!(second.mask.iter().all(|&px| px == BACKGROUND));
}

#[test]
fn every_representation_processes_a_gradient() {
    let mut data = Vec::with_capacity(256 * 3);
    for v in 0..=255u8 {
        data.extend([v, 255 - v, v / 2]);
    }
    let frame = Frame::new(colorthresh_engine::FrameConfig {
        data,
        width: 256,
        height: 1,
        format: colorthresh_engine::PixelFormat::RGB8,
    })
    .unwrap();

    let mut engine = ThresholdEngine::new();
    for _ in 0..colorspace::count() {
        let entry = engine.current_representation();
        let out = engine.process_frame(&frame).unwrap();
        assert_eq!(out.converted.format, entry.format);
        assert_eq!(
            out.converted.data.len(),
            256 * entry.channel_count(),
            "{} produced the wrong plane count",
            entry.name
        );
        assert_eq!(out.mask.dim(), (1, 256));
        engine.cycle_representation(Direction::Forward);
    }
}
