//! Benchmarks for landmark classification and recording parsing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gesture_assist::{
    gesture_classifier::GestureClassifier,
    landmarks::{Landmark, LandmarkRole, LandmarkSet},
    replay::parse_frame,
};

fn face(mouth_gap: f32, nose_x: f32) -> LandmarkSet {
    let mut points = vec![Landmark::planar(0.5, 0.5); 468];
    points[LandmarkRole::MouthUpper.index()].y = 0.5;
    points[LandmarkRole::MouthLower.index()].y = 0.5 + mouth_gap;
    points[LandmarkRole::NoseTip.index()].x = nose_x;
    LandmarkSet::new(points)
}

fn benchmark_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier");
    let classifier = GestureClassifier::default();

    let faces = [
        ("neutral", face(0.0, 0.5)),
        ("mouth_open", face(0.08, 0.5)),
        ("tilt_left", face(0.0, 0.3)),
    ];

    for (name, set) in &faces {
        group.bench_with_input(BenchmarkId::new("classify", name), set, |b, set| {
            b.iter(|| black_box(classifier.classify(black_box(set))));
        });
    }

    // A 30 fps second of video
    let stream: Vec<LandmarkSet> = (0..30)
        .map(|i| face(0.002 * i as f32, 0.3 + 0.015 * i as f32))
        .collect();
    group.bench_function("classify_30_frames", |b| {
        b.iter(|| {
            for set in &stream {
                black_box(classifier.classify(black_box(set)).ok());
            }
        });
    });

    group.finish();
}

fn benchmark_parse_recording(c: &mut Criterion) {
    let points: Vec<String> = (0..468)
        .map(|i| format!("[{:.4},{:.4},{:.4}]", i as f32 / 468.0, 0.5, -0.01))
        .collect();
    let line = format!(r#"{{"t": 1.25, "landmarks": [{}]}}"#, points.join(","));

    c.bench_function("parse_recorded_frame", |b| {
        b.iter(|| black_box(parse_frame(black_box(&line))));
    });
}

criterion_group!(benches, benchmark_classify, benchmark_parse_recording);
criterion_main!(benches);
