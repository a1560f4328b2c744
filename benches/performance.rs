// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for pewbox
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - One engine poll (decode, clock, gates)
//! - Encoder decoding throughput
//! - Painting the grid into a frame buffer

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pewbox::config::{EngineConfig, PatternWord};
use pewbox::input::{LineLevels, RotaryDecoder};
use pewbox::render::{FrameBuffer, GridPainter, GridProjection, GridSnapshot};
use pewbox::sequencer::{GateLines, GridShape, SequencerEngine, StepGrid};

const REST: LineLevels = LineLevels {
    clk: false,
    dt: false,
    sw: true,
};

/// Benchmark the poll hot path with simulated time
fn bench_engine_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_poll");

    for (tracks, steps) in [(2usize, 8usize), (4, 16)] {
        let mut config = EngineConfig::default();
        config.grid.tracks = tracks;
        config.grid.steps_per_track = steps;
        config.grid.pattern = vec![PatternWord::Value(0x5555 & ((1 << steps) - 1)); tracks];
        config.display.cell_size = 8;

        group.bench_with_input(
            BenchmarkId::new("grid", format!("{}x{}", tracks, steps)),
            &config,
            |b, config| {
                let mut engine = SequencerEngine::new(config, REST, Duration::ZERO).unwrap();
                let mut lines = GateLines::new(config.grid.tracks);
                let mut now = Duration::ZERO;
                b.iter(|| {
                    // 1ms per poll: a tick every 500 polls
                    now += Duration::from_millis(1);
                    black_box(engine.poll(REST, now, &mut lines))
                })
            },
        );
    }

    group.finish();
}

/// Benchmark decoding a stream of encoder samples
fn bench_decoder(c: &mut Criterion) {
    let samples: Vec<LineLevels> = (0..1024)
        .map(|i| LineLevels::new(i % 2 == 1, i % 4 == 1, i % 64 < 32))
        .collect();

    c.bench_function("decode_1024_samples", |b| {
        b.iter(|| {
            let mut decoder = RotaryDecoder::new(REST, true);
            let mut events = 0usize;
            for levels in &samples {
                events += decoder.poll(black_box(*levels)).iter().count();
            }
            black_box(events)
        })
    });
}

/// Benchmark painting a full frame
fn bench_paint(c: &mut Criterion) {
    let shape = GridShape::new(4, 16).unwrap();
    let grid = StepGrid::from_words(shape, &[0x1111, 0x0808, 0xFFFF, 0x0000]).unwrap();
    let painter = GridPainter::new(GridProjection::new(16, 8, (0, 0)).unwrap());
    let mut frame = FrameBuffer::new(128, 32);

    c.bench_function("paint_4x16", |b| {
        let mut step = 0;
        b.iter(|| {
            step = (step + 1) % 16;
            painter.paint(
                &mut frame,
                GridSnapshot {
                    grid: &grid,
                    cursor: 21,
                    active_step: step,
                },
            );
            black_box(frame.lit_count())
        })
    });
}

criterion_group!(benches, bench_engine_poll, bench_decoder, bench_paint);
criterion_main!(benches);
