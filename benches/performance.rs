//! Performance benchmarks for ving
//!
//! Every probe triggers a full redraw, so the per-iteration work (window
//! update, statistics, chart rendering, packet encoding) has to stay well
//! under the shortest practical ping interval.

use clap::Parser;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use ving::{
    cli::Cli,
    config::parser::ConfigParser,
    output::{format_stats, ChartData, ChartRenderer, FrameBuffer, Frame, TerminalChart, Theme},
    probe::packet::{checksum, parse_reply, EchoRequest, IcmpVersion, DEFAULT_PAYLOAD_LEN},
    stats::{LatencyHistory, PacketCounters, SlidingWindow},
};

/// Deterministic latencies between 10 and 60 ms
fn sample_latencies(count: usize) -> Vec<f64> {
    (0..count).map(|i| 10.0 + (i * 37 % 500) as f64 / 10.0).collect()
}

/// Benchmark sliding window updates
fn benchmark_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("sliding_window");

    for capacity in [50usize, 500, 5000].iter() {
        group.bench_with_input(BenchmarkId::new("push", capacity), capacity, |b, &capacity| {
            let latencies = sample_latencies(capacity * 2);
            b.iter(|| {
                let mut window = SlidingWindow::new(capacity);
                for (seq, latency) in latencies.iter().enumerate() {
                    window.push(seq as u64, *latency);
                }
                black_box(window.points());
            });
        });
    }

    group.finish();
}

/// Benchmark summary statistics over a growing history
fn benchmark_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for size in [10usize, 1_000, 100_000].iter() {
        let mut history = LatencyHistory::new();
        for latency in sample_latencies(*size) {
            history.push(latency);
        }

        group.bench_with_input(BenchmarkId::new("summary", size), size, |b, _| {
            b.iter(|| black_box(history.summary()));
        });
    }

    group.bench_function("format_stats", |b| {
        let mut history = LatencyHistory::new();
        let mut counters = PacketCounters::new();
        for latency in sample_latencies(1_000) {
            counters.record_sent();
            counters.record_received();
            history.push(latency);
        }
        b.iter(|| black_box(format_stats("example.com", &counters, &history)));
    });

    group.finish();
}

/// Benchmark chart rendering and frame diffing
fn benchmark_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");

    for points in [1usize, 50, 500].iter() {
        let sequences: Vec<u64> = (1..=*points as u64).collect();
        let latencies = sample_latencies(*points);

        for (name, theme) in [("plain", Theme::plain()), ("colored", Theme::colored())] {
            let chart = TerminalChart::new(theme);
            group.bench_with_input(BenchmarkId::new(name, points), points, |b, _| {
                b.iter(|| {
                    let text = chart
                        .render(&ChartData {
                            host: "example.com",
                            sequences: &sequences,
                            latencies: &latencies,
                        })
                        .unwrap();
                    black_box(text);
                });
            });
        }
    }

    group.bench_function("frame_present", |b| {
        let frame = Frame::new("row\n".repeat(16));
        let mut frames = FrameBuffer::new();
        b.iter(|| black_box(frames.present(&frame)));
    });

    group.finish();
}

/// Benchmark ICMP packet handling
fn benchmark_packets(c: &mut Criterion) {
    let mut group = c.benchmark_group("packets");

    group.bench_function("encode_v4", |b| {
        let request = EchoRequest::new(0x1234, 1, DEFAULT_PAYLOAD_LEN);
        b.iter(|| black_box(request.encode(IcmpVersion::V4)));
    });

    group.bench_function("parse_reply", |b| {
        let mut reply = EchoRequest::new(0x1234, 1, DEFAULT_PAYLOAD_LEN).encode(IcmpVersion::V4);
        reply[0] = 0;
        b.iter(|| black_box(parse_reply(&reply, IcmpVersion::V4).unwrap()));
    });

    group.bench_function("checksum", |b| {
        let data = vec![0xabu8; 1500];
        b.iter(|| black_box(checksum(&data)));
    });

    group.finish();
}

/// Benchmark configuration parsing
fn benchmark_config_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_parsing");

    let args = ["ving", "-c", "5", "-i", "0.5", "-W", "2", "-m", "100", "example.com"];

    group.bench_function("parse_cli_args", |b| {
        b.iter(|| black_box(Cli::try_parse_from(black_box(args)).unwrap()));
    });

    group.bench_function("build_config", |b| {
        let cli = Cli::try_parse_from(args).unwrap();
        b.iter(|| {
            let parser = ConfigParser::new(cli.clone()).with_env_file("/nonexistent/.env");
            black_box(parser.parse().unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_window,
    benchmark_statistics,
    benchmark_rendering,
    benchmark_packets,
    benchmark_config_parsing
);
criterion_main!(benches);
