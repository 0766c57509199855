//! Prompt 构建与限流判定基准测试

use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use roomdream::config::GenerationConfig;
use roomdream::ratelimit::{FixedWindow, MemoryRateLimiter};
use roomdream::services::{GenerateRequest, GuidanceScale, build_prompt};

// ============== Prompt 基准测试 ==============

fn bench_build_prompt(c: &mut Criterion) {
    let settings = GenerationConfig::default();

    let template = GenerateRequest {
        image_url: Some("https://upcdn.io/room.jpg".into()),
        theme: Some("Modern".into()),
        room: Some("Living Room".into()),
        architecture: Some("Scandinavian".into()),
        color_palette: Some("Earth Tones".into()),
        prompt: Some("add a reading nook".into()),
        scale: Some(GuidanceScale::Text("9".into())),
        ..Default::default()
    };
    c.bench_function("prompt/template", |b| {
        b.iter(|| build_prompt(black_box(&template), &settings));
    });

    let custom = GenerateRequest {
        image_url: Some("https://upcdn.io/room.jpg".into()),
        custom_prompt: Some("A cozy cabin with a stone fireplace".into()),
        ..Default::default()
    };
    c.bench_function("prompt/custom", |b| {
        b.iter(|| build_prompt(black_box(&custom), &settings));
    });
}

// ============== 内存限流基准测试 ==============

fn bench_memory_limiter(c: &mut Criterion) {
    let limiter = MemoryRateLimiter::new(
        FixedWindow::new(u64::MAX, Duration::from_secs(3600)),
        "bench",
    );
    let now = 1_700_000_000_000i64;

    c.bench_function("ratelimit/memory_same_client", |b| {
        b.iter(|| limiter.limit_at(black_box("203.0.113.1"), now));
    });

    let mut i = 0u64;
    c.bench_function("ratelimit/memory_many_clients", |b| {
        b.iter(|| {
            i += 1;
            limiter.limit_at(&format!("client_{}", i % 10_000), now)
        });
    });
}

criterion_group!(benches, bench_build_prompt, bench_memory_limiter);
criterion_main!(benches);
