use bytefloat::{format_float, parse_float};
use criterion::{black_box, criterion_group, Criterion};

fn parse_decimal(c: &mut Criterion) {
    c.bench_function("parse_f64_integer", |b| {
        b.iter(|| parse_float(black_box(b"33909"), 64))
    });
    c.bench_function("parse_f64_float", |b| {
        b.iter(|| parse_float(black_box(b"339.7784"), 64))
    });
    c.bench_function("parse_f64_float_exp", |b| {
        b.iter(|| parse_float(black_box(b"-5.09e75"), 64))
    });
    c.bench_function("parse_f64_big_mantissa", |b| {
        b.iter(|| parse_float(black_box(b"123456789123456789123456789"), 64))
    });
    c.bench_function("parse_f64_slow_path", |b| {
        b.iter(|| parse_float(black_box(b"2.2250738585072012e-308"), 64))
    });
    c.bench_function("parse_f32_float", |b| {
        b.iter(|| parse_float(black_box(b"339.778"), 32))
    });
    c.bench_function("parse_f32_float_exp", |b| {
        b.iter(|| parse_float(black_box(b"12.3456e32"), 32))
    });
}

fn format_decimal(c: &mut Criterion) {
    c.bench_function("format_f64_shortest", |b| {
        b.iter(|| format_float(black_box(339.7784), b'g', -1, 64))
    });
    c.bench_function("format_f64_exp_shortest", |b| {
        b.iter(|| format_float(black_box(-5.09e75), b'e', -1, 64))
    });
    c.bench_function("format_f64_fixed", |b| {
        b.iter(|| format_float(black_box(123456.789), b'f', 6, 64))
    });
    c.bench_function("format_f64_subnormal", |b| {
        b.iter(|| format_float(black_box(5e-324), b'g', -1, 64))
    });
    c.bench_function("format_f32_shortest", |b| {
        b.iter(|| format_float(black_box(339.778), b'g', -1, 32))
    });
}

criterion_group!(benches, parse_decimal, format_decimal);
