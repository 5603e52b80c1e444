//! Benchmarks for STL codec operations.
//!
//! Run with: cargo bench -p stl-io
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p stl-io -- --save-baseline main
//! 2. After changes: cargo bench -p stl-io -- --baseline main

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use stl_io::{StlFormat, ascii, binary, load_stl, save_stl};
use stl_types::{Mesh, Point3, Triangle};
use tempfile::tempdir;

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Build a wavy height-field mesh with `side * side * 2` triangles.
fn create_wavy_grid(side: usize) -> Mesh {
    let point = |i: usize, j: usize| {
        let x = i as f32 * 0.5;
        let y = j as f32 * 0.5;
        let z = (x * 0.7).sin() * (y * 0.4).cos() * 5.0;
        Point3::new(x, y, z)
    };

    let mut mesh = Mesh::with_capacity("bench_grid", side * side * 2);
    for i in 0..side {
        for j in 0..side {
            let p00 = point(i, j);
            let p10 = point(i + 1, j);
            let p01 = point(i, j + 1);
            let p11 = point(i + 1, j + 1);

            let mut lower = Triangle::from_vertices(p00, p10, p11);
            lower.normal = lower.face_normal();
            let mut upper = Triangle::from_vertices(p00, p11, p01);
            upper.normal = upper.face_normal();

            mesh.triangles.push(lower);
            mesh.triangles.push(upper);
        }
    }
    mesh
}

// =============================================================================
// In-Memory Codec Benchmarks
// =============================================================================

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("Codec");

    let mesh = create_wavy_grid(50); // 5k triangles
    let text = ascii::serialize(&mesh, ascii::DEFAULT_FLOAT_PRECISION);
    let binary_size = binary::HEADER_SIZE + 4 + mesh.triangle_count() * binary::TRIANGLE_SIZE;
    let mut bytes = Vec::with_capacity(binary_size);
    binary::serialize(&mut bytes, &mesh, "bench", 0).expect("failed to serialize binary STL");

    group.throughput(Throughput::Elements(mesh.triangle_count() as u64));

    // Parse benchmarks
    group.bench_function("parse_ascii", |b| {
        b.iter(|| ascii::parse(black_box(&text), true));
    });

    group.bench_function("parse_binary", |b| {
        b.iter(|| binary::parse_bytes(black_box(&bytes), true));
    });

    // Serialize benchmarks
    group.bench_function("serialize_ascii", |b| {
        b.iter(|| ascii::serialize(black_box(&mesh), ascii::DEFAULT_FLOAT_PRECISION));
    });

    group.bench_function("serialize_binary", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(binary_size);
            let _ = binary::serialize(&mut out, black_box(&mesh), "bench", 0);
            out
        });
    });

    group.finish();
}

// =============================================================================
// File I/O Benchmarks
// =============================================================================

fn bench_files(c: &mut Criterion) {
    let mut group = c.benchmark_group("IO");

    let mesh = create_wavy_grid(50); // 5k triangles
    let temp_dir = tempdir().expect("failed to create temp dir");

    // Write test files
    let ascii_path = temp_dir.path().join("bench_ascii.stl");
    let binary_path = temp_dir.path().join("bench_binary.stl");

    save_stl(&mesh, &ascii_path, StlFormat::Ascii).expect("failed to save ASCII STL");
    save_stl(&mesh, &binary_path, StlFormat::Binary).expect("failed to save binary STL");

    group.throughput(Throughput::Elements(mesh.triangle_count() as u64));

    // Load benchmarks
    group.bench_function("load_ascii", |b| {
        b.iter(|| load_stl(black_box(&ascii_path)));
    });

    group.bench_function("load_binary", |b| {
        b.iter(|| load_stl(black_box(&binary_path)));
    });

    // Save benchmarks
    let out_ascii = temp_dir.path().join("bench_out_ascii.stl");
    let out_binary = temp_dir.path().join("bench_out_binary.stl");

    group.bench_function("save_ascii", |b| {
        b.iter(|| save_stl(black_box(&mesh), black_box(&out_ascii), StlFormat::Ascii));
    });

    group.bench_function("save_binary", |b| {
        b.iter(|| save_stl(black_box(&mesh), black_box(&out_binary), StlFormat::Binary));
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_codecs, bench_files);
criterion_main!(benches);
