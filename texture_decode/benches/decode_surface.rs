use criterion::{black_box, criterion_group, criterion_main, Criterion};
use texture_decode::{ByteOrder, ImageFormat, Surface};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_surface");
    for image_format in [
        ImageFormat::Dxt1,
        ImageFormat::Dxt5,
        ImageFormat::Etc1,
        ImageFormat::Etc2Rgb,
        ImageFormat::Etc2Rgba1,
        ImageFormat::Etc2Rgba8,
        ImageFormat::Pvrtc2bpp,
        ImageFormat::Pvrtc4bpp,
    ] {
        // Overestimate the surface size to avoid errors.
        let surface = Surface {
            width: 512,
            height: 512,
            image_format,
            byte_order: ByteOrder::LittleEndian,
            data: (0..512 * 512).map(|i: u32| (i * 31 % 251) as u8).collect::<Vec<_>>(),
        };
        group.bench_function(format!("{image_format:?}"), |b| {
            b.iter(|| black_box(&surface).decode_rgba8())
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
