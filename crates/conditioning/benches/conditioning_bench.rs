use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use eeg_conditioning::{ButterworthDesigner, CoefficientProvider, HistoryFilter, RingBuffer, StreamingFilter};
use eeg_types::{FilterSpec, HistoryBackend};
use ndarray::Array2;

const FS: f64 = 220.0;

fn bandpass() -> eeg_conditioning::FilterCoefficients {
    ButterworthDesigner
        .design(FS, &FilterSpec::bandpass(5, 2.0, 36.0))
        .expect("bench filter must design")
}

fn bench_ring_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");

    for channels in [4usize, 32, 128] {
        let sample: Vec<f64> = (0..channels).map(|c| c as f64).collect();
        group.throughput(Throughput::Elements(channels as u64));

        group.bench_with_input(BenchmarkId::new("update", channels), &channels, |b, &channels| {
            let mut buf = RingBuffer::new(220, channels).unwrap();
            b.iter(|| buf.update(black_box(&sample)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("extract_220", channels), &channels, |b, &channels| {
            let mut buf = RingBuffer::new(220, channels).unwrap();
            for _ in 0..300 {
                buf.update(&sample).unwrap();
            }
            let mut out = Array2::zeros((0, 0));
            b.iter(|| buf.extract_into(black_box(220), &mut out).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("extract_transposed_220", channels), &channels, |b, &channels| {
            let mut buf = RingBuffer::new(220, channels).unwrap();
            for _ in 0..300 {
                buf.update(&sample).unwrap();
            }
            b.iter(|| black_box(buf.extract_transposed(220).unwrap()));
        });
    }

    group.finish();
}

fn bench_filter_forms(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_per_sample");
    let coeffs = bandpass();
    let channels = 4;
    let sample = vec![1.0; channels];

    group.bench_function("recursive", |b| {
        let mut filter = StreamingFilter::new(coeffs.clone(), channels).unwrap();
        let mut out = vec![0.0; channels];
        b.iter(|| filter.transform(black_box(&sample), &mut out).unwrap());
    });

    for backend in [HistoryBackend::Plain, HistoryBackend::Matrix] {
        group.bench_with_input(BenchmarkId::new("history", format!("{:?}", backend)), &backend, |b, &backend| {
            let filter = HistoryFilter::new(coeffs.clone(), backend);
            let (nb, ny) = filter.required_history();
            let x = Array2::zeros((nb, channels));
            let y = Array2::zeros((ny, channels));
            let mut out = vec![0.0; channels];
            b.iter(|| filter.transform(black_box(&x), black_box(&y), &mut out).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ring_buffer, bench_filter_forms);
criterion_main!(benches);
