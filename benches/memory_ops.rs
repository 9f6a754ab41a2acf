use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use memview::{
    FixedArrayPtr, FixedText, LocalMemory, MarshalledPtr, MemoryAllocate, MemoryReadWrite, Ptr,
};

fn bench_raw_transfers(c: &mut Criterion) {
    let local = LocalMemory;
    let allocation = local.allocate(4096).expect("allocation failed");
    let address = allocation.address();

    let mut group = c.benchmark_group("raw_transfers");
    for size in [8usize, 64, 1024, 4096] {
        group.throughput(Throughput::Bytes(size as u64));

        let data = vec![0xA5u8; size];
        group.bench_with_input(BenchmarkId::new("write_raw", size), &size, |b, _| {
            b.iter(|| local.write_raw(address, black_box(&data)).unwrap());
        });

        let mut out = vec![0u8; size];
        group.bench_with_input(BenchmarkId::new("read_raw", size), &size, |b, _| {
            b.iter(|| local.read_raw(address, black_box(&mut out)).unwrap());
        });
    }
    group.finish();

    local.free(allocation);
}

fn bench_typed_pointer(c: &mut Criterion) {
    let local = LocalMemory;
    let allocation = local.allocate(64).expect("allocation failed");
    let ptr = Ptr::<u64>::new(allocation.address());

    c.bench_function("ptr_set_u64", |b| {
        b.iter(|| ptr.set(black_box(&0x1122_3344_5566_7788)).unwrap());
    });
    c.bench_function("ptr_get_u64", |b| {
        b.iter(|| black_box(ptr.get().unwrap()));
    });

    local.free(allocation);
}

fn bench_array_bulk_copy(c: &mut Criterion) {
    let local = LocalMemory;
    let allocation = local.allocate(256 * 4).expect("allocation failed");
    let view = FixedArrayPtr::<u32>::new(allocation.address(), 256);

    let data: Vec<u32> = (0..256).collect();
    view.copy_from(&data).expect("seed failed");

    let mut group = c.benchmark_group("array_bulk_copy");
    group.throughput(Throughput::Bytes(view.byte_size() as u64));
    group.bench_function("copy_from_256_u32", |b| {
        b.iter(|| view.copy_from(black_box(&data)).unwrap());
    });
    let mut out = vec![0u32; 256];
    group.bench_function("copy_to_256_u32", |b| {
        b.iter(|| view.copy_to(black_box(&mut out)).unwrap());
    });
    group.finish();

    local.free(allocation);
}

fn bench_marshalled_text(c: &mut Criterion) {
    let local = LocalMemory;
    let allocation = local.allocate(64).expect("allocation failed");
    let ptr = MarshalledPtr::<FixedText<32>>::new(allocation.address());

    let text = FixedText::<32>::new("benchmark payload").expect("text fits");
    ptr.set(&text).expect("seed failed");

    c.bench_function("marshalled_set_text32", |b| {
        b.iter(|| ptr.set(black_box(&text)).unwrap());
    });
    c.bench_function("marshalled_get_text32", |b| {
        b.iter(|| black_box(ptr.get().unwrap()));
    });

    local.free(allocation);
}

criterion_group!(
    benches,
    bench_raw_transfers,
    bench_typed_pointer,
    bench_array_bulk_copy,
    bench_marshalled_text
);
criterion_main!(benches);
