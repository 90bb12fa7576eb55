//! Cart and checkout benchmarks (Criterion).
//!
//! Run: `cargo bench` or `cargo bench --bench cart`.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use storefront_orders::{
    replay_into_manager, CustomerDetails, OrderManager, OrderStatus, Workload, WorkloadConfig,
};

fn bench_cart_churn(c: &mut Criterion) {
    const N: usize = 1000;
    let mut group = c.benchmark_group("cart");
    group.throughput(Throughput::Elements(N as u64));
    group.bench_function("replay_1000_mixed_actions", |b| {
        b.iter_batched(
            || {
                let config = WorkloadConfig {
                    seed: 42,
                    num_actions: N,
                    ..Default::default()
                };
                let mut generator = Workload::new(config);
                let products = generator.products().to_vec();
                (OrderManager::new(), products, generator.all_actions())
            },
            |(mut manager, mut products, actions)| {
                replay_into_manager(&mut manager, &mut products, &actions)
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_create_order(c: &mut Criterion) {
    const ORDERS: usize = 200;
    const LINES: usize = 8;
    let mut group = c.benchmark_group("orders");
    group.throughput(Throughput::Elements(ORDERS as u64));
    group.bench_function("create_200_orders_8_lines", |b| {
        b.iter_batched(
            || {
                let generator = Workload::new(WorkloadConfig {
                    seed: 7,
                    num_products: LINES,
                    ..Default::default()
                });
                (OrderManager::new(), generator.products().to_vec())
            },
            |(mut manager, products)| {
                for _ in 0..ORDERS {
                    for product in &products {
                        manager.add_to_cart(product, 2);
                    }
                    manager
                        .create_order(CustomerDetails::new("Bench", "bench@example.com", "1 Bench Street"))
                        .unwrap();
                }
                manager
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_history_queries(c: &mut Criterion) {
    const HISTORY: usize = 1000;
    let mut manager = OrderManager::new();
    let products = Workload::new(WorkloadConfig::default()).products().to_vec();
    for i in 0..HISTORY {
        manager.add_to_cart(&products[i % products.len()], 1);
        let order = manager
            .create_order(CustomerDetails::new("Bench", "bench@example.com", "1 Bench Street"))
            .unwrap();
        if i % 3 == 0 {
            manager.update_status(order.id(), OrderStatus::Processing).unwrap();
        }
    }
    let mut group = c.benchmark_group("history");
    group.bench_function("recent_5_of_1000", |b| b.iter(|| manager.recent_orders(5)));
    group.bench_function("stats_1000", |b| b.iter(|| manager.stats()));
    group.finish();
}

criterion_group!(benches, bench_cart_churn, bench_create_order, bench_history_queries);
criterion_main!(benches);
