use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use supplychain_core::TxTimestamp;
use supplychain_ledger::InMemoryLedger;
use supplychain_products::{ProductLifecycle, SupplyChainContract};

fn populated_ledger(count: usize) -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    let tx = ledger.begin(TxTimestamp::new(1_700_000_000, 0));
    for i in 0..count {
        SupplyChainContract
            .create_product(
                &tx,
                &format!("p{i:06}"),
                "Laptop",
                "CompanyA",
                "High-end gaming laptop",
                "Electronics",
            )
            .unwrap();
    }
    tx.commit().unwrap();
    ledger
}

fn bench_get_all_products(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_all_products");

    for count in [10usize, 100, 1_000] {
        let ledger = populated_ledger(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let tx = ledger.begin(TxTimestamp::new(1_700_000_001, 0));
                black_box(SupplyChainContract.get_all_products(&tx).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_update_product(c: &mut Criterion) {
    let ledger = populated_ledger(100);
    c.bench_function("update_product", |b| {
        b.iter(|| {
            let tx = ledger.begin(TxTimestamp::new(1_700_000_002, 0));
            SupplyChainContract
                .update_product(&tx, black_box("p000042"), "Shipped", "CompanyB", "", "")
                .unwrap();
            black_box(tx.rw_set().unwrap())
        })
    });
}

criterion_group!(benches, bench_get_all_products, bench_update_product);
criterion_main!(benches);
