use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use quickorder_codec::{split_composites, truncate_composites};

/// An order-shaped payload with `groups` resource groups of `lines` plan lines each.
fn order_payload(groups: usize, lines: usize) -> Value {
    let plan_line = |n: usize| {
        json!({
            "PlanLineUniqueID": n,
            "ModeFlag": "NoChange",
            "WagonDetails": { "WagonType": "HBBINS || Covered wagon", "WagonQty": { "dropdown": "EA || Each", "input": "4" } },
            "ContainerDetails": { "ContainerType": "20GP || 20ft general purpose" },
            "ProductDetails": { "Product": "P-100 || Steel coils", "Weight": { "dropdown": "TON || Tonne", "input": "21.5" } },
            "THUDetails": { "THU": "PAL || Pallet" },
            "JourneyAndSchedulingDetails": { "From": "DEHAM || Hamburg", "To": "PLWAW || Warsaw", "Departure": "2024-05-01" },
            "OtherDetails": { "Remarks": "handle with care" },
        })
    };

    let groups: Vec<Value> = (0..groups)
        .map(|g| {
            json!({
                "ResourceUniqueID": g,
                "BasicDetails": { "Resource": "WAG || Wagon", "ServiceType": "RAIL || Rail" },
                "BillingDetails": { "Tariff": "T01 || Rail tariff", "UnitPrice": "1200.00" },
                "PlanDetails": (0..lines).map(plan_line).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({ "QuickUniqueID": 1, "Customer": "CUS01 || Acme", "ResourceGroup": groups })
}

fn bench_walks(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite_walk");

    for (groups, lines) in [(1usize, 5usize), (5, 20), (20, 50)] {
        let payload = order_payload(groups, lines);
        group.throughput(Throughput::Elements((groups * lines) as u64));

        group.bench_with_input(
            BenchmarkId::new("split", format!("{groups}x{lines}")),
            &payload,
            |b, payload| b.iter(|| split_composites(black_box(payload))),
        );
        group.bench_with_input(
            BenchmarkId::new("truncate", format!("{groups}x{lines}")),
            &payload,
            |b, payload| b.iter(|| truncate_composites(black_box(payload))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_walks);
criterion_main!(benches);
