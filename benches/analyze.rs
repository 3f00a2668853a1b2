use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use sales_insights::{AnalysisOptions, Dataset, analyze_with, detect_mapping};

fn generate_orders(rows: usize) -> String {
    let mut csv = String::from(
        "Order ID,Order Date,Customer ID,Product,Quantity,Unit Price,Total Amount,Cost,Region,Salesperson\n",
    );
    for i in 0..rows {
        let region = match i % 4 {
            0 => "East",
            1 => "West",
            2 => "North",
            _ => "South",
        };
        let month = (i % 12) + 1;
        let day = (i % 28) + 1;
        let quantity = (i % 9) + 1;
        let price = 5.0 + (i % 40) as f64 * 2.5;
        csv.push_str(&format!(
            "{i},2024-{month:02}-{day:02},C{},P{},{quantity},{price:.2},{:.2},{:.2},{region},Rep{}\n",
            i % 500,
            i % 80,
            price * quantity as f64,
            price * 0.6,
            i % 12,
        ));
    }
    csv
}

fn bench_analyze(c: &mut Criterion) {
    let text = generate_orders(20_000);
    let dataset = Dataset::from_csv_text(&text, b',').expect("parse generated orders");
    let mapping = detect_mapping(&dataset);
    let options = AnalysisOptions::default();

    let mut group = c.benchmark_group("sales_analysis");
    group.sample_size(20);
    group.bench_function("parse_csv", |b| {
        b.iter(|| Dataset::from_csv_text(&text, b',').expect("parse"))
    });
    group.bench_function("detect_mapping", |b| b.iter(|| detect_mapping(&dataset)));
    group.bench_function("analyze_all", |b| {
        b.iter_batched(
            || dataset.clone(),
            |dataset| analyze_with(&dataset, &mapping, &options),
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
