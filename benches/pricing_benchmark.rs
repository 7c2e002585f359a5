use chrono::{Duration, Utc};
use credit_engine::core::currency::CurrencyCode;
use credit_engine::core::money::Money;
use credit_engine::core::pricing::{PricingStrategy, ReceivableType, TradeDraftPricing};
use credit_engine::engine::orchestrator::{SettlementEngine, SettlementRequest};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;

fn bench_pricing_short_term(c: &mut Criterion) {
    let face = Money::new(dec!(10_000), CurrencyCode::new("BRL")).unwrap();

    c.bench_function("pricing_term_3", |b| {
        b.iter(|| TradeDraftPricing.calculate(black_box(&face), 3, dec!(0.0089)))
    });
}

fn bench_pricing_long_term(c: &mut Criterion) {
    let face = Money::new(dec!(10_000), CurrencyCode::new("BRL")).unwrap();

    c.bench_function("pricing_term_60", |b| {
        b.iter(|| TradeDraftPricing.calculate(black_box(&face), 60, dec!(0.0089)))
    });
}

fn bench_settle_100_receivables(c: &mut Criterion) {
    c.bench_function("settle_100_receivables", |b| {
        b.iter(|| {
            let engine = SettlementEngine::new();
            let cedent = engine
                .register_cedent("Bench Cedent", "00.000.000/0001-00")
                .unwrap();
            let due = Utc::now() + Duration::days(90);
            for i in 0..100 {
                engine
                    .create_and_settle(&SettlementRequest {
                        cedent_id: cedent.id(),
                        document_number: format!("DUP-{}", i),
                        receivable_type: ReceivableType::TradeDraft,
                        face_value: dec!(10_000),
                        face_currency: CurrencyCode::new("BRL"),
                        payment_currency: CurrencyCode::new("BRL"),
                        due_date: due,
                    })
                    .unwrap();
            }
            black_box(engine)
        })
    });
}

criterion_group!(
    benches,
    bench_pricing_short_term,
    bench_pricing_long_term,
    bench_settle_100_receivables
);
criterion_main!(benches);
