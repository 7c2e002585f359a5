//! Cross-currency settlement example.
//!
//! Settles a USD-denominated trade draft with the disbursement paid out in
//! BRL, then shows how a provider outage degrades rate refreshes without
//! touching the stored rates.

use chrono::{Duration, Utc};
use credit_engine::core::currency::CurrencyCode;
use credit_engine::core::pricing::ReceivableType;
use credit_engine::engine::orchestrator::{SettlementEngine, SettlementRequest};
use credit_engine::rates::provider::StaticRateProvider;
use rust_decimal_macros::dec;

fn main() {
    env_logger::init();

    println!("╔══════════════════════════════════════════════════╗");
    println!("║  credit-engine: Cross-Currency Settlement Example ║");
    println!("╚══════════════════════════════════════════════════╝\n");

    let usd = CurrencyCode::new("USD");
    let brl = CurrencyCode::new("BRL");

    let provider = StaticRateProvider::new("fx-gateway").with_quote(
        usd.clone(),
        brl.clone(),
        dec!(5.75),
    );
    let engine = SettlementEngine::with_provider(provider);

    let cedent = engine
        .register_cedent("Exportadora Sul Ltda", "33.444.555/0001-66")
        .unwrap();
    println!("Registered cedent: {} ({})\n", cedent.name(), cedent.tax_id());

    // --- Scenario 1: refresh the rate from the provider, then settle ---
    println!("━━━ Scenario 1: Settle with a provider-sourced rate ━━━\n");

    let rate = engine.refresh_rate_from_provider(&usd, &brl).unwrap();
    println!("Stored rate: {} -> {} = {} ({})\n", rate.from, rate.to, rate.rate, rate.source);

    let view = engine
        .create_and_settle(&SettlementRequest {
            cedent_id: cedent.id(),
            document_number: "EXP-2026-0042".to_string(),
            receivable_type: ReceivableType::TradeDraft,
            face_value: dec!(25_000),
            face_currency: usd.clone(),
            payment_currency: brl.clone(),
            due_date: Utc::now() + Duration::days(120),
        })
        .unwrap();

    println!("Document:          {}", view.document_number);
    println!("Face value:        {} {}", view.face_value, view.face_currency);
    println!("Term:              {} month(s)", view.term_in_months);
    println!("Present value:     {} {}", view.present_value, view.face_currency);
    println!("Discount:          {} {}", view.discount, view.face_currency);
    println!("Exchange rate:     {}", view.exchange_rate_applied);
    println!("Net disbursement:  {} {}", view.net_disbursement, view.payment_currency);
    println!("Status:            {}\n", view.status);

    // --- Scenario 2: provider outage ---
    println!("━━━ Scenario 2: Provider outage ━━━\n");

    let degraded = SettlementEngine::new(); // provider always unavailable
    let outage_cedent = degraded
        .register_cedent("Exportadora Sul Ltda", "33.444.555/0001-66")
        .unwrap();

    match degraded.refresh_rate_from_provider(&usd, &brl) {
        Ok(_) => unreachable!("provider is down"),
        Err(e) => println!("Refresh degraded as expected: {} [{}]", e, e.code()),
    }

    // Manual rates still work.
    degraded
        .upsert_rate(usd.clone(), brl.clone(), dec!(5.80), "treasury-desk")
        .unwrap();
    let view = degraded
        .create_and_settle(&SettlementRequest {
            cedent_id: outage_cedent.id(),
            document_number: "EXP-2026-0043".to_string(),
            receivable_type: ReceivableType::PostdatedCheck,
            face_value: dec!(8_000),
            face_currency: usd,
            payment_currency: brl,
            due_date: Utc::now() + Duration::days(60),
        })
        .unwrap();
    println!(
        "Settled on the manual rate: net {} {} at {}",
        view.net_disbursement, view.payment_currency, view.exchange_rate_applied
    );
}
