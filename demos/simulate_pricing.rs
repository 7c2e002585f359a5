//! Pricing simulation example.
//!
//! Prices the same receivable as a trade draft and as a post-dated check
//! across several terms, without persisting anything.

use chrono::{Duration, Utc};
use credit_engine::core::currency::CurrencyCode;
use credit_engine::core::pricing::ReceivableType;
use credit_engine::engine::orchestrator::{SettlementEngine, SimulationRequest};
use rust_decimal_macros::dec;

fn main() {
    println!("╔════════════════════════════════════════════╗");
    println!("║  credit-engine: Pricing Simulation Example ║");
    println!("╚════════════════════════════════════════════╝\n");

    let engine = SettlementEngine::new();
    let brl = CurrencyCode::new("BRL");

    println!(
        "Face value: 10,000.00 BRL | base rate: {}% monthly\n",
        engine.base_rate() * dec!(100)
    );

    for receivable_type in [ReceivableType::TradeDraft, ReceivableType::PostdatedCheck] {
        println!("━━━ {} ━━━\n", receivable_type);
        println!(
            "  {:>6}  {:>12}  {:>12}  {:>10}",
            "term", "present", "discount", "rate"
        );
        for days in [30, 60, 90, 180, 360] {
            let view = engine
                .simulate(&SimulationRequest {
                    face_value: dec!(10_000),
                    face_currency: brl.clone(),
                    payment_currency: brl.clone(),
                    receivable_type,
                    due_date: Utc::now() + Duration::days(days),
                })
                .unwrap();
            println!(
                "  {:>4}mo  {:>12}  {:>12}  {:>9}%",
                view.term_in_months, view.present_value, view.discount, view.discount_rate_percent
            );
        }
        println!();
    }
}
