//! credit-engine CLI
//!
//! Price and settle receivables from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Simulate pricing a trade draft
//! credit-engine simulate --face 10000 --currency BRL --due 2026-11-30
//!
//! # Simulate a cross-currency disbursement
//! credit-engine simulate --face 10000 --currency USD --pay-currency BRL \
//!     --due 2026-11-30 --rates rates.json
//!
//! # Settle a batch of receivables
//! credit-engine settle --input batch.json --format json
//!
//! # Inspect stored rates for a pair
//! credit-engine rates --input rates.json --from USD --to BRL
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use credit_engine::core::pricing::ReceivableType;
use credit_engine::engine::error::EngineError;
use credit_engine::engine::orchestrator::{
    SettlementEngine, SettlementRequest, SimulationRequest,
};
use credit_engine::engine::views::{PricingView, SettlementView};
use credit_engine::prelude::CurrencyCode;
use credit_engine::rates::provider::UnavailableProvider;
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"credit-engine — receivables pricing and settlement for a credit-rights fund

USAGE:
    credit-engine <COMMAND> [OPTIONS]

COMMANDS:
    simulate    Price a hypothetical receivable (nothing persists)
    settle      Price and settle a batch of receivables from a JSON file
    rates       Upsert rates from a JSON file and show the latest for a pair
    help        Show this message

OPTIONS (simulate):
    --face <AMOUNT>         Face value (required)
    --currency <CODE>       Face currency (default: BRL)
    --pay-currency <CODE>   Payment currency (default: same as face)
    --type <TYPE>           trade-draft (default) or postdated-check
    --due <DATE>            Due date, YYYY-MM-DD or RFC 3339 (required)
    --base-rate <RATE>      Monthly base rate as a fraction (default: 0.0089)
    --rates <FILE>          JSON rates file for cross-currency pricing
    --format <FORMAT>       Output format: text (default) or json

OPTIONS (settle):
    --input <FILE>          Path to JSON batch file (required)
    --base-rate <RATE>      Monthly base rate as a fraction (default: 0.0089)
    --format <FORMAT>       Output format: text (default) or json

OPTIONS (rates):
    --input <FILE>          JSON rates file (required)
    --from <CODE>           Source currency (required)
    --to <CODE>             Target currency (required)

EXAMPLES:
    credit-engine simulate --face 10000 --currency BRL --due 2026-11-30
    credit-engine simulate --face 10000 --currency USD --pay-currency BRL \
        --due 2026-11-30 --rates rates.json
    credit-engine settle --input batch.json --format json"#
    );
}

/// JSON schema for rate entries (standalone file or batch section).
#[derive(serde::Deserialize)]
struct RateInput {
    from: String,
    to: String,
    rate: String,
    #[serde(default = "default_rate_source")]
    source: String,
}

fn default_rate_source() -> String {
    "manual".to_string()
}

#[derive(serde::Deserialize)]
struct RatesFile {
    rates: Vec<RateInput>,
}

/// JSON schema for the settle batch file.
#[derive(serde::Deserialize)]
struct BatchFile {
    cedent: CedentInput,
    receivables: Vec<ReceivableInput>,
    #[serde(default)]
    rates: Vec<RateInput>,
}

#[derive(serde::Deserialize)]
struct CedentInput {
    name: String,
    tax_id: String,
}

#[derive(serde::Deserialize)]
struct ReceivableInput {
    document: String,
    #[serde(rename = "type", default = "default_receivable_type")]
    receivable_type: String,
    face_value: String,
    currency: String,
    #[serde(default)]
    payment_currency: Option<String>,
    due_date: String,
}

fn default_receivable_type() -> String {
    "trade-draft".to_string()
}

fn parse_receivable_type(s: &str) -> ReceivableType {
    match s {
        "trade-draft" | "duplicata" => ReceivableType::TradeDraft,
        "postdated-check" | "check" => ReceivableType::PostdatedCheck,
        other => {
            eprintln!(
                "Unknown receivable type '{}': expected trade-draft or postdated-check",
                other
            );
            process::exit(1);
        }
    }
}

fn parse_due_date(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => match date.and_hms_opt(0, 0, 0) {
            Some(naive) => naive.and_utc(),
            None => {
                eprintln!("Invalid due date '{}'", s);
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Invalid due date '{}': {}", s, e);
            process::exit(1);
        }
    }
}

fn parse_decimal(s: &str, what: &str) -> Decimal {
    s.parse().unwrap_or_else(|e| {
        eprintln!("Invalid {} '{}': {}", what, s, e);
        process::exit(1);
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing '{}': {}", path, e);
        process::exit(1);
    })
}

fn load_rates(engine: &SettlementEngine<UnavailableProvider>, entries: &[RateInput]) {
    for entry in entries {
        let rate = parse_decimal(&entry.rate, "rate");
        if let Err(e) = engine.upsert_rate(
            CurrencyCode::new(&entry.from),
            CurrencyCode::new(&entry.to),
            rate,
            &entry.source,
        ) {
            eprintln!(
                "Error storing rate {} -> {}: {} [{}]",
                entry.from,
                entry.to,
                e,
                e.code()
            );
            process::exit(1);
        }
    }
}

fn fail(err: &EngineError) -> ! {
    eprintln!("Error: {} [{}]", err, err.code());
    process::exit(1);
}

fn print_pricing_text(view: &PricingView) {
    println!("Pricing simulation");
    println!(
        "  Face value:        {} {}",
        view.face_value, view.face_currency
    );
    println!("  Term:              {} month(s)", view.term_in_months);
    println!("  Base rate:         {}% monthly", view.base_rate_percent);
    println!(
        "  Spread:            {}% monthly",
        view.applied_spread_percent
    );
    println!(
        "  Present value:     {} {}",
        view.present_value, view.face_currency
    );
    println!(
        "  Discount:          {} {} ({}%)",
        view.discount, view.face_currency, view.discount_rate_percent
    );
    if view.is_cross_currency {
        println!("  Exchange rate:     {}", view.exchange_rate_applied);
    }
    println!(
        "  Net disbursement:  {} {}",
        view.net_disbursement, view.payment_currency
    );
}

fn print_settlement_text(view: &SettlementView) {
    println!(
        "{} | {} | {} | face {} {} | net {} {} | status {}",
        view.document_number,
        view.cedent_name,
        view.receivable_type,
        view.face_value,
        view.face_currency,
        view.net_disbursement,
        view.payment_currency,
        view.status,
    );
}

fn cmd_simulate(args: &[String]) {
    let mut face = None;
    let mut currency = "BRL".to_string();
    let mut pay_currency = None;
    let mut receivable_type = "trade-draft".to_string();
    let mut due = None;
    let mut base_rate = None;
    let mut rates_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--face" => {
                i += 1;
                face = args.get(i).cloned();
            }
            "--currency" => {
                i += 1;
                currency = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--currency requires a code");
                    process::exit(1);
                });
            }
            "--pay-currency" => {
                i += 1;
                pay_currency = args.get(i).cloned();
            }
            "--type" => {
                i += 1;
                receivable_type = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--type requires trade-draft or postdated-check");
                    process::exit(1);
                });
            }
            "--due" => {
                i += 1;
                due = args.get(i).cloned();
            }
            "--base-rate" => {
                i += 1;
                base_rate = args.get(i).cloned();
            }
            "--rates" => {
                i += 1;
                rates_path = args.get(i).cloned();
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let face = face.unwrap_or_else(|| {
        eprintln!("Error: --face <AMOUNT> is required");
        process::exit(1);
    });
    let due = due.unwrap_or_else(|| {
        eprintln!("Error: --due <DATE> is required");
        process::exit(1);
    });

    let mut engine = SettlementEngine::new();
    if let Some(rate) = base_rate {
        engine = engine.with_base_rate(parse_decimal(&rate, "base rate"));
    }
    if let Some(path) = rates_path {
        let file: RatesFile = read_json(&path);
        load_rates(&engine, &file.rates);
    }

    let face_currency = CurrencyCode::new(&currency);
    let request = SimulationRequest {
        face_value: parse_decimal(&face, "face value"),
        payment_currency: pay_currency
            .map(|c| CurrencyCode::new(&c))
            .unwrap_or_else(|| face_currency.clone()),
        face_currency,
        receivable_type: parse_receivable_type(&receivable_type),
        due_date: parse_due_date(&due),
    };

    match engine.simulate(&request) {
        Ok(view) => {
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&view).unwrap());
            } else {
                print_pricing_text(&view);
            }
        }
        Err(e) => fail(&e),
    }
}

fn cmd_settle(args: &[String]) {
    let mut input_path = None;
    let mut base_rate = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--base-rate" => {
                i += 1;
                base_rate = args.get(i).cloned();
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let batch: BatchFile = read_json(&path);

    let mut engine = SettlementEngine::new();
    if let Some(rate) = base_rate {
        engine = engine.with_base_rate(parse_decimal(&rate, "base rate"));
    }
    load_rates(&engine, &batch.rates);

    let cedent = engine
        .register_cedent(batch.cedent.name.as_str(), batch.cedent.tax_id.as_str())
        .unwrap_or_else(|e| fail(&e));

    let mut settled = Vec::new();
    let mut failures = 0usize;
    for item in &batch.receivables {
        let request = SettlementRequest {
            cedent_id: cedent.id(),
            document_number: item.document.clone(),
            receivable_type: parse_receivable_type(&item.receivable_type),
            face_value: parse_decimal(&item.face_value, "face value"),
            face_currency: CurrencyCode::new(&item.currency),
            payment_currency: item
                .payment_currency
                .as_deref()
                .map(CurrencyCode::new)
                .unwrap_or_else(|| CurrencyCode::new(&item.currency)),
            due_date: parse_due_date(&item.due_date),
        };
        match engine.create_and_settle(&request) {
            Ok(view) => settled.push(view),
            Err(e) => {
                eprintln!("'{}' failed: {} [{}]", item.document, e, e.code());
                failures += 1;
            }
        }
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&settled).unwrap());
    } else {
        for view in &settled {
            print_settlement_text(view);
        }
        println!(
            "\nSettled {} of {} receivable(s) for cedent '{}'",
            settled.len(),
            batch.receivables.len(),
            cedent.name(),
        );
    }

    if failures > 0 {
        process::exit(1);
    }
}

fn cmd_rates(args: &[String]) {
    let mut input_path = None;
    let mut from = None;
    let mut to = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--from" => {
                i += 1;
                from = args.get(i).cloned();
            }
            "--to" => {
                i += 1;
                to = args.get(i).cloned();
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    let from = CurrencyCode::new(&from.unwrap_or_else(|| {
        eprintln!("Error: --from <CODE> is required");
        process::exit(1);
    }));
    let to = CurrencyCode::new(&to.unwrap_or_else(|| {
        eprintln!("Error: --to <CODE> is required");
        process::exit(1);
    }));

    let engine = SettlementEngine::new();
    let file: RatesFile = read_json(&path);
    load_rates(&engine, &file.rates);

    match engine.latest_rate(&from, &to) {
        Ok(view) => {
            println!(
                "{} -> {} = {} (source: {}, effective {})",
                view.from, view.to, view.rate, view.source, view.effective_date
            );
        }
        Err(e) => fail(&e),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "simulate" => cmd_simulate(rest),
        "settle" => cmd_settle(rest),
        "rates" => cmd_rates(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
