//! Performance benchmarks for the payroll engine.
//!
//! This benchmark suite measures:
//! - A single monthly calculation
//! - A full tax year of cumulative monthly calculations
//! - Batches of 100 and 1000 mixed requests
//! - The cost of each pay frequency
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use uuid::Uuid;

use payroll_engine::calculation::PayrollEngine;
use payroll_engine::config::{RateTable, RateTableLoader};
use payroll_engine::models::{CalculationRequest, NiCategory, PayFrequency};

/// Loads the 2017 rate table.
fn load_2017_rates() -> RateTable {
    let loader = RateTableLoader::load("./config/rates").expect("Failed to load rate tables");
    loader
        .rate_table(2017)
        .expect("2017 rate table missing")
        .clone()
}

/// Creates a request paid on the given date.
fn create_request(
    payment_date: NaiveDate,
    frequency: PayFrequency,
    tax_code: &str,
    gross_pay: i64,
) -> CalculationRequest {
    CalculationRequest {
        request_id: Uuid::new_v4(),
        payment_date,
        pay_frequency: frequency,
        gross_pay: Decimal::from(gross_pay),
        previous_pay_to_date: Decimal::ZERO,
        tax_paid_to_date: Decimal::ZERO,
        tax_code: tax_code.parse().expect("invalid tax code"),
        ni_category: NiCategory::A,
    }
}

/// Creates `count` requests cycling through codes, categories and pay levels.
fn create_mixed_requests(count: usize) -> Vec<CalculationRequest> {
    let codes = ["1150L", "K100", "BR", "1150L M1", "0T", "D0"];
    let categories = [NiCategory::A, NiCategory::B, NiCategory::H, NiCategory::M, NiCategory::X];
    let payment_date = NaiveDate::from_ymd_opt(2017, 9, 28).expect("valid date");

    (0..count)
        .map(|i| {
            let mut request = create_request(
                payment_date,
                PayFrequency::Monthly,
                codes[i % codes.len()],
                1000 + (i as i64 % 50) * 100,
            );
            request.ni_category = categories[i % categories.len()];
            request.previous_pay_to_date = Decimal::from(10_000);
            request.tax_paid_to_date = Decimal::from(1_000);
            request
        })
        .collect()
}

/// Benchmark: Single monthly calculation.
fn bench_single_calculation(c: &mut Criterion) {
    let engine = PayrollEngine::new().expect("Failed to build engine");
    let rates = load_2017_rates();
    let request = create_request(
        NaiveDate::from_ymd_opt(2017, 4, 28).expect("valid date"),
        PayFrequency::Monthly,
        "1150L",
        2000,
    );

    c.bench_function("single_calculation", |b| {
        b.iter(|| black_box(engine.calculate(black_box(&request), &rates)))
    });
}

/// Benchmark: Twelve cumulative monthly calculations.
fn bench_tax_year(c: &mut Criterion) {
    let engine = PayrollEngine::new().expect("Failed to build engine");
    let rates = load_2017_rates();

    c.bench_function("tax_year_monthly", |b| {
        b.iter(|| {
            let mut pay_to_date = Decimal::ZERO;
            let mut tax_paid = Decimal::ZERO;
            for month in 0..12u32 {
                let (year, calendar_month) = if month < 9 { (2017, month + 4) } else { (2018, month - 8) };
                let date = NaiveDate::from_ymd_opt(year, calendar_month, 28).expect("valid date");
                let mut request = create_request(date, PayFrequency::Monthly, "1150L", 2500);
                request.previous_pay_to_date = pay_to_date;
                request.tax_paid_to_date = tax_paid;

                if let Ok(result) = engine.calculate(&request, &rates) {
                    pay_to_date += result.paye.pay_this_period;
                    tax_paid += result.paye_tax();
                }
            }
            black_box(tax_paid)
        })
    });
}

/// Benchmark: Batches of mixed requests.
fn bench_batches(c: &mut Criterion) {
    let engine = PayrollEngine::new().expect("Failed to build engine");
    let rates = load_2017_rates();

    let mut group = c.benchmark_group("batch_processing");

    for size in [100usize, 1000] {
        let requests = create_mixed_requests(size);
        group.throughput(Throughput::Elements(size as u64));
        if size >= 1000 {
            // Reduce sample size for large batches to keep benchmark time reasonable
            group.sample_size(10);
        }
        group.bench_with_input(BenchmarkId::new("batch", size), &requests, |b, requests| {
            b.iter(|| black_box(engine.calculate_batch(requests, &rates)))
        });
    }

    group.finish();
}

/// Benchmark: Each pay frequency to compare factoring cost.
fn bench_frequencies(c: &mut Criterion) {
    let engine = PayrollEngine::new().expect("Failed to build engine");
    let rates = load_2017_rates();
    let date = NaiveDate::from_ymd_opt(2017, 10, 20).expect("valid date");

    let mut group = c.benchmark_group("frequencies");

    for frequency in PayFrequency::ALL {
        let request = create_request(date, frequency, "1150L", 1500);
        group.bench_with_input(
            BenchmarkId::new("frequency", frequency),
            &request,
            |b, request| b.iter(|| black_box(engine.calculate(request, &rates))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_calculation,
    bench_tax_year,
    bench_batches,
    bench_frequencies,
);
criterion_main!(benches);
