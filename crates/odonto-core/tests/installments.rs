use jiff::civil::date;
use odonto_core::installments::{
    InterestRates, PaymentMethod, QuoteError, QuoteRequest, amortized_payment, quote, schedule,
};
use odonto_core::money::round_cents;

fn request(total: f64, down_payment: f64, installments: u32, method: PaymentMethod) -> QuoteRequest {
    QuoteRequest {
        total,
        down_payment,
        installments,
        method,
    }
}

#[test]
fn single_installment_is_remaining_principal_for_every_method() {
    let rates = InterestRates::default();
    for method in [
        PaymentMethod::Boleto,
        PaymentMethod::Card,
        PaymentMethod::Pix,
        PaymentMethod::Cash,
    ] {
        let q = quote(&request(1000.0, 200.0, 1, method), &rates).unwrap();
        assert_eq!(q.installment_amount, 800.0, "{method:?}");
        assert_eq!(q.monthly_rate, 0.0);
        assert_eq!(q.total_payable, 1000.0);
        assert_eq!(q.interest_amount, 0.0);
    }
}

#[test]
fn zero_rate_divides_evenly() {
    let rates = InterestRates {
        boleto: 0.0,
        card: 0.0,
    };
    let q = quote(&request(1000.0, 100.0, 3, PaymentMethod::Card), &rates).unwrap();
    assert_eq!(q.installment_amount, 300.0);
    assert_eq!(q.total_payable, 1000.0);
    assert!(!q.is_amortized());
}

#[test]
fn methods_without_rate_divide_evenly() {
    let q = quote(
        &request(1200.0, 0.0, 6, PaymentMethod::Pix),
        &InterestRates::default(),
    )
    .unwrap();
    assert_eq!(q.installment_amount, 200.0);
    assert_eq!(q.interest_amount, 0.0);
}

#[test]
fn positive_rate_increases_total_paid() {
    let rates = InterestRates::default();
    for n in 2..=24 {
        let q = quote(&request(1500.0, 300.0, n, PaymentMethod::Card), &rates).unwrap();
        assert!(
            f64::from(n) * q.installment_amount > q.financed,
            "n={n}: {} * {} <= {}",
            n,
            q.installment_amount,
            q.financed
        );
        assert!(q.interest_amount > 0.0);
    }
}

#[test]
fn boleto_example_from_the_price_table() {
    let q = quote(
        &request(1000.0, 200.0, 4, PaymentMethod::Boleto),
        &InterestRates::default(),
    )
    .unwrap();
    assert_eq!(q.financed, 800.0);
    assert_eq!(q.monthly_rate, 0.015);
    assert_eq!(q.installment_amount, 207.56);
    assert_eq!(q.total_payable, 1030.24);
    assert_eq!(q.interest_amount, 30.24);
}

#[test]
fn amortized_payment_matches_formula() {
    let r: f64 = 0.025;
    let growth = (1.0 + r).powi(10);
    let expected = 5000.0 * (r * growth) / (growth - 1.0);
    assert!((amortized_payment(5000.0, r, 10) - expected).abs() < 1e-9);
    assert_eq!(amortized_payment(900.0, 0.0, 3), 300.0);
}

#[test]
fn rejects_zero_installments() {
    let err = quote(
        &request(1000.0, 0.0, 0, PaymentMethod::Boleto),
        &InterestRates::default(),
    )
    .unwrap_err();
    assert_eq!(err, QuoteError::InstallmentCount(0));
    assert_eq!(err.field(), "installments");
}

#[test]
fn rejects_down_payment_above_total() {
    let err = quote(
        &request(500.0, 600.0, 2, PaymentMethod::Cash),
        &InterestRates::default(),
    )
    .unwrap_err();
    assert!(matches!(err, QuoteError::DownPaymentExceedsTotal { .. }));
    assert!(err.user_message().contains("Entrada"));
}

#[test]
fn rejects_non_finite_amounts_and_negative_rates() {
    let rates = InterestRates::default();
    assert!(matches!(
        quote(&request(f64::NAN, 0.0, 2, PaymentMethod::Cash), &rates),
        Err(QuoteError::InvalidAmount { field: "total" })
    ));
    assert!(matches!(
        quote(&request(100.0, -1.0, 2, PaymentMethod::Cash), &rates),
        Err(QuoteError::InvalidAmount {
            field: "down_payment"
        })
    ));
    let negative = InterestRates {
        boleto: -0.01,
        card: 0.02,
    };
    assert!(matches!(
        quote(&request(100.0, 0.0, 2, PaymentMethod::Boleto), &negative),
        Err(QuoteError::InvalidRate(_))
    ));
}

#[test]
fn schedule_absorbs_rounding_in_last_installment() {
    let q = quote(
        &request(100.0, 0.0, 3, PaymentMethod::Cash),
        &InterestRates::default(),
    )
    .unwrap();
    let rows = schedule(&q, date(2025, 3, 10)).unwrap();
    let amounts: Vec<f64> = rows.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![33.33, 33.33, 33.34]);
    assert_eq!(round_cents(amounts.iter().sum()), 100.0);
    assert_eq!(q.total_payable, 100.0);
}

#[test]
fn amortized_schedule_sums_to_total_payable_minus_down_payment() {
    let q = quote(
        &request(2350.0, 350.0, 7, PaymentMethod::Card),
        &InterestRates::default(),
    )
    .unwrap();
    let rows = schedule(&q, date(2025, 1, 5)).unwrap();
    assert_eq!(rows.len(), 7);
    let sum = round_cents(rows.iter().map(|r| r.amount).sum());
    assert_eq!(sum, round_cents(q.total_payable - q.down_payment));
}

#[test]
fn due_dates_advance_monthly_and_clamp_month_end() {
    let q = quote(
        &request(400.0, 0.0, 4, PaymentMethod::Pix),
        &InterestRates::default(),
    )
    .unwrap();
    let rows = schedule(&q, date(2024, 1, 31)).unwrap();
    let due: Vec<_> = rows.iter().map(|r| r.due_date).collect();
    assert_eq!(
        due,
        vec![
            date(2024, 1, 31),
            date(2024, 2, 29),
            date(2024, 3, 31),
            date(2024, 4, 30),
        ]
    );
    assert_eq!(rows[0].number, 1);
    assert_eq!(rows[3].number, 4);
}

#[test]
fn rates_too_small_to_compound_divide_evenly() {
    let rates = InterestRates {
        boleto: 1e-17,
        card: 1e-12,
    };
    for method in [PaymentMethod::Boleto, PaymentMethod::Card] {
        let q = quote(&request(1000.0, 0.0, 4, method), &rates).unwrap();
        assert_eq!(q.installment_amount, 250.0, "{method:?}");
        assert_eq!(q.total_payable, 1000.0);
        assert_eq!(q.monthly_rate, 0.0);
        assert!(serde_json::to_value(q).unwrap()["installment_amount"].is_number());
    }
    assert_eq!(amortized_payment(1000.0, 1e-17, 4), 250.0);
}

#[test]
fn every_quote_is_finite_across_rates_and_counts() {
    for rate in [1e-300, 1e-17, 1e-12, 1e-9, 1e-6, 0.015, 0.5, 0.99] {
        let rates = InterestRates {
            boleto: rate,
            card: rate,
        };
        for n in [2, 12, 60, 120] {
            let q = quote(&request(3000.0, 0.0, n, PaymentMethod::Boleto), &rates).unwrap();
            assert!(q.installment_amount.is_finite(), "r={rate} n={n}");
            assert!(q.total_payable.is_finite(), "r={rate} n={n}");
            assert!(q.total_payable >= q.total, "r={rate} n={n}");
        }
    }
}

#[test]
fn last_installment_is_never_below_the_others_for_small_totals() {
    let rates = InterestRates::default();
    for cents in 1..=6000u32 {
        let total = f64::from(cents) / 100.0;
        for n in [2, 3, 4, 7, 12, 60, 115, 120] {
            let Ok(q) = quote(&request(total, 0.0, n, PaymentMethod::Pix), &rates) else {
                assert!(f64::from(n) > f64::from(cents), "total={total} n={n}");
                continue;
            };
            let rows = schedule(&q, date(2025, 1, 10)).unwrap();
            let last = rows[rows.len() - 1].amount;
            assert!(last >= q.installment_amount, "total={total} n={n} last={last}");
            assert_eq!(
                round_cents(rows.iter().map(|r| r.amount).sum()),
                total,
                "total={total} n={n}"
            );
        }
    }
}

#[test]
fn rejects_splits_below_one_cent() {
    let err = quote(
        &request(0.02, 0.0, 4, PaymentMethod::Pix),
        &InterestRates::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        QuoteError::FinancedTooSmall {
            financed: 0.02,
            installments: 4
        }
    );
    assert_eq!(err.field(), "installments");
}
