//! Currency helpers. Amounts are BRL held as `f64` and rounded to cents at
//! the points where they are persisted or displayed.

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round down to cents. The small offset keeps values that are already whole
/// cents (`0.29 * 100 = 28.999…`) from dropping a cent.
pub fn floor_cents(value: f64) -> f64 {
    ((value * 100.0) + 1e-6).floor() / 100.0
}

/// Sum a sequence of amounts, rounding the result to cents.
pub fn sum_cents<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    round_cents(values.into_iter().sum())
}

/// Format as Brazilian currency, e.g. `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let reais = cents / 100;
    let frac = cents % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac:02}")
}

/// Format a monthly rate fraction as a percentage, e.g. `0.015` → `1,50%`.
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0).replace('.', ",")
}
