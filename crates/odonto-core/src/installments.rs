//! Installment calculator for payment plans.
//!
//! A plan is an optional down payment (entrada) plus `N` installments
//! (parcelas). Boleto and card plans with more than one installment are
//! amortized at the clinic's monthly rate:
//!
//! ```text
//! P = V - E
//! installment = P * r(1+r)^N / ((1+r)^N - 1)
//! ```
//!
//! Every other case divides `P` evenly. The quote is computed once and its
//! figures (installment amount, total payable, interest) are persisted with
//! the plan, so printed contracts never recompute them.

use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::{floor_cents, round_cents};

pub const DEFAULT_BOLETO_RATE: f64 = 0.015;
pub const DEFAULT_CARD_RATE: f64 = 0.025;
/// Upper bound accepted for an installment count.
pub const MAX_INSTALLMENTS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    Boleto,
    Card,
    Pix,
    Cash,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Boleto => "Boleto",
            PaymentMethod::Card => "Cartão de crédito",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Cash => "Dinheiro",
        }
    }
}

/// Monthly interest rates configured per clinic, as fractions (0.015 = 1.5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InterestRates {
    pub boleto: f64,
    pub card: f64,
}

impl Default for InterestRates {
    fn default() -> Self {
        Self {
            boleto: DEFAULT_BOLETO_RATE,
            card: DEFAULT_CARD_RATE,
        }
    }
}

impl InterestRates {
    /// Rate associated with a method; `None` for methods that never accrue
    /// interest.
    pub fn rate_for(&self, method: PaymentMethod) -> Option<f64> {
        match method {
            PaymentMethod::Boleto => Some(self.boleto),
            PaymentMethod::Card => Some(self.card),
            PaymentMethod::Pix | PaymentMethod::Cash => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteRequest {
    pub total: f64,
    #[serde(default)]
    pub down_payment: f64,
    pub installments: u32,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub total: f64,
    pub down_payment: f64,
    /// `total - down_payment`.
    pub financed: f64,
    pub installments: u32,
    pub method: PaymentMethod,
    /// Rate actually applied; zero for flat division.
    pub monthly_rate: f64,
    pub installment_amount: f64,
    /// Down payment plus what the installment schedule adds up to. For
    /// amortized plans this is `down_payment + installments * installment_amount`.
    pub total_payable: f64,
    /// `total_payable - total`; positive only for amortized plans.
    pub interest_amount: f64,
}

impl Quote {
    pub fn is_amortized(&self) -> bool {
        self.monthly_rate > 0.0
    }

    /// Amount the installments add up to once the last one absorbs rounding.
    pub fn financed_payable(&self) -> f64 {
        if self.is_amortized() {
            round_cents(self.installment_amount * f64::from(self.installments))
        } else {
            self.financed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    #[error("installment count out of range: {0}")]
    InstallmentCount(u32),

    #[error("{field} must be a finite, non-negative amount")]
    InvalidAmount { field: &'static str },

    #[error("down payment {down_payment} exceeds total {total}")]
    DownPaymentExceedsTotal { down_payment: f64, total: f64 },

    #[error("monthly rate must be a finite, non-negative fraction, got {0}")]
    InvalidRate(f64),

    #[error("{financed} cannot be split into {installments} installments of at least one cent")]
    FinancedTooSmall { financed: f64, installments: u32 },
}

impl QuoteError {
    pub fn field(&self) -> &'static str {
        match self {
            QuoteError::InstallmentCount(_) => "installments",
            QuoteError::InvalidAmount { field } => *field,
            QuoteError::DownPaymentExceedsTotal { .. } => "down_payment",
            QuoteError::InvalidRate(_) => "monthly_rate",
            QuoteError::FinancedTooSmall { .. } => "installments",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            QuoteError::InstallmentCount(_) => {
                format!("Número de parcelas deve estar entre 1 e {MAX_INSTALLMENTS}.")
            }
            QuoteError::InvalidAmount { .. } => "Informe um valor maior ou igual a zero.".to_string(),
            QuoteError::DownPaymentExceedsTotal { .. } => {
                "Entrada maior que o valor total do tratamento.".to_string()
            }
            QuoteError::InvalidRate(_) => "Taxa de juros inválida.".to_string(),
            QuoteError::FinancedTooSmall { .. } => {
                "Valor financiado insuficiente para o número de parcelas.".to_string()
            }
        }
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), QuoteError> {
    if !value.is_finite() || value < 0.0 {
        return Err(QuoteError::InvalidAmount { field });
    }
    Ok(())
}

/// Smallest `(1+r)^N - 1` the amortization formula is evaluated for. Below it
/// the interest is far under a cent and the subtraction loses its precision
/// (down to zero for rates like `1e-17`).
const MIN_GROWTH: f64 = 1e-9;

/// Whether `rate` compounds to a usable amount over `periods`.
fn compounds(rate: f64, periods: u32) -> bool {
    rate > 0.0 && (1.0 + rate).powi(periods as i32) - 1.0 > MIN_GROWTH
}

/// Payment per period for a loan of `principal` over `periods` at `rate`.
/// Rates too small to compound fall back to even division.
pub fn amortized_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    if periods <= 1 || !compounds(rate, periods) {
        return principal / f64::from(periods.max(1));
    }
    let growth = (1.0 + rate).powi(periods as i32);
    principal * (rate * growth) / (growth - 1.0)
}

/// Quote a payment plan.
pub fn quote(request: &QuoteRequest, rates: &InterestRates) -> Result<Quote, QuoteError> {
    check_amount("total", request.total)?;
    check_amount("down_payment", request.down_payment)?;
    if request.installments == 0 || request.installments > MAX_INSTALLMENTS {
        return Err(QuoteError::InstallmentCount(request.installments));
    }
    if request.down_payment > request.total {
        return Err(QuoteError::DownPaymentExceedsTotal {
            down_payment: request.down_payment,
            total: request.total,
        });
    }

    let total = round_cents(request.total);
    let down_payment = round_cents(request.down_payment);
    let financed = round_cents(total - down_payment);
    let n = request.installments;

    let rate = match rates.rate_for(request.method) {
        Some(rate) if !rate.is_finite() || rate < 0.0 => return Err(QuoteError::InvalidRate(rate)),
        Some(rate) if n > 1 && compounds(rate, n) => rate,
        _ => 0.0,
    };

    // Flat plans round down so the last installment only ever grows.
    let installment_amount = if rate > 0.0 {
        round_cents(amortized_payment(financed, rate, n))
    } else {
        floor_cents(financed / f64::from(n))
    };
    if !installment_amount.is_finite() {
        return Err(QuoteError::InvalidRate(rate));
    }
    if installment_amount < 0.01 {
        return Err(QuoteError::FinancedTooSmall {
            financed,
            installments: n,
        });
    }

    let mut quote = Quote {
        total,
        down_payment,
        financed,
        installments: n,
        method: request.method,
        monthly_rate: rate,
        installment_amount,
        total_payable: 0.0,
        interest_amount: 0.0,
    };
    quote.total_payable = round_cents(down_payment + quote.financed_payable());
    quote.interest_amount = round_cents(quote.total_payable - total);
    if !quote.total_payable.is_finite() {
        return Err(QuoteError::InvalidRate(rate));
    }
    Ok(quote)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScheduledInstallment {
    /// 1-based.
    pub number: u32,
    pub amount: f64,
    pub due_date: Date,
}

/// Lay out the installments of a quote, one per month from `first_due`.
///
/// Due dates are computed from `first_due` directly, so a plan starting on
/// the 31st falls on the last day of shorter months and returns to the 31st
/// afterwards. The last installment absorbs the cent rounding so the schedule
/// sums to [`Quote::financed_payable`]; it is never smaller than the others
/// for flat plans, and within a cent of them for amortized ones.
pub fn schedule(quote: &Quote, first_due: Date) -> Result<Vec<ScheduledInstallment>, jiff::Error> {
    let n = quote.installments;
    let regular = quote.installment_amount;
    let last = round_cents(quote.financed_payable() - regular * f64::from(n.saturating_sub(1)));

    (1..=n)
        .map(|number| {
            let due_date = first_due.checked_add(i64::from(number - 1).months())?;
            let amount = if number == n { last } else { regular };
            Ok(ScheduledInstallment {
                number,
                amount,
                due_date,
            })
        })
        .collect()
}
