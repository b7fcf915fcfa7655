//! Report aggregates over collections fetched in full.
//!
//! Every function is a pure fold over its inputs, so re-running a report on
//! the same data always yields the same figures.

use std::collections::{BTreeMap, HashMap};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::models::Record;
use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::models::expense::Expense;
use crate::models::installment::{Installment, InstallmentStatus};
use crate::money::{round_cents, sum_cents};
use crate::validation::ValidationError;

pub const NO_PROCEDURE_LABEL: &str = "Sem procedimento";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    /// Inclusive.
    pub from: Date,
    /// Inclusive.
    pub to: Date,
}

impl DateRange {
    pub fn new(from: Date, to: Date) -> Result<Self, ValidationError> {
        if to < from {
            return Err(ValidationError::new("to", "Data final anterior à data inicial."));
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, date: Date) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Installments paid within the range.
pub fn paid_in_range<'a>(
    installments: &'a [Record<Installment>],
    range: &DateRange,
) -> Vec<&'a Record<Installment>> {
    installments
        .iter()
        .filter(|i| i.data.status == InstallmentStatus::Paid)
        .filter(|i| i.data.paid_date.is_some_and(|d| range.contains(d)))
        .collect()
}

/// Sum of paid installment amounts whose paid date falls in the range.
pub fn revenue(installments: &[Record<Installment>], range: &DateRange) -> f64 {
    sum_cents(paid_in_range(installments, range).iter().map(|i| i.data.amount))
}

pub fn expenses_total(expenses: &[Record<Expense>], range: &DateRange) -> f64 {
    sum_cents(
        expenses
            .iter()
            .filter(|e| range.contains(e.data.date))
            .map(|e| e.data.amount),
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receivables {
    /// Open and not yet due.
    pub pending: f64,
    pub overdue: f64,
}

impl Receivables {
    pub fn total(&self) -> f64 {
        round_cents(self.pending + self.overdue)
    }
}

/// Open installments due within the range, split by whether they are late
/// as of `today`.
pub fn receivables(
    installments: &[Record<Installment>],
    range: &DateRange,
    today: Date,
) -> Receivables {
    let mut pending = 0.0;
    let mut overdue = 0.0;
    for i in installments
        .iter()
        .filter(|i| i.data.is_open() && range.contains(i.data.due_date))
    {
        match i.data.effective_status(today) {
            InstallmentStatus::Overdue => overdue += i.data.amount,
            _ => pending += i.data.amount,
        }
    }
    Receivables {
        pending: round_cents(pending),
        overdue: round_cents(overdue),
    }
}

fn in_range<'a>(
    appointments: &'a [Record<Appointment>],
    range: &'a DateRange,
) -> impl Iterator<Item = &'a Appointment> + 'a {
    appointments
        .iter()
        .map(|a| &a.data)
        .filter(move |a| range.contains(a.date()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProcedureCount {
    pub procedure: String,
    pub count: usize,
}

/// Non-cancelled appointments in range grouped by procedure label. Labels
/// are compared trimmed and case-insensitively; the first spelling seen is
/// the one reported. Most frequent first, ties by label.
pub fn procedure_counts(
    appointments: &[Record<Appointment>],
    range: &DateRange,
) -> Vec<ProcedureCount> {
    let mut counts: HashMap<String, ProcedureCount> = HashMap::new();
    for appointment in in_range(appointments, range).filter(|a| !a.is_cancelled()) {
        let label = appointment
            .procedure
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(NO_PROCEDURE_LABEL);
        counts
            .entry(label.to_lowercase())
            .or_insert_with(|| ProcedureCount {
                procedure: label.to_string(),
                count: 0,
            })
            .count += 1;
    }

    let mut result: Vec<ProcedureCount> = counts.into_values().collect();
    result.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.procedure.cmp(&b.procedure))
    });
    result
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCount {
    pub status: AppointmentStatus,
    pub count: usize,
}

pub fn status_counts(appointments: &[Record<Appointment>], range: &DateRange) -> Vec<StatusCount> {
    let mut counts: BTreeMap<AppointmentStatus, usize> = BTreeMap::new();
    for appointment in in_range(appointments, range) {
        *counts.entry(appointment.status).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

/// Appointments per distinct patient, ignoring cancellations.
fn visits_per_patient(appointments: &[Record<Appointment>], range: &DateRange) -> HashMap<Uuid, usize> {
    let mut visits: HashMap<Uuid, usize> = HashMap::new();
    for appointment in in_range(appointments, range).filter(|a| !a.is_cancelled()) {
        *visits.entry(appointment.patient_id).or_default() += 1;
    }
    visits
}

/// Percentage (0–100) of patients seen in the range who had two or more
/// appointments in it. Zero when nobody was seen.
pub fn return_rate(appointments: &[Record<Appointment>], range: &DateRange) -> f64 {
    let visits = visits_per_patient(appointments, range);
    if visits.is_empty() {
        return 0.0;
    }
    let returning = visits.values().filter(|&&n| n >= 2).count();
    round_cents(returning as f64 * 100.0 / visits.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportSummary {
    pub range: DateRange,
    pub revenue: f64,
    pub expenses: f64,
    /// `revenue - expenses`.
    pub net: f64,
    pub receivables: Receivables,
    pub appointments: usize,
    pub patients_seen: usize,
    pub return_rate: f64,
    pub procedure_counts: Vec<ProcedureCount>,
    pub status_counts: Vec<StatusCount>,
}

pub fn summarize(
    range: DateRange,
    today: Date,
    appointments: &[Record<Appointment>],
    installments: &[Record<Installment>],
    expenses: &[Record<Expense>],
) -> ReportSummary {
    let revenue = revenue(installments, &range);
    let expenses = expenses_total(expenses, &range);
    ReportSummary {
        range,
        revenue,
        expenses,
        net: round_cents(revenue - expenses),
        receivables: receivables(installments, &range, today),
        appointments: in_range(appointments, &range).count(),
        patients_seen: visits_per_patient(appointments, &range).len(),
        return_rate: return_rate(appointments, &range),
        procedure_counts: procedure_counts(appointments, &range),
        status_counts: status_counts(appointments, &range),
    }
}
