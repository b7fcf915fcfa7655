use jiff::Timestamp;
use jiff::civil::{Date, date};
use uuid::Uuid;

use odonto_core::installments::PaymentMethod;
use odonto_core::models::Record;
use odonto_core::models::appointment::{Appointment, AppointmentStatus};
use odonto_core::models::expense::Expense;
use odonto_core::models::installment::{Installment, InstallmentStatus};
use odonto_core::reports::{
    DateRange, NO_PROCEDURE_LABEL, procedure_counts, receivables, return_rate, revenue, summarize,
};

fn clinic() -> Uuid {
    Uuid::from_u128(1)
}

fn appointment(patient: Uuid, day: Date, procedure: Option<&str>, status: AppointmentStatus) -> Record<Appointment> {
    Record::new(
        clinic(),
        Appointment {
            patient_id: patient,
            dentist_id: None,
            starts_at: day.at(9, 0, 0, 0),
            duration_minutes: 30,
            procedure: procedure.map(str::to_string),
            status,
            notes: None,
        },
        Timestamp::UNIX_EPOCH,
    )
}

fn installment(amount: f64, due: Date, paid: Option<Date>) -> Record<Installment> {
    Record::new(
        clinic(),
        Installment {
            plan_id: Uuid::from_u128(9),
            patient_id: Uuid::from_u128(2),
            number: 1,
            amount,
            due_date: due,
            paid_date: paid,
            status: if paid.is_some() {
                InstallmentStatus::Paid
            } else {
                InstallmentStatus::Pending
            },
            method: Some(PaymentMethod::Boleto),
            notes: None,
        },
        Timestamp::UNIX_EPOCH,
    )
}

fn march() -> DateRange {
    DateRange::new(date(2025, 3, 1), date(2025, 3, 31)).unwrap()
}

#[test]
fn revenue_sums_only_paid_installments_inside_range() {
    let installments = vec![
        installment(150.0, date(2025, 3, 5), Some(date(2025, 3, 5))),
        installment(99.9, date(2025, 2, 5), Some(date(2025, 3, 31))),
        installment(200.0, date(2025, 3, 10), None),
        installment(80.0, date(2025, 3, 1), Some(date(2025, 4, 1))),
    ];
    let range = march();
    assert_eq!(revenue(&installments, &range), 249.9);
    // Same data, same answer.
    assert_eq!(revenue(&installments, &range), revenue(&installments, &range));
}

#[test]
fn receivables_split_pending_and_overdue() {
    let installments = vec![
        installment(100.0, date(2025, 3, 5), None),
        installment(50.0, date(2025, 3, 25), None),
        installment(70.0, date(2025, 3, 6), Some(date(2025, 3, 6))),
    ];
    let r = receivables(&installments, &march(), date(2025, 3, 20));
    assert_eq!(r.overdue, 100.0);
    assert_eq!(r.pending, 50.0);
    assert_eq!(r.total(), 150.0);
}

#[test]
fn return_rate_is_zero_when_everyone_came_once() {
    let appointments: Vec<_> = (0..4)
        .map(|n| {
            appointment(
                Uuid::from_u128(100 + n),
                date(2025, 3, 3),
                Some("Limpeza"),
                AppointmentStatus::Done,
            )
        })
        .collect();
    assert_eq!(return_rate(&appointments, &march()), 0.0);
}

#[test]
fn return_rate_is_hundred_when_everyone_came_twice() {
    let mut appointments = Vec::new();
    for n in 0..3 {
        let patient = Uuid::from_u128(200 + n);
        appointments.push(appointment(patient, date(2025, 3, 3), None, AppointmentStatus::Done));
        appointments.push(appointment(patient, date(2025, 3, 17), None, AppointmentStatus::Scheduled));
    }
    assert_eq!(return_rate(&appointments, &march()), 100.0);
}

#[test]
fn return_rate_ignores_cancellations_and_empty_sets() {
    let patient = Uuid::from_u128(300);
    let appointments = vec![
        appointment(patient, date(2025, 3, 3), None, AppointmentStatus::Done),
        appointment(patient, date(2025, 3, 4), None, AppointmentStatus::Cancelled),
    ];
    assert_eq!(return_rate(&appointments, &march()), 0.0);
    assert_eq!(return_rate(&[], &march()), 0.0);
}

#[test]
fn procedure_counts_group_labels_case_insensitively() {
    let p = Uuid::from_u128(5);
    let appointments = vec![
        appointment(p, date(2025, 3, 1), Some("Limpeza"), AppointmentStatus::Done),
        appointment(p, date(2025, 3, 2), Some(" limpeza "), AppointmentStatus::Done),
        appointment(p, date(2025, 3, 3), Some("Canal"), AppointmentStatus::Scheduled),
        appointment(p, date(2025, 3, 4), Some("Canal"), AppointmentStatus::Cancelled),
        appointment(p, date(2025, 3, 5), None, AppointmentStatus::Done),
        appointment(p, date(2025, 4, 5), Some("Canal"), AppointmentStatus::Done),
    ];
    let counts = procedure_counts(&appointments, &march());
    let flat: Vec<(&str, usize)> = counts
        .iter()
        .map(|c| (c.procedure.as_str(), c.count))
        .collect();
    assert_eq!(
        flat,
        vec![("Limpeza", 2), ("Canal", 1), (NO_PROCEDURE_LABEL, 1)]
    );
}

#[test]
fn summary_combines_all_figures() {
    let patient = Uuid::from_u128(7);
    let appointments = vec![
        appointment(patient, date(2025, 3, 3), Some("Avaliação"), AppointmentStatus::Done),
        appointment(patient, date(2025, 3, 10), Some("Restauração"), AppointmentStatus::NoShow),
    ];
    let installments = vec![installment(500.0, date(2025, 3, 3), Some(date(2025, 3, 3)))];
    let expenses = vec![Record::new(
        clinic(),
        Expense {
            description: "Aluguel".to_string(),
            category: None,
            amount: 320.5,
            date: date(2025, 3, 10),
            paid: true,
            notes: None,
        },
        Timestamp::UNIX_EPOCH,
    )];

    let summary = summarize(march(), date(2025, 3, 31), &appointments, &installments, &expenses);
    assert_eq!(summary.revenue, 500.0);
    assert_eq!(summary.expenses, 320.5);
    assert_eq!(summary.net, 179.5);
    assert_eq!(summary.appointments, 2);
    assert_eq!(summary.patients_seen, 1);
    assert_eq!(summary.return_rate, 100.0);
    assert_eq!(summary.status_counts.len(), 2);
}

#[test]
fn range_rejects_inverted_bounds() {
    assert!(DateRange::new(date(2025, 3, 2), date(2025, 3, 1)).is_err());
}
