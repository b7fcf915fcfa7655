use jiff::Timestamp;
use jiff::civil::{DateTime, date};
use uuid::Uuid;

use odonto_core::agenda::{AgendaFilter, MAX_DAYS, days, filter_appointments};
use odonto_core::models::Record;
use odonto_core::models::appointment::{Appointment, AppointmentStatus};
use odonto_core::models::schedule_block::{BlockKind, ScheduleBlock};

fn clinic() -> Uuid {
    Uuid::from_u128(1)
}

fn appointment(dentist: Option<Uuid>, starts_at: DateTime, status: AppointmentStatus) -> Record<Appointment> {
    Record::new(
        clinic(),
        Appointment {
            patient_id: Uuid::from_u128(10),
            dentist_id: dentist,
            starts_at,
            duration_minutes: 45,
            procedure: None,
            status,
            notes: None,
        },
        Timestamp::UNIX_EPOCH,
    )
}

#[test]
fn filter_by_range_dentist_and_status_sorted_by_start() {
    let ana = Uuid::from_u128(2);
    let bia = Uuid::from_u128(3);
    let appointments = vec![
        appointment(Some(ana), date(2025, 5, 6).at(14, 0, 0, 0), AppointmentStatus::Scheduled),
        appointment(Some(ana), date(2025, 5, 6).at(9, 0, 0, 0), AppointmentStatus::Scheduled),
        appointment(Some(bia), date(2025, 5, 6).at(10, 0, 0, 0), AppointmentStatus::Scheduled),
        appointment(Some(ana), date(2025, 5, 8).at(10, 0, 0, 0), AppointmentStatus::Cancelled),
        appointment(Some(ana), date(2025, 5, 9).at(10, 0, 0, 0), AppointmentStatus::Scheduled),
    ];

    let filter = AgendaFilter {
        from: Some(date(2025, 5, 6)),
        to: Some(date(2025, 5, 8)),
        dentist_id: Some(ana),
        status: Some(AppointmentStatus::Scheduled),
        ..AgendaFilter::default()
    };
    let matching = filter_appointments(appointments, &filter);
    let starts: Vec<_> = matching.iter().map(|a| a.data.starts_at.hour()).collect();
    assert_eq!(starts, vec![9, 14]);
}

#[test]
fn appointment_end_adds_duration() {
    let a = appointment(None, date(2025, 5, 6).at(11, 30, 0, 0), AppointmentStatus::Scheduled);
    assert_eq!(a.data.ends_at().unwrap(), date(2025, 5, 6).at(12, 15, 0, 0));
}

#[test]
fn day_view_overlays_blocks() {
    let ana = Uuid::from_u128(2);
    let appointments = vec![
        appointment(Some(ana), date(2025, 5, 5).at(9, 0, 0, 0), AppointmentStatus::Confirmed),
        appointment(Some(ana), date(2025, 5, 7).at(9, 0, 0, 0), AppointmentStatus::Confirmed),
    ];
    let blocks = vec![Record::new(
        clinic(),
        ScheduleBlock {
            dentist_id: None,
            start_date: date(2025, 5, 6),
            end_date: date(2025, 5, 6),
            kind: BlockKind::Holiday,
            reason: Some("Feriado municipal".to_string()),
        },
        Timestamp::UNIX_EPOCH,
    )];

    let view = days(date(2025, 5, 5), date(2025, 5, 7), Some(ana), appointments, &blocks).unwrap();
    assert_eq!(view.len(), 3);
    assert_eq!(view[0].appointments.len(), 1);
    assert!(!view[0].is_blocked());
    assert!(view[1].is_blocked());
    assert!(view[1].appointments.is_empty());
    assert_eq!(view[2].date, date(2025, 5, 7));
}

#[test]
fn day_view_limits_range() {
    let err = days(date(2025, 1, 1), date(2025, 6, 1), None, Vec::new(), &[]).unwrap_err();
    assert!(err.message.contains(&MAX_DAYS.to_string()));
    assert!(days(date(2025, 1, 2), date(2025, 1, 1), None, Vec::new(), &[]).is_err());
}
