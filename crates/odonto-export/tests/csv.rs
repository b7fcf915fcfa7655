use std::collections::HashMap;

use jiff::Timestamp;
use jiff::civil::date;
use uuid::Uuid;

use odonto_core::installments::PaymentMethod;
use odonto_core::models::Record;
use odonto_core::models::appointment::{Appointment, AppointmentStatus};
use odonto_core::models::installment::{Installment, InstallmentStatus};
use odonto_core::reports::ProcedureCount;
use odonto_export::csv::{
    CsvWriter, ExportKind, appointments_csv, escape_field, procedure_counts_csv, revenue_csv,
};

#[test]
fn fields_are_quoted_only_when_needed() {
    assert_eq!(escape_field("Limpeza"), "Limpeza");
    assert_eq!(escape_field("Canal, molar"), "\"Canal, molar\"");
    assert_eq!(escape_field("dente \"16\""), "\"dente \"\"16\"\"\"");
    assert_eq!(escape_field("linha 1\nlinha 2"), "\"linha 1\nlinha 2\"");
}

#[test]
fn rows_are_padded_to_header_width() {
    let mut csv = CsvWriter::new(&["a", "b", "c"]);
    csv.row(["1"]);
    assert_eq!(csv.finish(), "a,b,c\n1,,\n");
}

#[test]
fn export_kinds_parse_from_slugs() {
    assert_eq!(ExportKind::from_slug("revenue"), Some(ExportKind::Revenue));
    assert_eq!(ExportKind::from_slug("procedures").map(ExportKind::slug), Some("procedures"));
    assert_eq!(ExportKind::from_slug("patients"), None);
}

#[test]
fn revenue_export_lists_paid_installments_by_payment_date() {
    let patient = Uuid::from_u128(7);
    let paid = |number: u32, day: i8, amount: f64| {
        Record::new(
            Uuid::from_u128(1),
            Installment {
                plan_id: Uuid::from_u128(2),
                patient_id: patient,
                number,
                amount,
                due_date: date(2025, 3, 1),
                paid_date: Some(date(2025, 3, day)),
                status: InstallmentStatus::Paid,
                method: Some(PaymentMethod::Card),
                notes: None,
            },
            Timestamp::UNIX_EPOCH,
        )
    };
    let late = paid(2, 20, 99.9);
    let early = paid(1, 5, 150.0);
    let names = HashMap::from([(patient, "Silva, Ana".to_string())]);

    let csv = revenue_csv(&[&late, &early], &names);
    assert_eq!(
        csv,
        "data_pagamento,paciente,parcela,vencimento,forma_pagamento,valor\n\
         2025-03-05,\"Silva, Ana\",1,2025-03-01,Cartão de crédito,150.00\n\
         2025-03-20,\"Silva, Ana\",2,2025-03-01,Cartão de crédito,99.90\n"
    );
}

#[test]
fn appointment_export_includes_end_time_and_status() {
    let appointment = Record::new(
        Uuid::from_u128(1),
        Appointment {
            patient_id: Uuid::from_u128(7),
            dentist_id: None,
            starts_at: date(2025, 3, 5).at(9, 30, 0, 0),
            duration_minutes: 45,
            procedure: Some("Avaliação".to_string()),
            status: AppointmentStatus::Done,
            notes: None,
        },
        Timestamp::UNIX_EPOCH,
    );
    let csv = appointments_csv(&[appointment], &HashMap::new(), &HashMap::new());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[1], "2025-03-05,09:30,10:15,,,Avaliação,Realizado");
}

#[test]
fn procedure_counts_export() {
    let counts = vec![ProcedureCount {
        procedure: "Limpeza".to_string(),
        count: 3,
    }];
    assert_eq!(procedure_counts_csv(&counts), "procedimento,quantidade\nLimpeza,3\n");
}
