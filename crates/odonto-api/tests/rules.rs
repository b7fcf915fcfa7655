use jiff::Timestamp;
use jiff::civil::{Date, date};
use uuid::Uuid;

use odonto_api::config::GoogleOAuthConfig;
use odonto_api::routes::installments::{derived_plan_status, with_effective_status};
use odonto_api::routes::integrations::authorize_url;
use odonto_api::routes::patients::matches_search;
use odonto_api::routes::payment_plans::live_plan_for;
use odonto_core::installments::PaymentMethod;
use odonto_core::models::Record;
use odonto_core::models::installment::{Installment, InstallmentStatus};
use odonto_core::models::patient::Patient;
use odonto_core::models::payment_plan::{PaymentPlan, PlanStatus};

fn installment(number: u32, due: Date, status: InstallmentStatus) -> Record<Installment> {
    let data = Installment {
        plan_id: Uuid::nil(),
        patient_id: Uuid::nil(),
        number,
        amount: 207.56,
        due_date: due,
        paid_date: (status == InstallmentStatus::Paid).then_some(due),
        status,
        method: None,
        notes: None,
    };
    Record::new(Uuid::new_v4(), data, Timestamp::UNIX_EPOCH)
}

#[test]
fn search_matches_name_case_insensitively_or_cpf_digits() {
    let patient = Patient {
        name: "Maria Souza".to_string(),
        cpf: Some("12345678909".to_string()),
        ..Patient::default()
    };

    assert!(matches_search(&patient, "souza"));
    assert!(matches_search(&patient, "MARIA"));
    assert!(matches_search(&patient, "456.789"));
    assert!(matches_search(&patient, "  "));
    assert!(!matches_search(&patient, "João"));
    assert!(!matches_search(&patient, "999"));
}

#[test]
fn unpaid_past_due_installments_are_reported_overdue() {
    let rows = vec![
        installment(1, date(2025, 1, 10), InstallmentStatus::Paid),
        installment(2, date(2025, 2, 10), InstallmentStatus::Pending),
        installment(3, date(2025, 3, 10), InstallmentStatus::Pending),
        installment(4, date(2025, 1, 10), InstallmentStatus::Cancelled),
    ];

    let statuses: Vec<_> = with_effective_status(rows, date(2025, 2, 20))
        .into_iter()
        .map(|r| r.data.status)
        .collect();
    assert_eq!(
        statuses,
        [
            InstallmentStatus::Paid,
            InstallmentStatus::Overdue,
            InstallmentStatus::Pending,
            InstallmentStatus::Cancelled,
        ]
    );
}

#[test]
fn plan_completes_once_nothing_is_open() {
    let mut rows = vec![
        installment(1, date(2025, 1, 10), InstallmentStatus::Paid),
        installment(2, date(2025, 2, 10), InstallmentStatus::Pending),
    ];
    assert_eq!(derived_plan_status(PlanStatus::Active, &rows), PlanStatus::Active);

    rows[1].data.status = InstallmentStatus::Paid;
    assert_eq!(derived_plan_status(PlanStatus::Active, &rows), PlanStatus::Completed);

    // A paid installment reopened puts the plan back to active.
    rows[1].data.status = InstallmentStatus::Overdue;
    assert_eq!(derived_plan_status(PlanStatus::Completed, &rows), PlanStatus::Active);
}

#[test]
fn cancelled_plans_stay_cancelled() {
    let rows = vec![installment(1, date(2025, 1, 10), InstallmentStatus::Paid)];
    assert_eq!(
        derived_plan_status(PlanStatus::Cancelled, &rows),
        PlanStatus::Cancelled
    );
}

#[test]
fn plan_with_everything_cancelled_is_not_completed() {
    let rows = vec![installment(1, date(2025, 1, 10), InstallmentStatus::Cancelled)];
    assert_eq!(derived_plan_status(PlanStatus::Active, &rows), PlanStatus::Active);
}

#[test]
fn authorize_url_carries_the_clinic_as_state() {
    let google = GoogleOAuthConfig {
        client_id: "google-client".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: "https://api.example.com/integrations/calendar/callback".to_string(),
    };
    let clinic = Uuid::parse_str("6f1c1a4e-2f7b-4c55-9a0e-1d2b3c4d5e6f").unwrap();

    let url = authorize_url(&google, clinic).unwrap();

    assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(url.contains("state=6f1c1a4e-2f7b-4c55-9a0e-1d2b3c4d5e6f"));
    assert!(url.contains("access_type=offline"));
    assert!(url.contains(
        "redirect_uri=https%3A%2F%2Fapi.example.com%2Fintegrations%2Fcalendar%2Fcallback"
    ));
    assert!(!url.contains("secret"));
}

fn plan(budget_id: Option<Uuid>, status: PlanStatus) -> Record<PaymentPlan> {
    let data = PaymentPlan {
        budget_id,
        patient_id: Uuid::nil(),
        total: 1000.0,
        down_payment: 200.0,
        installments: 4,
        installment_amount: 207.56,
        method: PaymentMethod::Boleto,
        monthly_rate: 0.015,
        total_payable: 1030.24,
        interest_amount: 30.24,
        first_due_date: date(2025, 2, 10),
        status,
        notes: None,
    };
    Record::new(Uuid::nil(), data, Timestamp::UNIX_EPOCH)
}

#[test]
fn a_budget_with_a_live_plan_cannot_be_financed_again() {
    let budget = Uuid::new_v4();
    let plans = vec![
        plan(None, PlanStatus::Active),
        plan(Some(Uuid::new_v4()), PlanStatus::Active),
        plan(Some(budget), PlanStatus::Completed),
    ];

    let found = live_plan_for(&plans, budget, None).unwrap();
    assert_eq!(found.id, plans[2].id);
}

#[test]
fn cancelled_plans_and_the_plan_being_edited_do_not_block() {
    let budget = Uuid::new_v4();
    let plans = vec![
        plan(Some(budget), PlanStatus::Cancelled),
        plan(Some(budget), PlanStatus::Active),
    ];

    assert!(live_plan_for(&plans[..1], budget, None).is_none());
    assert!(live_plan_for(&plans, budget, Some(plans[1].id)).is_none());
    assert!(live_plan_for(&plans, budget, None).is_some());
}
