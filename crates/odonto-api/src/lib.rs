//! odonto-api
//!
//! HTTP surface of the clinic backend: an axum router served from Lambda.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{delete, get, post, put};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use odonto_core::models::appointment::Appointment;
use odonto_core::models::budget::Budget;
use odonto_core::models::dentist::Dentist;
use odonto_core::models::employee::Employee;
use odonto_core::models::expense::Expense;
use odonto_core::models::installment::Installment;
use odonto_core::models::patient::Patient;
use odonto_core::models::procedure::Procedure;
use odonto_core::models::schedule_block::ScheduleBlock;

use crate::routes::*;
use crate::state::AppState;

/// Build the full application: public routes, bearer-protected routes, then
/// the audit log and CORS around everything.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        // Health (no auth)
        .route("/health", get(health::health_check))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/confirm", post(auth::confirm))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/sign-out", post(auth::sign_out))
        // Google redirects the browser here without our token
        .route(
            "/integrations/calendar/callback",
            get(integrations::calendar_callback),
        );

    let protected = Router::new()
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/patients/{id}",
            get(crud::get::<Patient>)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/patients/{id}/appointments",
            get(patients::patient_appointments),
        )
        .route("/patients/{id}/budgets", get(patients::patient_budgets))
        .route(
            "/patients/{id}/payment-plans",
            get(patients::patient_payment_plans),
        )
        .route(
            "/patients/{id}/installments",
            get(patients::patient_installments),
        )
        .route(
            "/patients/{id}/files",
            get(files::list_files).post(files::create_file),
        )
        .route(
            "/patients/{id}/files/{file_id}",
            delete(files::delete_file),
        )
        .route(
            "/patients/{id}/files/{file_id}/download-url",
            get(files::download_url),
        )
        .route(
            "/dentists",
            get(dentists::list_dentists).post(dentists::create_dentist),
        )
        .route(
            "/dentists/{id}",
            get(crud::get::<Dentist>)
                .put(dentists::update_dentist)
                .delete(dentists::delete_dentist),
        )
        .route(
            "/procedures",
            get(procedures::list_procedures).post(crud::create::<Procedure>),
        )
        .route(
            "/procedures/{id}",
            get(crud::get::<Procedure>)
                .put(crud::update::<Procedure>)
                .delete(crud::delete::<Procedure>),
        )
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(crud::get::<Appointment>)
                .put(appointments::update_appointment)
                .delete(crud::delete::<Appointment>),
        )
        .route(
            "/appointments/{id}/status",
            put(appointments::update_appointment_status),
        )
        .route(
            "/budgets",
            get(budgets::list_budgets).post(budgets::create_budget),
        )
        .route(
            "/budgets/{id}",
            get(crud::get::<Budget>)
                .put(budgets::update_budget)
                .delete(crud::delete::<Budget>),
        )
        .route("/budgets/{id}/print.html", get(budgets::print_budget))
        .route("/budgets/{id}/payment-plan", post(budgets::approve_budget))
        .route(
            "/payment-plans",
            get(payment_plans::list_payment_plans).post(payment_plans::create_payment_plan),
        )
        .route(
            "/payment-plans/preview",
            post(payment_plans::preview_payment_plan),
        )
        .route(
            "/payment-plans/{id}",
            get(payment_plans::get_payment_plan)
                .put(payment_plans::update_payment_plan)
                .delete(payment_plans::delete_payment_plan),
        )
        .route(
            "/payment-plans/{id}/cancel",
            post(payment_plans::cancel_payment_plan),
        )
        .route(
            "/payment-plans/{id}/contract.html",
            get(payment_plans::contract_html),
        )
        .route(
            "/payment-plans/{id}/contract.docx",
            get(payment_plans::contract_docx),
        )
        .route("/installments", get(installments::list_installments))
        .route(
            "/installments/{id}",
            get(installments::get_installment)
                .put(installments::update_installment)
                .delete(crud::delete::<Installment>),
        )
        .route("/installments/{id}/pay", post(installments::pay_installment))
        .route(
            "/installments/{id}/reopen",
            post(installments::reopen_installment),
        )
        .route(
            "/installments/{id}/cancel",
            post(installments::cancel_installment),
        )
        .route(
            "/schedule-blocks",
            get(crud::list::<ScheduleBlock>).post(crud::create::<ScheduleBlock>),
        )
        .route(
            "/schedule-blocks/{id}",
            get(crud::get::<ScheduleBlock>)
                .put(crud::update::<ScheduleBlock>)
                .delete(crud::delete::<ScheduleBlock>),
        )
        .route(
            "/expenses",
            get(crud::list::<Expense>).post(crud::create::<Expense>),
        )
        .route(
            "/expenses/{id}",
            get(crud::get::<Expense>)
                .put(crud::update::<Expense>)
                .delete(crud::delete::<Expense>),
        )
        .route(
            "/employees",
            get(crud::list::<Employee>).post(crud::create::<Employee>),
        )
        .route(
            "/employees/{id}",
            get(crud::get::<Employee>)
                .put(crud::update::<Employee>)
                .delete(crud::delete::<Employee>),
        )
        .route("/agenda", get(agenda::get_agenda))
        .route("/reports/summary", get(reports::summary))
        .route("/reports/export/{file}", get(reports::export_csv))
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/integrations/calendar",
            get(integrations::calendar_status),
        )
        .route(
            "/integrations/calendar/authorize-url",
            get(integrations::get_authorize_url),
        )
        .route("/billing/portal", post(billing::create_portal_session))
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(axum_mw::from_fn(middleware::audit::audit_log)),
        )
        .with_state(state)
}
