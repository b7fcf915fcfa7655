use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use jiff::Timestamp;
use jiff::civil::Date;
use serde::Deserialize;
use uuid::Uuid;

use odonto_core::installments::{PaymentMethod, QuoteRequest};
use odonto_core::models::Record;
use odonto_core::models::budget::{Budget, BudgetStatus};
use odonto_core::models::dentist::Dentist;
use odonto_core::models::payment_plan::PaymentPlanRequest;
use odonto_export::budget::{BudgetPrint, render_budget_html};
use odonto_storage::records;

use super::crud;
use super::payment_plans::{
    PlanWithInstallments, create_plan_with_installments, ensure_budget_unplanned,
};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

async fn check_refs(state: &AppState, clinic_id: Uuid, budget: &Budget) -> Result<(), ApiError> {
    crud::require_patient(state, clinic_id, budget.patient_id).await?;
    if let Some(dentist_id) = budget.dentist_id {
        crud::require_ref::<Dentist>(state, clinic_id, "dentist_id", dentist_id).await?;
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    pub patient_id: Option<Uuid>,
    pub status: Option<BudgetStatus>,
}

pub async fn list_budgets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<Vec<Record<Budget>>>, ApiError> {
    let mut budgets = records::list::<Budget>(&state.s3, state.bucket(), user.clinic_id).await?;
    budgets.retain(|b| {
        query.patient_id.is_none_or(|id| b.data.patient_id == id)
            && query.status.is_none_or(|s| b.data.status == s)
    });
    Ok(Json(budgets))
}

pub async fn create_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut budget): Json<Budget>,
) -> Result<Json<Record<Budget>>, ApiError> {
    crud::prepare(&state, user.clinic_id, &mut budget).await?;
    check_refs(&state, user.clinic_id, &budget).await?;
    let record = records::insert(&state.s3, state.bucket(), user.clinic_id, budget).await?;

    tracing::info!(
        clinic_id = %user.clinic_id,
        budget_id = %record.id,
        patient_id = %record.data.patient_id,
        total = record.data.total,
        "budget created"
    );
    Ok(Json(record))
}

pub async fn update_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(mut budget): Json<Budget>,
) -> Result<Json<Record<Budget>>, ApiError> {
    let mut record = records::get::<Budget>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    crud::prepare(&state, user.clinic_id, &mut budget).await?;
    check_refs(&state, user.clinic_id, &budget).await?;
    record.replace(budget, Timestamp::now());
    records::put(&state.s3, state.bucket(), &record).await?;

    tracing::info!(clinic_id = %user.clinic_id, budget_id = %id, total = record.data.total, "budget updated");
    Ok(Json(record))
}

pub async fn print_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let budget = records::get::<Budget>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    let patient = crud::require_patient(&state, user.clinic_id, budget.data.patient_id).await?;
    let dentist = match budget.data.dentist_id {
        Some(dentist_id) => {
            Some(records::get::<Dentist>(&state.s3, state.bucket(), user.clinic_id, dentist_id).await?)
        }
        None => None,
    };

    let settings = state.settings(user.clinic_id).await?;
    let print = BudgetPrint::build(
        &settings,
        &patient.data,
        dentist.as_ref().map(|d| d.data.name.as_str()),
        &budget.data,
        settings.today(Timestamp::now()),
    );
    let html = render_budget_html(&print)?;
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html))
}

/// Terms for turning an approved budget into a plan; the total comes from
/// the budget.
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    #[serde(default)]
    pub down_payment: f64,
    pub installments: u32,
    pub method: PaymentMethod,
    pub first_due_date: Date,
    pub notes: Option<String>,
}

/// Approve the budget and create its payment plan and installments.
///
/// The writes are sequential and independent: budget, then plan, then each
/// installment. A later failure leaves the earlier writes in place.
pub async fn approve_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<PlanWithInstallments>, ApiError> {
    let mut budget = records::get::<Budget>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    if budget.data.status == BudgetStatus::Rejected {
        return Err(ApiError::invalid("status", "Orçamento recusado."));
    }
    ensure_budget_unplanned(&state, user.clinic_id, id, None).await?;

    let plan_request = PaymentPlanRequest {
        patient_id: budget.data.patient_id,
        budget_id: Some(budget.id),
        quote: QuoteRequest {
            total: budget.data.total,
            down_payment: request.down_payment,
            installments: request.installments,
            method: request.method,
        },
        first_due_date: request.first_due_date,
        notes: request.notes,
    };
    // Validate the terms before the budget is touched.
    let settings = state.settings(user.clinic_id).await?;
    odonto_core::installments::quote(&plan_request.quote, &settings.interest_rates)?;

    budget.data.status = BudgetStatus::Approved;
    budget.updated_at = Timestamp::now();
    records::put(&state.s3, state.bucket(), &budget).await?;
    tracing::info!(clinic_id = %user.clinic_id, budget_id = %id, "budget approved");

    match create_plan_with_installments(&state, user.clinic_id, &plan_request).await {
        Ok(created) => Ok(Json(created)),
        Err(e) => {
            tracing::warn!(
                clinic_id = %user.clinic_id,
                budget_id = %id,
                "budget approved but payment plan creation failed"
            );
            Err(e)
        }
    }
}
