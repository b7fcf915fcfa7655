use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use jiff::{Timestamp, ToSpan};
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use odonto_core::installments::{self, Quote, QuoteRequest, ScheduledInstallment};
use odonto_core::models::Record;
use odonto_core::models::budget::Budget;
use odonto_core::models::installment::{Installment, InstallmentStatus};
use odonto_core::models::patient::Patient;
use odonto_core::models::payment_plan::{PaymentPlan, PaymentPlanRequest, PlanStatus};
use odonto_export::contract::{ContractData, render_contract_docx, render_contract_html};
use odonto_export::styles::DocumentStyles;
use odonto_storage::records;

use super::crud;
use super::installments::with_effective_status;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Serialize)]
pub struct PlanWithInstallments {
    pub plan: Record<PaymentPlan>,
    pub installments: Vec<Record<Installment>>,
}

/// Installments belonging to `plan_id`, in order.
pub async fn plan_installments(
    state: &AppState,
    clinic_id: Uuid,
    plan_id: Uuid,
) -> Result<Vec<Record<Installment>>, ApiError> {
    let mut rows = records::list::<Installment>(&state.s3, state.bucket(), clinic_id).await?;
    rows.retain(|i| i.data.plan_id == plan_id);
    rows.sort_by_key(|i| i.data.number);
    Ok(rows)
}

/// Write the installment rows for a stored plan, one object each. Nothing is
/// rolled back: a failure part-way leaves the rows already written, and the
/// ids are logged so the plan can be repaired.
async fn write_installments(
    state: &AppState,
    plan: &Record<PaymentPlan>,
) -> Result<Vec<Record<Installment>>, ApiError> {
    let rows = plan.data.installment_rows(plan.id)?;
    let mut written = Vec::with_capacity(rows.len());
    for row in rows {
        match records::insert(&state.s3, state.bucket(), plan.clinic_id, row).await {
            Ok(record) => written.push(record),
            Err(e) => {
                let ids: Vec<String> = written.iter().map(|r| r.id.to_string()).collect();
                tracing::warn!(
                    clinic_id = %plan.clinic_id,
                    plan_id = %plan.id,
                    written = ?ids,
                    error = %e,
                    "installment write failed; plan left partially scheduled"
                );
                return Err(e.into());
            }
        }
    }
    Ok(written)
}

/// Quote with the clinic's rates, then store the plan and its installments.
pub async fn create_plan_with_installments(
    state: &AppState,
    clinic_id: Uuid,
    request: &PaymentPlanRequest,
) -> Result<PlanWithInstallments, ApiError> {
    let settings = state.settings(clinic_id).await?;
    let quote = installments::quote(&request.quote, &settings.interest_rates)?;

    let mut plan = PaymentPlan::from_quote(request, &quote);
    crud::prepare(state, clinic_id, &mut plan).await?;
    let plan = records::insert(&state.s3, state.bucket(), clinic_id, plan).await?;
    tracing::info!(
        clinic_id = %clinic_id,
        plan_id = %plan.id,
        patient_id = %plan.data.patient_id,
        installments = plan.data.installments,
        installment_amount = plan.data.installment_amount,
        total_payable = plan.data.total_payable,
        "payment plan created"
    );

    let installments = write_installments(state, &plan).await?;
    Ok(PlanWithInstallments { plan, installments })
}

/// The plan, other than `except`, that already finances `budget_id`.
/// Cancelled plans don't count, so a budget can be financed again after one.
pub fn live_plan_for(
    plans: &[Record<PaymentPlan>],
    budget_id: Uuid,
    except: Option<Uuid>,
) -> Option<&Record<PaymentPlan>> {
    plans.iter().find(|p| {
        p.data.budget_id == Some(budget_id)
            && p.data.status != PlanStatus::Cancelled
            && Some(p.id) != except
    })
}

/// Reject a second live plan for the same budget.
pub async fn ensure_budget_unplanned(
    state: &AppState,
    clinic_id: Uuid,
    budget_id: Uuid,
    except: Option<Uuid>,
) -> Result<(), ApiError> {
    let plans = records::list::<PaymentPlan>(&state.s3, state.bucket(), clinic_id).await?;
    match live_plan_for(&plans, budget_id, except) {
        Some(existing) => {
            tracing::info!(
                clinic_id = %clinic_id,
                budget_id = %budget_id,
                plan_id = %existing.id,
                "budget already has a payment plan"
            );
            Err(ApiError::invalid("budget_id", "Orçamento já possui plano de pagamento."))
        }
        None => Ok(()),
    }
}

async fn check_refs(
    state: &AppState,
    clinic_id: Uuid,
    request: &PaymentPlanRequest,
    plan_id: Option<Uuid>,
) -> Result<(), ApiError> {
    crud::require_patient(state, clinic_id, request.patient_id).await?;
    if let Some(budget_id) = request.budget_id {
        let budget = crud::require_ref::<Budget>(state, clinic_id, "budget_id", budget_id).await?;
        if budget.data.patient_id != request.patient_id {
            return Err(ApiError::invalid("budget_id", "Orçamento de outro paciente."));
        }
        ensure_budget_unplanned(state, clinic_id, budget_id, plan_id).await?;
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanQuery {
    pub patient_id: Option<Uuid>,
    pub status: Option<PlanStatus>,
}

pub async fn list_payment_plans(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<Vec<Record<PaymentPlan>>>, ApiError> {
    let mut plans = records::list::<PaymentPlan>(&state.s3, state.bucket(), user.clinic_id).await?;
    plans.retain(|p| {
        query.patient_id.is_none_or(|id| p.data.patient_id == id)
            && query.status.is_none_or(|s| p.data.status == s)
    });
    Ok(Json(plans))
}

pub async fn get_payment_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanWithInstallments>, ApiError> {
    let plan = records::get::<PaymentPlan>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    let today = state.today(user.clinic_id).await?;
    let installments = plan_installments(&state, user.clinic_id, id).await?;
    Ok(Json(PlanWithInstallments {
        plan,
        installments: with_effective_status(installments, today),
    }))
}

pub async fn create_payment_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<PaymentPlanRequest>,
) -> Result<Json<PlanWithInstallments>, ApiError> {
    check_refs(&state, user.clinic_id, &request, None).await?;
    let created = create_plan_with_installments(&state, user.clinic_id, &request).await?;
    Ok(Json(created))
}

/// Re-quote a plan. Allowed only while nothing has been paid; the old
/// installments are replaced by a fresh schedule.
pub async fn update_payment_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<PaymentPlanRequest>,
) -> Result<Json<PlanWithInstallments>, ApiError> {
    let mut plan = records::get::<PaymentPlan>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    let existing = plan_installments(&state, user.clinic_id, id).await?;
    if existing.iter().any(|i| i.data.status == InstallmentStatus::Paid) {
        return Err(ApiError::invalid(
            "installments",
            "Plano com parcelas pagas não pode ser alterado.",
        ));
    }
    check_refs(&state, user.clinic_id, &request, Some(id)).await?;

    let settings = state.settings(user.clinic_id).await?;
    let quote = installments::quote(&request.quote, &settings.interest_rates)?;
    let mut data = PaymentPlan::from_quote(&request, &quote);
    data.status = plan.data.status;
    crud::prepare(&state, user.clinic_id, &mut data).await?;

    for row in &existing {
        records::delete::<Installment>(&state.s3, state.bucket(), user.clinic_id, row.id).await?;
    }
    plan.replace(data, Timestamp::now());
    records::put(&state.s3, state.bucket(), &plan).await?;
    tracing::info!(
        clinic_id = %user.clinic_id,
        plan_id = %id,
        replaced = existing.len(),
        installments = plan.data.installments,
        "payment plan re-quoted"
    );

    let installments = write_installments(&state, &plan).await?;
    Ok(Json(PlanWithInstallments { plan, installments }))
}

/// Delete the plan and its installments.
pub async fn delete_payment_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, ApiError> {
    let installments = plan_installments(&state, user.clinic_id, id).await?;
    records::delete::<PaymentPlan>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    for row in &installments {
        records::delete::<Installment>(&state.s3, state.bucket(), user.clinic_id, row.id).await?;
    }
    tracing::info!(
        clinic_id = %user.clinic_id,
        plan_id = %id,
        installments = installments.len(),
        "payment plan deleted"
    );
    Ok(Json(()))
}

/// Cancel a plan: its open installments are cancelled, paid ones are kept.
pub async fn cancel_payment_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanWithInstallments>, ApiError> {
    let mut plan = records::get::<PaymentPlan>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    let now = Timestamp::now();
    let mut installments = plan_installments(&state, user.clinic_id, id).await?;
    let mut cancelled = 0;
    for row in installments.iter_mut().filter(|i| i.data.is_open()) {
        row.data.cancel();
        row.updated_at = now;
        records::put(&state.s3, state.bucket(), row).await?;
        cancelled += 1;
    }

    plan.data.status = PlanStatus::Cancelled;
    plan.updated_at = now;
    records::put(&state.s3, state.bucket(), &plan).await?;
    tracing::info!(clinic_id = %user.clinic_id, plan_id = %id, cancelled, "payment plan cancelled");

    Ok(Json(PlanWithInstallments { plan, installments }))
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(flatten)]
    pub quote: QuoteRequest,
    /// Defaults to one month from the clinic's today.
    pub first_due_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct Preview {
    pub quote: Quote,
    pub schedule: Vec<ScheduledInstallment>,
}

/// Quote and schedule without writing anything.
pub async fn preview_payment_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<Preview>, ApiError> {
    let settings = state.settings(user.clinic_id).await?;
    let quote = installments::quote(&request.quote, &settings.interest_rates)?;
    let first_due = match request.first_due_date {
        Some(date) => date,
        None => settings
            .today(Timestamp::now())
            .checked_add(1.month())?,
    };
    let schedule = installments::schedule(&quote, first_due)?;
    Ok(Json(Preview { quote, schedule }))
}

async fn contract_data(state: &AppState, clinic_id: Uuid, id: Uuid) -> Result<ContractData, ApiError> {
    let plan = records::get::<PaymentPlan>(&state.s3, state.bucket(), clinic_id, id).await?;
    let patient = records::get::<Patient>(&state.s3, state.bucket(), clinic_id, plan.data.patient_id).await?;
    let budget = match plan.data.budget_id {
        Some(budget_id) => Some(records::get::<Budget>(&state.s3, state.bucket(), clinic_id, budget_id).await?),
        None => None,
    };
    let installments: Vec<Installment> = plan_installments(state, clinic_id, id)
        .await?
        .into_iter()
        .map(|r| r.data)
        .collect();

    let settings = state.settings(clinic_id).await?;
    let issued_on = settings.today(Timestamp::now());
    Ok(ContractData::build(
        &settings,
        &patient.data,
        budget.as_ref().map(|b| &b.data),
        &plan.data,
        &installments,
        issued_on,
    ))
}

pub async fn contract_html(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let data = contract_data(&state, user.clinic_id, id).await?;
    let html = render_contract_html(&data)?;
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html))
}

pub async fn contract_docx(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let data = contract_data(&state, user.clinic_id, id).await?;
    let bytes = render_contract_docx(&data, &DocumentStyles::default())?;
    let disposition = format!("attachment; filename=\"contrato-{id}.docx\"");
    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
