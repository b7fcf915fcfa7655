use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use jiff::Timestamp;
use jiff::civil::Date;
use serde::Deserialize;
use uuid::Uuid;

use odonto_core::installments::PaymentMethod;
use odonto_core::models::installment::{Installment, InstallmentEdit, InstallmentStatus};
use odonto_core::models::payment_plan::{PaymentPlan, PlanStatus};
use odonto_core::models::{Document, Record};
use odonto_storage::records;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Report overdue for unpaid installments past due. Stored status is not
/// touched; the derivation depends on the day the request is made.
pub fn with_effective_status(rows: Vec<Record<Installment>>, today: Date) -> Vec<Record<Installment>> {
    rows.into_iter()
        .map(|mut r| {
            r.data.status = r.data.effective_status(today);
            r
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct InstallmentQuery {
    pub plan_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<InstallmentStatus>,
    /// Inclusive due-date bounds.
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl InstallmentQuery {
    fn matches(&self, installment: &Installment) -> bool {
        self.plan_id.is_none_or(|p| installment.plan_id == p)
            && self.patient_id.is_none_or(|p| installment.patient_id == p)
            && self.status.is_none_or(|s| installment.status == s)
            && self.from.is_none_or(|d| installment.due_date >= d)
            && self.to.is_none_or(|d| installment.due_date <= d)
    }
}

/// Installments by due date. `status` filters on the derived status, so
/// `?status=overdue` finds late payments.
pub async fn list_installments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<InstallmentQuery>,
) -> Result<Json<Vec<Record<Installment>>>, ApiError> {
    let today = state.today(user.clinic_id).await?;
    let all = records::list::<Installment>(&state.s3, state.bucket(), user.clinic_id).await?;
    let mut rows: Vec<_> = with_effective_status(all, today)
        .into_iter()
        .filter(|r| query.matches(&r.data))
        .collect();
    rows.sort_by_key(|r| (r.data.due_date, r.data.number));
    Ok(Json(rows))
}

pub async fn get_installment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Record<Installment>>, ApiError> {
    let today = state.today(user.clinic_id).await?;
    let mut record = records::get::<Installment>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    record.data.status = record.data.effective_status(today);
    Ok(Json(record))
}

/// Change the due date, method or notes. Amount and status are not editable
/// here, so the plan's status is unaffected.
pub async fn update_installment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(edit): Json<InstallmentEdit>,
) -> Result<Json<Record<Installment>>, ApiError> {
    let today = state.today(user.clinic_id).await?;
    let mut record = records::get::<Installment>(&state.s3, state.bucket(), user.clinic_id, id).await?;

    edit.apply(&mut record.data);
    record.data.prepare(today)?;
    record.updated_at = Timestamp::now();
    records::put(&state.s3, state.bucket(), &record).await?;
    tracing::info!(clinic_id = %user.clinic_id, installment_id = %id, "installment updated");

    record.data.status = record.data.effective_status(today);
    Ok(Json(record))
}

#[derive(Debug, Default, Deserialize)]
pub struct PayRequest {
    /// Defaults to the clinic's today.
    pub paid_date: Option<Date>,
    pub method: Option<PaymentMethod>,
}

pub async fn pay_installment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<PayRequest>,
) -> Result<Json<Record<Installment>>, ApiError> {
    let today = state.today(user.clinic_id).await?;
    let mut record = records::get::<Installment>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    if !record.data.is_open() {
        return Err(ApiError::invalid("status", "Parcela já quitada ou cancelada."));
    }
    let paid_date = request.paid_date.unwrap_or(today);
    if paid_date > today {
        return Err(ApiError::invalid("paid_date", "Data de pagamento no futuro."));
    }

    record.data.mark_paid(paid_date, request.method);
    record.updated_at = Timestamp::now();
    records::put(&state.s3, state.bucket(), &record).await?;
    tracing::info!(
        clinic_id = %user.clinic_id,
        installment_id = %id,
        plan_id = %record.data.plan_id,
        amount = record.data.amount,
        "installment paid"
    );

    sync_plan_status(&state, user.clinic_id, record.data.plan_id).await?;
    Ok(Json(record))
}

pub async fn reopen_installment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Record<Installment>>, ApiError> {
    let today = state.today(user.clinic_id).await?;
    let mut record = records::get::<Installment>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    if record.data.is_open() {
        return Err(ApiError::invalid("status", "Parcela já está em aberto."));
    }

    record.data.reopen(today);
    record.updated_at = Timestamp::now();
    records::put(&state.s3, state.bucket(), &record).await?;
    tracing::info!(clinic_id = %user.clinic_id, installment_id = %id, "installment reopened");

    sync_plan_status(&state, user.clinic_id, record.data.plan_id).await?;
    Ok(Json(record))
}

pub async fn cancel_installment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Record<Installment>>, ApiError> {
    let mut record = records::get::<Installment>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    if record.data.status == InstallmentStatus::Paid {
        return Err(ApiError::invalid("status", "Reabra a parcela antes de cancelar."));
    }

    record.data.cancel();
    record.updated_at = Timestamp::now();
    records::put(&state.s3, state.bucket(), &record).await?;
    tracing::info!(clinic_id = %user.clinic_id, installment_id = %id, "installment cancelled");

    sync_plan_status(&state, user.clinic_id, record.data.plan_id).await?;
    Ok(Json(record))
}

/// What a plan's status should be given its installments. Cancelled plans
/// stay cancelled.
pub fn derived_plan_status(current: PlanStatus, installments: &[Record<Installment>]) -> PlanStatus {
    if current == PlanStatus::Cancelled {
        return current;
    }
    let any_paid = installments
        .iter()
        .any(|i| i.data.status == InstallmentStatus::Paid);
    let any_open = installments.iter().any(|i| i.data.is_open());
    if any_paid && !any_open {
        PlanStatus::Completed
    } else {
        PlanStatus::Active
    }
}

/// Mark the plan completed once nothing is left to pay, or active again
/// after a reopen.
async fn sync_plan_status(state: &AppState, clinic_id: Uuid, plan_id: Uuid) -> Result<(), ApiError> {
    let mut plan = match records::get::<PaymentPlan>(&state.s3, state.bucket(), clinic_id, plan_id).await {
        Ok(plan) => plan,
        Err(odonto_storage::error::StorageError::NotFound { .. }) => {
            tracing::warn!(clinic_id = %clinic_id, plan_id = %plan_id, "installment references a missing plan");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut installments = records::list::<Installment>(&state.s3, state.bucket(), clinic_id).await?;
    installments.retain(|i| i.data.plan_id == plan_id);

    let status = derived_plan_status(plan.data.status, &installments);
    if status != plan.data.status {
        plan.data.status = status;
        plan.updated_at = Timestamp::now();
        records::put(&state.s3, state.bucket(), &plan).await?;
        tracing::info!(clinic_id = %clinic_id, plan_id = %plan_id, status = ?status, "plan status changed");
    }
    Ok(())
}
