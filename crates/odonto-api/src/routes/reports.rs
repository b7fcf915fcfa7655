use std::collections::HashMap;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use jiff::civil::Date;
use serde::Deserialize;
use uuid::Uuid;

use odonto_core::models::appointment::Appointment;
use odonto_core::models::dentist::Dentist;
use odonto_core::models::expense::Expense;
use odonto_core::models::installment::Installment;
use odonto_core::models::patient::Patient;
use odonto_core::models::{Document, Record};
use odonto_core::reports::{self, DateRange, ReportSummary};
use odonto_export::csv::{self, ExportKind};
use odonto_storage::records;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Date,
    pub to: Date,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange, ApiError> {
        Ok(DateRange::new(self.from, self.to)?)
    }
}

async fn names<T: Document>(
    state: &AppState,
    clinic_id: Uuid,
    name_of: impl Fn(&T) -> &str,
) -> Result<HashMap<Uuid, String>, ApiError> {
    let rows = records::list::<T>(&state.s3, state.bucket(), clinic_id).await?;
    Ok(rows
        .iter()
        .map(|r| (r.id, name_of(&r.data).to_string()))
        .collect())
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ReportSummary>, ApiError> {
    let range = query.range()?;
    let today = state.today(user.clinic_id).await?;
    let appointments = records::list::<Appointment>(&state.s3, state.bucket(), user.clinic_id).await?;
    let installments = records::list::<Installment>(&state.s3, state.bucket(), user.clinic_id).await?;
    let expenses = records::list::<Expense>(&state.s3, state.bucket(), user.clinic_id).await?;

    let summary = reports::summarize(range, today, &appointments, &installments, &expenses);
    tracing::info!(
        clinic_id = %user.clinic_id,
        from = %range.from,
        to = %range.to,
        revenue = summary.revenue,
        "report summary computed"
    );
    Ok(Json(summary))
}

/// `GET /reports/export/{kind}.csv?from=&to=`.
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(file): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = file
        .strip_suffix(".csv")
        .and_then(ExportKind::from_slug)
        .ok_or_else(ApiError::not_found)?;
    let range = query.range()?;

    let body = match kind {
        ExportKind::Revenue => {
            let installments =
                records::list::<Installment>(&state.s3, state.bucket(), user.clinic_id).await?;
            let patients = names::<Patient>(&state, user.clinic_id, |p| p.name.as_str()).await?;
            csv::revenue_csv(&reports::paid_in_range(&installments, &range), &patients)
        }
        ExportKind::Appointments => {
            let mut appointments: Vec<Record<Appointment>> =
                records::list::<Appointment>(&state.s3, state.bucket(), user.clinic_id).await?;
            appointments.retain(|a| range.contains(a.data.date()));
            appointments.sort_by_key(|a| a.data.starts_at);
            let patients = names::<Patient>(&state, user.clinic_id, |p| p.name.as_str()).await?;
            let dentists = names::<Dentist>(&state, user.clinic_id, |d| d.name.as_str()).await?;
            csv::appointments_csv(&appointments, &patients, &dentists)
        }
        ExportKind::Procedures => {
            let appointments =
                records::list::<Appointment>(&state.s3, state.bucket(), user.clinic_id).await?;
            csv::procedure_counts_csv(&reports::procedure_counts(&appointments, &range))
        }
    };

    tracing::info!(
        clinic_id = %user.clinic_id,
        kind = kind.slug(),
        "csv exported"
    );
    let disposition = format!(
        "attachment; filename=\"{}-{}-{}.csv\"",
        kind.slug(),
        range.from,
        range.to
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
