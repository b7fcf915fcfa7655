use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use super::auth::AuthUser;

/// Audit logging middleware.
///
/// Logs every API request as a structured `api_request` event. The clinic is
/// included when the auth layer accepted the request.
pub async fn audit_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let clinic_id = response
        .extensions()
        .get::<AuthUser>()
        .map(|u| u.clinic_id.to_string());
    tracing::info!(
        method = %method,
        path = %path,
        status = status,
        clinic_id = clinic_id.as_deref(),
        "api_request"
    );

    response
}
