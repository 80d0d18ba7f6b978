use crate::{
    AppState,
    mail::{ContactEmail, ContactSubmission, contact::Branding},
    types::{AppError, ContactRequest, ContactResponse, ErrorResponse, Result},
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Utc;

/// Relay a contact-form submission by email
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Email sent", body = ContactResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 413, description = "Body over the configured limit", body = ErrorResponse),
        (status = 500, description = "Mail not configured or delivery failed", body = ErrorResponse)
    ),
    tag = "contact"
)]
pub async fn contact(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>> {
    let Json(request) = payload.map_err(AppError::from)?;
    let submission = ContactSubmission::try_from(request)?;

    let Some(mailer) = state.mailer.as_ref() else {
        tracing::error!("Contact submission received but mail credentials are missing");
        return Err(AppError::Configuration(
            "Email configuration is missing. Please check environment variables.".to_string(),
        ));
    };

    let config = state.config_manager.config();
    let email = ContactEmail::compose(&submission, &Branding::from(&config.mail), Utc::now())
        .map_err(|e| {
            tracing::error!("Error rendering contact email: {}", e);
            AppError::from(e)
        })?;

    tracing::info!(
        has_company = submission.company.is_some(),
        message_len = submission.message.len(),
        "Sending contact submission via {}",
        mailer.describe()
    );

    mailer.send(&email).await.map_err(|e| {
        tracing::error!("Error sending contact email: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(ContactResponse {
        message: "Email sent successfully!".to_string(),
    }))
}
