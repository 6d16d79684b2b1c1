use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use kontakt_core_contact_contracts::{ContactService, ContactSubmitError, ContactValidationError};
use kontakt_models::contact::ContactSubmission;

use super::error;
use crate::{extractors::payload::RawPayload, models::ApiMessage};

const CONFIRMATION: &str = "Tack! Ditt meddelande har skickats och vi återkommer snarast.";
const SEND_FAILED: &str = "Vi kunde inte skicka ditt meddelande just nu. Försök igen senare.";
const MISSING_FIELDS: &str = "Vänligen fyll i namn, efternamn, e-post och meddelande.";
const INVALID_EMAIL: &str = "E-postadressen verkar ogiltig. Kontrollera och försök igen.";
const MESSAGE_TOO_LONG: &str = "Meddelandet är för långt. Försök korta ner det något.";

pub fn router(service: Arc<impl ContactService>) -> Router<()> {
    Router::new()
        .route("/api/contact", routing::post(submit))
        .with_state(service)
}

async fn submit(
    service: State<Arc<impl ContactService>>,
    RawPayload(payload): RawPayload,
) -> Response {
    let submission = ContactSubmission::from_payload(&payload);

    match service.submit(submission).await {
        Ok(()) => Json(ApiMessage {
            message: CONFIRMATION,
        })
        .into_response(),
        Err(ContactSubmitError::Validation(err)) => {
            error(StatusCode::BAD_REQUEST, validation_detail(err))
        }
        Err(ContactSubmitError::Send) => {
            tracing::error!("smtp relay rejected the contact message");
            error(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED)
        }
        Err(ContactSubmitError::Email(err)) => {
            tracing::error!("failed to send contact message: {err:#}");
            error(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED)
        }
    }
}

fn validation_detail(err: ContactValidationError) -> &'static str {
    match err {
        ContactValidationError::MissingFields => MISSING_FIELDS,
        ContactValidationError::InvalidEmail => INVALID_EMAIL,
        ContactValidationError::MessageTooLong => MESSAGE_TOO_LONG,
    }
}
