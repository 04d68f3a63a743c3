//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto;
use super::handlers::{auth, entries, events, prizes, system};
use crate::domain::{EventDraft, EventStatus, PrizeDraft};
use crate::error::{ErrorBody, ErrorResponse};

/// Path of the served OpenAPI JSON document.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// The generated OpenAPI document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "giveaway-admin",
        description = "Admin back end for the prize-giveaway platform: events, prizes and the live user-entry table."
    ),
    paths(
        auth::login,
        auth::logout,
        auth::me,
        events::list_events,
        events::create_event,
        events::get_event,
        events::update_event,
        events::delete_event,
        prizes::list_prizes,
        prizes::create_prize,
        prizes::update_prize,
        prizes::delete_prize,
        entries::list_entries,
        entries::export_entries,
        system::health_handler,
    ),
    components(schemas(
        dto::AdminDto,
        dto::LoginRequest,
        dto::EventDto,
        dto::EventForm,
        dto::EventListResponse,
        dto::EventPayload,
        dto::EventSavedResponse,
        dto::EventSummaryDto,
        dto::PrizeDto,
        dto::UserEntryDto,
        dto::EntriesPageResponse,
        dto::PaginationMeta,
        EventDraft,
        EventStatus,
        PrizeDraft,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    tags(
        (name = "Auth", description = "Admin sessions"),
        (name = "Events", description = "Giveaway events"),
        (name = "Prizes", description = "Prizes per event"),
        (name = "Entries", description = "User registrations"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/swagger-ui`, serving [`ApiDoc`].
#[cfg(feature = "swagger-ui")]
#[must_use]
pub fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_JSON_PATH, ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/v1/auth/login",
            "/api/v1/events",
            "/api/v1/events/{id}",
            "/api/v1/events/{id}/prizes",
            "/api/v1/prizes/{id}",
            "/api/v1/entries",
            "/api/v1/entries/export",
            "/health",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
