//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, items, reservations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Booklend API",
        version = "0.1.0",
        description = "Book reservation and inventory REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Items
        items::list_items,
        items::get_item,
        // Reservations
        reservations::list_reservations,
        reservations::create_reservation,
        reservations::return_reservations,
    ),
    components(
        schemas(
            // Items
            crate::models::item::Item,
            crate::models::item::AvailabilityStatus,
            crate::models::item::ItemQuery,
            items::ItemPage,
            // Reservations
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanStatus,
            crate::models::loan::ReturnReport,
            crate::models::loan::ReturnedLoan,
            crate::models::loan::FailedReturn,
            crate::models::loan::ReturnFailureReason,
            reservations::CreateReservationRequest,
            reservations::ReturnRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "items", description = "Catalog browsing"),
        (name = "reservations", description = "Reserve and return books")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
