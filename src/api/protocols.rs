use rocket::serde::json::Json;
use rocket::Route;
use serde::Serialize;

use crate::auth::User;
use crate::error::AppError;
use crate::protocol::{Phase, Protocol, ProtocolSummary};

#[derive(Debug, Serialize)]
pub struct CalculationResponse {
    #[serde(flatten)]
    pub summary: ProtocolSummary,
    pub phases: Vec<Phase>,
}

#[post("/protocols/calculate", data = "<protocol>")]
pub async fn api_calculate_protocol(
    protocol: Json<Protocol>,
    user: User,
) -> Result<Json<CalculationResponse>, AppError> {
    let protocol = protocol.into_inner();
    let summary = protocol.summary()?;

    tracing::debug!(
        user_id = user.id,
        protocol = %summary.protocol,
        total_seconds = summary.total_seconds,
        "Protocol calculated"
    );

    Ok(Json(CalculationResponse {
        summary,
        phases: protocol.phases()?,
    }))
}

pub fn routes() -> Vec<Route> {
    routes![api_calculate_protocol]
}
