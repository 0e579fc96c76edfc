use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::auth::AuthenticatedPrincipal;

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl From<&AuthenticatedPrincipal> for MeResponse {
    fn from(principal: &AuthenticatedPrincipal) -> Self {
        Self {
            id: principal.user().id,
            username: principal.username().to_owned(),
            roles: principal.roles().iter().cloned().collect(),
        }
    }
}
