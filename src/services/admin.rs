//! Operator authentication gate
//!
//! The real identity/session system lives elsewhere; the API only needs a
//! yes/no. Admin requests carry `Authorization: Bearer <ADMIN_API_TOKEN>`.
//! With no token configured the admin surface stays closed.

use axum::http::{HeaderMap, header};

use crate::services::tokens;

#[derive(Clone)]
pub struct AdminGate {
    token: Option<String>,
}

impl AdminGate {
    pub fn new(token: Option<String>) -> Self {
        AdminGate {
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn from_env() -> Self {
        let gate = AdminGate::new(std::env::var("ADMIN_API_TOKEN").ok());
        if gate.token.is_none() {
            tracing::warn!("ADMIN_API_TOKEN not set, admin endpoints are disabled");
        }
        gate
    }

    pub fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.token else {
            return false;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|supplied| tokens::token_matches(supplied, expected))
    }
}
