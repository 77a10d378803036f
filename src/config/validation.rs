//! Mock file validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every route template compiles
//! - Check that every method name is a valid HTTP method token
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MockFile → Result<(), Vec<ValidationError>>
//! - Response values are not checked here; a bad one surfaces only when
//!   its target is selected

use std::fmt;

use axum::http::Method;

use crate::config::schema::MockFile;
use crate::routing::PathPattern;

/// A single validation problem, located by mock and target index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub mock: usize,
    pub target: Option<usize>,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(target) => write!(f, "mocks[{}].targets[{}]: {}", self.mock, target, self.message),
            None => write!(f, "mocks[{}]: {}", self.mock, self.message),
        }
    }
}

/// Validate a parsed mock file.
pub fn validate_mock_file(file: &MockFile) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (i, mock) in file.mocks.iter().enumerate() {
        if mock.route.trim().is_empty() {
            errors.push(ValidationError {
                mock: i,
                target: None,
                message: "route is empty".to_string(),
            });
        } else if let Err(e) = PathPattern::compile(&mock.route) {
            errors.push(ValidationError {
                mock: i,
                target: None,
                message: format!("route '{}': {}", mock.route, e),
            });
        }

        for (j, target) in mock.targets.iter().enumerate() {
            let Some(method) = target.request.as_ref().and_then(|r| r.method.as_ref()) else {
                continue;
            };
            for name in method.to_vec() {
                if Method::from_bytes(name.as_bytes()).is_err() {
                    errors.push(ValidationError {
                        mock: i,
                        target: Some(j),
                        message: format!("invalid method '{}'", name),
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
