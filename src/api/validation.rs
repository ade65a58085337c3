//! Field validation for request bodies.
//!
//! The gate runs after envelope decryption and before any business logic,
//! so handlers only ever see well-formed plaintext input. Failures collect
//! every broken rule into one 400 with the messages joined by `. `.

use crate::types::{
    AppError, CreateTaskRequest, LoginRequest, RegisterRequest, Result, TaskStatus,
    UpdateTaskRequest,
};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email regex"));

const STATUS_MESSAGE: &str = "Status must be todo, in-progress, or done";

/// A registration payload that passed every rule; email is normalized to
/// lowercase and name is trimmed.
#[derive(Debug)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct ValidNewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

#[derive(Debug)]
pub struct ValidTaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

pub fn validate_register(req: &RegisterRequest) -> Result<ValidRegistration> {
    let mut errors = Vec::new();

    let name = req.name.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() {
        errors.push("Name is required".to_string());
    } else if !(2..=50).contains(&name.chars().count()) {
        errors.push("Name must be 2-50 characters".to_string());
    }

    let email = normalize_email(req.email.as_deref(), &mut errors);

    let password = req.password.clone().unwrap_or_default();
    if password.is_empty() {
        errors.push("Password is required".to_string());
    } else if password.chars().count() < 6 {
        errors.push("Password must be at least 6 characters".to_string());
    }

    if errors.is_empty() {
        Ok(ValidRegistration {
            name,
            email,
            password,
        })
    } else {
        Err(AppError::Validation(errors.join(". ")))
    }
}

pub fn validate_login(req: &LoginRequest) -> Result<ValidLogin> {
    let mut errors = Vec::new();

    let email = normalize_email(req.email.as_deref(), &mut errors);

    let password = req.password.clone().unwrap_or_default();
    if password.is_empty() {
        errors.push("Password is required".to_string());
    }

    if errors.is_empty() {
        Ok(ValidLogin { email, password })
    } else {
        Err(AppError::Validation(errors.join(". ")))
    }
}

pub fn validate_create_task(req: &CreateTaskRequest) -> Result<ValidNewTask> {
    let mut errors = Vec::new();

    let title = req.title.as_deref().unwrap_or("").trim().to_string();
    if title.is_empty() {
        errors.push("Title is required".to_string());
    } else if title.chars().count() > 100 {
        errors.push("Title cannot exceed 100 characters".to_string());
    }

    let description = req.description.as_deref().unwrap_or("").trim().to_string();
    if description.chars().count() > 500 {
        errors.push("Description cannot exceed 500 characters".to_string());
    }

    let status = match req.status.as_deref() {
        None => TaskStatus::Todo,
        Some(raw) => match TaskStatus::parse(raw) {
            Some(status) => status,
            None => {
                errors.push(STATUS_MESSAGE.to_string());
                TaskStatus::Todo
            }
        },
    };

    if errors.is_empty() {
        Ok(ValidNewTask {
            title,
            description,
            status,
        })
    } else {
        Err(AppError::Validation(errors.join(". ")))
    }
}

pub fn validate_update_task(req: &UpdateTaskRequest) -> Result<ValidTaskUpdate> {
    let mut errors = Vec::new();

    let title = req.title.as_deref().map(|raw| raw.trim().to_string());
    if let Some(title) = &title {
        if title.is_empty() {
            errors.push("Title cannot be empty".to_string());
        } else if title.chars().count() > 100 {
            errors.push("Title cannot exceed 100 characters".to_string());
        }
    }

    let description = req.description.as_deref().map(|raw| raw.trim().to_string());
    if let Some(description) = &description {
        if description.chars().count() > 500 {
            errors.push("Description cannot exceed 500 characters".to_string());
        }
    }

    let status = match req.status.as_deref() {
        None => None,
        Some(raw) => match TaskStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                errors.push(STATUS_MESSAGE.to_string());
                None
            }
        },
    };

    if errors.is_empty() {
        Ok(ValidTaskUpdate {
            title,
            description,
            status,
        })
    } else {
        Err(AppError::Validation(errors.join(". ")))
    }
}

fn normalize_email(raw: Option<&str>, errors: &mut Vec<String>) -> String {
    let email = raw.unwrap_or("").trim().to_lowercase();
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !EMAIL_RE.is_match(&email) {
        errors.push("Please provide a valid email".to_string());
    }
    email
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_normalizes_email() {
        let req = RegisterRequest {
            name: Some("  Ana  ".into()),
            email: Some("Ana@Example.COM".into()),
            password: Some("secret1".into()),
        };

        let valid = validate_register(&req).unwrap();
        assert_eq!(valid.name, "Ana");
        assert_eq!(valid.email, "ana@example.com");
    }

    #[test]
    fn register_collects_all_failures() {
        let req = RegisterRequest {
            name: None,
            email: Some("not-an-email".into()),
            password: Some("abc".into()),
        };

        let err = validate_register(&req).unwrap_err();
        let AppError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("Name is required"));
        assert!(message.contains("Please provide a valid email"));
        assert!(message.contains("Password must be at least 6 characters"));
    }

    #[test]
    fn create_task_defaults() {
        let req = CreateTaskRequest {
            title: Some("Buy milk".into()),
            description: None,
            status: None,
        };

        let valid = validate_create_task(&req).unwrap();
        assert_eq!(valid.status, TaskStatus::Todo);
        assert_eq!(valid.description, "");
    }

    #[test]
    fn create_task_rejects_unknown_status() {
        let req = CreateTaskRequest {
            title: Some("Buy milk".into()),
            description: None,
            status: Some("archived".into()),
        };

        let err = validate_create_task(&req).unwrap_err();
        let AppError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert_eq!(message, STATUS_MESSAGE);
    }

    #[test]
    fn create_task_rejects_oversized_fields() {
        let req = CreateTaskRequest {
            title: Some("t".repeat(101)),
            description: Some("d".repeat(501)),
            status: None,
        };

        let err = validate_create_task(&req).unwrap_err();
        let AppError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("Title cannot exceed 100 characters"));
        assert!(message.contains("Description cannot exceed 500 characters"));
    }

    #[test]
    fn update_task_allows_partial_bodies() {
        let req = UpdateTaskRequest {
            title: None,
            description: None,
            status: Some("done".into()),
        };

        let valid = validate_update_task(&req).unwrap();
        assert!(valid.title.is_none());
        assert_eq!(valid.status, Some(TaskStatus::Done));
    }

    #[test]
    fn update_task_rejects_blank_title() {
        let req = UpdateTaskRequest {
            title: Some("   ".into()),
            description: None,
            status: None,
        };

        assert!(validate_update_task(&req).is_err());
    }
}
