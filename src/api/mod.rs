//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for TaskVault, built on the Axum
//! web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//! - [`api::validation`](crate::api::validation) - Field validation ahead of business logic
//!
//! # API Endpoints
//!
//! ## Authentication (`/api/auth`)
//! - `POST /api/auth/register` - Register and receive a session cookie
//! - `POST /api/auth/login` - Login and receive a session cookie
//! - `POST /api/auth/logout` - Clear the session cookie
//! - `GET /api/auth/me` - Current authenticated user
//!
//! ## Tasks (`/api/tasks`)
//! - `GET /api/tasks` - List own tasks with pagination, status filter, search
//! - `POST /api/tasks` - Create a task
//! - `GET /api/tasks/{id}` - Get a task
//! - `PUT /api/tasks/{id}` - Update a task
//! - `DELETE /api/tasks/{id}` - Delete a task
//!
//! ## Health (`/api/health`)
//! - `GET /api/health` - Health check endpoint
//!
//! # Authentication
//!
//! Protected endpoints require a valid session token in the HTTP-only
//! `token` cookie. Task endpoints additionally accept and emit the
//! `{encrypted, data}` payload envelope.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
/// Request body validation rules.
pub mod validation;
