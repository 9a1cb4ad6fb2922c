/// OpenShift cluster management API module
///
/// This module provides the pieces of the OpenShift client: the resource
/// dispatcher, the bearer token lifecycle, and structural secret
/// validation.
///
/// ## Request flow
///
/// 1. A caller asks [`client::OpenShiftClient`] for an operation on a
///    resource kind within a project
/// 2. The client asks [`auth::TokenManager`] for a valid bearer token
///    (memory first, shared cache second, token exchange last)
/// 3. The client builds the request, merging per-kind defaults on create and
///    applying merge-patch null rules on update, and sends it
/// 4. The response is classified into a typed result, a documented soft
///    empty/false result, or a propagated error
pub mod auth;
pub mod client;
pub mod jwt;
pub mod resources;
pub mod types;

pub use auth::{BearerToken, TokenManager};
pub use client::OpenShiftClient;
pub use jwt::{validate_jwt, JwtValidationError};
pub use resources::ResourceKind;
pub use types::{ApiError, OpenShiftConfig, OpenShiftError};
