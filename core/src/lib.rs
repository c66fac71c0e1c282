//! Synchronous CRM API client core and resource page state machine.
//!
//! # Overview
//! Builds `HttpRequest` values and normalizes `HttpResponse` values for the
//! CRM REST API without touching the network (host-does-IO pattern). The
//! host supplies a `Transport`; `CrmApi` runs each operation through it and
//! folds every outcome into the `{ success, message, data }` envelope.
//! `ResourcePage` drives the list/add/edit views for one resource on top.
//!
//! # Design
//! - One generic `ResourceClient` parameterized by `Resource` metadata
//!   covers all fourteen entity types.
//! - Records are open JSON objects so updates can merge a partial form over
//!   the stored record without losing fields the form never loaded.
//! - The bearer token is an explicit argument everywhere; there is no
//!   ambient session.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod form;
pub mod http;
pub mod page;
pub mod pagination;
pub mod resource;
pub mod transport;
pub mod types;

pub use api::CrmApi;
pub use auth::{AuthClient, ValidationOutcome};
pub use client::{ResourceClient, WriteOutcome};
pub use envelope::ApiResult;
pub use error::{ApiError, TransportError};
pub use form::{coerce_field, FormError, FormMode, FormState, RelationOption};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use page::{FetchTicket, ListDisplay, ResourcePage, ViewMode, SUCCESS_BANNER_TTL};
pub use pagination::{page_count, page_slice, PageSize};
pub use resource::{FieldKind, FieldSpec, Resource};
pub use transport::Transport;
pub use types::{merge_for_update, Record, RelationRef};
