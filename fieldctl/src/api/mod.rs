//! API layer: management routes, request/response models.
//!
//! Handlers live in [`handlers`], one module per resource; their DTOs live
//! in [`models`]. Routes are assembled in [`crate::build_router`].

pub mod handlers;
pub mod models;
