//! Domain layer for the Cinematic Platform backend.
//!
//! This crate contains:
//! - Domain models (MovieRequest, User, Subscription, settings)
//! - Business rules that do not touch storage (request quota window,
//!   notification composition)

pub mod models;
pub mod services;
