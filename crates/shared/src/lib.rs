//! Shared utilities and common types for the Cinematic Platform backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id
//! - Session token issuing and validation (HS256 JWT)
//! - Common input normalization and validation
//! - One-time secrets for password reset and email login codes

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
