//! Identity provider implementations.
//!
//! Every provider runs the same authorization-code flow in [`StandardProvider`];
//! the modules here are presets for specific identity services.

pub mod google;
pub mod oidc;
mod standard;

pub use standard::{
    Endpoints, StandardProvider, DEFAULT_PENDING_LIFETIME_SECS, DEFAULT_TOKEN_LIFETIME_SECS,
};
