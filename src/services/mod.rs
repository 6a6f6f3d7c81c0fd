//! View-facing service facades.
//!
//! These compose the store, API client, mapper, and grouping engine into
//! the flows the screens need. Errors cross this boundary as readable
//! strings the host can show directly; typed errors stay in the layers
//! below.

pub mod contacts;
pub mod onboarding;
pub mod pipelines;
