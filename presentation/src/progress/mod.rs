//! Progress display driven by council events

pub mod reporter;
