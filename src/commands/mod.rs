//! Command implementations for the modsync CLI

pub mod metadata;
pub mod setup;
pub mod sync;
