// src/core/handler/mod.rs

//! Command dispatch: the client-facing router (including the three
//! connection-state commands it special-cases) and the replica-side replay
//! path the master's propagated stream is fed through.

pub mod router;
