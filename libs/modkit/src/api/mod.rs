//! HTTP API helpers shared by REST modules.

pub mod problem;
