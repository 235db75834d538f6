//! # ModKit - module system for TaskFlow services
//!
//! Modules implement a small set of capability traits and are registered
//! explicitly, in dependency order, into a [`ModuleRegistry`]. The runner then
//! drives every module through the same phases:
//!
//! `init → db (migrations) → rest (router composition) → start → wait → stop`
//!
//! ```rust,ignore
//! let registry = ModuleRegistry::builder()
//!     .register(ModuleEntry::new("api_ingress", ingress.clone())
//!         .rest_host(ingress.clone())
//!         .stateful(ingress))
//!     .register(ModuleEntry::new("tasks", tasks.clone())
//!         .deps(&["auth"])
//!         .db(tasks.clone())
//!         .rest(tasks))
//!     .build()?;
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod contracts;
pub use contracts::*;

pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod client_hub;
pub use client_hub::{ClientHub, ClientHubError};

pub mod registry;
pub use registry::{ModuleEntry, ModuleRegistry, RegistryError};

pub mod api;
pub use api::problem::{
    bad_request, conflict, internal_error, not_found, unauthorized, Problem, ProblemResponse,
    APPLICATION_PROBLEM_JSON,
};

pub mod http;
pub use http::client::TracedClient;

pub mod runtime;
pub use runtime::{run, RunOptions, ShutdownOptions};
