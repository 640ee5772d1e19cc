//! # ModKit - module wiring for the User API server
//!
//! Modules are plain structs registered explicitly with a [`RegistryBuilder`].
//! The runner drives them through ordered phases:
//!
//! - **init**: DI/wiring, reads the module's config section
//! - **rest**: the single REST host prepares a router, every REST module adds
//!   its routes and OpenAPI fragment, the host finalizes
//! - **start**: stateful modules (the HTTP server) begin work
//! - **stop**: reverse order, after shutdown is requested
//!
//! ```rust,ignore
//! let mut b = RegistryBuilder::default();
//! b.register_core("users_info", users.clone());
//! b.register_rest("users_info", users);
//! let registry = b.build()?;
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod contracts;
pub use crate::contracts::*;

pub mod registry;
pub use registry::{ModuleRegistry, RegistryBuilder, RegistryError};

pub mod api;
pub use api::problem::{Problem, ProblemResponse, ValidationError};
pub use api::{OpenApiRegistry, XRequestId, REQUEST_ID_HEADER};

pub mod runtime;
pub use runtime::{run, RunOptions, ShutdownOptions};
