//! Core application primitives: engine context, evaluation pass, scheduler
//! and the HTTP/WebSocket surface.

pub mod context;
pub mod http;
pub mod runtime;
pub mod scheduler;
pub mod ws;

pub use context::EngineContext;
pub use http::{create_router, start_server, AppState};
pub use runtime::{AlertRuntime, PassSummary};
pub use scheduler::AlertScheduler;
