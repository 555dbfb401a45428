//! Durable task queue, handler registry, and worker loop.
//!
//! This crate owns scheduling only: it knows how to store, lease, and
//! dispatch a task by operation name. It has no knowledge of what an
//! `enrich.commit_description` task actually does — that lives in whichever
//! crate registers the handler for it.

pub mod error;
pub mod payload;
pub mod priority;
pub mod queue;
pub mod registry;
pub mod worker;

pub use error::{TaskError, TaskQueueResult};
pub use payload::{coerce_i64_from_json, decode_i64, decode_str};
pub use priority::Priority;
pub use queue::{Leased, MockTaskQueue, NewTask, PgTaskQueue, Task, TaskQueue};
pub use registry::{Handler, HandlerRegistry};
pub use worker::{run_once, TaskOutcome, WorkerConfig};
