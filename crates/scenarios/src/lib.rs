//! Analyzer-hostile scenarios with reproducible ground truth.
//!
//! Each scenario produces runtime behavior a conservative static analyzer
//! struggles to predict (aliasing, opaque dispatch, name indirection, closure
//! pipelines over scoped state, guarded-dead branches) while every branch
//! decision flows through an injectable [`mirage_entropy::Nondeterminism`]
//! source, so tests can pin any outcome.
//!
//! * [`identity`]: direct, weak and cloned handles to one resource
//! * [`dispatch`]: overlapping dispatch keys behind a proxy
//! * [`maze`]: alias to type to operation lookups by name
//! * [`pipeline`]: closure steps mutating call-scoped state
//! * [`unreachable`]: dead guards plus an interceptable hook
//!
//! [`ScenarioSuite`] builds all of them and routes an
//! [`mirage_invocation::Invocation`] to the right one.

pub mod config;
pub mod dispatch;
pub mod effects;
pub mod error;
mod fingerprint;
pub mod hook;
pub mod identity;
pub mod maze;
pub mod pipeline;
pub mod scope;
mod suite;
pub mod unreachable;

pub use config::ScenarioConfig;
pub use effects::{ActionOutcome, DisabledAction, ExternalAction, ProcessAction, RecordingAction};
pub use error::{Result, ScenarioError};
pub use fingerprint::fingerprint;
pub use hook::{Instrumentation, WeavingLog};
pub use suite::ScenarioSuite;
