#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and logic for the deliverable progress monitor.
//!
//! This crate is pure: it knows nothing about the filesystem, timers, or
//! HTTP. Presence checks and escalation are injected capabilities
//! ([`progress::ArtifactProbe`], [`policy::EscalationSink`]) so everything
//! here is testable with fakes.

pub mod policy;
pub mod progress;
pub mod registry;
pub mod snapshot;

mod util;

pub use util::now_ms;
