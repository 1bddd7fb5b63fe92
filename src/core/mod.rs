//! Core data structures.
//!
//! This module contains the foundational types used throughout the crate:
//! - Version kinds, requests and resolved versions
//! - Clamping policies and candidate filters
//! - Per-build settings and workflow scheduling
//! - The host interfaces (units of work, resolution hooks)

pub mod clamp;
pub mod filter;
pub mod host;
pub mod request;
pub mod scheduling;
pub mod settings;
pub mod version;

pub use clamp::ClampPolicy;
pub use filter::{FilterChain, FilterContext, FilterSet};
pub use host::{ResolutionHook, Substitution, UnitFailure, UnitListener, UnitOutcome, WorkUnit};
pub use request::FutureVersionRequest;
pub use scheduling::Scheduling;
pub use settings::{FutureSettings, ReportIces};
pub use version::{ResolvedVersion, VersionKind};
