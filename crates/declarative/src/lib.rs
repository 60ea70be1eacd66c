//! # Declarative
//!
//! The contract between a declarative engine and the resources it manages.
//!
//! This crate provides the core abstractions for comparing desired
//! configuration with persisted state and converging remote objects to match.
//!
//! ## Core Concepts
//!
//! - **Resource**: a remote object type with Create/Read/Update/Delete/Import
//! - **ReadOutcome**: a refresh either returns the object or reports it gone
//! - **Action**: what convergence requires for one instance (create, update,
//!   replace, delete, or nothing)
//! - **ExecutionPlan**: the ordered list of planned changes
//! - **Executor**: applies a plan one change at a time
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{plan_action, Action, Registry};
//! use serde_json::json;
//!
//! let prior = json!({"id": "f1", "key": "beta", "name": "Beta"});
//! let desired = json!({"key": "beta", "name": "Beta rollout"});
//!
//! match plan_action(Some(&prior), Some(&desired), &["key"]) {
//!     Some(Action::Update { changed }) => assert_eq!(changed[0].attribute, "name"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Provider Traits
//!
//! - [`Resource`]: typed CRUD for one resource type
//! - [`DynResource`]: object-safe JSON view used by registries
//! - [`ProgressCallback`]: receives progress updates
//! - [`ConfirmCallback`]: handles user confirmations
//!
//! This keeps the crate free of any particular UI or API client.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{AttributeChange, DiffSummary, attribute_diff, merged_plan, satisfies};
pub use executor::{AppliedChange, execute, execute_action};
pub use planner::{Action, ExecutionPlan, PlannedChange, parse_address, plan_action};
pub use resource::{BoxedResource, DynResource, ReadOutcome, Registry, Resource};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary};
