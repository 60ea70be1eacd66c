//! Execution engine - applies a plan one change at a time

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::diff::merged_plan;
use crate::planner::{Action, ExecutionPlan, PlannedChange};
use crate::resource::{DynResource, Registry};
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::{Context, Result};
use serde_json::Value;

/// Outcome of one planned change
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedChange {
    pub address: String,
    pub result: ApplyResult,
    /// State to persist afterwards; `None` removes the instance
    pub state: Option<Value>,
}

/// Execute a plan with the given options and callbacks
///
/// Changes run strictly in plan order. A failed change is recorded and the
/// remaining changes still run.
///
/// # Returns
/// The summary plus one [`AppliedChange`] per pending change
pub fn execute<C, P, F>(
    plan: &ExecutionPlan,
    registry: &Registry<C>,
    ctx: &C,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut F,
) -> Result<(ExecuteSummary, Vec<AppliedChange>)>
where
    C: ?Sized,
    P: ProgressCallback,
    F: ConfirmCallback,
{
    let pending: Vec<&PlannedChange> = plan.pending().collect();
    if pending.is_empty() {
        return Ok((ExecuteSummary::default(), Vec::new()));
    }

    let skip_reason = if opts.dry_run {
        Some("dry run")
    } else if !confirm.confirm(&format!("Apply {} change(s)?", pending.len()))? {
        Some("declined")
    } else {
        None
    };

    let mut summary = ExecuteSummary::default();
    let mut applied = Vec::with_capacity(pending.len());

    for change in pending {
        let outcome = match skip_reason {
            Some(reason) => AppliedChange {
                address: change.address.clone(),
                result: ApplyResult::Skipped {
                    reason: reason.to_string(),
                },
                state: change.prior.clone(),
            },
            None => {
                progress.on_change_start(&change.address, &change.action);
                let outcome = match registry.require(&change.type_name) {
                    Ok(resource) => execute_action(resource, ctx, change),
                    Err(e) => failed(change, change.prior.clone(), &e),
                };
                progress.on_change_complete(&change.address, &outcome.result);
                outcome
            }
        };
        summary.add_result(&outcome.result);
        applied.push(outcome);
    }

    Ok((summary, applied))
}

fn failed(change: &PlannedChange, state: Option<Value>, error: &anyhow::Error) -> AppliedChange {
    log::debug!("{} failed: {error:#}", change.address);
    AppliedChange {
        address: change.address.clone(),
        result: ApplyResult::Failed {
            error: format!("{error:#}"),
        },
        state,
    }
}

fn require<'a>(value: Option<&'a Value>, what: &str, address: &str) -> Result<&'a Value> {
    value.with_context(|| format!("No {what} for {address}"))
}

/// Apply a single planned change
///
/// On failure the returned state is whatever is true remotely: the prior
/// state, or nothing if a replace destroyed the object but could not
/// recreate it.
pub fn execute_action<C: ?Sized>(
    resource: &dyn DynResource<C>,
    ctx: &C,
    change: &PlannedChange,
) -> AppliedChange {
    let address = change.address.as_str();
    let prior = change.prior.as_ref();
    let desired = change.desired.as_ref();

    let done = |result, state| AppliedChange {
        address: address.to_string(),
        result,
        state,
    };

    match &change.action {
        Action::NoOp => done(ApplyResult::NoChange, change.prior.clone()),

        Action::Create => {
            match require(desired, "configuration", address)
                .and_then(|plan| resource.create_value(ctx, plan))
            {
                Ok(state) => done(ApplyResult::Created, Some(state)),
                Err(e) => failed(change, None, &e),
            }
        }

        Action::Update { .. } => {
            let result = require(prior, "state", address).and_then(|prior| {
                let desired = require(desired, "configuration", address)?;
                resource.update_value(ctx, &merged_plan(prior, desired), prior)
            });
            match result {
                Ok(state) => done(ApplyResult::Modified, Some(state)),
                Err(e) => failed(change, change.prior.clone(), &e),
            }
        }

        Action::Replace { .. } => {
            let destroyed = require(prior, "state", address)
                .and_then(|prior| resource.delete_value(ctx, prior));
            if let Err(e) = destroyed {
                return failed(change, change.prior.clone(), &e);
            }
            match require(desired, "configuration", address)
                .and_then(|plan| resource.create_value(ctx, plan))
            {
                Ok(state) => done(ApplyResult::Replaced, Some(state)),
                Err(e) => failed(change, None, &e),
            }
        }

        Action::Delete => {
            match require(prior, "state", address).and_then(|prior| resource.delete_value(ctx, prior))
            {
                Ok(()) => done(ApplyResult::Removed, None),
                Err(e) => failed(change, change.prior.clone(), &e),
            }
        }
    }
}
