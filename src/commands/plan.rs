//! `plan` and `apply`

use crate::Context;
use crate::cli::{ApplyArgs, PlanArgs};
use crate::commands::{connect, state_path};
use crate::desired::DesiredConfig;
use crate::state::ProviderState;
use crate::ui;
use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{
    Action, ApplyResult, ConfirmCallback, ExecuteOptions, ExecutionPlan, PlannedChange,
    ProgressCallback, Registry, execute, plan_action,
};
use shoehornkit::Client;
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// Commands
// ============================================================================

/// Show what apply would change
pub fn plan(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let registry = crate::resource::registry();
    let execution_plan = load_plan(ctx, &registry, args)?;
    show_plan(&registry, &execution_plan);
    Ok(())
}

/// Converge remote objects to the desired configuration
pub fn apply(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let registry = crate::resource::registry();
    let path = state_path(ctx.state.as_deref())?;
    let mut state = ProviderState::load(&path)?;
    let desired = DesiredConfig::load(Path::new(&args.plan.desired))?;
    let execution_plan =
        build_plan(&registry, &desired, &state)?.filter_by_target(args.plan.target.as_deref());

    show_plan(&registry, &execution_plan);
    if execution_plan.is_empty() {
        return Ok(());
    }

    let client = connect(&ctx.connection)?;
    let opts = ExecuteOptions {
        dry_run: args.dry_run,
    };
    let mut progress = ConsoleProgress { quiet: ctx.quiet };
    let mut confirm = PromptConfirm {
        assume_yes: args.yes,
    };

    let summary = apply_plan(
        &client,
        &registry,
        &execution_plan,
        &mut state,
        &opts,
        &mut progress,
        &mut confirm,
    )?;

    if args.dry_run {
        ui::info("Dry run: no changes were made");
        return Ok(());
    }
    if summary.total_changes() == 0 && summary.failed == 0 {
        ui::info("Apply cancelled");
        return Ok(());
    }

    state.save(&path)?;
    ui::execute_summary(&summary);

    if !summary.is_success() {
        bail!("{} change(s) failed", summary.failed);
    }
    Ok(())
}

fn load_plan(
    ctx: &Context,
    registry: &Registry<Client>,
    args: &PlanArgs,
) -> Result<ExecutionPlan> {
    let state = ProviderState::load(&state_path(ctx.state.as_deref())?)?;
    let desired = DesiredConfig::load(Path::new(&args.desired))?;
    Ok(build_plan(registry, &desired, &state)?.filter_by_target(args.target.as_deref()))
}

// ============================================================================
// Planning
// ============================================================================

/// Plan every configured and tracked instance
///
/// Configured instances come first in address order. Instances tracked in
/// state but no longer configured are deleted last, in reverse order.
pub fn build_plan(
    registry: &Registry<Client>,
    desired: &DesiredConfig,
    state: &ProviderState,
) -> Result<ExecutionPlan> {
    let mut execution_plan = ExecutionPlan::new();

    for (address, resource) in &desired.resources {
        let handler = registry.require(&resource.type_name)?;
        let prior = state.get(address);
        if let Some(tracked) = state.resources.get(address)
            && tracked.type_name != resource.type_name
        {
            bail!(
                "{address} is tracked as {} but configured as {}",
                tracked.type_name,
                resource.type_name
            );
        }
        if let Some(action) =
            plan_action(prior, Some(&resource.attributes), handler.replace_fields())
        {
            execution_plan.push(PlannedChange {
                address: address.clone(),
                type_name: resource.type_name.clone(),
                action,
                prior: prior.cloned(),
                desired: Some(resource.attributes.clone()),
            });
        }
    }

    for (address, tracked) in state.resources.iter().rev() {
        if desired.get(address).is_some() {
            continue;
        }
        registry.require(&tracked.type_name)?;
        execution_plan.push(PlannedChange {
            address: address.clone(),
            type_name: tracked.type_name.clone(),
            action: Action::Delete,
            prior: Some(tracked.attributes.clone()),
            desired: None,
        });
    }

    Ok(execution_plan)
}

fn show_plan(registry: &Registry<Client>, execution_plan: &ExecutionPlan) {
    ui::header("Shoehorn Plan");

    if execution_plan.is_empty() {
        println!();
        ui::success("No changes. Remote objects match the configuration.");
        return;
    }

    println!();
    for change in execution_plan.pending() {
        let replace_fields = registry
            .get(&change.type_name)
            .map(|r| r.replace_fields())
            .unwrap_or_default();
        ui::planned_change(&change.address, &change.action, replace_fields);
    }

    println!();
    println!("{}", ui::plan_summary_line(&execution_plan.summary()).bold());
}

// ============================================================================
// Execution
// ============================================================================

/// Execute a plan and fold the outcomes into `state`
pub fn apply_plan<P, F>(
    client: &Client,
    registry: &Registry<Client>,
    execution_plan: &ExecutionPlan,
    state: &mut ProviderState,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut F,
) -> Result<declarative::ExecuteSummary>
where
    P: ProgressCallback,
    F: ConfirmCallback,
{
    let (summary, applied) = execute(execution_plan, registry, client, opts, progress, confirm)?;

    if !opts.dry_run {
        let types: HashMap<&str, &str> = execution_plan
            .changes
            .iter()
            .map(|c| (c.address.as_str(), c.type_name.as_str()))
            .collect();
        state.record(|address| types.get(address).map(ToString::to_string), applied);
    }

    Ok(summary)
}

/// Prints each change as it runs
struct ConsoleProgress {
    quiet: bool,
}

impl ProgressCallback for ConsoleProgress {
    fn on_change_start(&mut self, address: &str, action: &Action) {
        if !self.quiet {
            println!(
                "  {} {} {}",
                ui::action_symbol(action),
                address.bold(),
                format!("({action})").dimmed()
            );
        }
    }

    fn on_change_complete(&mut self, address: &str, result: &ApplyResult) {
        match result {
            ApplyResult::Failed { error } => {
                println!("    {} {}", "✗".red(), address);
                println!("      {}", error.red());
            }
            ApplyResult::Skipped { reason } => {
                if !self.quiet {
                    ui::dim(&format!("  skipped: {reason}"));
                }
            }
            other => {
                if !self.quiet {
                    let verb = match other {
                        ApplyResult::Created => "created",
                        ApplyResult::Modified => "updated",
                        ApplyResult::Replaced => "replaced",
                        ApplyResult::Removed => "destroyed",
                        _ => "unchanged",
                    };
                    println!("    {} {}", "✓".green(), verb);
                }
            }
        }
    }
}

/// Asks before applying unless `--yes` was given
struct PromptConfirm {
    assume_yes: bool,
}

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        println!();
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}

// ============================================================================
// Tests
// ============================================================================
