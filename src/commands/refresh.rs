use crate::Context;
use crate::commands::{connect, state_path};
use crate::state::ProviderState;
use crate::ui;
use anyhow::{Result, bail};
use colored::Colorize;
use declarative::Registry;
use shoehornkit::Client;

/// Re-read every tracked instance and rewrite the state file
pub fn run(ctx: &Context) -> Result<()> {
    let path = state_path(ctx.state.as_deref())?;
    let mut state = ProviderState::load(&path)?;

    if state.resources.is_empty() {
        ui::info("No tracked instances");
        return Ok(());
    }

    let client = connect(&ctx.connection)?;
    let registry = crate::resource::registry();

    ui::header("Refreshing State");
    let outcome = refresh(&client, &registry, &mut state, ctx.quiet);
    state.save(&path)?;

    println!();
    println!(
        "  {} refreshed, {} removed, {} failed",
        outcome.refreshed, outcome.removed, outcome.failed
    );
    if outcome.failed > 0 {
        bail!("{} instance(s) could not be refreshed", outcome.failed);
    }
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub refreshed: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Read every instance in `state`
///
/// Instances that report gone leave state. A failed read keeps the prior
/// attributes.
pub fn refresh(
    client: &Client,
    registry: &Registry<Client>,
    state: &mut ProviderState,
    quiet: bool,
) -> RefreshOutcome {
    let mut outcome = RefreshOutcome::default();
    let tracked: Vec<(String, String, serde_json::Value)> = state
        .resources
        .iter()
        .map(|(address, r)| (address.clone(), r.type_name.clone(), r.attributes.clone()))
        .collect();

    for (address, type_name, attributes) in tracked {
        let read = registry
            .require(&type_name)
            .and_then(|resource| resource.read_value(client, &attributes));

        match read {
            Ok(Some(current)) => {
                if !quiet {
                    println!("  {} {}", "✓".green(), address);
                }
                state.upsert(&address, &type_name, current);
                outcome.refreshed += 1;
            }
            Ok(None) => {
                println!(
                    "  {} {} {}",
                    "-".red(),
                    address,
                    "(gone, removed from state)".dimmed()
                );
                state.remove(&address);
                outcome.removed += 1;
            }
            Err(e) => {
                println!("  {} {}", "✗".red(), address);
                println!("      {}", format!("{e:#}").red());
                outcome.failed += 1;
            }
        }
    }

    outcome
}
