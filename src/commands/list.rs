use crate::Context;
use crate::commands::connect;
use crate::datasource::DataSource;
use anyhow::{Context as _, Result};

/// Print a data source as pretty JSON on stdout
pub fn run(ctx: &Context, source: DataSource) -> Result<()> {
    let client = connect(&ctx.connection)?;
    let value = source.read(&client)?;
    let text = serde_json::to_string_pretty(&value).context("Failed to serialize data source")?;
    println!("{text}");
    Ok(())
}
