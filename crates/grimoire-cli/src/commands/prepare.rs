//! Prepare command
//!
//! Usage: grimoire prepare <ACTOR>
//!
//! Loads an actor (JSON file with embedded items) and prints the
//! preparation report of one cycle. `@actor.<path>` references resolve
//! against the actor's `data`.

use std::path::PathBuf;

use clap::Args;
use grimoire_core::model::Actor;
use grimoire_core::rules::{ActorPathResolver, RulePipeline};
use grimoire_core::CoreConfig;

use super::{print_json, read_json, CommandResult};

#[derive(Debug, Args)]
pub struct PrepareArgs {
    /// Actor document (JSON file)
    pub actor: PathBuf,
}

pub async fn execute(args: PrepareArgs, config: &CoreConfig) -> CommandResult {
    let mut actor: Actor = serde_json::from_value(read_json(&args.actor).await?)?;

    let pipeline = RulePipeline::from_config(&config.rules);
    let report = pipeline.prepare(&mut actor, &ActorPathResolver)?;
    tracing::debug!(cycle_id = %report.cycle_id, "preparation finished");
    print_json(&report)
}
