//! Config command handlers

use crate::cli::{ConfigInitArgs, ConfigValidateArgs};
use crate::config::{GuardianConfig, EXAMPLE_CONFIG};
use std::fs;

/// Handle `guardian config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Edit the [[nodes]] entries to describe your fleet.");

    Ok(())
}

/// Handle `guardian config validate` command. Returns a one-line summary.
pub fn handle_config_validate(
    args: &ConfigValidateArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = GuardianConfig::load(Some(&args.config))?.with_env_overrides();
    config.validate()?;

    let g = &config.guardian;
    Ok(format!(
        "✓ {} is valid: {} nodes, max_failures={}, max_restarts={}, availability_floor={}",
        args.config.display(),
        config.nodes.len(),
        g.max_failures,
        g.max_restarts,
        g.availability_floor
    ))
}
