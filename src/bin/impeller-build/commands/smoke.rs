//! `impeller-build smoke` command

use anyhow::Result;

use crate::cli::SmokeArgs;
use impeller_build::core::platform::Rid;
use impeller_build::ops::smoke::{smoke, SmokeOptions};
use impeller_build::util::process::SystemRunner;
use impeller_build::util::GlobalContext;

pub fn execute(args: SmokeArgs, ctx: &GlobalContext) -> Result<()> {
    let mut opts = SmokeOptions::new(ctx.cwd().join(&args.artifact_dir), Rid::new(args.rid));

    // Symbols: CLI > config > defaults
    if !args.symbols.is_empty() {
        opts.symbols = args.symbols;
    } else if let Some(ref symbols) = ctx.config().smoke.symbols {
        opts.symbols = symbols.clone();
    }

    let result = smoke(&SystemRunner, &ctx.search_path(), &opts)?;
    let name = result
        .library
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!(
        "PASS: {} exports all {} expected symbol(s) ({} exported)",
        name,
        opts.symbols.len(),
        result.exported
    );
    Ok(())
}
