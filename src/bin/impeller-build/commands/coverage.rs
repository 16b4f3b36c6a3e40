//! `impeller-build coverage` command

use anyhow::Result;

use crate::cli::CoverageArgs;
use impeller_build::ops::coverage::{
    run, CoverageOptions, CoverageOutcome, DEFAULT_HEADER, DEFAULT_INTEROP_DIR, DEFAULT_OUTPUT,
};
use impeller_build::util::GlobalContext;

pub fn execute(args: CoverageArgs, ctx: &GlobalContext) -> Result<()> {
    let config = &ctx.config().coverage;
    let mut opts = CoverageOptions::new(ctx.repo_root());

    opts.header = ctx.resolve_or(args.header.as_deref(), config.header.as_ref(), DEFAULT_HEADER);
    opts.interop_dir = ctx.resolve_or(
        args.interop_dir.as_deref(),
        config.interop_dir.as_ref(),
        DEFAULT_INTEROP_DIR,
    );
    opts.output = ctx.resolve_or(args.output.as_deref(), config.output.as_ref(), DEFAULT_OUTPUT);
    opts.check = args.check;
    if let Some(ref prefix) = config.symbol_prefix {
        opts.symbol_prefix = prefix.clone();
    }

    let result = run(&opts)?;
    let path = opts.output.display();
    match result.outcome {
        CoverageOutcome::Written => println!("Wrote coverage report to {}", path),
        CoverageOutcome::Unchanged => println!("{} is already up to date. No changes written.", path),
        CoverageOutcome::UpToDate => println!("{} is up to date.", path),
    }
    println!("Coverage: {:.2}%", result.report.coverage_percent());
    Ok(())
}
