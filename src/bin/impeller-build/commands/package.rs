//! `impeller-build package` command

use anyhow::Result;

use crate::cli::PackageArgs;
use impeller_build::core::layout::{ArtifactLayout, Library};
use impeller_build::core::platform::Rid;
use impeller_build::ops::package::{package, PackageOptions, DEFAULT_OUTPUT};
use impeller_build::util::process::SystemRunner;
use impeller_build::util::GlobalContext;

pub fn execute(args: PackageArgs, ctx: &GlobalContext) -> Result<()> {
    let config = &ctx.config().package;
    let mut opts = PackageOptions::new(ctx.repo_root());

    opts.configuration = args.configuration.parse()?;
    opts.artifacts = ArtifactLayout::for_library(&ctx.artifacts_dir(), Library::Impeller);
    opts.output = ctx.resolve_or(args.output.as_deref(), config.output.as_ref(), DEFAULT_OUTPUT);

    // RIDs: CLI > config > defaults
    if !args.rids.is_empty() {
        opts.rids = args.rids.iter().map(Rid::new).collect();
    } else if let Some(ref rids) = config.rids {
        opts.rids = rids.iter().map(Rid::new).collect();
    }
    if let Some(ref projects) = config.projects {
        opts.projects = projects.clone();
    }
    if let Some(ref solution) = config.solution {
        opts.solution = solution.clone();
    }

    opts.version_suffix = args.prerelease_suffix;
    opts.skip_native_check = args.skip_native_check;

    let manifest = package(&SystemRunner, &ctx.search_path(), &opts)?;
    println!(
        "Packed {} package(s) into {}",
        manifest.packages.len(),
        opts.output.display()
    );
    Ok(())
}
