//! `impeller-build stage` command

use anyhow::{anyhow, Result};

use crate::cli::StageArgs;
use impeller_build::core::layout::{ArtifactLayout, Library};
use impeller_build::core::platform::Configuration;
use impeller_build::ops::stage_artifact_tree;
use impeller_build::util::GlobalContext;

pub fn execute(args: StageArgs, ctx: &GlobalContext) -> Result<()> {
    let library: Library = args.library.parse().map_err(|e: String| anyhow!(e))?;
    let configuration: Configuration = args.configuration.parse()?;

    let artifacts_dir = match args.artifacts {
        Some(ref dir) => ctx.cwd().join(dir),
        None => ctx.artifacts_dir(),
    };
    let layout = ArtifactLayout::for_library(&artifacts_dir, library);

    let summary = stage_artifact_tree(&layout, &ctx.restaging_layout(), configuration)?;
    println!(
        "Staged {} RID(s) ({} file copies): {}",
        summary.rids.len(),
        summary.copies,
        summary
            .rids
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
