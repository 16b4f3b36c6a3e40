//! `impeller-build engine` command

use anyhow::Result;

use super::{build_native_options, build_request};
use crate::cli::EngineArgs;
use impeller_build::builder::{BuildContext, EngineBuilder};
use impeller_build::core::layout::Library;
use impeller_build::ops::build_native;
use impeller_build::util::process::SystemRunner;
use impeller_build::util::GlobalContext;

pub fn execute(args: EngineArgs, ctx: &GlobalContext) -> Result<()> {
    let request = build_request(&args.target)?;
    let opts = build_native_options(ctx, Library::Impeller, args.target.output.as_deref());
    let flutter_root = ctx.checkout(Library::Impeller, args.flutter_root.as_deref());

    let runner = SystemRunner;
    let build_ctx = BuildContext::new(request, ctx.repo_root(), ctx.search_path(), &runner);

    let engine = ctx.config().engine.clone();
    let mut builder = EngineBuilder::new(&build_ctx, flutter_root)
        .legacy_output_dir(engine.legacy_output_dir.unwrap_or(false));
    if let Some(targets) = engine.ninja_targets {
        builder = builder.targets(targets);
    }

    let result = build_native(&builder, &build_ctx.request, &opts)?;
    println!("Manifest: {}", result.manifest_path.display());
    Ok(())
}
