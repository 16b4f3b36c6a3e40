//! `impeller-build runtime` command

use anyhow::Result;

use super::{build_native_options, build_request};
use crate::cli::RuntimeArgs;
use impeller_build::builder::{BuildContext, RuntimeBuilder};
use impeller_build::core::layout::Library;
use impeller_build::ops::build_native;
use impeller_build::util::process::SystemRunner;
use impeller_build::util::GlobalContext;

pub fn execute(args: RuntimeArgs, ctx: &GlobalContext) -> Result<()> {
    let request = build_request(&args.target)?;
    let opts = build_native_options(ctx, Library::Rive, args.target.output.as_deref());
    let rive_root = ctx.checkout(Library::Rive, args.rive_root.as_deref());

    let runner = SystemRunner;
    let build_ctx = BuildContext::new(request, ctx.repo_root(), ctx.search_path(), &runner);
    let builder = RuntimeBuilder::new(&build_ctx, rive_root).args(args.cmake_args);

    let result = build_native(&builder, &build_ctx.request, &opts)?;
    println!("Manifest: {}", result.manifest_path.display());
    Ok(())
}
