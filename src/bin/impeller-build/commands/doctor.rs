//! `impeller-build doctor` command

use anyhow::{anyhow, Result};

use crate::cli::DoctorArgs;
use impeller_build::core::layout::Library;
use impeller_build::ops::doctor::{doctor, format_report, DoctorScope};
use impeller_build::util::GlobalContext;

pub fn execute(args: DoctorArgs, ctx: &GlobalContext, verbose: bool) -> Result<()> {
    let scope: DoctorScope = args.scope.parse().map_err(|e: String| anyhow!(e))?;
    let checkouts = [Library::Impeller, Library::Rive].map(|lib| (lib, ctx.checkout(lib, None)));

    let report = doctor(&ctx.search_path(), &checkouts, scope);
    print!("{}", format_report(&report, verbose));

    // Exit with error code if required checks failed
    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}
