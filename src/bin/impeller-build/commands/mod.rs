//! Command implementations

pub mod completions;
pub mod coverage;
pub mod doctor;
pub mod engine;
pub mod package;
pub mod runtime;
pub mod smoke;
pub mod stage;

use anyhow::Result;

use crate::cli::TargetArgs;
use impeller_build::core::layout::{ArtifactLayout, Library};
use impeller_build::core::request::BuildRequest;
use impeller_build::ops::BuildNativeOptions;
use impeller_build::util::GlobalContext;

/// Validate the orchestrator flags into a request.
pub fn build_request(args: &TargetArgs) -> Result<BuildRequest> {
    Ok(BuildRequest::parse(
        &args.platform,
        args.arch.as_deref(),
        &args.configuration,
        args.skip_sync,
    )?)
}

/// Output locations for one library.
///
/// `--output` names the library root itself (`<output>/<rid>/native`);
/// otherwise the library folder under the configured artifacts directory.
pub fn build_native_options(
    ctx: &GlobalContext,
    library: Library,
    output: Option<&std::path::Path>,
) -> BuildNativeOptions {
    let artifacts = match output {
        Some(root) => ArtifactLayout::new(ctx.cwd().join(root)),
        None => ArtifactLayout::for_library(&ctx.artifacts_dir(), library),
    };
    BuildNativeOptions {
        artifacts,
        staging: ctx.staging_layout(library),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impeller_build::core::platform::Rid;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_output_is_library_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .with_config(Default::default());
        let rid = Rid::new("linux-x64");

        let opts = build_native_options(&ctx, Library::Impeller, Some(Path::new("artifacts/native")));
        assert_eq!(
            opts.artifacts.native_dir(&rid),
            tmp.path().join("artifacts/native/linux-x64/native")
        );

        let opts = build_native_options(&ctx, Library::Rive, None);
        assert_eq!(
            opts.artifacts.native_dir(&rid),
            tmp.path().join("artifacts/rive/linux-x64/native")
        );
    }
}
