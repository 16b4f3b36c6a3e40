//! CMake + Ninja orchestrator for the Rive runtime.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::builder::NativeBuilder;
use crate::core::errors::NativeError;
use crate::core::layout::Library;
use crate::core::platform::{Arch, Platform};
use crate::util::fs::ensure_dir;

/// Rive runtime builder.
pub struct RuntimeBuilder<'a> {
    ctx: &'a BuildContext<'a>,
    source_dir: PathBuf,
    cmake_args: Vec<String>,
}

impl<'a> RuntimeBuilder<'a> {
    pub fn new(ctx: &'a BuildContext<'a>, source_dir: impl Into<PathBuf>) -> Self {
        RuntimeBuilder {
            ctx,
            source_dir: source_dir.into(),
            cmake_args: Vec::new(),
        }
    }

    /// Add CMake arguments. They are passed last, so they override defaults.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.cmake_args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// `<source>/out/<platform>-<arch>-<configuration>`
    pub fn build_dir(&self) -> PathBuf {
        let req = &self.ctx.request;
        self.source_dir
            .join("out")
            .join(format!("{}-{}-{}", req.platform, req.arch, req.configuration))
    }

    /// Checkout path as given to `git submodule`, relative to the repo root when possible.
    fn submodule_path(&self) -> PathBuf {
        self.source_dir
            .strip_prefix(&self.ctx.repo_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.source_dir.clone())
    }

    fn checkout_hint(&self) -> String {
        format!(
            "Run 'git submodule update --init --recursive {}'.",
            self.submodule_path().display()
        )
    }

    /// Make sure the checkout exists, initializing the submodule if allowed.
    pub fn ensure_checkout(&self) -> Result<()> {
        if !self.source_dir.exists() && !self.ctx.request.skip_sync {
            let git = self.ctx.require_tool("git", "Install git to initialize submodules")?;
            let cmd = self
                .ctx
                .command(git)?
                .args(["submodule", "update", "--init", "--recursive"])
                .arg(self.submodule_path())
                .cwd(&self.ctx.repo_root);
            self.ctx.run(&cmd)?;
        }

        if !self.source_dir.exists() {
            return Err(NativeError::CheckoutMissing {
                what: "Rive".to_string(),
                path: self.source_dir.clone(),
                hint: Some(self.checkout_hint()),
            }
            .into());
        }
        Ok(())
    }

    /// CMake generator name, requiring its build tool on the search path.
    pub fn generator(&self) -> Result<&'static str> {
        self.ctx.require_tool("ninja", "Ninja build tool not found in PATH; install ninja")?;
        Ok("Ninja")
    }

    /// `CMAKE_SYSTEM_PROCESSOR` value for the request.
    fn system_processor(&self) -> &'static str {
        let req = &self.ctx.request;
        match (req.platform, req.arch) {
            (Platform::Windows, Arch::Arm64) => "ARM64",
            (Platform::Windows, Arch::X64) => "x86_64",
            (_, arch) => arch.as_str(),
        }
    }

    /// Arguments for the configure step.
    pub fn configure_args(&self, generator: &str) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            self.source_dir.display().to_string(),
            "-B".to_string(),
            self.build_dir().display().to_string(),
            "-G".to_string(),
            generator.to_string(),
            format!(
                "-DCMAKE_BUILD_TYPE={}",
                self.ctx.request.configuration.capitalized()
            ),
            "-DRIVE_BUILD_TESTS=OFF".to_string(),
            "-DRIVE_BUILD_EXAMPLES=OFF".to_string(),
            "-DRIVE_BUILD_TOOLS=OFF".to_string(),
            "-DRIVE_BUILD_SHARED=ON".to_string(),
            format!("-DCMAKE_SYSTEM_PROCESSOR={}", self.system_processor()),
        ];
        args.extend(self.cmake_args.iter().cloned());
        args
    }

    fn cmake(&self) -> Result<PathBuf> {
        self.ctx
            .require_tool("cmake", "CMake is required to build Rive; install it and ensure it's in your PATH")
    }

    /// Run CMake configuration.
    pub fn configure(&self) -> Result<()> {
        tracing::info!("Configuring Rive in {}", self.build_dir().display());

        let generator = self.generator()?;
        let cmake = self.cmake()?;
        ensure_dir(&self.build_dir())?;

        let cmd = self.ctx.command(cmake)?.args(self.configure_args(generator));
        self.ctx.run(&cmd)
    }

    /// Run CMake build.
    pub fn compile(&self) -> Result<()> {
        tracing::info!("Building Rive");

        let cmake = self.cmake()?;
        let cmd = self
            .ctx
            .command(cmake)?
            .arg("--build")
            .arg(self.build_dir())
            .arg("--config")
            .arg(self.ctx.request.configuration.capitalized());
        self.ctx.run(&cmd)
    }
}

impl NativeBuilder for RuntimeBuilder<'_> {
    fn library(&self) -> Library {
        Library::Rive
    }

    fn checkout(&self) -> &Path {
        &self.source_dir
    }

    fn build(&self) -> Result<PathBuf> {
        let req = &self.ctx.request;
        tracing::info!(
            "Building Rive for platform={} arch={} configuration={}",
            req.platform,
            req.arch,
            req.configuration
        );

        self.ensure_checkout()?;
        self.configure()?;
        self.compile()?;
        Ok(self.build_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::Configuration;
    use crate::core::request::BuildRequest;
    use crate::test_support::{MockExecutor, MockProcessOutput};
    use crate::util::process::SearchPath;
    use tempfile::TempDir;

    fn context<'a>(
        exec: &'a MockExecutor,
        root: &Path,
        request: BuildRequest,
        search: SearchPath,
    ) -> BuildContext<'a> {
        BuildContext::new(request, root, search, exec)
    }

    #[test]
    fn test_build_dirs_do_not_collide() {
        let exec = MockExecutor::new();
        let root = Path::new("/repo");
        let mut dirs = std::collections::HashSet::new();

        for platform in Platform::ALL {
            for arch in Arch::ALL {
                for configuration in [Configuration::Debug, Configuration::Release] {
                    let ctx = context(
                        &exec,
                        root,
                        BuildRequest::new(platform, arch, configuration),
                        SearchPath::isolated(Vec::new()),
                    );
                    assert!(dirs.insert(RuntimeBuilder::new(&ctx, "/repo/extern/rive").build_dir()));
                }
            }
        }

        let ctx = context(
            &exec,
            root,
            BuildRequest::new(Platform::Macos, Arch::Arm64, Configuration::Debug),
            SearchPath::isolated(Vec::new()),
        );
        assert_eq!(
            RuntimeBuilder::new(&ctx, "/repo/extern/rive").build_dir(),
            PathBuf::from("/repo/extern/rive/out/macos-arm64-debug")
        );
    }

    #[test]
    fn test_configure_args_append_overrides_last() {
        let exec = MockExecutor::new();
        let ctx = context(
            &exec,
            Path::new("/repo"),
            BuildRequest::new(Platform::Windows, Arch::Arm64, Configuration::Release),
            SearchPath::isolated(Vec::new()),
        );
        let builder = RuntimeBuilder::new(&ctx, "/repo/extern/rive").args(["-DRIVE_BUILD_SHARED=OFF"]);
        let args = builder.configure_args("Ninja");

        assert!(args.contains(&"-DCMAKE_BUILD_TYPE=Release".to_string()));
        assert!(args.contains(&"-DCMAKE_SYSTEM_PROCESSOR=ARM64".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("-DRIVE_BUILD_SHARED=OFF"));

        let ctx = context(
            &exec,
            Path::new("/repo"),
            BuildRequest::new(Platform::Linux, Arch::X64, Configuration::Debug),
            SearchPath::isolated(Vec::new()),
        );
        let args = RuntimeBuilder::new(&ctx, "/repo/extern/rive").configure_args("Ninja");
        assert!(args.contains(&"-DCMAKE_SYSTEM_PROCESSOR=x64".to_string()));
        assert!(args.contains(&"-DCMAKE_BUILD_TYPE=Debug".to_string()));
    }

    #[test]
    fn test_missing_checkout_with_skip_sync() {
        let tmp = TempDir::new().unwrap();
        let exec = MockExecutor::new();
        let ctx = context(
            &exec,
            tmp.path(),
            BuildRequest::new(Platform::Linux, Arch::X64, Configuration::Release).with_skip_sync(true),
            SearchPath::isolated(Vec::new()),
        );

        let err = RuntimeBuilder::new(&ctx, tmp.path().join("extern/rive"))
            .build()
            .unwrap_err();
        let native = err.downcast_ref::<NativeError>().unwrap();
        assert!(matches!(native, NativeError::CheckoutMissing { .. }));
        assert!(native
            .to_diagnostic()
            .format(false)
            .contains("git submodule update --init --recursive extern/rive"));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_generator_requires_ninja() {
        let tmp = TempDir::new().unwrap();
        let exec = MockExecutor::new();
        let ctx = context(
            &exec,
            tmp.path(),
            BuildRequest::new(Platform::Linux, Arch::X64, Configuration::Release).with_skip_sync(true),
            SearchPath::isolated(Vec::new()),
        );

        let err = RuntimeBuilder::new(&ctx, tmp.path()).build().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NativeError>(),
            Some(NativeError::GeneratorToolMissing { tool, .. }) if tool == "ninja"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_checkout_configures_then_builds() {
        use crate::test_support::fake_tools;

        let tmp = TempDir::new().unwrap();
        let bin = fake_tools(&tmp.path().join("bin"), &["git", "cmake", "ninja"]);
        let rive = tmp.path().join("extern").join("rive");

        let exec = MockExecutor::permissive();
        std::fs::create_dir_all(&rive).unwrap();
        let ctx = context(
            &exec,
            tmp.path(),
            BuildRequest::new(Platform::Linux, Arch::X64, Configuration::Release),
            SearchPath::isolated(vec![bin]),
        );
        let out = RuntimeBuilder::new(&ctx, &rive).build().unwrap();
        assert_eq!(out, rive.join("out/linux-x64-release"));
        assert!(out.is_dir());

        let calls = exec.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains(" -G Ninja -DCMAKE_BUILD_TYPE=Release"));
        assert!(calls[1].ends_with("--config Release"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_submodule_init_surfaces_exit_code() {
        use crate::test_support::fake_tools;

        let tmp = TempDir::new().unwrap();
        let bin = fake_tools(&tmp.path().join("bin"), &["git"]);
        let exec = MockExecutor::new();
        exec.expect_contains("submodule update", MockProcessOutput::failure(128, "fatal"));

        let ctx = context(
            &exec,
            tmp.path(),
            BuildRequest::new(Platform::Linux, Arch::X64, Configuration::Release),
            SearchPath::isolated(vec![bin]),
        );
        let err = RuntimeBuilder::new(&ctx, tmp.path().join("extern/rive"))
            .build()
            .unwrap_err();
        assert_eq!(err.downcast_ref::<NativeError>().unwrap().exit_code(), 128);
        assert!(exec.calls()[0].ends_with("submodule update --init --recursive extern/rive"));
    }
}
