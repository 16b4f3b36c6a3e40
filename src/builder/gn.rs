//! GN + Ninja orchestrator for the Impeller engine.
//!
//! The engine lives inside a Flutter checkout hydrated by `gclient`:
//!
//! ```text
//! <flutter_root>/.gclient
//! <flutter_root>/engine/src/flutter/tools/gn
//! <flutter_root>/engine/src/out/<output dir>/
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::builder::NativeBuilder;
use crate::core::errors::NativeError;
use crate::core::layout::Library;
use crate::core::platform::{Configuration, Platform};
use crate::sources::git::origin_url;
use crate::util::fs::write_string;

/// Used for `.gclient` when the checkout has no `origin` remote.
pub const FLUTTER_FALLBACK_URL: &str = "https://github.com/flutter/flutter.git";

/// Ninja targets producing the interop library.
pub const DEFAULT_NINJA_TARGETS: &[&str] = &["flutter/impeller/toolkit/interop:library"];

/// Impeller engine builder.
pub struct EngineBuilder<'a> {
    ctx: &'a BuildContext<'a>,
    flutter_root: PathBuf,
    legacy_output_dir: bool,
    targets: Vec<String>,
}

impl<'a> EngineBuilder<'a> {
    pub fn new(ctx: &'a BuildContext<'a>, flutter_root: impl Into<PathBuf>) -> Self {
        EngineBuilder {
            ctx,
            flutter_root: flutter_root.into(),
            legacy_output_dir: false,
            targets: DEFAULT_NINJA_TARGETS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Name the output directory by configuration only (`impeller_host_<mode>`).
    ///
    /// All platforms and architectures of one configuration then share a
    /// directory, so builds against the same checkout must be serialized.
    pub fn legacy_output_dir(mut self, legacy: bool) -> Self {
        self.legacy_output_dir = legacy;
        self
    }

    /// Replace the ninja targets.
    pub fn targets(mut self, targets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn engine_src(&self) -> PathBuf {
        self.flutter_root.join("engine").join("src")
    }

    pub fn gn_script(&self) -> PathBuf {
        self.engine_src().join("flutter").join("tools").join("gn")
    }

    /// GN `--runtime-mode` for the configuration.
    fn runtime_mode(&self) -> &'static str {
        match self.ctx.request.configuration {
            Configuration::Release => "release",
            Configuration::Debug => "debug",
        }
    }

    /// Output directory name passed as `--target-dir`.
    pub fn output_dir_name(&self) -> String {
        let req = &self.ctx.request;
        if self.legacy_output_dir {
            format!("impeller_host_{}", self.runtime_mode())
        } else {
            format!("impeller_{}_{}_{}", req.platform, req.arch, self.runtime_mode())
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.engine_src().join("out").join(self.output_dir_name())
    }

    fn ensure_checkout(&self) -> Result<()> {
        if !self.flutter_root.exists() {
            return Err(NativeError::CheckoutMissing {
                what: "Flutter".to_string(),
                path: self.flutter_root.clone(),
                hint: Some(
                    "Clone flutter/flutter into extern/flutter or pass --flutter-root".to_string(),
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Write a `.gclient` solution file unless one exists.
    ///
    /// Returns whether a file was written.
    pub fn ensure_gclient_config(&self) -> Result<bool> {
        let path = self.flutter_root.join(".gclient");
        if path.exists() {
            return Ok(false);
        }

        let url = origin_url(&self.flutter_root)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| FLUTTER_FALLBACK_URL.to_string());
        write_string(&path, &gclient_config(&url))?;
        tracing::info!("Wrote {}", path.display());
        Ok(true)
    }

    /// Hydrate engine dependencies with `gclient sync`.
    pub fn sync(&self) -> Result<()> {
        let gclient = self.ctx.which("gclient").ok_or_else(|| NativeError::SyncToolMissing {
            searched: self.ctx.search.extra_dirs().to_vec(),
        })?;
        self.ensure_gclient_config()?;

        let cmd = self.ctx.command(gclient)?.arg("sync").cwd(&self.flutter_root);
        let shown = cmd.display_command();
        tracing::info!("$ {}", shown);

        let code = self.ctx.runner().status(&cmd)?;
        if code != 0 {
            return Err(NativeError::SyncFailed {
                command: shown,
                code,
            }
            .into());
        }
        Ok(())
    }

    /// Arguments after the GN script path.
    pub fn gn_args(&self) -> Vec<String> {
        let req = &self.ctx.request;
        let mut args = vec![
            "--runtime-mode".to_string(),
            self.runtime_mode().to_string(),
            "--target-dir".to_string(),
            self.output_dir_name(),
        ];

        if req.configuration == Configuration::Debug {
            args.push("--unoptimized".to_string());
        }

        let os_flag = match req.platform {
            Platform::Macos => "mac",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        };
        args.push(format!("--{}", os_flag));
        args.push(format!("--{}-cpu", os_flag));
        args.push(req.arch.as_str().to_string());
        args
    }

    /// Generate ninja files with `flutter/tools/gn`.
    pub fn generate(&self) -> Result<PathBuf> {
        let script = self.gn_script();
        if !script.exists() {
            return Err(NativeError::GeneratorMissing { path: script }.into());
        }

        let python = self
            .ctx
            .which("python3")
            .or_else(|| self.ctx.which("python"))
            .ok_or_else(|| NativeError::GeneratorToolMissing {
                tool: "python3".to_string(),
                hint: Some("GN is driven by a Python script; install Python 3".to_string()),
            })?;

        let cmd = self
            .ctx
            .command(python)?
            .arg(&script)
            .args(self.gn_args())
            .cwd(self.engine_src());
        self.ctx.run(&cmd)?;

        Ok(self.output_dir())
    }

    /// Build the configured targets with ninja.
    pub fn compile(&self, out_dir: &Path) -> Result<()> {
        let ninja = self
            .ctx
            .require_tool("ninja", "Install ninja or initialize depot_tools, which bundles it")?;

        let cmd = self
            .ctx
            .command(ninja)?
            .arg("-C")
            .arg(out_dir)
            .args(&self.targets)
            .cwd(out_dir);
        self.ctx.run(&cmd)
    }
}

impl NativeBuilder for EngineBuilder<'_> {
    fn library(&self) -> Library {
        Library::Impeller
    }

    fn checkout(&self) -> &Path {
        &self.flutter_root
    }

    fn build(&self) -> Result<PathBuf> {
        let req = &self.ctx.request;
        tracing::info!(
            "Building Impeller for platform={} arch={} configuration={}",
            req.platform,
            req.arch,
            req.configuration
        );

        self.ensure_checkout()?;
        if req.skip_sync {
            tracing::info!("Skipping gclient sync");
        } else {
            self.sync()?;
        }

        let out_dir = self.generate()?;
        self.compile(&out_dir)?;
        Ok(out_dir)
    }
}

/// `.gclient` contents with a single unmanaged solution rooted at the checkout.
fn gclient_config(url: &str) -> String {
    format!(
        r#"solutions = [
  {{
    "custom_deps": {{}},
    "deps_file": "DEPS",
    "managed": False,
    "name": ".",
    "safesync_url": "",
    "url": "{}",
  }},
]
"#,
        url
    )
}
