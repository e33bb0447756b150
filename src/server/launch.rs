//! Launching `llama-server`.

use std::path::{Path, PathBuf};

use crate::bootstrap::LLAMA_CPP_TARGET;
use crate::error::{Result, StrapError};
use crate::shell::{CommandRunner, Invocation};

pub const SERVER_BINARY: &str = "llama-server";

/// How to run the inference server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLaunch {
    /// GGUF model file.
    pub model: PathBuf,
    pub host: String,
    pub port: u16,
    /// Model name clients send in requests.
    pub alias: String,
    /// Context window in tokens.
    pub ctx_size: u32,
    /// Layers offloaded to the GPU.
    pub gpu_layers: u32,
}

impl ServerLaunch {
    /// Command line for `server`, with tool-calling chat templates enabled.
    pub fn invocation(&self, server: &Path) -> Invocation {
        Invocation::new(server.to_string_lossy())
            .arg("-m")
            .arg(self.model.to_string_lossy())
            .args(["--host", self.host.as_str()])
            .arg("--port")
            .arg(self.port.to_string())
            .args(["--alias", self.alias.as_str()])
            .arg("-c")
            .arg(self.ctx_size.to_string())
            .arg("-ngl")
            .arg(self.gpu_layers.to_string())
            .arg("--jinja")
    }

    /// Base URL clients should use.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Run the server in the foreground until it exits.
    pub fn run(&self, runner: &dyn CommandRunner, bin_dir: &Path) -> Result<()> {
        if !self.model.is_file() {
            return Err(StrapError::ModelNotFound {
                path: self.model.clone(),
            });
        }

        let server = resolve_server(runner, bin_dir)?;
        tracing::info!("Starting {} on {}", server.display(), self.url());
        runner.run_checked(&self.invocation(&server))?;
        Ok(())
    }
}

/// Find `llama-server` in the build output first, then on PATH.
pub fn resolve_server(runner: &dyn CommandRunner, bin_dir: &Path) -> Result<PathBuf> {
    let built = bin_dir.join(SERVER_BINARY);
    runner
        .resolve(&built.to_string_lossy(), &[])
        .or_else(|| runner.resolve(SERVER_BINARY, &[]))
        .ok_or_else(|| StrapError::ToolNotInstalled {
            tool: SERVER_BINARY.to_string(),
            target: LLAMA_CPP_TARGET.to_string(),
        })
}
