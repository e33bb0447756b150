//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Every setting has an
//! environment-variable override and a documented default.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::bootstrap::{CudaSettings, LlamaSettings};
use crate::source::cmake;

/// llamastrap - Set up CUDA and llama.cpp, then serve a local model.
#[derive(Debug, Parser)]
#[command(name = "llamastrap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (default: <config dir>/llamastrap/config.yml)
    #[arg(short, long, global = true, env = "LLAMASTRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Shell profile that receives environment exports
    #[arg(long, global = true, env = "LLAMASTRAP_PROFILE")]
    pub profile_file: Option<String>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub settings: BuildSettings,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where CUDA and llama.cpp live and how llama.cpp is built.
#[derive(Debug, Clone, clap::Args)]
pub struct BuildSettings {
    /// CUDA toolkit root
    #[arg(long, global = true, env = "LLAMASTRAP_CUDA_ROOT", default_value = "/usr/local/cuda")]
    pub cuda_root: PathBuf,

    /// Minimum CUDA major version
    #[arg(
        long,
        global = true,
        env = "LLAMASTRAP_CUDA_MIN_MAJOR",
        default_value_t = 8,
        value_parser = clap::value_parser!(u32).range(1..),
    )]
    pub cuda_min_major: u32,

    /// llama.cpp checkout directory
    #[arg(long, global = true, env = "LLAMASTRAP_LLAMA_ROOT", default_value = "~/llama.cpp")]
    pub llama_root: String,

    /// llama.cpp git repository
    #[arg(
        long,
        global = true,
        env = "LLAMASTRAP_LLAMA_REPO",
        default_value = crate::bootstrap::targets::DEFAULT_LLAMA_REPO,
    )]
    pub llama_repo: String,

    /// Extra CMake configure flags (space-separated)
    #[arg(
        long,
        global = true,
        env = "LLAMASTRAP_CMAKE_FLAGS",
        default_value = crate::bootstrap::targets::DEFAULT_CMAKE_FLAGS,
        allow_hyphen_values = true,
    )]
    pub cmake_flags: String,

    /// CUDA architectures to compile for (e.g. "86;89")
    #[arg(long, global = true, env = "LLAMASTRAP_CUDA_ARCHITECTURES")]
    pub cuda_architectures: Option<String>,

    /// Parallel build jobs (default: available parallelism)
    #[arg(long, global = true, env = "LLAMASTRAP_BUILD_JOBS")]
    pub build_jobs: Option<usize>,
}

impl BuildSettings {
    pub fn cuda(&self) -> CudaSettings {
        CudaSettings {
            root: self.cuda_root.clone(),
            min_major: self.cuda_min_major,
        }
    }

    pub fn llama(&self) -> LlamaSettings {
        let mut settings = LlamaSettings::at(crate::shell::expand_home(&self.llama_root));
        settings.repo_url = self.llama_repo.clone();
        settings.cmake_flags = cmake::split_flags(&self.cmake_flags);
        settings.cuda_architectures = self
            .cuda_architectures
            .clone()
            .filter(|a| !a.trim().is_empty());
        if let Some(jobs) = self.build_jobs {
            settings.jobs = jobs;
        }
        settings
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install targets that are missing (all targets if none are named)
    Install(InstallArgs),

    /// Report which targets are installed and at what version
    Check(CheckArgs),

    /// Append environment exports for targets to the profile
    Env(EnvArgs),

    /// List available targets
    Targets,

    /// Run llama-server in the foreground
    Serve(ServeArgs),

    /// Send a tool-calling chat request to a running server
    Demo(DemoArgs),

    /// Let the served model read and write files in a workspace directory
    Agent(AgentArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InstallArgs {
    /// Targets to install
    pub targets: Vec<String>,

    /// Install without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Targets to check
    pub targets: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `env` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EnvArgs {
    /// Targets whose exports to write
    pub targets: Vec<String>,
}

/// Arguments for the `serve` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ServeArgs {
    /// GGUF model file
    #[arg(short, long, env = "LLAMASTRAP_MODEL")]
    pub model: PathBuf,

    /// Address to listen on
    #[arg(long, env = "LLAMASTRAP_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "LLAMASTRAP_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Model name clients use in requests
    #[arg(long, env = "LLAMASTRAP_ALIAS", default_value = "local-model")]
    pub alias: String,

    /// Context size in tokens
    #[arg(long, env = "LLAMASTRAP_CTX_SIZE", default_value_t = 8192)]
    pub ctx_size: u32,

    /// Layers to offload to the GPU
    #[arg(long, env = "LLAMASTRAP_GPU_LAYERS", default_value_t = 99)]
    pub gpu_layers: u32,
}

/// Arguments for the `demo` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DemoArgs {
    /// Base URL of the running server
    #[arg(long, env = "LLAMASTRAP_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    pub server_url: String,

    /// Model name to request
    #[arg(long, env = "LLAMASTRAP_ALIAS", default_value = "local-model")]
    pub model: String,

    /// User message
    #[arg(long, default_value = crate::server::DEFAULT_PROMPT)]
    pub prompt: String,

    /// Request timeout in seconds
    #[arg(long, env = "LLAMASTRAP_DEMO_TIMEOUT", default_value_t = 120)]
    pub timeout: u64,
}

/// Arguments for the `agent` command.
#[derive(Debug, Clone, clap::Args)]
pub struct AgentArgs {
    /// What the agent should do
    #[arg(default_value = crate::agent::DEFAULT_TASK)]
    pub task: String,

    /// Directory the agent may read and write (created if missing)
    #[arg(short, long, env = "LLAMASTRAP_WORKSPACE")]
    pub workspace: String,

    /// Base URL of the running server
    #[arg(long, env = "LLAMASTRAP_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    pub server_url: String,

    /// Model name to request
    #[arg(long, env = "LLAMASTRAP_ALIAS", default_value = "local-model")]
    pub model: String,

    /// Model replies allowed before giving up
    #[arg(
        long,
        env = "LLAMASTRAP_AGENT_MAX_TURNS",
        default_value_t = crate::agent::DEFAULT_MAX_TURNS,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..),
    )]
    pub max_turns: usize,

    /// Request timeout in seconds, per turn
    #[arg(long, env = "LLAMASTRAP_DEMO_TIMEOUT", default_value_t = 120)]
    pub timeout: u64,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
