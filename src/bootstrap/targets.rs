//! Built-in targets and the target catalog.

use std::path::PathBuf;

use crate::detection::PackageManager;
use crate::error::{Result, StrapError};
use crate::profile::EnvBlock;
use crate::requirements::{InstallMethod, PackageSpec, ToolRequirement};
use crate::source::{cmake, SourceBuild};

use super::machine::Target;

pub const CUDA_TARGET: &str = "cuda";
pub const LLAMA_CPP_TARGET: &str = "llama-cpp";

pub const CUDA_MARKER: &str = "llamastrap cuda";
pub const LLAMA_CPP_MARKER: &str = "llamastrap llama.cpp";

pub const DEFAULT_CUDA_ROOT: &str = "/usr/local/cuda";
pub const DEFAULT_CUDA_MIN_MAJOR: u32 = 8;
pub const DEFAULT_LLAMA_REPO: &str = "https://github.com/ggml-org/llama.cpp";
pub const DEFAULT_CMAKE_FLAGS: &str = "-DGGML_CUDA=ON";

/// Where the CUDA toolkit lives and how new it must be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CudaSettings {
    pub root: PathBuf,
    pub min_major: u32,
}

impl Default for CudaSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_CUDA_ROOT),
            min_major: DEFAULT_CUDA_MIN_MAJOR,
        }
    }
}

/// Where llama.cpp is checked out and how it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlamaSettings {
    pub root: PathBuf,
    pub repo_url: String,
    pub cmake_flags: Vec<String>,
    pub cuda_architectures: Option<String>,
    pub jobs: usize,
}

impl LlamaSettings {
    /// Defaults with the checkout at `root`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            repo_url: DEFAULT_LLAMA_REPO.to_string(),
            cmake_flags: cmake::split_flags(DEFAULT_CMAKE_FLAGS),
            cuda_architectures: None,
            jobs: cmake::default_jobs(),
        }
    }

    /// Directory holding `llama-server` after a build.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("build").join("bin")
    }
}

/// The `cuda` target: `nvcc` from the system package manager.
pub fn cuda_target(settings: &CudaSettings) -> Result<Target> {
    let root = settings.root.display().to_string();
    let requirement = ToolRequirement::new("nvcc", settings.min_major, r"release\s+(\d+)\.")?
        .with_search_dir(settings.root.join("bin"));

    let packages = PackageSpec::new(["cuda-toolkit"])
        .with_override(PackageManager::Apt, ["nvidia-cuda-toolkit"])
        .with_override(PackageManager::Pacman, ["cuda"])
        .with_override(PackageManager::Homebrew, Vec::<String>::new());

    Ok(Target {
        name: CUDA_TARGET.to_string(),
        description: "CUDA toolkit (nvcc)".to_string(),
        requirement,
        method: InstallMethod::Packages(packages),
        prerequisites: Vec::new(),
        env: Some(
            EnvBlock::new(CUDA_MARKER)
                .export("CUDA_HOME", root.as_str())
                .export("PATH", format!("{}/bin:$PATH", root))
                .export("LD_LIBRARY_PATH", format!("{}/lib64:$LD_LIBRARY_PATH", root)),
        ),
    })
}

/// The `llama-cpp` target: `llama-server` built from source.
pub fn llama_cpp_target(settings: &LlamaSettings) -> Result<Target> {
    let root = settings.root.display().to_string();
    let requirement = ToolRequirement::new("llama-server", 1, r"version:\s*(\d+)")?
        .with_search_dir(settings.bin_dir());

    let build = SourceBuild::new(settings.repo_url.clone(), settings.root.clone())
        .with_cmake_flags(settings.cmake_flags.clone())
        .with_cuda_architectures(settings.cuda_architectures.clone())
        .with_jobs(settings.jobs);

    Ok(Target {
        name: LLAMA_CPP_TARGET.to_string(),
        description: "llama.cpp inference server (llama-server), built from source".to_string(),
        requirement,
        method: InstallMethod::Source(build),
        prerequisites: vec![
            package_target("git", r"git version (\d+)\.", 2)?,
            package_target("cmake", r"cmake version (\d+)\.", 3)?,
        ],
        env: Some(
            EnvBlock::new(LLAMA_CPP_MARKER)
                .export("LLAMA_CPP_ROOT", root.as_str())
                .export("PATH", format!("{}/build/bin:$PATH", root)),
        ),
    })
}

/// A build tool installed from the package of the same name.
fn package_target(tool: &str, pattern: &str, min_major: u32) -> Result<Target> {
    Ok(Target {
        name: tool.to_string(),
        description: format!("{} (build prerequisite)", tool),
        requirement: ToolRequirement::new(tool, min_major, pattern)?,
        method: InstallMethod::Packages(PackageSpec::new([tool])),
        prerequisites: Vec::new(),
        env: None,
    })
}

/// Every target available to a run, in listing order.
#[derive(Debug, Clone, Default)]
pub struct TargetCatalog {
    targets: Vec<Target>,
}

impl TargetCatalog {
    /// Catalog with the built-in targets.
    pub fn builtin(cuda: &CudaSettings, llama: &LlamaSettings) -> Result<Self> {
        Ok(Self {
            targets: vec![cuda_target(cuda)?, llama_cpp_target(llama)?],
        })
    }

    /// Add a target. Names and env block markers must be unique.
    pub fn add(&mut self, target: Target) -> Result<()> {
        if self.targets.iter().any(|t| t.name == target.name) {
            return Err(StrapError::ConfigValidationError {
                message: format!("tool '{}' collides with an existing target", target.name),
            });
        }
        if let Some(marker) = target.env.as_ref().map(EnvBlock::marker) {
            if let Some(owner) = self.targets.iter().find(|t| {
                t.env.as_ref().is_some_and(|env| env.marker() == marker)
            }) {
                return Err(StrapError::ConfigValidationError {
                    message: format!(
                        "tools.{}.env: marker '{}' is already used by '{}'",
                        target.name, marker, owner.name
                    ),
                });
            }
        }
        self.targets.push(target);
        Ok(())
    }

    pub fn all(&self) -> &[Target] {
        &self.targets
    }

    /// Look up a target by name.
    pub fn get(&self, name: &str) -> Result<&Target> {
        self.targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| StrapError::UnknownTarget {
                name: name.to_string(),
            })
    }

    /// Resolve command-line names; no names selects every target.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Target>> {
        if names.is_empty() {
            return Ok(self.targets.iter().collect());
        }
        names.iter().map(|name| self.get(name)).collect()
    }
}
