//! Environment bootstrapping.
//!
//! A [`Target`] is driven through detect, install, verify and write-env by
//! the [`Bootstrapper`]. The [`TargetCatalog`] holds the built-in `cuda`
//! and `llama-cpp` targets plus any defined in the config file.

pub mod machine;
pub mod targets;

pub use machine::{reported_version, BootstrapRun, BootstrapState, Bootstrapper, Target};
pub use targets::{
    cuda_target, llama_cpp_target, CudaSettings, LlamaSettings, TargetCatalog, CUDA_MARKER,
    CUDA_TARGET, LLAMA_CPP_MARKER, LLAMA_CPP_TARGET,
};
