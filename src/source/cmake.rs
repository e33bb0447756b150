//! CMake configure and build commands.

use crate::shell::Invocation;

use super::SourceBuild;

/// Split a flag string on whitespace.
///
/// Flags containing spaces are not supported; each whitespace-separated
/// word becomes one argument.
pub fn split_flags(flags: &str) -> Vec<String> {
    flags.split_whitespace().map(str::to_string).collect()
}

/// Parallelism to use when none is configured.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// `cmake -S <root> -B <root>/build` with a Release build type.
pub fn configure_command(build: &SourceBuild) -> Invocation {
    let mut invocation = Invocation::new("cmake")
        .arg("-S")
        .arg(build.root.to_string_lossy())
        .arg("-B")
        .arg(build.build_dir().to_string_lossy())
        .arg("-DCMAKE_BUILD_TYPE=Release")
        .args(build.cmake_flags.iter().cloned());

    if let Some(arch) = &build.cuda_architectures {
        invocation = invocation.arg(format!("-DCMAKE_CUDA_ARCHITECTURES={}", arch));
    }

    invocation
}

/// `cmake --build <root>/build --config Release -j <jobs>`.
pub fn build_command(build: &SourceBuild) -> Invocation {
    Invocation::new("cmake")
        .arg("--build")
        .arg(build.build_dir().to_string_lossy())
        .args(["--config", "Release", "-j"])
        .arg(build.jobs.max(1).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> SourceBuild {
        SourceBuild::new("https://github.com/ggml-org/llama.cpp", "/opt/llama.cpp")
            .with_cmake_flags(split_flags("-DGGML_CUDA=ON  -DLLAMA_CURL=OFF"))
            .with_jobs(8)
    }

    #[test]
    fn split_flags_ignores_extra_whitespace() {
        assert_eq!(
            split_flags("  -DGGML_CUDA=ON \t-DLLAMA_CURL=OFF "),
            vec!["-DGGML_CUDA=ON", "-DLLAMA_CURL=OFF"]
        );
        assert!(split_flags("").is_empty());
    }

    #[test]
    fn configure_passes_flags_after_build_type() {
        assert_eq!(
            configure_command(&build()).display(),
            "cmake -S /opt/llama.cpp -B /opt/llama.cpp/build -DCMAKE_BUILD_TYPE=Release -DGGML_CUDA=ON -DLLAMA_CURL=OFF"
        );
    }

    #[test]
    fn configure_adds_cuda_architectures() {
        let build = build().with_cuda_architectures(Some("86;89".to_string()));
        assert!(configure_command(&build)
            .args
            .contains(&"-DCMAKE_CUDA_ARCHITECTURES=86;89".to_string()));
    }

    #[test]
    fn build_uses_release_config_and_jobs() {
        assert_eq!(
            build_command(&build()).display(),
            "cmake --build /opt/llama.cpp/build --config Release -j 8"
        );
    }

    #[test]
    fn zero_jobs_builds_serially() {
        let build = build().with_jobs(0);
        assert_eq!(build_command(&build).args.last().map(String::as_str), Some("1"));
    }

    #[test]
    fn default_jobs_is_positive() {
        assert!(default_jobs() >= 1);
    }
}
