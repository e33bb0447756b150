//! Serve command implementation.
//!
//! The `llamastrap serve` command runs `llama-server` in the foreground
//! with tool-calling chat templates enabled.

use std::path::PathBuf;

use crate::cli::args::ServeArgs;
use crate::error::Result;
use crate::server::ServerLaunch;
use crate::shell::CommandRunner;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The serve command implementation.
pub struct ServeCommand<'a> {
    runner: &'a dyn CommandRunner,
    bin_dir: PathBuf,
    args: ServeArgs,
}

impl<'a> ServeCommand<'a> {
    /// Create a new serve command looking for the server in `bin_dir` first.
    pub fn new(runner: &'a dyn CommandRunner, bin_dir: PathBuf, args: ServeArgs) -> Self {
        Self {
            runner,
            bin_dir,
            args,
        }
    }

    fn launch(&self) -> ServerLaunch {
        ServerLaunch {
            model: crate::shell::expand_home(&self.args.model.to_string_lossy()),
            host: self.args.host.clone(),
            port: self.args.port,
            alias: self.args.alias.clone(),
            ctx_size: self.args.ctx_size,
            gpu_layers: self.args.gpu_layers,
        }
    }
}

impl Command for ServeCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let launch = self.launch();
        ui.show_header(&format!("Serving {} as '{}'", launch.model.display(), launch.alias));
        ui.message(&format!("Listening on {} (Ctrl-C to stop)", launch.url()));
        ui.show_hint(&format!(
            "In another shell: llamastrap demo --server-url {} --model {}",
            launch.url(),
            launch.alias
        ));

        launch.run(self.runner, &self.bin_dir)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrapError;
    use crate::shell::ScriptedRunner;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn args(model: PathBuf) -> ServeArgs {
        ServeArgs {
            model,
            host: "0.0.0.0".to_string(),
            port: 9000,
            alias: "qwen".to_string(),
            ctx_size: 4096,
            gpu_layers: 20,
        }
    }

    #[test]
    fn runs_built_server_with_requested_settings() {
        let temp = TempDir::new().unwrap();
        let model = temp.path().join("qwen.gguf");
        fs::write(&model, b"GGUF").unwrap();
        let bin_dir = temp.path().join("build").join("bin");
        let server = bin_dir.join("llama-server");
        let runner = ScriptedRunner::new().with_tool(&server.to_string_lossy(), server.clone());
        let mut ui = MockUI::new();

        ServeCommand::new(&runner, bin_dir, args(model.clone()))
            .execute(&mut ui)
            .unwrap();

        let lines = runner.command_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(&server.display().to_string()));
        assert!(lines[0].contains("--host 0.0.0.0 --port 9000 --alias qwen -c 4096 -ngl 20 --jinja"));
        assert!(ui.has_message("http://0.0.0.0:9000"));
    }

    #[test]
    fn missing_server_is_reported_with_install_hint() {
        let temp = TempDir::new().unwrap();
        let model = temp.path().join("qwen.gguf");
        fs::write(&model, b"GGUF").unwrap();
        let runner = ScriptedRunner::new();

        let err = ServeCommand::new(&runner, temp.path().to_path_buf(), args(model))
            .execute(&mut MockUI::new())
            .unwrap_err();

        assert!(matches!(err, StrapError::ToolNotInstalled { .. }));
    }
}
