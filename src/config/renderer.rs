//! `[renderer]` section configuration.
//!
//! ```toml
//! [renderer]
//! command = ["node", "render.js"]
//! ```
//!
//! Without `command`, the embedded djot script runs as `node -e <script>`.
//! It needs `node` in `PATH` and the `@djot/djot` package resolvable from
//! the working directory or `NODE_PATH`:
//!
//! ```sh
//! npm install -g @djot/djot
//! export NODE_PATH="$(npm root -g)"
//! ```
//!
//! When the package is missing the script exits at startup and `s4g serve`
//! stops with the renderer's message before the first build.

use serde::{Deserialize, Serialize};

use crate::embed::renderer::default_command;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Program and arguments of the long-lived renderer process.
    pub command: Option<Vec<String>>,
}

impl RendererConfig {
    /// Configured command, or the embedded default.
    pub fn command(&self) -> Vec<String> {
        self.command.clone().unwrap_or_else(default_command)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_default_command_runs_embedded_script() {
        let config = test_parse_config("");
        let command = config.renderer.command();

        assert_eq!(command[0], "node");
        assert_eq!(command[1], "-e");
        assert!(command[2].contains("@djot/djot"));
    }

    #[test]
    fn test_custom_command() {
        let config = test_parse_config("[renderer]\ncommand = [\"deno\", \"run\", \"r.ts\"]");
        assert_eq!(config.renderer.command(), vec!["deno", "run", "r.ts"]);
    }
}
