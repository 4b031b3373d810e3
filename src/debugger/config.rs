use crate::debugger::error::Error;
use crate::{cs_error, muted_error, weak_error};
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Debugger preferences, read from a host configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct Preferences {
    /// Debugger executable, a path or a name looked up in `PATH`.
    pub debugger: String,
    pub checkpoints: bool,
    pub small_step: u32,
    pub big_step: u32,
    pub process_count: u32,
    /// Timeout of a blocking expression evaluation, in milliseconds.
    pub display_timeout_ms: u64,
    /// Default port for remote debugging.
    pub remote_port: u16,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            debugger: "ocamldebug".to_string(),
            checkpoints: true,
            small_step: 1000,
            big_step: 10000,
            process_count: 15,
            display_timeout_ms: 2000,
            remote_port: 8000,
        }
    }
}

impl Preferences {
    const DEFAULT_PATH: &'static str = ".config/camlstalker/config.toml";

    pub fn from_toml(data: &str) -> Result<Self, Error> {
        Ok(toml::de::from_str(data)?)
    }

    /// Load preferences from a file, or from the default location if `path` is `None`.
    /// Return defaults if the file is missing or malformed.
    pub fn load(path: Option<&Path>) -> Self {
        let data = match path {
            None => {
                let Some(home) = home::home_dir() else {
                    return Self::default();
                };
                match muted_error!(read_to_string(home.join(Self::DEFAULT_PATH))) {
                    Some(data) => data,
                    None => return Self::default(),
                }
            }
            Some(path) => match read_to_string(path) {
                Ok(data) => data,
                Err(err) => {
                    cs_error!("Error while load configuration file: {err}");
                    return Self::default();
                }
            },
        };

        weak_error!(Self::from_toml(&data), "configuration ignored:").unwrap_or_default()
    }

    pub fn display_timeout(&self) -> Duration {
        Duration::from_millis(self.display_timeout_ms)
    }
}

/// Arguments of a single debugger session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchArgs {
    /// Bytecode executable to debug.
    pub program: PathBuf,
    pub program_args: Vec<String>,
    /// Project root, relative search paths are resolved against it.
    pub project_root: PathBuf,
    /// Directories where sources of debugged modules are searched.
    pub search_paths: Vec<PathBuf>,
    /// Wait for a remote debuggee on this port instead of launching it locally.
    pub remote_port: Option<u16>,
    /// Overrides checkpoints preference if set.
    pub checkpoints: Option<bool>,
    /// Debugger script sourced right after the debuggee is connected.
    pub script_file: Option<PathBuf>,
}

impl LaunchArgs {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths = paths.into_iter().collect();
        self
    }

    pub fn with_program_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.program_args = args.into_iter().collect();
        self
    }

    pub fn with_remote_port(mut self, port: Option<u16>) -> Self {
        self.remote_port = port;
        self
    }

    pub fn with_checkpoints(mut self, checkpoints: Option<bool>) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    pub fn with_script_file(mut self, script: Option<PathBuf>) -> Self {
        self.script_file = script;
        self
    }

    pub fn is_remote(&self) -> bool {
        self.remote_port.is_some()
    }
}
