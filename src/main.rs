use anyhow::Context;
use camlstalker::debugger::{LaunchArgs, Preferences};
use camlstalker::ui::console::AppBuilder;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bytecode executable to debug
    program: PathBuf,

    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    program_args: Vec<String>,

    /// Debugger executable, overrides the configuration file
    #[clap(long, env = "CAMLS_DEBUGGER")]
    debugger: Option<String>,

    /// Wait for a remote program on the configured port instead of launching it
    #[clap(long)]
    remote: bool,

    /// Wait for a remote program on this port
    #[clap(long)]
    remote_port: Option<u16>,

    /// Debugger script sourced after the program is connected
    #[clap(long)]
    script: Option<PathBuf>,

    /// Disable checkpoints (backward execution becomes unavailable)
    #[clap(long)]
    no_checkpoints: bool,

    /// Add a directory to the list of source search paths (maybe more than one)
    #[clap(short = 'I', long = "include")]
    search_paths: Vec<PathBuf>,

    /// Project root, current directory by default
    #[clap(long)]
    project: Option<PathBuf>,

    /// Configuration file, ~/.config/camlstalker/config.toml by default
    #[clap(long)]
    config: Option<PathBuf>,

    /// Mute controller logs while the console runs
    #[clap(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    camlstalker::log::init();
    let args = Args::parse();
    if args.quiet {
        camlstalker::log::disable();
    }

    let mut prefs = Preferences::load(args.config.as_deref());
    if let Some(debugger) = args.debugger {
        prefs.debugger = debugger;
    }

    let project_root = match args.project {
        Some(root) => root,
        None => std::env::current_dir().context("determine current directory")?,
    };
    let remote_port = args
        .remote_port
        .or_else(|| args.remote.then_some(prefs.remote_port));

    let launch = LaunchArgs::new(args.program)
        .with_project_root(project_root)
        .with_search_paths(args.search_paths)
        .with_program_args(args.program_args)
        .with_remote_port(remote_port)
        .with_checkpoints(args.no_checkpoints.then_some(false))
        .with_script_file(args.script);

    let app = AppBuilder::new(prefs, launch)
        .build()
        .context("build console application")?;
    app.run()
}
