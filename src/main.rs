use anyhow::Context;
use clap::Parser;
use costglow::app;
use costglow::config::{Config, Overrides, parse_duration};
use costglow::logging::{self, LogTarget};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Show your ccusage spend as animated block-letter art.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The configuration file to use instead of the default one.
    #[clap(short, long, env = "COSTGLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Time between animation frames, e.g. `100ms`.
    #[clap(long, env = "COSTGLOW_ANIMATION_SPEED", value_parser = parse_duration)]
    animation_speed: Option<Duration>,

    /// The animation pattern: cycling, gradient, pulse or wave.
    #[clap(long, env = "COSTGLOW_ANIMATION_PATTERN")]
    animation_pattern: Option<String>,

    /// Draw the cost in plain white.
    #[clap(long, env = "COSTGLOW_NO_ANIMATION")]
    no_animation: bool,

    /// The log level used when `RUST_LOG` is not set.
    #[clap(long, env = "COSTGLOW_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write logs to this file.
    #[clap(long, env = "COSTGLOW_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Print a single frame to stdout and exit.
    #[clap(long)]
    once: bool,

    /// The width used by `--once`. Defaults to the terminal width.
    #[clap(long, requires = "once")]
    width: Option<usize>,

    /// The height used by `--once`. Defaults to the terminal height.
    #[clap(long, requires = "once")]
    height: Option<usize>,

    #[clap(long, hide = true)]
    bankruptcy: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            animation_speed: self.animation_speed,
            animation_pattern: self.animation_pattern.clone(),
            no_animation: self.no_animation,
            bankruptcy: self.bankruptcy,
            log_level: self.log_level.clone(),
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply(&cli.overrides());
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init(config.log_level()?, &LogTarget::select(cli.log_file.as_deref(), !cli.once))?;
    debug!(?config, "configuration loaded");

    if cli.once {
        let viewport = app::default_viewport(cli.width, cli.height);
        println!("{}", app::render_once(&config, viewport)?);
        return Ok(());
    }
    app::run(&config)
}
