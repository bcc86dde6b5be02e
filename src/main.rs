use anyhow::{Context, Result};
use argh::FromArgs;
use log::info;

use normplot::observe::{dump_observer, observer};
use normplot::params::{DistributionParams, RepairPolicy};
use normplot::plot::TextPlot;
use normplot::session::{load_script, read_script, Session};
use normplot::state::{DistributionState, StateConfig, StepPolicy};

#[derive(FromArgs)]
/// NORMPLOT explores the normal distribution from the terminal, replaying a
/// script of field edits, drags and mode switches.
struct Config {
    #[argh(option, default = "0.0")]
    /// initial mean
    pub mean: f64,

    #[argh(option, default = "1.0")]
    /// initial standard deviation
    pub sd: f64,

    #[argh(option, default = "default_min()")]
    /// lower bound of the plotted range
    pub min: f64,

    #[argh(option, default = "default_max()")]
    /// upper bound of the plotted range
    pub max: f64,

    #[argh(option, default = "0.0")]
    /// initial evaluation point
    pub x: f64,

    #[argh(switch)]
    /// start in likelihood mode, with the evaluation point as observation
    pub likelihood: bool,

    #[argh(option, default = "RepairPolicy::FirstMatch")]
    /// how range bounds are repaired: `first-match` or `fixed-point`
    pub repair: RepairPolicy,

    #[argh(switch)]
    /// coarsen the sampling step on wide ranges
    pub adaptive_step: bool,

    #[argh(option, default = "default_width()")]
    /// width of the plot, in characters
    pub width: usize,

    #[argh(option, default = "default_height()")]
    /// height of the plot, in characters
    pub height: usize,

    #[argh(option)]
    /// write the observed events to this CSV file
    pub observe: Option<String>,

    #[argh(switch, short = 'v')]
    /// log debug information
    pub verbose: bool,

    #[argh(positional)]
    /// path to the script, standard input if missing
    pub script: Option<String>,
}

fn default_min() -> f64 {
    -3.0
}

fn default_max() -> f64 {
    3.0
}

fn default_width() -> usize {
    72
}

fn default_height() -> usize {
    18
}

fn main() -> Result<()> {
    // read configuration
    let config: Config = argh::from_env();
    let level = if config.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let commands = match &config.script {
        Some(path) => load_script(path)?,
        None => read_script(std::io::stdin().lock()).context("reading stdin")?,
    };

    let params = DistributionParams::new(config.mean, config.sd, config.min, config.max);
    let state_config = StateConfig {
        step: if config.adaptive_step {
            StepPolicy::Adaptive
        } else {
            StepPolicy::default()
        },
        repair: config.repair,
    };
    info!("starting from {:?} with {:?}", params, state_config);
    let mut state = DistributionState::new(
        params,
        config.x,
        state_config,
        TextPlot::new(config.width, config.height),
    );
    if config.likelihood {
        state.set_mode(true);
    }

    let mut session = Session::new(state);
    session.run(&commands, std::io::stdout().lock())?;

    if let Some(path) = &config.observe {
        dump_observer(path)?;
        for (name, count) in observer().counts() {
            info!("{}: {}", name, count);
        }
    }
    Ok(())
}
