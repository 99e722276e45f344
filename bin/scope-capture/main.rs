use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;

use tekscope::plotting::plot_waveform;
use tekscope::{
    load_config_or_default, write_waveform_file, Bandwidth, Channel, ChannelConfig, Coupling,
    ScopeSession, TimebaseConfig, TriggerConfig, TriggerSlope,
};

/// Single-shot waveform capture from a Tektronix DPO7000 oscilloscope
#[derive(Parser, Debug)]
#[command(name = "scope-capture")]
#[command(about = "Capture one waveform over VISA and save it as a text table", long_about = None)]
struct Args {
    /// VISA address (e.g. GPIB0::1::INSTR); auto-detects when omitted
    #[arg(short, long, value_name = "ADDRESS")]
    address: Option<String>,

    /// Channel to capture (1-4)
    #[arg(short = 'n', long, default_value_t = 1)]
    channel: u8,

    /// Vertical scale in volts per division
    #[arg(short, long, default_value_t = 1.0)]
    scale: f64,

    /// Vertical offset in volts
    #[arg(long, default_value_t = 0.0)]
    offset: f64,

    /// Coupling mode: ac, dc, or gnd
    #[arg(long, default_value = "dc")]
    coupling: String,

    /// Limit channel bandwidth to 20 MHz
    #[arg(long)]
    bandwidth_limit: bool,

    /// Edge trigger level in volts (trigger left untouched when omitted)
    #[arg(short, long, value_name = "VOLTS")]
    trigger_level: Option<f64>,

    /// Trigger on the falling edge instead of the rising edge
    #[arg(long)]
    falling_edge: bool,

    /// Horizontal scale in seconds per division (timebase untouched when omitted)
    #[arg(long, value_name = "SECONDS")]
    timebase: Option<f64>,

    /// Run the instrument's auto-setup before capturing
    #[arg(long)]
    auto_scale: bool,

    /// Output file for the capture
    #[arg(short, long, value_name = "FILE", default_value = "waveform.csv")]
    output: PathBuf,

    /// Skip the terminal preview plot
    #[arg(long)]
    no_plot: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn parse_coupling(value: &str) -> Result<Coupling, String> {
    match value.to_lowercase().as_str() {
        "ac" => Ok(Coupling::Ac),
        "dc" => Ok(Coupling::Dc),
        "gnd" => Ok(Coupling::Gnd),
        other => Err(format!("unknown coupling mode: {other}")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = args.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = load_config_or_default(args.config.as_deref());
    let channel = Channel::new(args.channel)?;
    let coupling = parse_coupling(&args.coupling)?;

    let mut scope = ScopeSession::native(config)?;
    if !scope.connect(args.address.as_deref()) {
        error!("Could not connect to an oscilloscope");
        std::process::exit(1);
    }
    info!("Connected to {}", scope.address().unwrap_or("<unknown>"));

    let mut channel_config = ChannelConfig::new(channel, args.scale)
        .offset(args.offset)
        .coupling(coupling);
    if args.bandwidth_limit {
        channel_config = channel_config.bandwidth(Bandwidth::TwentyMhz);
    }
    if !scope.configure_channel(&channel_config) {
        scope.disconnect();
        std::process::exit(1);
    }

    if let Some(level) = args.trigger_level {
        let mut trigger = TriggerConfig::new(channel, level);
        if args.falling_edge {
            trigger = trigger.slope(TriggerSlope::Falling);
        }
        if !scope.set_trigger(&trigger) {
            scope.disconnect();
            std::process::exit(1);
        }
    }

    if let Some(seconds_per_div) = args.timebase {
        if !scope.set_timebase(&TimebaseConfig::new(seconds_per_div)) {
            scope.disconnect();
            std::process::exit(1);
        }
    }

    if args.auto_scale && !scope.auto_scale(channel) {
        scope.disconnect();
        std::process::exit(1);
    }

    let waveform = scope.acquire_waveform(channel);
    if waveform.is_empty() {
        error!("Acquisition returned no data");
        scope.disconnect();
        std::process::exit(1);
    }
    info!("Captured {} samples from {channel}", waveform.len());

    if !args.no_plot {
        if let Err(e) = plot_waveform(&waveform, Some(&format!("{channel} capture")), None, None) {
            error!("Preview failed: {e}");
        }
    }

    let saved = write_waveform_file(&args.output, channel, &waveform);
    scope.disconnect();

    if let Err(e) = saved {
        error!("Error saving waveform: {e}");
        std::process::exit(1);
    }
    info!("Waveform written to {}", args.output.display());
    Ok(())
}
