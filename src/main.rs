// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn, Level};

use pewbox::config::{ConfigEvent, ConfigWatcher, EngineConfig};
use pewbox::input::{command_for_key, InputLines, PanelCommand, SimulatedPanel};
use pewbox::midi::{print_sources, MidiTransportInput, TransportEvent};
use pewbox::render::FrameBuffer;
use pewbox::sequencer::{GateLines, GateOutput, SequencerEngine};
use pewbox::timing::{MonotonicTime, TimeSource};
use pewbox::ui::{PanelStatus, TerminalDisplay};

/// Poll interval of the main loop
const FRAME_INTERVAL: Duration = Duration::from_millis(2);

/// Minimum time between terminal redraws when nothing changed
const REDRAW_INTERVAL: Duration = Duration::from_millis(50);

fn print_usage() {
    println!("pewbox - Step trigger sequencer");
    println!();
    println!("Usage: pewbox [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>         Load configuration from a YAML or TOML file");
    println!("  --headless <SECONDS>    Run without the terminal UI, logging gate edges");
    println!("  --midi <N>              Follow Start/Stop/Continue from MIDI source N");
    println!("  --list-sources          List available MIDI sources (inputs)");
    println!("  --monitor <N>           Monitor transport messages from MIDI source N");
    println!("  --log <PATH>            Log file for the terminal UI (default pewbox.log)");
    println!("  -v, --verbose           More logging (repeat for trace output)");
    println!("  --help                  Show this help message");
}

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Interactive,
    Headless(Duration),
    ListSources,
    Monitor(usize),
    Help,
}

/// Parsed command line
#[derive(Debug, Clone)]
struct Options {
    mode: Mode,
    config: Option<PathBuf>,
    midi: Option<usize>,
    log: PathBuf,
    verbosity: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::Interactive,
            config: None,
            midi: None,
            log: PathBuf::from("pewbox.log"),
            verbosity: 0,
        }
    }
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", name))
        };

        match arg.as_str() {
            "--config" => options.config = Some(PathBuf::from(value("--config")?)),
            "--headless" => {
                let text = value("--headless")?;
                let seconds: f64 = text
                    .parse()
                    .map_err(|_| anyhow!("Invalid number of seconds: {}", text))?;
                if !seconds.is_finite() || seconds <= 0.0 {
                    return Err(anyhow!("--headless needs a positive duration"));
                }
                options.mode = Mode::Headless(Duration::from_secs_f64(seconds));
            }
            "--midi" => options.midi = Some(parse_index(&value("--midi")?)?),
            "--monitor" => options.mode = Mode::Monitor(parse_index(&value("--monitor")?)?),
            "--list-sources" => options.mode = Mode::ListSources,
            "--log" => options.log = PathBuf::from(value("--log")?),
            "-v" | "--verbose" => options.verbosity = options.verbosity.saturating_add(1),
            "-vv" => options.verbosity = options.verbosity.saturating_add(2),
            "--help" | "-h" => options.mode = Mode::Help,
            other => return Err(anyhow!("Unknown option: {}", other)),
        }
    }

    Ok(options)
}

fn parse_index(text: &str) -> Result<usize> {
    text.parse()
        .map_err(|_| anyhow!("Invalid source number: {}", text))
}

fn init_logging(options: &Options) -> Result<()> {
    let level = match options.verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    if options.mode == Mode::Interactive {
        // The terminal belongs to the UI, so logs go to a file
        let file = File::create(&options.log)
            .with_context(|| format!("Failed to create log file: {:?}", options.log))?;
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.validate().context("Refusing to start")?;
    Ok(config)
}

fn connect_transport(source: Option<usize>) -> Result<Option<MidiTransportInput>> {
    source
        .map(|index| {
            MidiTransportInput::connect(index)
                .context("Use --list-sources to see available sources")
        })
        .transpose()
}

fn watch_config(path: Option<&Path>) -> Option<ConfigWatcher> {
    let path = path?;
    match ConfigWatcher::new(path, None) {
        Ok(watcher) => {
            info!(path = ?watcher.watched_path(), "watching config for changes");
            Some(watcher)
        }
        Err(e) => {
            warn!(error = %e, "config hot reload unavailable");
            None
        }
    }
}

/// Apply a config event, returning a message for the operator
fn apply_config_event(engine: &mut SequencerEngine, event: ConfigEvent) -> String {
    match event {
        ConfigEvent::Reloaded(config) => match engine.apply_live_config(&config) {
            Ok(()) => format!(
                "config reloaded: {:.1} BPM, {}ms gate",
                config.timing.tempo_bpm, config.timing.gate_length_ms
            ),
            Err(e) => {
                warn!(error = %e, "reloaded config rejected");
                format!("config rejected: {}", e)
            }
        },
        ConfigEvent::Error(message) => {
            warn!(%message, "config reload failed");
            message
        }
    }
}

fn run_interactive(options: &Options) -> Result<()> {
    let config = load_config(options.config.as_deref())?;
    let time = MonotonicTime::new();

    let mut panel = SimulatedPanel::new(config.input.switch_active_low);
    let mut engine = SequencerEngine::new(&config, panel.rest(), time.now())?;
    let mut lines = GateLines::new(config.grid.tracks);
    let transport = connect_transport(options.midi.or(config.midi.source))?;
    let watcher = watch_config(options.config.as_deref());

    let mut display = TerminalDisplay::new(config.display.width, config.display.height)
        .context("Failed to initialise terminal")?;
    if let Some(input) = &transport {
        display.set_message(format!("following MIDI transport from {}", input.port_name()));
    }

    let mut last_redraw: Option<Instant> = None;

    loop {
        if let Some((code, modifiers)) = display.poll_key(FRAME_INTERVAL)? {
            match command_for_key(code, modifiers) {
                Some(PanelCommand::Quit) => break,
                Some(PanelCommand::AdjustTempo(delta)) => match engine.nudge_tempo(delta) {
                    Ok(bpm) => display.set_message(format!("tempo {:.1} BPM", bpm)),
                    Err(e) => {
                        warn!(error = %e, "tempo change rejected");
                        display.set_message(e.to_string());
                    }
                },
                Some(PanelCommand::ToggleTransport) => {
                    engine.toggle_transport(time.now(), &mut lines)
                }
                Some(command) => panel.push(command),
                None => {}
            }
        }

        let now = time.now();
        if let Some(input) = &transport {
            for event in input.recv_all() {
                engine.handle_transport(event, now, &mut lines);
            }
        }
        if let Some(watcher) = &watcher {
            for event in watcher.recv_all() {
                let message = apply_config_event(&mut engine, event);
                display.set_message(message);
            }
        }

        let before = lines.clone();
        let report = engine.poll(panel.sample(), now, &mut lines);

        let changed = report.clock.ticked || !report.input.is_empty() || lines != before;
        let stale = last_redraw.map_or(true, |at| at.elapsed() >= REDRAW_INTERVAL);
        if changed || stale {
            display.set_status(PanelStatus::capture(&engine, &lines));
            engine.render(&mut display);
            last_redraw = Some(Instant::now());
        }
    }

    engine.close_gates(&mut lines);
    info!("quit");
    Ok(())
}

/// Output lines that log every edge
struct LoggedLines {
    lines: GateLines,
    start: Instant,
}

impl GateOutput for LoggedLines {
    fn set_line(&mut self, track: usize, high: bool) {
        info!(
            t_ms = self.start.elapsed().as_millis() as u64,
            track,
            high,
            "gate"
        );
        self.lines.set_line(track, high);
    }
}

fn run_headless(options: &Options, duration: Duration) -> Result<()> {
    let config = load_config(options.config.as_deref())?;
    let time = MonotonicTime::new();

    let mut panel = SimulatedPanel::new(config.input.switch_active_low);
    let mut engine = SequencerEngine::new(&config, panel.rest(), time.now())?;
    let mut output = LoggedLines {
        lines: GateLines::new(config.grid.tracks),
        start: Instant::now(),
    };
    let mut frame = FrameBuffer::new(config.display.width, config.display.height);
    let transport = connect_transport(options.midi.or(config.midi.source))?;
    let watcher = watch_config(options.config.as_deref());

    info!(seconds = duration.as_secs_f64(), "running headless");
    engine.render(&mut frame);

    while time.now() < duration {
        let now = time.now();
        if let Some(input) = &transport {
            for event in input.recv_all() {
                engine.handle_transport(event, now, &mut output);
            }
        }
        if let Some(watcher) = &watcher {
            for event in watcher.recv_all() {
                let message = apply_config_event(&mut engine, event);
                info!(%message, "config");
            }
        }

        let report = engine.poll(panel.sample(), now, &mut output);
        if report.clock.ticked {
            engine.render(&mut frame);
        }
        thread::sleep(FRAME_INTERVAL);
    }

    engine.close_gates(&mut output);

    println!("Ran {:.1}s at {:.1} BPM", duration.as_secs_f64(), engine.clock().bpm());
    for track in 0..config.grid.tracks {
        println!("  track {}: {} pulses", track + 1, output.lines.pulses(track));
    }
    println!("  frames drawn: {}", frame.present_count());
    Ok(())
}

fn monitor_input(source: usize) -> Result<()> {
    println!("Connecting to MIDI source {}...", source);
    let input = MidiTransportInput::connect(source)?;

    println!("Monitoring {} (press Ctrl+C to stop)...", input.port_name());
    println!();

    let start_time = Instant::now();
    let run_duration = Duration::from_secs(30);

    while start_time.elapsed() < run_duration {
        while let Some(msg) = input.try_recv_message() {
            match TransportEvent::from_message(&msg) {
                Some(TransportEvent::Clock) => {}
                Some(event) => println!("{:?} -> {:?}", msg, event),
                None => println!("{:?}", msg),
            }
        }

        // Small sleep to prevent busy-waiting
        thread::sleep(Duration::from_millis(1));
    }

    println!();
    println!("Monitor complete!");
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage information");
            std::process::exit(1);
        }
    };

    if options.mode == Mode::Help {
        print_usage();
        return Ok(());
    }

    init_logging(&options)?;

    match options.mode {
        Mode::Interactive => run_interactive(&options),
        Mode::Headless(duration) => run_headless(&options, duration),
        Mode::ListSources => print_sources(),
        Mode::Monitor(source) => monitor_input(source),
        Mode::Help => Ok(()),
    }
}
