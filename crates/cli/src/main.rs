//! Five-stage pipeline simulator CLI.
//!
//! This binary provides a single entry point for all simulation modes. It performs:
//! 1. **Run:** Assemble a source file, simulate it under a preset or JSON config,
//!    and print registers, statistics, and optionally a per-cycle trace.
//! 2. **Compare:** Run one program under two presets and report the differences.
//! 3. **Presets:** List the named pipeline configurations.

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pipesim_core::config::BranchPredictorKind;
use pipesim_core::sim::{Simulator, load_file};
use pipesim_core::stats::STATS_SECTIONS;
use pipesim_core::trace::{JsonTrace, NullSink, TextTrace, TraceSink};
use pipesim_core::{Config, FinalState, Preset, Program};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(
    name = "pipesim",
    author,
    version,
    about = "Cycle-accurate five-stage pipeline simulator",
    long_about = "Simulate an assembly program on a five-stage in-order pipeline with optional \
                  stall-based hazard control and static branch prediction.\n\nExamples:\n  \
                  pipesim run prog.s --preset naive --trace -\n  \
                  pipesim run prog.s --config pipeline.json --memory-dump mem.txt\n  \
                  pipesim compare prog.s --left naive --right predicted-hazard-control"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate one program.
    Run(RunArgs),

    /// Simulate one program under two presets and compare the outcomes.
    Compare {
        /// Assembly source file.
        file: PathBuf,

        /// Baseline preset.
        #[arg(long, default_value = "naive")]
        left: Preset,

        /// Preset compared against the baseline.
        #[arg(long, default_value = "predicted-hazard-control")]
        right: Preset,
    },

    /// List the named presets.
    Presets,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Assembly source file.
    file: PathBuf,

    /// Named configuration to start from.
    #[arg(short, long, conflicts_with = "config")]
    preset: Option<Preset>,

    /// JSON configuration file to start from.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the branch predictor (none, always-taken, always-not-taken).
    #[arg(long)]
    predictor: Option<BranchPredictorKind>,

    /// Disable stall-based hazard control.
    #[arg(long)]
    no_hazard_control: bool,

    /// Override the cycle cap.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Write the per-cycle trace to this file (`-` for stdout).
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Trace output format.
    #[arg(long, value_enum, default_value_t = TraceFormat::Text)]
    trace_format: TraceFormat,

    /// Write the final data memory as `[NNN] -> value` lines to this file.
    #[arg(long)]
    memory_dump: Option<PathBuf>,

    /// Statistics sections to print (default: all).
    #[arg(long, value_delimiter = ',')]
    stats: Vec<String>,

    /// Print the final state as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Print only errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TraceFormat {
    /// Human-readable per-cycle listing.
    Text,
    /// One JSON object per cycle.
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => cmd_run(&args),
        Commands::Compare { file, left, right } => cmd_compare(&file, left, right),
        Commands::Presets => {
            cmd_presets();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Builds the run configuration: file or preset first, then flag overrides.
fn build_config(args: &RunArgs) -> CliResult<Config> {
    let mut config = match (&args.config, args.preset) {
        (Some(path), _) => {
            info!(path = %path.display(), "loading config");
            let json = fs::read_to_string(path)
                .map_err(|e| format!("could not read config '{}': {e}", path.display()))?;
            Config::from_json(&json)
                .map_err(|e| format!("invalid config '{}': {e}", path.display()))?
        }
        (None, Some(preset)) => Config::preset(preset),
        (None, None) => Config::default(),
    };
    if let Some(kind) = args.predictor {
        config.pipeline.branch_predictor = kind;
    }
    if args.no_hazard_control {
        config.pipeline.hazard_control = false;
    }
    if let Some(cap) = args.max_cycles {
        config.general.max_cycles = Some(cap);
    }
    Ok(config)
}

fn open_output(path: &Path) -> CliResult<Box<dyn Write>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(path)
        .map_err(|e| format!("could not create '{}': {e}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn load(path: &Path) -> CliResult<Program> {
    load_file(path).map_err(|e| format!("{}: {e}", path.display()).into())
}

fn cmd_run(args: &RunArgs) -> CliResult<()> {
    for section in &args.stats {
        if !STATS_SECTIONS.contains(&section.as_str()) {
            return Err(format!(
                "unknown stats section '{section}' (expected one of: {})",
                STATS_SECTIONS.join(", ")
            )
            .into());
        }
    }

    let config = build_config(args)?;
    let program = load(&args.file)?;
    let mut sim = Simulator::new(&program, &config)?;

    if !args.quiet && !args.json {
        println!("[*] Program: {} ({} instructions)", args.file.display(), program.len());
        println!(
            "    hazard control: {}  predictor: {}  cycle cap: {}",
            config.pipeline.hazard_control,
            config.pipeline.branch_predictor,
            sim.max_cycles()
        );
    }

    let outcome = match &args.trace {
        None => sim.run(&mut NullSink),
        Some(path) => {
            debug!(path = %path.display(), format = ?args.trace_format, "tracing enabled");
            let out = open_output(path)?;
            match args.trace_format {
                TraceFormat::Text => traced_run(&mut sim, TextTrace::new(out), TextTrace::finish)?,
                TraceFormat::Json => traced_run(&mut sim, JsonTrace::new(out), JsonTrace::finish)?,
            }
        }
    };

    let state = match outcome {
        Ok(state) => state,
        Err(e) => {
            let engine = sim.engine();
            eprintln!("\n[!] Simulation halted at cycle {}, pc {}", engine.cycle(), engine.pc());
            let mut err = io::stderr().lock();
            for status in engine.stage_statuses() {
                let _ = writeln!(err, "    {status}");
            }
            let _ = engine.registers().dump(&mut err);
            return Err(e.into());
        }
    };

    if let Some(path) = &args.memory_dump {
        let mut out = open_output(path)?;
        sim.engine().memory().dump(&mut out)?;
        out.flush()?;
    }

    if args.json {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &state)?;
        writeln!(out)?;
    } else if !args.quiet {
        print_state(&state, sim.engine().registers())?;
        state.stats.print_sections(&args.stats)?;
    }
    Ok(())
}

/// Runs with a writer-backed trace sink and surfaces trace I/O errors.
fn traced_run<S, W>(
    sim: &mut Simulator,
    mut sink: S,
    finish: fn(S) -> io::Result<W>,
) -> CliResult<Result<FinalState, pipesim_core::common::SimError>>
where
    S: TraceSink,
    W: Write,
{
    let outcome = sim.run(&mut sink);
    let _ = finish(sink).map_err(|e| format!("trace output failed: {e}"))?;
    Ok(outcome)
}

fn print_state(
    state: &FinalState,
    registers: &pipesim_core::core::arch::RegisterFile,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "\n[*] Finished after {} cycles", state.stats.cycles)?;
    writeln!(out, "\nREGISTERS")?;
    registers.dump(&mut out)
}

fn cmd_compare(file: &Path, left: Preset, right: Preset) -> CliResult<()> {
    let program = load(file)?;
    let run = |preset: Preset| -> CliResult<FinalState> {
        let mut sim = Simulator::new(&program, &Config::preset(preset))?;
        Ok(sim.run(&mut NullSink)?)
    };
    let a = run(left)?;
    let b = run(right)?;

    let mut out = io::stdout().lock();
    writeln!(out, "{:<22} {:>26} {:>26}", "", left.name(), right.name())?;
    let rows = [
        ("cycles", a.stats.cycles, b.stats.cycles),
        ("instructions", a.stats.instructions_retired, b.stats.instructions_retired),
        ("stalls.data", a.stats.stalls_data, b.stats.stalls_data),
        ("stalls.speculation", a.stats.stalls_speculation, b.stats.stalls_speculation),
        ("flushes", a.stats.flushes, b.stats.flushes),
        ("squashed", a.stats.squashed, b.stats.squashed),
        (
            "mispredictions",
            a.predictor.as_ref().map_or(0, |p| p.mispredictions),
            b.predictor.as_ref().map_or(0, |p| p.mispredictions),
        ),
    ];
    for (name, l, r) in rows {
        writeln!(out, "{name:<22} {l:>26} {r:>26}")?;
    }
    writeln!(out, "{:<22} {:>26.4} {:>26.4}", "cpi", a.stats.cpi(), b.stats.cpi())?;

    let reg_diffs: Vec<usize> = (0..a.registers.len())
        .filter(|&i| a.registers[i] != b.registers[i])
        .collect();
    let mem_diffs = a
        .memory
        .iter()
        .zip(&b.memory)
        .filter(|(x, y)| x != y)
        .count();

    if reg_diffs.is_empty() && mem_diffs == 0 {
        writeln!(out, "\nfinal state: identical")?;
    } else {
        writeln!(out, "\nfinal state: differs ({mem_diffs} memory word(s))")?;
        for i in reg_diffs {
            writeln!(out, "  x{i:<2} {:>12} {:>12}", a.registers[i], b.registers[i])?;
        }
    }
    Ok(())
}

fn cmd_presets() {
    for preset in Preset::ALL {
        let config = Config::preset(preset);
        println!(
            "{:<26} {} (hazard control: {}, predictor: {})",
            preset.name(),
            preset.description(),
            config.pipeline.hazard_control,
            config.pipeline.branch_predictor
        );
    }
}
