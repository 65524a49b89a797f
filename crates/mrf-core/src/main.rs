//! MRF Denoise - Gibbs sampling + EM for quantized images
//!
//! The main entry point for mrf-denoise, handling:
//! - EM denoising runs over JSON label grids
//! - Default parameter matrices
//! - Configuration validation and schema export

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use mrf_common::{
    AffinityScale, Error, Grid, OutputFormat, StructuredError, SweepOrder, SCHEMA_VERSION,
};
use mrf_config::{load_config, resolve_config, DenoiseConfig, PresetName};
use mrf_core::exit_codes::ExitCode;
use mrf_core::inference::{default_j, default_mu, EmDriver};
use mrf_core::log_event;
use mrf_core::logging::{
    event_names, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use mrf_core::report::EmReport;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// MRF Denoise - recover quantized images with Gibbs sampling and EM
#[derive(Parser)]
#[command(name = "mrf-denoise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Denoise a label grid with EM over Gibbs samples
    Run(RunArgs),

    /// Print the built-in J and mu for a color count
    Defaults(DefaultsArgs),

    /// Validate a configuration file
    Check(CheckArgs),

    /// Print the JSON schema of the configuration file
    Schema,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct RunArgs {
    /// Noisy label grid (JSON: nested rows or {"rows","cols","cells"})
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Configuration file (overrides MRF_DENOISE_CONFIG and the XDG file)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Iteration preset applied on top of the config (quick, standard, thorough)
    #[arg(long)]
    preset: Option<PresetName>,

    /// Random seed; drawn and recorded when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Number of labels K
    #[arg(long)]
    n_colors: Option<usize>,

    /// EM cycles
    #[arg(long)]
    em_iters: Option<usize>,

    /// Gibbs sweeps per EM cycle
    #[arg(long)]
    gibbs_iters: Option<usize>,

    /// Sweeps discarded before aggregation
    #[arg(long)]
    burnin: Option<usize>,

    /// Thinning stride after burn-in
    #[arg(long)]
    sample_every: Option<usize>,

    /// Inverse temperature
    #[arg(long)]
    beta: Option<f64>,

    /// Pseudo-count added to every co-occurrence cell
    #[arg(long)]
    smoothing: Option<f64>,

    /// Pixel visitation order
    #[arg(long, value_enum)]
    sweep_order: Option<SweepOrder>,

    /// Count-to-affinity convention of the estimator
    #[arg(long, value_enum)]
    affinity_scale: Option<AffinityScale>,

    /// Write the report here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Include the last cycle's Gibbs samples in the report
    #[arg(long)]
    include_samples: bool,
}

impl RunArgs {
    fn apply_overrides(&self, config: &mut DenoiseConfig) {
        if let Some(preset) = self.preset {
            preset.apply(config);
        }
        if let Some(v) = self.n_colors {
            config.n_colors = v;
        }
        if let Some(v) = self.em_iters {
            config.n_em_iters = v;
        }
        if let Some(v) = self.gibbs_iters {
            config.n_gibbs_iters = v;
        }
        if let Some(v) = self.burnin {
            config.burnin = v;
        }
        if let Some(v) = self.sample_every {
            config.sample_every = v;
        }
        if let Some(v) = self.beta {
            config.beta = v;
        }
        if let Some(v) = self.smoothing {
            config.smoothing = v;
        }
        if let Some(v) = self.sweep_order {
            config.sweep_order = v;
        }
        if let Some(v) = self.affinity_scale {
            config.affinity_scale = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

#[derive(Args, Debug)]
struct DefaultsArgs {
    /// Number of labels K
    #[arg(long, short = 'k', default_value_t = 2)]
    n_colors: usize,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Configuration file to validate (defaults to the resolved one)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Clean,
                _ => ExitCode::ArgsError,
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = if cli.global.log_level.is_some() {
        cli.global.log_level
    } else if cli.global.quiet {
        Some(LogLevel::Error)
    } else if cli.global.verbose > 0 {
        let mut level = LogLevel::Info;
        for _ in 0..cli.global.verbose {
            level = level.louder();
        }
        Some(level)
    } else {
        None
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let ctx = LogContext::generate();
    let exit_code = match &cli.command {
        Commands::Run(args) => run_denoise(&cli.global, args, &ctx),
        Commands::Defaults(args) => run_defaults(&cli.global, args, &ctx),
        Commands::Check(args) => run_check(&cli.global, args, &ctx),
        Commands::Schema => run_schema(&ctx),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_denoise(global: &GlobalOpts, args: &RunArgs, ctx: &LogContext) -> ExitCode {
    let resolved = resolve_config(args.config.as_deref());
    let loaded = match load_config(&resolved) {
        Ok(loaded) => loaded,
        Err(e) => {
            log_event!(
                ctx,
                ERROR,
                event_names::CONFIG_ERROR,
                Stage::Init,
                "Failed to load configuration"
            );
            return output_error(global, ctx, &Error::from(e), ExitCode::ConfigError);
        }
    };
    match &resolved.path {
        Some(path) => log_event!(
            ctx,
            DEBUG,
            event_names::CONFIG_LOADED,
            Stage::Init,
            "Loaded configuration",
            path = path.display().to_string(),
            source = resolved.source.to_string()
        ),
        None => log_event!(
            ctx,
            DEBUG,
            event_names::CONFIG_DEFAULT_USED,
            Stage::Init,
            "Using built-in configuration"
        ),
    }

    let mut config = loaded.config;
    let mut snapshot = loaded.snapshot;
    args.apply_overrides(&mut config);
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);
    snapshot.refresh(&config);

    let driver = match EmDriver::new(config.clone()) {
        Ok(driver) => driver.with_context(ctx.clone()),
        Err(e) => return output_error(global, ctx, &e, ExitCode::ArgsError),
    };

    let noisy = match read_grid(&args.input) {
        Ok(grid) => grid,
        Err(e) => {
            let code = match &e {
                Error::Json(_) => ExitCode::InputError,
                other => ExitCode::from(other),
            };
            return output_error(global, ctx, &e, code);
        }
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let result = driver.run_with(&noisy, &mut rng, |cycle| {
        if global.format == OutputFormat::Jsonl {
            if let Ok(line) = serde_json::to_string(cycle) {
                println!("{line}");
            }
        }
    });
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            let code = ExitCode::from(&e);
            return output_error(global, ctx, &e, code);
        }
    };

    let report = match EmReport::from_outcome(
        ctx.run_id.clone(),
        seed,
        config,
        snapshot,
        outcome,
        args.include_samples,
    ) {
        Ok(report) => report,
        Err(e) => return output_error(global, ctx, &e, ExitCode::InternalError),
    };

    let payload = match global.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report),
        OutputFormat::Jsonl => serde_json::to_string(&report),
        OutputFormat::Summary => Ok(report.summary_line()),
    };
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return output_error(global, ctx, &Error::from(e), ExitCode::InternalError),
    };

    if let Err(e) = write_payload(args.output.as_deref(), &payload) {
        return output_error(global, ctx, &e, ExitCode::IoError);
    }
    log_event!(
        ctx,
        INFO,
        event_names::REPORT_WRITTEN,
        Stage::Report,
        "Report written",
        cycles = report.cycles.len(),
        seed = seed
    );
    ExitCode::Clean
}

fn run_defaults(global: &GlobalOpts, args: &DefaultsArgs, ctx: &LogContext) -> ExitCode {
    let (j, mu) = match (default_j(args.n_colors), default_mu(args.n_colors)) {
        (Ok(j), Ok(mu)) => (j, mu),
        (Err(e), _) | (_, Err(e)) => return output_error(global, ctx, &e, ExitCode::ArgsError),
    };

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "n_colors": args.n_colors,
                "j": j,
                "mu": mu,
            });
            let text = if global.format == OutputFormat::Json {
                serde_json::to_string_pretty(&response)
            } else {
                serde_json::to_string(&response)
            };
            match text {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    return output_error(global, ctx, &Error::from(e), ExitCode::InternalError)
                }
            }
        }
        OutputFormat::Summary => {
            println!("J (K={}):", args.n_colors);
            print_matrix_rows(&j.to_rows());
            println!("mu (K={}):", args.n_colors);
            print_matrix_rows(&mu.to_rows());
        }
    }
    ExitCode::Clean
}

fn run_check(global: &GlobalOpts, args: &CheckArgs, ctx: &LogContext) -> ExitCode {
    let resolved = resolve_config(args.config.as_deref());
    let loaded = match load_config(&resolved) {
        Ok(loaded) => loaded,
        Err(e) => return output_error(global, ctx, &Error::from(e), ExitCode::ConfigError),
    };

    let path = resolved.path.as_ref().map(|p| p.display().to_string());
    match global.format {
        OutputFormat::Summary => {
            println!(
                "[{}] config valid: {} ({})",
                ctx.run_id,
                path.as_deref().unwrap_or("built-in defaults"),
                resolved.source
            );
        }
        OutputFormat::Json | OutputFormat::Jsonl => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "valid",
                "path": path,
                "source": resolved.source.to_string(),
                "using_defaults": resolved.path.is_none(),
                "retained_samples": loaded.config.retained_samples(),
                "snapshot": loaded.snapshot,
            });
            match serde_json::to_string_pretty(&response) {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    return output_error(global, ctx, &Error::from(e), ExitCode::InternalError)
                }
            }
        }
    }
    ExitCode::Clean
}

fn run_schema(ctx: &LogContext) -> ExitCode {
    let schema = schemars::schema_for!(DenoiseConfig);
    match serde_json::to_string_pretty(&schema) {
        Ok(text) => {
            println!("{text}");
            ExitCode::Clean
        }
        Err(e) => {
            log_event!(
                ctx,
                ERROR,
                event_names::INTERNAL_ERROR,
                Stage::Report,
                "Schema serialization failed"
            );
            eprintln!("{e}");
            ExitCode::InternalError
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn read_grid(path: &Path) -> Result<Grid, Error> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_payload(output: Option<&Path>, payload: &str) -> Result<(), Error> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{payload}\n"))?;
            Ok(())
        }
        None => {
            println!("{payload}");
            Ok(())
        }
    }
}

fn print_matrix_rows(rows: &[Vec<f64>]) {
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>6.2}")).collect();
        println!("  {}", cells.join(" "));
    }
}

/// Report an error on stderr in the requested format.
fn output_error(global: &GlobalOpts, ctx: &LogContext, error: &Error, code: ExitCode) -> ExitCode {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "status": "error",
                "exit_code": code.as_i32(),
                "exit_code_name": code.code_name(),
                "error": StructuredError::from(error),
                "remediation": error.remediation(),
            });
            eprintln!("{}", response);
        }
        OutputFormat::Summary => {
            eprintln!("[{}] {}: {}", ctx.run_id, error.headline(), error);
        }
    }
    code
}
