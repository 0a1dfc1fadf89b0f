//! osu! replay (.osr) parser CLI
//!
//! A command-line interface for parsing, validating, and summarizing osu!
//! replay files.
//!
//! ## Commands
//!
//! - `info` - Display quick replay metadata
//! - `parse` - Parse replay with output format options
//! - `validate` - Validate replay format (exit codes for scripting)
//! - `batch` - Process multiple replays from a directory
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG` or pass
//! `--verbose` for parser-level detail.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use osr_parser::{AccuracyCounts, HealthPoint, LzmaDecompressor, ParseOptions, Replay};

/// osu! replay (.osr) parser
#[derive(Parser)]
#[command(name = "osr-parser")]
#[command(about = "osu! replay (.osr) parser", long_about = None)]
#[command(version)]
struct Cli {
    /// Log parser internals (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display replay information
    Info {
        /// Path to the replay file
        file: PathBuf,
    },
    /// Parse a replay file
    Parse {
        /// Path to the replay file
        file: PathBuf,
        /// Output format: json, pretty
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
        /// Include the healthbar graph
        #[arg(long)]
        healthbar: bool,
        /// Include the decompressed frame stream
        #[arg(long)]
        replay_data: bool,
        /// Reject malformed healthbar tokens instead of reading them as NaN
        #[arg(long)]
        strict_healthbar: bool,
    },
    /// Validate replay format
    Validate {
        /// Path to the replay file
        file: PathBuf,
        /// Verbose error reporting
        #[arg(short, long)]
        details: bool,
    },
    /// Parse multiple replay files
    Batch {
        /// Directory containing replay files
        directory: PathBuf,
        /// Output directory for JSON files
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Generate summary report
        #[arg(long)]
        summary: bool,
        /// Keep going past failed files (the exit code still reports them)
        #[arg(long)]
        continue_on_error: bool,
    },
}

/// Output format options
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

// ============================================================================
// Serializable Output Structures
// ============================================================================

#[derive(Serialize)]
struct ParseOutput {
    file_size: usize,
    gamemode: String,
    version: i32,
    player: String,
    beatmap_hash: String,
    replay_hash: String,
    score: i32,
    max_combo: i16,
    perfect: bool,
    accuracy: AccuracyCounts,
    mods: Vec<&'static str>,
    mods_raw: i32,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_id: Option<i64>,
    frame_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    healthbar: Option<Vec<HealthPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay_data: Option<String>,
}

#[derive(Serialize)]
struct BatchSummary {
    total_files: usize,
    successful: usize,
    failed: usize,
    gamemode_distribution: HashMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    average_score: Option<i64>,
}

// ============================================================================
// Validation Result Structure
// ============================================================================

struct ValidationResult {
    read_valid: bool,
    record_valid: bool,
    decompression_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn is_valid(&self) -> bool {
        self.read_valid && self.record_valid && self.decompression_valid
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { file } => cmd_info(&file),
        Commands::Parse {
            file,
            output,
            healthbar,
            replay_data,
            strict_healthbar,
        } => cmd_parse(&file, output, healthbar, replay_data, strict_healthbar),
        Commands::Validate { file, details } => cmd_validate(&file, details),
        Commands::Batch {
            directory,
            output,
            summary,
            continue_on_error,
        } => cmd_batch(&directory, output.as_deref(), summary, continue_on_error),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_replay(file: &Path, options: ParseOptions) -> Result<(Replay, usize), String> {
    let data = std::fs::read(file).map_err(|e| format!("Failed to read file: {e}"))?;
    let replay = Replay::parse_with(&data, LzmaDecompressor, options)
        .map_err(|e| format!("Replay parsing failed: {e}"))?;
    Ok((replay, data.len()))
}

// ============================================================================
// Info Command Implementation
// ============================================================================

fn cmd_info(file: &Path) -> ExitCode {
    let (replay, file_size) = match load_replay(file, ParseOptions::default()) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    print_info(&replay, file_size);

    ExitCode::SUCCESS
}

#[allow(clippy::cast_precision_loss)]
fn print_info(replay: &Replay, file_size: usize) {
    println!("=== Replay Information ===\n");

    println!("File:");
    println!(
        "  Size: {} bytes ({:.2} KB)",
        file_size,
        file_size as f64 / 1024.0
    );
    println!("  Game Version: {}", replay.version);

    println!();

    println!("Play:");
    println!("  Player: {}", replay.player);
    println!("  Mode: {}", gamemode_label(replay));
    println!("  Beatmap: {}", replay.beatmap_hash);
    println!("  Score: {}", replay.score);
    println!(
        "  Max Combo: {}x{}",
        replay.max_combo,
        if replay.is_perfect() { " (FC)" } else { "" }
    );
    println!("  Mods: {}", replay.mod_flags());
    println!("  Played At: {}", replay.timestamp.to_rfc3339());
    if let Some(id) = replay.score_id {
        println!("  Score ID: {id}");
    }

    println!();

    print_accuracy(&replay.accuracy);

    println!();

    println!("Technical:");
    println!("  Replay Hash: {}", replay.replay_hash);
    println!("  Healthbar Points: {}", replay.healthbar.len());
    println!("  Frames: {}", frame_count(&replay.replay_data));
}

fn print_accuracy(accuracy: &AccuracyCounts) {
    println!("Judgements:");
    println!("  300: {}", accuracy.count_300);
    println!("  100: {}", accuracy.count_100);
    println!("  50: {}", accuracy.count_50);
    println!("  300k: {}", accuracy.count_300k);
    println!("  100k: {}", accuracy.count_100k);
    println!("  Miss: {}", accuracy.count_miss);
}

fn gamemode_label(replay: &Replay) -> String {
    match replay.gamemode_kind() {
        Some(mode) => mode.to_string(),
        None => format!("unknown ({})", replay.gamemode),
    }
}

fn frame_count(replay_data: &str) -> usize {
    replay_data.split(',').filter(|f| !f.is_empty()).count()
}

// ============================================================================
// Parse Command Implementation
// ============================================================================

fn cmd_parse(
    file: &Path,
    output: OutputFormat,
    include_healthbar: bool,
    include_replay_data: bool,
    strict_healthbar: bool,
) -> ExitCode {
    let options = if strict_healthbar {
        ParseOptions::strict()
    } else {
        ParseOptions::default()
    };

    let (replay, file_size) = match load_replay(file, options) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let output_data = build_output(replay, file_size, include_healthbar, include_replay_data);

    match output {
        OutputFormat::Json => print_json(&output_data),
        OutputFormat::Pretty => print_pretty(&output_data),
    }

    ExitCode::SUCCESS
}

fn build_output(
    replay: Replay,
    file_size: usize,
    include_healthbar: bool,
    include_replay_data: bool,
) -> ParseOutput {
    let mods = replay.mod_flags();
    let frame_count = frame_count(&replay.replay_data);

    ParseOutput {
        file_size,
        gamemode: gamemode_label(&replay),
        version: replay.version,
        perfect: replay.is_perfect(),
        timestamp: replay.timestamp.to_rfc3339(),
        mods: mods.names(),
        mods_raw: replay.mods,
        score: replay.score,
        max_combo: replay.max_combo,
        accuracy: replay.accuracy,
        score_id: replay.score_id,
        frame_count,
        player: replay.player,
        beatmap_hash: replay.beatmap_hash,
        replay_hash: replay.replay_hash,
        healthbar: include_healthbar.then_some(replay.healthbar),
        replay_data: include_replay_data.then_some(replay.replay_data),
    }
}

fn print_json(output: &ParseOutput) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Error serializing to JSON: {e}"),
    }
}

fn print_pretty(output: &ParseOutput) {
    println!("=== Replay ===");
    println!("Player: {}", output.player);
    println!("Mode: {}", output.gamemode);
    println!("Version: {}", output.version);
    println!("Beatmap: {}", output.beatmap_hash);
    println!("Score: {}", output.score);
    println!("Max Combo: {}", output.max_combo);
    println!("Perfect: {}", output.perfect);
    if output.mods.is_empty() {
        println!("Mods: NONE");
    } else {
        println!("Mods: {}", output.mods.join(", "));
    }
    println!("Played At: {}", output.timestamp);
    if let Some(id) = output.score_id {
        println!("Score ID: {id}");
    }
    println!("Frames: {}", output.frame_count);
    println!();

    print_accuracy(&output.accuracy);
    println!();

    if let Some(healthbar) = &output.healthbar {
        println!("=== Healthbar ({}) ===", healthbar.len());
        for point in healthbar {
            println!("  [{}ms] {:.2}", point.timestamp, point.percentage);
        }
        println!();
    }

    if let Some(replay_data) = &output.replay_data {
        println!("=== Frames ({}) ===", output.frame_count);
        // Only show the first 50 frames in pretty mode
        let frames: Vec<&str> = replay_data.split(',').filter(|f| !f.is_empty()).collect();
        for frame in frames.iter().take(50) {
            println!("  {frame}");
        }
        if frames.len() > 50 {
            println!("  ... and {} more frames", frames.len() - 50);
        }
    }
}

// ============================================================================
// Validate Command Implementation
// ============================================================================

fn cmd_validate(file: &Path, details: bool) -> ExitCode {
    let result = validate_replay(file);

    if details {
        print_validation_details(&result, file);
    } else {
        print_validation_summary(&result, file);
    }

    if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn validate_replay(file: &Path) -> ValidationResult {
    let mut result = ValidationResult {
        read_valid: false,
        record_valid: false,
        decompression_valid: false,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    // Step 1: Read file
    let data = match std::fs::read(file) {
        Ok(d) => {
            result.read_valid = true;
            d
        }
        Err(e) => {
            result.errors.push(format!("Failed to read file: {e}"));
            return result;
        }
    };

    // Step 2: Parse the record with the codec stubbed out, so a bad payload
    // is reported separately from a bad header
    let skip_payload = |_: &[u8]| -> osr_parser::Result<Vec<u8>> { Ok(Vec::new()) };
    let replay = match Replay::parse_with(&data, skip_payload, ParseOptions::default()) {
        Ok(r) => {
            result.record_valid = true;
            r
        }
        Err(e) => {
            result.errors.push(format!("Record parsing failed: {e}"));
            return result;
        }
    };

    // Step 3: Parse again with the real codec
    match Replay::parse(&data) {
        Ok(full) => {
            result.decompression_valid = true;
            if full.replay_data.is_empty() {
                result.warnings.push("Replay has no frame data".to_string());
            }
        }
        Err(e) => result.errors.push(e.to_string()),
    }

    // Additional checks
    if replay.gamemode_kind().is_none() {
        result
            .warnings
            .push(format!("Unknown gamemode byte {}", replay.gamemode));
    }
    if replay
        .healthbar
        .iter()
        .any(|p| p.timestamp.is_nan() || p.percentage.is_nan())
    {
        result
            .warnings
            .push("Healthbar contains unreadable tokens".to_string());
    }
    if replay.score_id.is_none() {
        result
            .warnings
            .push("No score ID (older format revision)".to_string());
    }

    result
}

fn print_validation_summary(result: &ValidationResult, file: &Path) {
    let status = if result.is_valid() { "VALID" } else { "INVALID" };
    println!("{}: {}", file.display(), status);
}

fn print_validation_details(result: &ValidationResult, file: &Path) {
    println!("Validating: {}\n", file.display());

    println!("Checks:");
    println!("  File read:         {}", status_icon(result.read_valid));
    println!("  Record parsing:    {}", status_icon(result.record_valid));
    println!(
        "  Decompression:     {}",
        status_icon(result.decompression_valid)
    );

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in &result.errors {
            println!("  - {error}");
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }

    println!(
        "\nResult: {}",
        if result.is_valid() { "VALID" } else { "INVALID" }
    );
}

fn status_icon(valid: bool) -> &'static str {
    if valid {
        "OK"
    } else {
        "FAILED"
    }
}

// ============================================================================
// Batch Command Implementation
// ============================================================================

fn cmd_batch(
    directory: &Path,
    output_dir: Option<&Path>,
    summary: bool,
    continue_on_error: bool,
) -> ExitCode {
    let replays = find_replays(directory);

    if replays.is_empty() {
        error!("No .osr files found in {}", directory.display());
        return ExitCode::FAILURE;
    }

    info!("Found {} replay files", replays.len());

    if let Some(dir) = output_dir {
        if !dir.exists() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                error!("Failed to create output directory: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut results: Vec<ParseOutput> = Vec::new();
    let mut error_count = 0;

    for replay in &replays {
        let name = replay.file_name().unwrap_or_default().to_string_lossy();

        match process_replay(replay, output_dir) {
            Ok(output) => {
                info!("{name}: OK");
                results.push(output);
            }
            Err(e) => {
                warn!("{name}: {e}");
                error_count += 1;
                if !continue_on_error {
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    info!(
        "Processed: {} success, {} errors",
        results.len(),
        error_count
    );

    if summary {
        generate_summary(&results, error_count, output_dir);
    }

    if error_count > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn find_replays(directory: &Path) -> Vec<PathBuf> {
    let mut replays = Vec::new();

    if let Ok(entries) = std::fs::read_dir(directory) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("osr")) {
                replays.push(path);
            }
        }
    }

    replays.sort();
    replays
}

fn process_replay(replay: &Path, output_dir: Option<&Path>) -> Result<ParseOutput, String> {
    let (parsed, file_size) = load_replay(replay, ParseOptions::default())?;
    // Frame streams are too large for batch output
    let output = build_output(parsed, file_size, false, false);

    if let Some(dir) = output_dir {
        let output_file = dir
            .join(replay.file_stem().unwrap_or_default())
            .with_extension("json");
        let content = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
        std::fs::write(&output_file, content).map_err(|e| e.to_string())?;
    }

    Ok(output)
}

fn generate_summary(results: &[ParseOutput], failed: usize, output_dir: Option<&Path>) {
    let mut gamemode_distribution: HashMap<String, usize> = HashMap::new();
    for output in results {
        *gamemode_distribution
            .entry(output.gamemode.clone())
            .or_insert(0) += 1;
    }

    #[allow(clippy::cast_possible_wrap)]
    let average_score = if results.is_empty() {
        None
    } else {
        Some(
            results.iter().map(|o| i64::from(o.score)).sum::<i64>() / results.len() as i64,
        )
    };

    let summary = BatchSummary {
        total_files: results.len() + failed,
        successful: results.len(),
        failed,
        gamemode_distribution,
        average_score,
    };

    println!("\n=== Batch Summary ===");
    println!("Files processed: {}", summary.total_files);
    println!("Successful: {}", summary.successful);
    println!("Failed: {}", summary.failed);

    println!("\nGamemode distribution:");
    for (mode, count) in &summary.gamemode_distribution {
        println!("  {mode}: {count}");
    }

    if let Some(avg) = summary.average_score {
        println!("\nAverage score: {avg}");
    }

    if let Some(dir) = output_dir {
        let summary_file = dir.join("summary.json");
        if let Ok(json) = serde_json::to_string_pretty(&summary) {
            if std::fs::write(&summary_file, json).is_ok() {
                println!("\nSummary written to: {}", summary_file.display());
            }
        }
    }
}
