// Command-line front end for flashpatch.
//
// `build` writes a patch for a base/target pair, `inspect` prints a patch
// and optionally simulates applying it, `config` prints build features and
// defaults. Errors go to stderr prefixed with the program name; commands
// return a process exit code.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::decoder::PatchFile;
use crate::diff::DiffMode;
use crate::encoder::{DEFAULT_ARENA_FACTOR, DEFAULT_MERGE_GAP, DEFAULT_MIN_CHUNK, PatchOptions};
use crate::format::{DigestAlgo, FORMAT_VERSION, HEADER_LEN, MetadataValues};
use crate::introspect::default_introspector;
use crate::io::build_patch_file;

// ---------------------------------------------------------------------------
// Hex parsing (accepts an optional 0x prefix)
// ---------------------------------------------------------------------------

fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() {
        return Err("empty hex value".into());
    }
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// In-place binary patch generator for firmware-resident model artifacts.
#[derive(Parser, Debug)]
#[command(
    name = "flashpatch",
    version,
    about = "Binary patch generator for firmware-resident model artifacts",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (errors only).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Build a patch turning BASE into TARGET.
    Build(BuildArgs),
    /// Print a patch, optionally simulating it against a base artifact.
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DigestArg {
    None,
    Crc32,
}

impl From<DigestArg> for DigestAlgo {
    fn from(arg: DigestArg) -> Self {
        match arg {
            DigestArg::None => DigestAlgo::None,
            DigestArg::Crc32 => DigestAlgo::Crc32,
        }
    }
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Artifact currently on the device.
    #[arg(value_hint = ValueHint::FilePath)]
    base: PathBuf,

    /// Artifact to produce.
    #[arg(value_hint = ValueHint::FilePath)]
    target: PathBuf,

    /// Patch output path.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Digest for header and chunk integrity checks.
    #[arg(long, value_enum, default_value_t = DigestArg::Crc32)]
    digest: DigestArg,

    /// Merge runs separated by at most this many unchanged bytes.
    #[arg(long = "merge-gap", default_value_t = DEFAULT_MERGE_GAP)]
    merge_gap: u32,

    /// Fold runs shorter than this into a nearby predecessor.
    #[arg(long = "min-chunk", default_value_t = DEFAULT_MIN_CHUNK)]
    min_chunk: u32,

    /// Diff only the constant weight buffers of the target model.
    #[arg(long = "weights-only")]
    weights_only: bool,

    /// Derive metadata (ABI, fingerprints, arena) from the target model.
    #[arg(long = "auto-meta")]
    auto_meta: bool,

    /// Multiplier for the arena estimate; 0 disables it.
    #[arg(long = "arena-factor", default_value_t = DEFAULT_ARENA_FACTOR)]
    arena_factor: f64,

    /// Required arena bytes (overrides the estimate).
    #[arg(long = "req-arena")]
    req_arena: Option<u32>,

    /// Required runtime ABI version.
    #[arg(long)]
    abi: Option<u16>,

    /// Opset fingerprint, hex.
    #[arg(long = "opset-hash", value_parser = parse_hex_u32)]
    opset_hash: Option<u32>,

    /// I/O fingerprint, hex.
    #[arg(long = "io-hash", value_parser = parse_hex_u32)]
    io_hash: Option<u32>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// Base artifact to simulate the patch against.
    #[arg(long, value_hint = ValueHint::FilePath)]
    base: Option<PathBuf>,

    /// Expected result of the simulation.
    #[arg(long, value_hint = ValueHint::FilePath, requires = "base")]
    target: Option<PathBuf>,
}

/// Global flags shared by every command.
#[derive(Debug, Clone, Copy)]
struct Globals {
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("flashpatch".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        if let Cmd::Build(args) = &cli.command {
            let _ = build_patch_options(args);
        }
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("flashpatch version {version}");

    let tflite = cfg!(feature = "tflite") as u8;
    eprintln!("TFLITE={tflite}");
    eprintln!("INTROSPECTOR={}", default_introspector().name());
    eprintln!("FORMAT_VERSION={FORMAT_VERSION}");
    eprintln!("DEFAULT_DIGEST={}", DigestAlgo::default().name());
    eprintln!("DEFAULT_MERGE_GAP={DEFAULT_MERGE_GAP}");
    eprintln!("DEFAULT_MIN_CHUNK={DEFAULT_MIN_CHUNK}");
    eprintln!("DEFAULT_ARENA_FACTOR={DEFAULT_ARENA_FACTOR}");

    0
}

// ---------------------------------------------------------------------------
// Build PatchOptions from CLI arguments
// ---------------------------------------------------------------------------

fn build_patch_options(args: &BuildArgs) -> PatchOptions {
    PatchOptions {
        digest: args.digest.into(),
        merge_gap: args.merge_gap,
        min_chunk: args.min_chunk,
        mode: if args.weights_only {
            DiffMode::WeightRanges
        } else {
            DiffMode::WholeArtifact
        },
        auto_meta: args.auto_meta,
        arena_factor: (args.arena_factor > 0.0).then_some(args.arena_factor),
        manual: MetadataValues {
            req_arena_bytes: args.req_arena,
            abi_version: args.abi,
            opset_fingerprint: args.opset_hash,
            io_fingerprint: args.io_hash,
        },
    }
}

// ---------------------------------------------------------------------------
// Build command
// ---------------------------------------------------------------------------

fn cmd_build(args: &BuildArgs, globals: Globals) -> i32 {
    if args.output.exists() && !globals.force {
        eprintln!(
            "flashpatch: output file exists, use -f to overwrite: {}",
            args.output.display()
        );
        return 1;
    }

    let opts = build_patch_options(args);
    let introspector = default_introspector();
    let stats = match build_patch_file(
        &args.base,
        &args.target,
        &args.output,
        &opts,
        introspector.as_ref(),
    ) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("flashpatch: {e}");
            return 1;
        }
    };

    if globals.verbose > 0 && !globals.quiet {
        eprintln!(
            "flashpatch: base {} bytes, target {} bytes, {} chunks ({} raw, {} rle), \
             metadata {} bytes, patch {} bytes",
            stats.base_len,
            stats.target_len,
            stats.chunks,
            stats.raw_chunks,
            stats.rle_chunks,
            stats.metadata_len,
            stats.patch_len
        );
    }

    if globals.json_output {
        let json = serde_json::json!({
            "command": "build",
            "base_size": stats.base_len,
            "target_size": stats.target_len,
            "chunks": stats.chunks,
            "raw_chunks": stats.raw_chunks,
            "rle_chunks": stats.rle_chunks,
            "payload_bytes": stats.payload_bytes,
            "metadata_bytes": stats.metadata_len,
            "patch_size": stats.patch_len,
            "auto_metadata": stats.auto_metadata,
            "digest": opts.digest.name(),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn print_patch(patch: &PatchFile, verbose: u8) {
    let hdr = &patch.header;
    println!("flashpatch version:    {}", hdr.version);
    println!("digest:                {}", hdr.digest_algo.name());
    println!("base length:           {}", hdr.base_length);
    println!("target length:         {}", hdr.target_length);
    if let Some(crc) = hdr.base_crc32() {
        println!("base crc32:            {crc:#010x}");
    }
    if let Some(crc) = hdr.target_crc32() {
        println!("target crc32:          {crc:#010x}");
    }
    println!("metadata length:       {}", hdr.metadata_length);
    println!("chunk count:           {}", hdr.chunk_count);

    let values = patch.metadata_values();
    if let Some(v) = values.req_arena_bytes {
        println!("  required arena:      {v}");
    }
    if let Some(v) = values.abi_version {
        println!("  ABI version:         {v}");
    }
    if let Some(v) = values.opset_fingerprint {
        println!("  opset fingerprint:   {v:#010x}");
    }
    if let Some(v) = values.io_fingerprint {
        println!("  I/O fingerprint:     {v:#010x}");
    }
    for rec in patch.records.iter().filter(|r| r.tag >= crate::format::TAG_VENDOR_BEGIN) {
        println!("  vendor tag {:#04x}:     {} bytes", rec.tag, rec.value.len());
    }

    if verbose > 0 {
        println!("  OFFSET     LEN  ENC  CRC");
        for chunk in &patch.chunks {
            let crc = chunk
                .crc32
                .map_or_else(|| "-".to_string(), |c| format!("{c:#010x}"));
            println!(
                "  {:<10} {:<4} {:<4} {crc}",
                chunk.offset,
                chunk.payload.len(),
                chunk.encoding.name()
            );
        }
    }
}

fn cmd_inspect(args: &InspectArgs, globals: Globals) -> i32 {
    let bytes = match std::fs::read(&args.patch) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("flashpatch: patch file: {}: {e}", args.patch.display());
            return 1;
        }
    };
    let patch = match PatchFile::parse(&bytes) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("flashpatch: invalid patch: {e}");
            return 1;
        }
    };

    if !globals.quiet {
        print_patch(&patch, globals.verbose);
    }

    let mut verified = None;
    if let Some(base_path) = &args.base {
        let base = match std::fs::read(base_path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("flashpatch: base file: {}: {e}", base_path.display());
                return 1;
            }
        };
        let ok = match patch.apply(&base) {
            Ok(image) => match &args.target {
                Some(target_path) => {
                    let target = match std::fs::read(target_path) {
                        Ok(t) => t,
                        Err(e) => {
                            eprintln!("flashpatch: target file: {}: {e}", target_path.display());
                            return 1;
                        }
                    };
                    let target_len = patch.header.target_length as usize;
                    let same = image[..target_len] == target[..];
                    if !same {
                        eprintln!(
                            "flashpatch: applied patch does not reproduce {}",
                            target_path.display()
                        );
                    }
                    same
                }
                None => true,
            },
            Err(e) => {
                eprintln!("flashpatch: apply failed: {e}");
                false
            }
        };
        if ok && !globals.quiet {
            println!("verify:                OK");
        }
        verified = Some(ok);
    }

    if globals.json_output {
        let json = serde_json::json!({
            "command": "inspect",
            "patch_size": bytes.len(),
            "header_size": HEADER_LEN,
            "digest": patch.header.digest_algo.name(),
            "base_length": patch.header.base_length,
            "target_length": patch.header.target_length,
            "metadata_bytes": patch.metadata.len(),
            "metadata_records": patch.records.len(),
            "chunks": patch.chunks.len(),
            "verified": verified,
        });
        eprintln!("{json:#}");
    }

    if verified == Some(false) { 1 } else { 0 }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let globals = Globals {
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
    };

    let exit_code = match &cli.command {
        Cmd::Build(args) => cmd_build(args, globals),
        Cmd::Inspect(args) => cmd_inspect(args, globals),
        Cmd::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
