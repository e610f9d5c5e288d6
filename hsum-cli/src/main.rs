use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

use hsum_core::ops::verify_manifest_with;
use hsum_core::{Algorithm, EngineConfig, InputMode, Job, ParseMode, VerificationOutcome};

mod logging;

#[derive(Parser)]
#[command(name = "hsum", version, about = "Create and verify checksum manifests")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long, global = true)]
    jobs: Option<usize>,
    /// More logging on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Write a checksum manifest for files and directories
    Create {
        #[arg(long, value_parser = parse_algorithm)]
        algo: Option<Algorithm>,
        /// Manifest to write (default CHECKSUMS.<algo>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Mark entries as text mode instead of binary
        #[arg(long, default_value_t = false)]
        text: bool,
        #[arg(long)]
        include: Vec<String>,
        #[arg(long)]
        exclude: Vec<String>,
        /// Print the manifest instead of writing it
        #[arg(long, default_value_t = false)]
        stdout: bool,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Verify files against a manifest
    Verify {
        /// Algorithm, when the manifest name does not tell
        #[arg(long, value_parser = parse_algorithm)]
        algo: Option<Algorithm>,
        /// Skip malformed lines instead of failing
        #[arg(long, default_value_t = false)]
        lenient: bool,
        /// Reject entries that leave the manifest's directory
        #[arg(long, default_value_t = false)]
        confine: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
        manifest: PathBuf,
    },
    /// Print digests of files
    Digest {
        /// Repeatable; all algorithms when omitted
        #[arg(long, value_parser = parse_algorithm)]
        algo: Vec<Algorithm>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn parse_algorithm(s: &str) -> Result<Algorithm, String> {
    s.parse().map_err(|e: hsum_core::HashsumError| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("hsum: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Ok(false) means the command ran but found problems.
fn run(cli: Cli) -> Result<bool> {
    let mut cfg = match &cli.config {
        Some(p) => EngineConfig::load(p)?,
        None => EngineConfig::default(),
    };
    if let Some(j) = cli.jobs {
        cfg.concurrency = j;
    }
    match cli.cmd {
        Cmd::Create { algo, output, text, include, exclude, stdout, inputs } => {
            if text {
                cfg.input_mode = InputMode::Text;
            }
            create(&cfg, algo, output, &include, &exclude, stdout, &inputs)?;
            Ok(true)
        }
        Cmd::Verify { algo, lenient, confine, json, manifest } => {
            if lenient {
                cfg.parse_mode = ParseMode::Lenient;
            }
            if confine {
                cfg.paths.confine_to_base = true;
            }
            verify(&cfg, algo, json, &manifest)
        }
        Cmd::Digest { algo, files } => digest(&cfg, &algo, &files),
    }
}

fn build_globset(includes: &[String], excludes: &[String]) -> Result<(globset::GlobSet, globset::GlobSet)> {
    let mut incb = GlobSetBuilder::new();
    let mut excb = GlobSetBuilder::new();
    if includes.is_empty() { incb.add(Glob::new("**/*")?); }
    for g in includes { incb.add(Glob::new(g)?); }
    for g in excludes { excb.add(Glob::new(g)?); }
    Ok((incb.build()?, excb.build()?))
}

fn list_files(inputs: &[PathBuf], inc: &globset::GlobSet, exc: &globset::GlobSet) -> Result<Vec<PathBuf>> {
    let mut v = vec![];
    for p in inputs {
        let md = fs::metadata(p).with_context(|| format!("stat {}", p.display()))?;
        if md.is_dir() {
            for e in WalkDir::new(p).into_iter().filter_map(|e| e.ok()) {
                if !e.file_type().is_file() { continue; }
                let rp = e.path().to_string_lossy().replace('\\', "/");
                if !inc.is_match(&rp) { continue; }
                if !exc.is_match(&rp) { v.push(e.path().to_path_buf()); }
            }
        } else if md.is_file() { v.push(p.clone()); }
    }
    v.sort();
    v.dedup();
    Ok(v)
}

fn absolute(p: &Path) -> Result<PathBuf> {
    if p.is_absolute() { return Ok(p.to_path_buf()); }
    Ok(std::env::current_dir()?.join(p))
}

/// Entry path for `file` as written in a manifest living in `base`.
fn entry_path(file: &Path, base: &Path) -> Result<String> {
    let abs = absolute(file)?;
    let rp = pathdiff::diff_paths(&abs, base).unwrap_or(abs);
    let s = rp.to_str().ok_or_else(|| anyhow!("path is not UTF-8: {}", rp.display()))?;
    Ok(s.replace('\\', "/"))
}

fn create(
    cfg: &EngineConfig,
    algo: Option<Algorithm>,
    output: Option<PathBuf>,
    includes: &[String],
    excludes: &[String],
    to_stdout: bool,
    inputs: &[PathBuf],
) -> Result<()> {
    let algorithm = algo
        .or_else(|| {
            let name = output.as_ref()?.file_name()?.to_str()?;
            Algorithm::infer_from_extension(name)
        })
        .unwrap_or(cfg.algorithm);
    let output = output.unwrap_or_else(|| PathBuf::from(format!("CHECKSUMS.{}", algorithm.extension())));
    let output = absolute(&output)?;
    let base = if to_stdout {
        std::env::current_dir()?
    } else {
        output.parent().map(Path::to_path_buf).unwrap_or(std::env::current_dir()?)
    };

    let (inc, exc) = build_globset(includes, excludes)?;
    let out_can = fs::canonicalize(&output).ok();
    let files: Vec<PathBuf> = list_files(inputs, &inc, &exc)?
        .into_iter()
        .filter(|p| out_can.is_none() || fs::canonicalize(p).ok() != out_can)
        .collect();
    let entries = files.iter().map(|f| entry_path(f, &base)).collect::<Result<Vec<_>>>()?;
    tracing::info!(files = entries.len(), algorithm = %algorithm, "hashing");

    let job = Job::new(cfg)?.with_base_dir(&base);
    let manifest = hsum_core::create::create(&entries, algorithm, cfg.input_mode, &job)
        .context("create manifest")?;

    if to_stdout {
        print!("{}", manifest.to_text());
    } else {
        fs::write(&output, manifest.to_text()).with_context(|| format!("write {}", output.display()))?;
        eprintln!("Wrote {} entries ({}) to {}", manifest.len(), algorithm, output.display());
    }
    Ok(())
}

fn verify(cfg: &EngineConfig, algo: Option<Algorithm>, json: bool, manifest: &Path) -> Result<bool> {
    let report = verify_manifest_with(manifest, algo, cfg, None)
        .with_context(|| format!("verify {}", manifest.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for r in &report.results {
            match &r.outcome {
                VerificationOutcome::Matched => println!("{}: OK", r.entry.path()),
                VerificationOutcome::Mismatched { .. } => println!("{}: FAILED", r.entry.path()),
                VerificationOutcome::Unreadable { reason } => {
                    println!("{}: FAILED open or read ({})", r.entry.path(), reason)
                }
            }
        }
    }
    eprintln!(
        "Checked {} ({}): ok={}, mismatched={}, unreadable={}",
        report.len(),
        report.algorithm,
        report.matched(),
        report.mismatched(),
        report.unreadable()
    );
    Ok(report.is_ok())
}

fn digest(cfg: &EngineConfig, algos: &[Algorithm], files: &[PathBuf]) -> Result<bool> {
    let algos: &[Algorithm] = if algos.is_empty() { &Algorithm::ALL } else { algos };
    let engine = cfg.digest_engine();
    let mut all_ok = true;
    for f in files {
        match engine.digest_many(f, algos) {
            Ok(digests) => {
                for (algo, hex) in digests {
                    println!("{:<8} {}  {}", algo.to_string(), hex, f.display());
                }
            }
            Err(e) => {
                eprintln!("hsum: {}", e);
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

