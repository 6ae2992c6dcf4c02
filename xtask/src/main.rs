//! Ambience Build Tasks
//!
//! Usage:
//!   cargo xtask test            - Run native tests
//!   cargo xtask wasm            - Build the browser package (wasm-pack)
//!   cargo xtask docs            - Generate documentation
//!   cargo xtask check           - Clippy + format check

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

/// Crates that build and test on the host
const NATIVE_CRATES: &[&str] = &["amb-core", "amb-tone", "amb-transition", "amb-preview"];

#[derive(Parser)]
#[command(name = "xtask", about = "Ambience build tasks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run native tests
    Test {
        /// Also run the browser tests headless (needs wasm-pack and Chrome)
        #[arg(long)]
        browser: bool,
    },
    /// Build the browser package with wasm-pack
    Wasm {
        /// Build in release mode
        #[arg(short, long)]
        release: bool,
    },
    /// Generate documentation
    Docs {
        /// Open in browser
        #[arg(short, long)]
        open: bool,
    },
    /// Check code quality
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_root = project_root()?;

    match cli.command {
        Commands::Test { browser } => run_tests(&project_root, browser),
        Commands::Wasm { release } => build_wasm(&project_root, release),
        Commands::Docs { open } => generate_docs(&project_root, open),
        Commands::Check => check_quality(&project_root),
    }
}

fn project_root() -> Result<PathBuf> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR")
        .context("CARGO_MANIFEST_DIR not set")?;

    Ok(Path::new(&manifest_dir)
        .parent()
        .context("Failed to get parent directory")?
        .to_path_buf())
}

fn package_args<'a>(command: &'a str) -> Vec<&'a str> {
    let mut args = vec![command];
    for &krate in NATIVE_CRATES {
        args.extend(["--package", krate]);
    }
    args
}

fn run(root: &Path, program: &str, args: &[&str], what: &str) -> Result<()> {
    let status = Command::new(program)
        .current_dir(root)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run {}", program))?;

    if !status.success() {
        bail!("{} failed", what);
    }
    Ok(())
}

fn run_tests(root: &Path, browser: bool) -> Result<()> {
    println!("🧪 Running tests...\n");

    run(root, "cargo", &package_args("test"), "Tests")?;

    if browser {
        println!("\n🌐 Running browser tests...\n");
        run(
            root,
            "wasm-pack",
            &["test", "--headless", "--chrome", "crates/amb-wasm"],
            "Browser tests",
        )?;
    }

    println!("\n✅ All tests passed!");
    Ok(())
}

fn build_wasm(root: &Path, release: bool) -> Result<()> {
    println!("📦 Building browser package...\n");

    let mut args = vec!["build", "crates/amb-wasm", "--target", "web"];
    args.push(if release { "--release" } else { "--dev" });

    run(root, "wasm-pack", &args, "wasm-pack build")?;

    println!("\n✅ Package written to crates/amb-wasm/pkg");
    Ok(())
}

fn generate_docs(root: &Path, open: bool) -> Result<()> {
    println!("📚 Generating documentation...\n");

    let mut args = vec!["doc", "--workspace", "--no-deps"];
    if open {
        args.push("--open");
    }

    run(root, "cargo", &args, "Documentation generation")?;

    println!("\n✅ Documentation generated!");
    Ok(())
}

fn check_quality(root: &Path) -> Result<()> {
    println!("🔍 Checking code quality...\n");

    println!("Running clippy...");
    let mut clippy = package_args("clippy");
    clippy.extend(["--all-targets", "--", "-D", "warnings"]);
    run(root, "cargo", &clippy, "Clippy")?;

    println!("\nRunning clippy (wasm32)...");
    run(
        root,
        "cargo",
        &[
            "clippy",
            "--package",
            "amb-wasm",
            "--target",
            "wasm32-unknown-unknown",
            "--",
            "-D",
            "warnings",
        ],
        "Clippy (wasm32)",
    )?;

    // Format check
    println!("\nChecking formatting...");
    let fmt_status = Command::new("cargo")
        .current_dir(root)
        .args(["fmt", "--all", "--check"])
        .status()
        .context("Failed to check formatting")?;

    if !fmt_status.success() {
        println!("⚠️  Formatting issues found. Run 'cargo fmt' to fix.");
    }

    println!("\n✅ Code quality check complete!");
    Ok(())
}
