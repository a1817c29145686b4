//! dutvision CLI - project setup and diagnostics
//!
//! Usage:
//!     dutvision setup [--dir <path>]
//!     dutvision check
//!     dutvision list-devices
//!
//! The automation core lives in the `dut_vision` library; this binary only
//! provisions project skeletons and reports on the environment.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dut_vision::{CapabilityReport, ToolStatus};
use std::path::{Path, PathBuf};

const CONFIG_TEMPLATE: &str = r#"# dut_vision configuration
#
# One [DUT.<name>] table per managed device. `device_id` is the serial shown
# by `adb devices`.

[paths]
resource_dir = "Resources"
output_dir = "output"

[DUT.Phone]
device_id = "emulator-5554"
"#;

/// dut_vision - keyword automation for Android DUTs
#[derive(Parser, Debug)]
#[command(name = "dutvision")]
#[command(about = "Setup and diagnostics for the dut_vision automation library")]
#[command(after_help = r#"Examples:
    # Scaffold a project in the current directory
    dutvision setup

    # Scaffold into a specific directory
    dutvision setup --dir my-tests

    # Report which external tools are available
    dutvision check

    # List attached devices
    dutvision list-devices
"#)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Create a project skeleton: config file and resource directories
    Setup {
        /// Target directory for the project
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Probe for required external tools (adb, tesseract)
    Check,
    /// List devices attached to adb
    ListDevices,
}

fn setup(dir: &Path) -> Result<()> {
    for sub in ["Resources/Coordinates", "Resources/images", "output"] {
        let path = dir.join(sub);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Creating {}", path.display()))?;
        println!("\u{2705} Created {}", path.display());
    }

    let config_path = dir.join("dutvision.toml");
    if config_path.exists() {
        println!("\u{2139} Config already exists: {}", config_path.display());
    } else {
        std::fs::write(&config_path, CONFIG_TEMPLATE)
            .with_context(|| format!("Writing {}", config_path.display()))?;
        println!("\u{2705} Wrote {}", config_path.display());
    }

    println!("\nNext steps:");
    println!("  1. Edit dutvision.toml with your device serials");
    println!("  2. Run `dutvision check` to verify adb and tesseract");
    Ok(())
}

fn check() -> Result<()> {
    println!("\u{1F50D} Probing external tools...");
    println!("{}", "-".repeat(50));

    let report = CapabilityReport::probe();

    print_status("adb", &report.adb, "shell commands, gestures, screenshots, recording");
    print_status("tesseract", &report.tesseract, "OCR-based taps");

    if report.missing().is_empty() {
        println!("\n\u{2705} All external tools available");
        Ok(())
    } else {
        bail!("missing tools: {}", report.missing().join(", "));
    }
}

fn print_status(name: &str, status: &ToolStatus, gates: &str) {
    match status {
        ToolStatus::Found(path) => {
            println!("\u{2705} {} -> {}", name, path.display());
        }
        ToolStatus::Missing => {
            println!("\u{274C} {} not found (needed for: {})", name, gates);
        }
    }
}

async fn list_devices() -> Result<()> {
    let report = CapabilityReport::probe();
    if !report.adb.is_found() {
        bail!("adb is not installed or not in PATH");
    }

    let devices = dut_vision::list_devices(&report.adb_command()).await?;
    if devices.is_empty() {
        println!("No devices attached");
        return Ok(());
    }

    println!("{:<24} {:<10} {}", "DEVICE", "STATUS", "MODEL");
    for device in devices {
        println!(
            "{:<24} {:<10} {}",
            device.device_id,
            device.status,
            device.model.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Setup { dir } => setup(&dir),
        CliCommand::Check => check(),
        CliCommand::ListDevices => list_devices().await,
    }
}
