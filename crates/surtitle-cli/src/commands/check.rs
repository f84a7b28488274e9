//! `surtitle check` -- validate a script file.
//!
//! Reports whether the script loads and flags lines the alignment
//! engine can only leave through the next line's entry zone (short
//! lines) or cannot match at all (no speakable words).

use std::path::PathBuf;

use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use surtitle_core::{normalize, zones};
use surtitle_types::{AlignmentConfig, Script};

use super::{load_config, read_script};

/// Arguments for the `check` subcommand.
#[derive(Args)]
pub struct CheckArgs {
    /// Script file: JSON array of {id, text, speaker?, note?}.
    #[arg(short, long)]
    pub script: PathBuf,

    /// Print each line's entry and exit zones.
    #[arg(long)]
    pub zones: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Per-line matching summary.
struct LineReport {
    id: String,
    tokens: usize,
    entry: String,
    exit: String,
    exit_trigger: bool,
}

fn analyze(script: &Script, config: &AlignmentConfig) -> Vec<LineReport> {
    script
        .iter()
        .map(|line| {
            let tokens = normalize(&line.text);
            let z = zones(&tokens, config.zone_tokens);
            LineReport {
                id: line.id.clone(),
                tokens: tokens.len(),
                entry: z.entry.join(" "),
                exit: z.exit.join(" "),
                exit_trigger: tokens.len() > config.short_line_tokens,
            }
        })
        .collect()
}

/// Run the `check` subcommand.
pub async fn run(args: CheckArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref()).await?;
    let script = read_script(&args.script).await?;
    let reports = analyze(&script, &config.alignment);

    println!("{}: {} lines OK", args.script.display(), script.len());

    let silent: Vec<&str> = reports
        .iter()
        .filter(|r| r.tokens == 0)
        .map(|r| r.id.as_str())
        .collect();
    if !silent.is_empty() {
        println!("  no speakable words: {}", silent.join(", "));
    }
    let short = reports
        .iter()
        .filter(|r| r.tokens > 0 && !r.exit_trigger)
        .count();
    if short > 0 {
        println!(
            "  {short} short line(s) (<= {} tokens) advance on the next line's entry only",
            config.alignment.short_line_tokens
        );
    }

    if args.zones {
        println!();
        println!("{}", zone_table(&reports));
    }
    Ok(())
}

fn zone_table(reports: &[LineReport]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["#", "ID", "TOKENS", "ENTRY", "EXIT", "EXIT TRIGGER"]);
    for (i, r) in reports.iter().enumerate() {
        let exit_trigger = if r.exit_trigger { "yes" } else { "no (short)" };
        table.add_row([
            (i + 1).to_string(),
            r.id.clone(),
            r.tokens.to_string(),
            r.entry.clone(),
            r.exit.clone(),
            exit_trigger.to_string(),
        ]);
    }
    table
}
