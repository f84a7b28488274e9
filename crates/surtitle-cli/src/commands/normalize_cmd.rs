//! `surtitle normalize` -- show how text is tokenized for matching.
//!
//! # Examples
//!
//! ```text
//! surtitle normalize "O Romeo, Romeo! Wherefore art thou Romeo?"
//! surtitle normalize --json "Exit, pursued by a bear."
//! ```

use clap::Args;
use surtitle_core::normalize;

/// Arguments for the `normalize` subcommand.
#[derive(Args)]
pub struct NormalizeArgs {
    /// Text to normalize (multiple arguments are joined with spaces).
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Print the tokens as a JSON array.
    #[arg(long)]
    pub json: bool,
}

/// Run the `normalize` subcommand.
pub fn run(args: &NormalizeArgs) -> anyhow::Result<()> {
    let tokens = normalize(&args.text.join(" "));
    if args.json {
        println!("{}", serde_json::to_string(&tokens)?);
    } else {
        println!("{}", tokens.join(" "));
    }
    Ok(())
}
