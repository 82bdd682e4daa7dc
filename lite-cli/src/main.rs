use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lite", version, about = "Tokenize and render lite-html templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the marker-annotated markup and the bindings of a template.
    Tokenize {
        /// Template file; holes are written `{}`
        input: PathBuf,
    },
    /// Render a template with string values and print the markup.
    Render {
        input: PathBuf,
        /// Value for the next hole, in order
        #[arg(long = "value")]
        values: Vec<String>,
        /// Keep the sentinel comments in the output
        #[arg(long)]
        markers: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let out = match cli.command {
        Commands::Tokenize { input } => lite_cli::tokenize_cmd(&input)?,
        Commands::Render { input, values, markers } => lite_cli::render_cmd(&input, &values, markers)?,
    };
    print!("{out}");
    if !out.ends_with('\n') {
        println!();
    }
    Ok(())
}
