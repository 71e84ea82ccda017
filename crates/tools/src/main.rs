use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a scripted widget session on the headless globe")]
struct Args {
    /// Script file (JSON): prefs, language, frameRate and steps
    script: PathBuf,

    /// Pretty-print each emission instead of one JSON object per line
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let force_debug = env_var_bool("ATLAS_DEBUG", false);

    let script = tools::load_script(&args.script)?;
    let emissions = tools::replay(&script, force_debug)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for emission in &emissions {
        if args.pretty {
            serde_json::to_writer_pretty(&mut out, emission)?;
        } else {
            serde_json::to_writer(&mut out, emission)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn env_var_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
