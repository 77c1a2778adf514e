//! CLI entrypoint for the Hashem runtime.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use hashem_runtime::{Context, Engine, EngineConfig, Source, Value};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "hashem", version, about = "Run a Hashem program")]
struct Cli {
    /// Program file.
    file: PathBuf,
    /// Function to invoke.
    #[arg(long, default_value = "main")]
    entry: String,
    /// Engine configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Arguments passed to the entry function.
    args: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let name = cli.file.display().to_string();
    let source = Source::new(config.language.clone(), text, name);

    let engine = Engine::builder().config(config).build();
    let mut context = Context::new(&engine);
    context.eval(&source)?;

    let args: Vec<Value> = cli.args.iter().map(String::as_str).map(parse_arg).collect();
    info!(entry = %cli.entry, args = args.len(), "invoking entry function");
    let result = context.invoke(&cli.entry, &args)?;
    println!("{result}");
    Ok(())
}

fn parse_arg(arg: &str) -> Value {
    if let Ok(value) = arg.parse::<i64>() {
        return Value::Int(value);
    }
    match arg {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::from(arg),
    }
}
