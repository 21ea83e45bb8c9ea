use std::env;
use std::path::PathBuf;

use csvforge_core::{Schema, load_schema};
use csvforge_generate::{GenerateOptions, GenerationEngine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut schema_path: Option<PathBuf> = None;
    let mut out_path: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" => schema_path = args.next().map(PathBuf::from),
            "--out" => out_path = args.next().map(PathBuf::from),
            "--seed" => seed = args.next().map(|value| value.parse()).transpose()?,
            _ => return Err(format!("unexpected argument: {arg}").into()),
        }
    }

    let mut schema = match schema_path {
        Some(path) => load_schema(&path)?,
        None => Schema::example(),
    };
    let out_path = out_path.unwrap_or_else(|| PathBuf::from("output/example.csv"));

    let options = GenerateOptions {
        seed,
        ..GenerateOptions::default()
    };
    let engine = GenerationEngine::new(options);
    let report = engine.run_to_path(&mut schema, &out_path)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
