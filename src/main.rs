use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use vivid::config::Settings;
use vivid::error::{Result, VividError};
use vivid::expression::Evaluator;
use vivid::model::Model;

// Evaluates every formula of a model file:
//   vivid scenario.json
// Settings come from vivid.{toml,json,yaml} and VIVID_* variables, and
// RUST_LOG overrides the log filter.
fn main() -> ExitCode {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "evaluation failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: Settings) -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| settings.model.clone())
        .ok_or_else(|| VividError::Config("no model file given".into()))?;
    let model = Model::load(&path)?;
    let scenario = model.build(settings.parse.shared())?;
    for (formula, truth) in scenario.evaluate(&Evaluator)? {
        println!("{}: {}", formula, truth);
    }
    Ok(())
}
