//! Interactive front end: reads `run`, `resume` and `quit` from stdin and
//! plots on a preview device.

use std::io::BufRead;
use std::thread;

use camino::Utf8PathBuf;
use miette::{IntoDiagnostic, miette};
use plotyard::{Config, Dispatcher, JsonLinesSource, PreviewDevice, RunArtifact, Trigger};

const USAGE: &str = "Usage: plotyard --records <file> [--config <file>] [--resume <artifact>] [--fail-after <n>]";

/// Fault code used by `--fail-after`: the pause button.
const REHEARSAL_FAULT: i32 = 102;

#[derive(Debug, Default)]
struct Args {
    config: Option<Utf8PathBuf>,
    records: Option<Utf8PathBuf>,
    resume: Option<Utf8PathBuf>,
    fail_after: Option<usize>,
}

fn parse_args() -> miette::Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value = || iter.next().ok_or_else(|| miette!("{} needs a value\n{}", flag, USAGE));
        match flag.as_str() {
            "--config" => args.config = Some(value()?.into()),
            "--records" => args.records = Some(value()?.into()),
            "--resume" => args.resume = Some(value()?.into()),
            "--fail-after" => {
                let n = value()?;
                args.fail_after = Some(
                    n.parse()
                        .map_err(|_| miette!("--fail-after expects a count, got `{}`", n))?,
                );
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other => return Err(miette!("unknown argument `{}`\n{}", other, USAGE)),
        }
    }
    Ok(args)
}

fn main() -> miette::Result<()> {
    // Logs go to stderr; stdout stays free for prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let records = args
        .records
        .ok_or_else(|| miette!("--records is required\n{}", USAGE))?;
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut device = PreviewDevice::new();
    if let Some(n) = args.fail_after {
        device = device.fail_after(n, REHEARSAL_FAULT);
    }

    let (mut dispatcher, sender) = Dispatcher::new(device, JsonLinesSource::new(records), config)?;
    if let Some(path) = &args.resume {
        let artifact = RunArtifact::load(path)?;
        let run_id = path
            .file_stem()
            .and_then(|stem| stem.strip_suffix("_artifact"))
            .unwrap_or("resumed")
            .to_string();
        tracing::info!(%path, remaining = artifact.remaining.len(), "loaded artifact, send `resume` to continue");
        dispatcher = dispatcher.with_pending(run_id, artifact);
    }

    let input = thread::Builder::new()
        .name("plotyard-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match line.trim() {
                    "run" => {
                        sender.fire(Trigger::Run);
                    }
                    "resume" => {
                        sender.fire(Trigger::Resume);
                    }
                    "quit" | "exit" => break,
                    "" => {}
                    other => tracing::warn!(command = other, "expected `run`, `resume` or `quit`"),
                }
            }
        })
        .into_diagnostic()?;

    dispatcher.run();
    input
        .join()
        .map_err(|_| miette!("stdin reader panicked"))?;

    let session = dispatcher.session();
    tracing::info!(
        state = ?session.state(),
        drawn = session.device().drawn(),
        pending = dispatcher.pending().is_some(),
        "shutting down"
    );
    Ok(())
}
