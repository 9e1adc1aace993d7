//! CLI entrypoint for `propstack`: run one load session and print the result.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use propstack::{Loader, PropsError, PropsResult, SystemProperties};

/// Output formats supported by `propstack`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One `key=value` line per entry.
    Properties,
    /// A pretty-printed JSON object.
    Json,
}

/// Parsed CLI arguments for `propstack`.
#[derive(Debug, Parser)]
#[command(name = "propstack")]
#[command(about = "Resolve layered properties and YAML sources into one flat map")]
#[command(version)]
struct Args {
    /// Directory holding bundled resources.
    #[arg(long, value_name = "path", default_value = "resources")]
    resource_dir: PathBuf,
    /// Stem of the main and profile source names.
    #[arg(long, value_name = "name", default_value = "application")]
    base_name: String,
    /// Override files, separated by commas, semicolons or spaces.
    #[arg(short = 'p', value_name = "paths")]
    props: Option<String>,
    /// System property visible to placeholders (repeatable).
    #[arg(short = 'D', value_name = "key=value", value_parser = parse_define)]
    define: Vec<(String, String)>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Properties)]
    format: OutputFormat,
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

/// Wraps a failure writing the resolved map to stdout.
fn write_failed(err: impl Into<io::Error>) -> Arc<PropsError> {
    Arc::new(PropsError::Io(err.into()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> PropsResult<()> {
    init_tracing();
    run()
}

fn run() -> PropsResult<()> {
    let args = Args::parse();
    let system = args
        .define
        .iter()
        .fold(SystemProperties::new(), |props, (key, value)| {
            props.with(key.as_str(), value.as_str())
        });
    let overrides = args
        .props
        .iter()
        .flat_map(|paths| [String::from("-p"), paths.clone()]);
    let props = Loader::builder()
        .resource_dir(args.resource_dir)
        .base_name(args.base_name)
        .fallback(system)
        .args(overrides)
        .build()
        .load()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Properties => {
            for (key, value) in props.iter() {
                writeln!(out, "{key}={value}").map_err(write_failed)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &props.into_inner()).map_err(write_failed)?;
            writeln!(out).map_err(write_failed)?;
        }
    }
    out.flush().map_err(write_failed)
}

#[cfg(test)]
mod tests {
    use super::{parse_define, write_failed};
    use propstack::PropsError;
    use rstest::rstest;

    #[rstest]
    #[case("a=b", Ok(("a", "b")))]
    #[case("url=http://x:1/?q=2", Ok(("url", "http://x:1/?q=2")))]
    #[case("empty=", Ok(("empty", "")))]
    #[case("novalue", Err(()))]
    fn parses_defines(#[case] raw: &str, #[case] expected: Result<(&str, &str), ()>) {
        let parsed = parse_define(raw);
        match expected {
            Ok((key, value)) => assert_eq!(parsed, Ok((key.to_owned(), value.to_owned()))),
            Err(()) => assert!(parsed.is_err(), "expected failure for {raw}"),
        }
    }

    #[rstest]
    fn json_write_failures_surface_as_io() {
        let json_err = serde_json::from_str::<u8>("x").expect_err("invalid json");
        let err = write_failed(json_err);
        assert!(matches!(err.as_ref(), PropsError::Io(_)), "got {err:?}");
    }
}
