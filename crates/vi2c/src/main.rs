mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "vi2c", version, about = "Virtual I2C device probe")]
struct Cli {
    /// Device node to talk to.
    #[arg(
        long,
        value_name = "PATH",
        env = "VI2C_DEVICE",
        default_value = vi2c_io::DEFAULT_DEVICE_PATH,
        global = true
    )]
    device: PathBuf,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.device, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_probe_with_defaults() {
        let cli = Cli::try_parse_from(["vi2c", "probe"]).expect("probe args should parse");
        match cli.command {
            Command::Probe(args) => {
                assert_eq!(args.pattern, "01,02,03");
                assert_eq!(args.repeat, 2);
                assert_eq!(args.read_len, 1024);
                assert!(!args.loopback);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn device_flag_overrides_default() {
        let cli = Cli::try_parse_from(["vi2c", "read", "--device", "/tmp/fake-vi2c"])
            .expect("read args should parse");
        assert_eq!(cli.device, PathBuf::from("/tmp/fake-vi2c"));
        assert!(matches!(cli.command, Command::Read(_)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "vi2c",
            "write",
            "--pattern",
            "01",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_zero_repeat() {
        let err = Cli::try_parse_from(["vi2c", "probe", "--repeat", "0"])
            .expect_err("zero repeat should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
