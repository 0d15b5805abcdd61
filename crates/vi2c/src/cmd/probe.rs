use std::path::Path;

use tracing::warn;
use vi2c_io::{Exchange, ExchangeConfig, Loopback, Pattern};

use crate::cmd::ProbeArgs;
use crate::exit::{device_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(args: ProbeArgs, device: &Path, format: OutputFormat) -> CliResult<i32> {
    let config = exchange_config(&args)?;

    let (report, backend) = if args.loopback {
        let loopback = Loopback::new();
        let report = Exchange::run_loopback(&loopback, &config)
            .map_err(|err| device_error("loopback probe failed", err))?;
        (report, "loopback")
    } else {
        let report = Exchange::run(device, &config)
            .map_err(|err| device_error("probe failed", err))?;
        (report, "device")
    };

    print_report(&report, backend, format);

    if args.expect_echo && !report.echoed() {
        warn!(path = ?report.path, "device did not echo the written bytes");
        return Ok(FAILURE);
    }
    Ok(SUCCESS)
}

fn exchange_config(args: &ProbeArgs) -> CliResult<ExchangeConfig> {
    let pattern =
        Pattern::parse(&args.pattern).map_err(|err| device_error("bad --pattern", err))?;
    Ok(ExchangeConfig {
        pattern,
        repeat: args.repeat as usize,
        read_len: args.read_len as usize,
    })
}
