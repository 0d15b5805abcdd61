use std::fs;
use std::path::Path;

use vi2c_io::{write_phase, DeviceHandle, Pattern};

use crate::cmd::WriteArgs;
use crate::exit::{device_error, io_error, CliResult, SUCCESS};
use crate::output::{print_written, OutputFormat};

pub fn run(args: WriteArgs, device: &Path, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;

    let written = {
        let mut handle = DeviceHandle::open_for_write(device)
            .map_err(|err| device_error("open failed", err))?;
        write_phase(&mut handle, device, &payload, args.repeat as usize)
            .map_err(|err| device_error("write failed", err))?
    };

    print_written(
        &device.display().to_string(),
        &payload.repeated(args.repeat as usize),
        written,
        format,
    );
    Ok(SUCCESS)
}

fn resolve_payload(args: &WriteArgs) -> CliResult<Pattern> {
    if let Some(data) = &args.data {
        return Pattern::new(data.as_bytes()).map_err(|err| device_error("bad --data", err));
    }
    if let Some(path) = &args.file {
        let bytes = fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return Pattern::new(bytes).map_err(|err| device_error("bad --file", err));
    }
    match &args.pattern {
        Some(pattern) => Pattern::parse(pattern).map_err(|err| device_error("bad --pattern", err)),
        None => Ok(Pattern::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::USAGE;

    fn args() -> WriteArgs {
        WriteArgs {
            pattern: None,
            data: None,
            file: None,
            repeat: 1,
        }
    }

    #[test]
    fn no_payload_uses_default_pattern() {
        assert_eq!(resolve_payload(&args()).unwrap(), Pattern::default());
    }

    #[test]
    fn data_is_written_verbatim() {
        let payload = resolve_payload(&WriteArgs {
            data: Some("hi".to_string()),
            ..args()
        })
        .expect("data payload");
        assert_eq!(payload.as_bytes(), b"hi");
    }

    #[test]
    fn empty_data_is_rejected() {
        let err = resolve_payload(&WriteArgs {
            data: Some(String::new()),
            ..args()
        })
        .expect_err("empty payload should fail");
        assert_eq!(err.code, USAGE);
    }
}
