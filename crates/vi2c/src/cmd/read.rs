use std::path::Path;

use vi2c_io::{read_phase, DeviceHandle};

use crate::cmd::ReadArgs;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_read, OutputFormat};

pub fn run(args: ReadArgs, device: &Path, format: OutputFormat) -> CliResult<i32> {
    let data = {
        let mut handle = DeviceHandle::open_for_read(device)
            .map_err(|err| device_error("open failed", err))?;
        read_phase(&mut handle, device, args.read_len as usize)
            .map_err(|err| device_error("read failed", err))?
    };

    print_read(&device.display().to_string(), data.as_ref(), format);
    Ok(SUCCESS)
}
