use crate::cmd::{with_client, TargetArgs};
use crate::exit::{supplicant_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    with_client(target, |client| {
        let status = client
            .status()
            .map_err(|err| supplicant_error("status failed", err))?;
        print_status(&status, format);
        Ok(SUCCESS)
    })
}
