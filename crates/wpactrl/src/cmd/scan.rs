use std::time::Instant;

use crossbeam_channel::RecvTimeoutError;
use wpactrl_ctrl::Ctrl;
use wpactrl_supplicant::EventKind;

use crate::cmd::{parse_duration, with_client, ScanArgs, TargetArgs};
use crate::exit::{
    ctrl_error, supplicant_error, CliError, CliResult, FAILURE, SUCCESS, TIMEOUT,
    TRANSPORT_ERROR,
};
use crate::output::{print_ack, print_event, OutputFormat};

pub fn run(args: ScanArgs, target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = if args.wait {
        Some(parse_duration(&args.wait_timeout)?)
    } else {
        None
    };

    with_client(target, |client| {
        let Some(wait) = wait else {
            client
                .scan()
                .map_err(|err| supplicant_error("scan failed", err))?;
            print_ack("scan", None, format);
            return Ok(SUCCESS);
        };

        // Attach first so no scan event can slip past.
        client
            .ctrl()
            .attach()
            .map_err(|err| ctrl_error("attach failed", err))?;
        client
            .scan()
            .map_err(|err| supplicant_error("scan failed", err))?;

        let deadline = Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let event = client
                .events()
                .recv_timeout(remaining)
                .map_err(|err| match err {
                    RecvTimeoutError::Timeout => CliError::new(
                        TIMEOUT,
                        format!("no scan results within {}", args.wait_timeout),
                    ),
                    RecvTimeoutError::Disconnected => {
                        CliError::new(TRANSPORT_ERROR, "event stream closed")
                    }
                })?;
            print_event(&event, format);

            match event.kind() {
                EventKind::ScanResults => return Ok(SUCCESS),
                EventKind::ScanFailed => {
                    return Err(CliError::new(
                        FAILURE,
                        format!("scan failed: {}", event.raw()),
                    ))
                }
                _ => {}
            }
        }
    })
}
