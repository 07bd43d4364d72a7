use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::RecvTimeoutError;
use tracing::debug;
use wpactrl_ctrl::Ctrl;

use crate::cmd::{install_ctrlc_handler, with_client, EventsArgs, TargetArgs, POLL_INTERVAL};
use crate::exit::{ctrl_error, CliError, CliResult, SUCCESS, TRANSPORT_ERROR};
use crate::output::{print_event, OutputFormat};

pub fn run(args: EventsArgs, target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    with_client(target, |client| {
        client
            .ctrl()
            .attach()
            .map_err(|err| ctrl_error("attach failed", err))?;

        let mut printed = 0usize;
        while running.load(Ordering::SeqCst) {
            let event = match client.events().recv_timeout(POLL_INTERVAL) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CliError::new(TRANSPORT_ERROR, "event stream closed"));
                }
            };

            print_event(&event, format);
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }

        debug!(printed, "interrupted");
        Ok(SUCCESS)
    })
}
