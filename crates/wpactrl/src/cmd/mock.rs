use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};
use wpactrl_mock::MockSupplicant;
use wpactrl_transport::UnixDatagramListener;

use crate::cmd::{install_ctrlc_handler, MockArgs, POLL_INTERVAL};
use crate::exit::{mock_error, transport_error, CliResult, SUCCESS};

pub fn run(args: MockArgs) -> CliResult<i32> {
    let listener =
        UnixDatagramListener::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mock =
        MockSupplicant::spawn(listener).map_err(|err| mock_error("mock start failed", err))?;
    // A real daemon reports the association shortly after enabling.
    mock.on_network_enabled(|daemon, id| {
        if let Err(err) = daemon.announce_connected(id) {
            warn!(error = %err, id, "connected event not sent");
        }
    });
    info!(path = %args.path.display(), "mock supplicant listening");

    while running.load(Ordering::SeqCst) {
        thread::sleep(POLL_INTERVAL);
    }

    info!(commands = mock.commands().len(), "mock supplicant stopping");
    mock.close();
    Ok(SUCCESS)
}
