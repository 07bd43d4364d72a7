use std::path::Path;

use wpactrl_transport::UnixDatagramConn;

use crate::config::CtrlConfig;
use crate::ctrl::WpaCtrl;
use crate::error::Result;

/// Connect to the control socket at `path`.
pub fn connect(path: impl AsRef<Path>, config: CtrlConfig) -> Result<WpaCtrl<UnixDatagramConn>> {
    let conn = UnixDatagramConn::connect(path)?;
    WpaCtrl::with_config(conn, config)
}

/// Connect to the control socket of `iface` under `ctrl_dir`
/// (usually `/var/run/wpa_supplicant`).
pub fn connect_interface(
    ctrl_dir: impl AsRef<Path>,
    iface: &str,
    config: CtrlConfig,
) -> Result<WpaCtrl<UnixDatagramConn>> {
    let conn = UnixDatagramConn::connect_interface(ctrl_dir, iface)?;
    WpaCtrl::with_config(conn, config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use wpactrl_mock::MockSupplicant;
    use wpactrl_transport::{TransportError, UnixDatagramListener};

    use super::*;
    use crate::ctrl::Ctrl;
    use crate::error::CtrlError;

    fn make_dir(tag: &str) -> PathBuf {
        let dir = PathBuf::from(format!(
            "/tmp/wpactrl-conn-{}-{}-{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn connect_interface_roundtrip() {
        let dir = make_dir("roundtrip");
        let listener =
            UnixDatagramListener::bind(dir.join("wlan0")).expect("listener should bind");
        let mock = MockSupplicant::spawn(listener).expect("mock should start");

        let ctrl = connect_interface(&dir, "wlan0", CtrlConfig::default())
            .expect("client should connect");
        assert_eq!(ctrl.command("PING").expect("ping should succeed"), "PONG");
        ctrl.attach().expect("attach should succeed");

        mock.send_unsolicited("<2>CTRL-EVENT-SCAN-STARTED")
            .expect("event should send");
        let event = ctrl
            .unsolicited()
            .recv_timeout(std::time::Duration::from_secs(1))
            .expect("event should arrive");
        assert_eq!(event, "CTRL-EVENT-SCAN-STARTED");

        ctrl.close();
        mock.close();
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn connect_missing_socket_fails() {
        let dir = make_dir("missing");
        let err = connect(dir.join("wlan9"), CtrlConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CtrlError::Transport(TransportError::Connect { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
