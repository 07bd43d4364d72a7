use std::net::Shutdown;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{SocketAddr, UnixDatagram};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{Datagram, DatagramListener};

/// Maximum socket path length.
/// Unix `sockaddr_un.sun_path` is typically 108 bytes on Linux, 104 on macOS.
#[cfg(target_os = "linux")]
const MAX_PATH_LEN: usize = 108;
#[cfg(not(target_os = "linux"))]
const MAX_PATH_LEN: usize = 104;

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(0);

fn validate_path_len(path: &Path) -> Result<()> {
    let len = path.as_os_str().len();
    if len >= MAX_PATH_LEN {
        return Err(TransportError::PathTooLong {
            path: path.to_path_buf(),
            len,
            max: MAX_PATH_LEN,
        });
    }
    Ok(())
}

/// Unique path for the client end of a control connection.
///
/// The daemon answers to the sender's address, so the client socket must be
/// bound to a path of its own.
fn local_socket_path(target: &Path) -> PathBuf {
    let tag = target
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("ctrl");
    std::env::temp_dir().join(format!(
        "wpactrl-{tag}-{}-{}",
        std::process::id(),
        NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed)
    ))
}

fn shutdown_socket(socket: &UnixDatagram) -> Result<()> {
    match socket.shutdown(Shutdown::Both) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Client end of a Unix datagram control socket.
pub struct UnixDatagramConn {
    socket: UnixDatagram,
    local_path: Option<PathBuf>,
}

impl UnixDatagramConn {
    /// Connect to the control socket at `path`.
    ///
    /// Binds a private socket under the temp directory so replies can be
    /// routed back; it is removed again on drop.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        validate_path_len(path)?;

        let local_path = local_socket_path(path);
        validate_path_len(&local_path)?;

        let socket = UnixDatagram::bind(&local_path).map_err(|e| TransportError::Bind {
            path: local_path.clone(),
            source: e,
        })?;

        if let Err(e) = socket.connect(path) {
            let _ = std::fs::remove_file(&local_path);
            return Err(TransportError::Connect {
                path: path.to_path_buf(),
                source: e,
            });
        }

        debug!(?path, local = ?local_path, "connected to control socket");
        Ok(Self {
            socket,
            local_path: Some(local_path),
        })
    }

    /// Connect to the control socket for `iface` inside `ctrl_dir`.
    pub fn connect_interface(ctrl_dir: impl AsRef<Path>, iface: &str) -> Result<Self> {
        Self::connect(ctrl_dir.as_ref().join(iface))
    }

    /// Path this end is bound to, if any.
    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }
}

impl Datagram for UnixDatagramConn {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        Ok(self.socket.send(buf)?)
    }

    fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.socket.recv(buf)?)
    }

    fn close(&self) -> Result<()> {
        shutdown_socket(&self.socket)
    }
}

impl Drop for UnixDatagramConn {
    fn drop(&mut self) {
        if let Some(path) = &self.local_path {
            if let Ok(metadata) = std::fs::symlink_metadata(path) {
                if metadata.file_type().is_socket() {
                    debug!(?path, "cleaning up client socket file");
                    let _ = std::fs::remove_file(path);
                }
            }
        }
    }
}

impl std::fmt::Debug for UnixDatagramConn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnixDatagramConn")
            .field("local_path", &self.local_path)
            .finish()
    }
}

/// Listening Unix datagram socket, the daemon side of a control interface.
pub struct UnixDatagramListener {
    socket: UnixDatagram,
    path: PathBuf,
    created_inode: Option<(u64, u64)>,
}

impl UnixDatagramListener {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;

    /// Bind a datagram socket at `path`.
    ///
    /// If the path already exists and is a socket, it is removed first
    /// (stale socket cleanup). Any other file is left alone and reported.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_mode(path, Self::DEFAULT_SOCKET_MODE)
    }

    /// Bind a datagram socket at `path` with an explicit mode.
    pub fn bind_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        validate_path_len(&path)?;

        if path.exists() {
            let metadata = std::fs::symlink_metadata(&path).map_err(|e| TransportError::Bind {
                path: path.clone(),
                source: e,
            })?;
            if metadata.file_type().is_socket() {
                debug!(?path, "removing stale socket");
                std::fs::remove_file(&path).map_err(|e| TransportError::Bind {
                    path: path.clone(),
                    source: e,
                })?;
            } else {
                return Err(TransportError::Bind {
                    path: path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "existing path is not a unix socket",
                    ),
                });
            }
        }

        let socket = UnixDatagram::bind(&path).map_err(|e| TransportError::Bind {
            path: path.clone(),
            source: e,
        })?;

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
            TransportError::Bind {
                path: path.clone(),
                source: e,
            }
        })?;
        let created_metadata =
            std::fs::symlink_metadata(&path).map_err(|e| TransportError::Bind {
                path: path.clone(),
                source: e,
            })?;
        let created_inode = Some((created_metadata.dev(), created_metadata.ino()));

        info!(?path, "listening on unix datagram socket");

        Ok(Self {
            socket,
            path,
            created_inode,
        })
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Datagram for UnixDatagramListener {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        Ok(self.socket.send(buf)?)
    }

    fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.socket.recv(buf)?)
    }

    fn close(&self) -> Result<()> {
        shutdown_socket(&self.socket)
    }
}

impl DatagramListener for UnixDatagramListener {
    type Addr = SocketAddr;
    type Reply = UnixDatagramConn;

    fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, Self::Addr)> {
        Ok(self.socket.recv_from(buf)?)
    }

    fn reply_channel(&self, addr: &Self::Addr) -> Result<Self::Reply> {
        let path = addr.as_pathname().ok_or(TransportError::UnnamedPeer)?;
        let socket = UnixDatagram::unbound()?;
        socket.connect(path).map_err(|e| TransportError::Connect {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(UnixDatagramConn {
            socket,
            local_path: None,
        })
    }
}

impl Drop for UnixDatagramListener {
    fn drop(&mut self) {
        if let Some((expected_dev, expected_ino)) = self.created_inode {
            if let Ok(metadata) = std::fs::symlink_metadata(&self.path) {
                if metadata.file_type().is_socket()
                    && metadata.dev() == expected_dev
                    && metadata.ino() == expected_ino
                {
                    debug!(path = ?self.path, "cleaning up socket file");
                    let _ = std::fs::remove_file(&self.path);
                } else {
                    debug!(
                        path = ?self.path,
                        "socket path identity changed; skipping cleanup"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for UnixDatagramListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnixDatagramListener")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn make_dir(tag: &str) -> PathBuf {
        let dir = PathBuf::from(format!(
            "/tmp/wpactrl-uds-{}-{}-{}",
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
    fn test_connect_send_and_reply() {
        let dir = make_dir("reply");
        let listener = UnixDatagramListener::bind(dir.join("wlan0")).unwrap();

        let client = UnixDatagramConn::connect_interface(&dir, "wlan0").unwrap();
        client.send(b"PING").unwrap();

        let mut buf = [0u8; 64];
        let (n, addr) = listener.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"PING");

        let reply = listener.reply_channel(&addr).unwrap();
        reply.send(b"PONG").unwrap();

        let n = client.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"PONG");

        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_close_wakes_blocked_recv() {
        let dir = make_dir("close");
        let listener = UnixDatagramListener::bind(dir.join("wlan0")).unwrap();
        let client = std::sync::Arc::new(UnixDatagramConn::connect(listener.path()).unwrap());

        let reader = std::sync::Arc::clone(&client);
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 16];
            reader.recv(&mut buf)
        });

        thread::sleep(Duration::from_millis(20));
        client.close().unwrap();

        let n = handle
            .join()
            .expect("reader thread should finish")
            .expect("shutdown recv should not error");
        assert_eq!(n, 0);

        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_client_socket_removed_on_drop() {
        let dir = make_dir("client-drop");
        let listener = UnixDatagramListener::bind(dir.join("wlan0")).unwrap();

        let client = UnixDatagramConn::connect(listener.path()).unwrap();
        let local = client.local_path().expect("client is bound").to_path_buf();
        assert!(local.exists());

        drop(client);
        assert!(!local.exists(), "client socket should be cleaned up on drop");

        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_connect_missing_socket() {
        let dir = make_dir("missing");
        let result = UnixDatagramConn::connect(dir.join("nope"));
        assert!(matches!(result, Err(TransportError::Connect { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_path_too_long() {
        let long_path = "/tmp/".to_string() + &"a".repeat(200) + ".sock";
        let result = UnixDatagramListener::bind(&long_path);
        assert!(matches!(result, Err(TransportError::PathTooLong { .. })));
    }

    #[test]
    fn test_bind_default_permissions_hardened() {
        let dir = make_dir("perms");
        let sock_path = dir.join("wlan0");

        let listener = UnixDatagramListener::bind(&sock_path).unwrap();
        let mode = std::fs::metadata(&sock_path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bind_rejects_existing_non_socket_file() {
        let dir = make_dir("bind-file");
        let sock_path = dir.join("wlan0");
        std::fs::write(&sock_path, b"regular-file").unwrap();

        let result = UnixDatagramListener::bind(&sock_path);
        assert!(matches!(result, Err(TransportError::Bind { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_drop_does_not_remove_replaced_path() {
        let dir = make_dir("drop-race");
        let sock_path = dir.join("wlan0");

        let listener = UnixDatagramListener::bind(&sock_path).unwrap();
        std::fs::remove_file(&sock_path).unwrap();
        std::fs::write(&sock_path, b"replacement-file").unwrap();

        drop(listener);
        assert!(
            sock_path.exists(),
            "drop must not remove path if inode identity changed"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
