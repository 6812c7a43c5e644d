//! Device identity
//!
//! The registry document describing this device: name, model, local IP,
//! and OS. Mirrors what a dashboard needs to render a "your phone is
//! online" card and to print the LAN API URL.

use serde::{Deserialize, Serialize};
use std::net::UdpSocket;

/// Fallback device name when the hostname cannot be determined
const DEFAULT_DEVICE_NAME: &str = "android-device";

/// Information identifying this device to the cloud registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable device name (hostname)
    pub device_name: String,
    /// OS and architecture, e.g. `linux aarch64`
    pub model: String,
    /// First non-loopback local IPv4, or `127.0.0.1`
    pub ip: String,
    /// Operating system family
    pub os: String,
}

impl DeviceInfo {
    /// Probe the host for device identity
    pub fn detect() -> Self {
        DeviceInfo {
            device_name: hostname(),
            model: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            ip: local_ip(),
            os: std::env::consts::OS.to_string(),
        }
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string())
}

/// Find the local IP used for outbound traffic
///
/// Connecting a UDP socket does not send any packets; it just asks the
/// kernel which source address it would route from.
fn local_ip() -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string())
}
