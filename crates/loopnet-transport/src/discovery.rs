//! Host-list entry for the locally running server.
//!
//! Discovery UIs query every driver for hosts. The loopback driver cannot
//! broadcast anything, so it reports the local game directly whenever a
//! server endpoint exists.

use serde::Serialize;

use crate::directory::{LoopbackTransport, LOCAL_HOST};

/// Host name games use before the operator sets one.
pub const UNNAMED_HOST: &str = "UNNAMED";

/// Transport label reported in host entries.
pub const DRIVER_LABEL: &str = "loopback";

/// What the game knows about the server it is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStatus {
    pub hostname: String,
    pub map: String,
    /// Live connections counted by the game.
    pub active_connections: usize,
    pub max_clients: usize,
}

/// One row of a host listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub name: String,
    pub map: String,
    pub users: usize,
    pub max_users: usize,
    pub driver: &'static str,
    /// Target to pass to [`LoopbackTransport::connect`].
    pub cname: &'static str,
}

impl LoopbackTransport {
    /// List the local host, if a server endpoint exists.
    pub fn list_local_host(&self, status: &HostStatus) -> Vec<HostEntry> {
        if self.server().is_none() {
            return Vec::new();
        }

        let name = if status.hostname.is_empty() || status.hostname == UNNAMED_HOST {
            LOCAL_HOST.to_string()
        } else {
            status.hostname.clone()
        };

        vec![HostEntry {
            name,
            map: status.map.clone(),
            users: status.active_connections,
            max_users: status.max_clients,
            driver: DRIVER_LABEL,
            cname: LOCAL_HOST,
        }]
    }
}
