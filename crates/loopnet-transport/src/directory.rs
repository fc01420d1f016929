use bytes::BytesMut;
use tracing::{debug, trace, warn};

use crate::config::LoopbackConfig;
use crate::endpoint::{Endpoint, EndpointHandle, Side};
use crate::error::{Result, TransportError};

/// The only connect target the loopback transport answers to.
pub const LOCAL_HOST: &str = "local";

/// How the hosting process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    /// A client that may run its own embedded server.
    Listen,
    /// A headless server; there is no local client to pair with.
    Dedicated,
}

/// Process-wide loopback state: one client slot, one server slot.
///
/// Every operation goes through this context; it owns both endpoints and
/// the scratch buffer received payloads are decoded into.
pub struct LoopbackTransport {
    config: LoopbackConfig,
    pub(crate) slots: [Option<Endpoint>; 2],
    connect_pending: bool,
    next_generation: u64,
    pub(crate) message: BytesMut,
}

impl LoopbackTransport {
    /// Initialize with default buffer sizing.
    pub fn init(mode: HostMode) -> Result<Self> {
        Self::with_config(mode, LoopbackConfig::default())
    }

    /// Initialize with explicit buffer sizing.
    ///
    /// Fails with [`TransportError::Unsupported`] in dedicated mode.
    pub fn with_config(mode: HostMode, config: LoopbackConfig) -> Result<Self> {
        if mode == HostMode::Dedicated {
            debug!("loopback transport disabled in dedicated mode");
            return Err(TransportError::Unsupported);
        }
        config.validate()?;

        debug!(
            max_message = config.max_message,
            buffered_messages = config.buffered_messages,
            "loopback transport initialized"
        );

        Ok(Self {
            message: BytesMut::with_capacity(config.max_message),
            config,
            slots: [None, None],
            connect_pending: false,
            next_generation: 0,
        })
    }

    pub fn config(&self) -> &LoopbackConfig {
        &self.config
    }

    /// Listening is implicit for the loopback pair; the request is ignored.
    pub fn listen(&mut self, enabled: bool) {
        trace!(enabled, "loopback listen request ignored");
    }

    /// Connect to the local server.
    ///
    /// Only [`LOCAL_HOST`] is accepted. Creates whichever endpoints are
    /// missing, resets both, links them, and flags the connection as pending
    /// for [`poll_accept`](Self::poll_accept). Reconnecting reuses the
    /// existing pair.
    pub fn connect(&mut self, target: &str) -> Result<EndpointHandle> {
        if target != LOCAL_HOST {
            debug!(target, "loopback connect to non-local host");
            return Err(TransportError::NotFound {
                target: target.to_string(),
            });
        }

        self.connect_pending = true;
        self.ensure_endpoint(Side::Client).reset();
        self.ensure_endpoint(Side::Server).reset();

        let client = self.ensure_endpoint(Side::Client);
        client.peer = Some(Side::Server);
        let handle = client.handle();
        self.ensure_endpoint(Side::Server).peer = Some(Side::Client);

        debug!("loopback client connected");
        Ok(handle)
    }

    /// Server-side discovery of a pending connect.
    ///
    /// Returns the server handle exactly once per [`connect`](Self::connect);
    /// both endpoints are reset again on acceptance.
    pub fn poll_accept(&mut self) -> Option<EndpointHandle> {
        if !self.connect_pending {
            return None;
        }
        self.connect_pending = false;

        for endpoint in self.slots.iter_mut().flatten() {
            endpoint.reset();
        }

        match self.server() {
            Some(server) => {
                debug!("loopback server accepted connection");
                Some(server.handle())
            }
            None => {
                warn!("pending loopback connect lost its server endpoint");
                None
            }
        }
    }

    /// Close one endpoint and free its slot.
    ///
    /// The peer stays alive, unlinked, with its buffered data untouched.
    pub fn close(&mut self, handle: EndpointHandle) -> Result<()> {
        let endpoint = self.endpoint_mut(handle)?;
        endpoint.reset();
        let peer = endpoint.peer.take();

        if let Some(peer_side) = peer {
            if let Some(peer) = self.slots[peer_side.index()].as_mut() {
                peer.peer = None;
            }
        }
        self.slots[handle.side().index()] = None;

        debug!(side = %handle.side(), "loopback endpoint closed");
        Ok(())
    }

    /// Close both endpoints and drop any pending connect.
    pub fn shutdown(&mut self) {
        for slot in &mut self.slots {
            if let Some(endpoint) = slot.take() {
                debug!(side = %endpoint.side(), "loopback endpoint closed");
            }
        }
        self.connect_pending = false;
        debug!("loopback transport shut down");
    }

    /// Whether a connect is waiting for [`poll_accept`](Self::poll_accept).
    pub fn is_connect_pending(&self) -> bool {
        self.connect_pending
    }

    /// Look up a live endpoint.
    pub fn endpoint(&self, handle: EndpointHandle) -> Result<&Endpoint> {
        match &self.slots[handle.side().index()] {
            Some(endpoint) if endpoint.handle() == handle => Ok(endpoint),
            _ => Err(TransportError::StaleHandle(handle.side())),
        }
    }

    pub fn client(&self) -> Option<&Endpoint> {
        self.slots[Side::Client.index()].as_ref()
    }

    pub fn server(&self) -> Option<&Endpoint> {
        self.slots[Side::Server.index()].as_ref()
    }

    pub(crate) fn endpoint_mut(&mut self, handle: EndpointHandle) -> Result<&mut Endpoint> {
        lookup_mut(&mut self.slots, handle)
    }

    fn ensure_endpoint(&mut self, side: Side) -> &mut Endpoint {
        let capacity = self.config.capacity();
        let generation = &mut self.next_generation;
        self.slots[side.index()].get_or_insert_with(|| {
            *generation += 1;
            debug!(%side, generation = *generation, "creating loopback endpoint");
            Endpoint::new(side, *generation, capacity)
        })
    }
}

pub(crate) fn lookup_mut(
    slots: &mut [Option<Endpoint>; 2],
    handle: EndpointHandle,
) -> Result<&mut Endpoint> {
    match slots[handle.side().index()].as_mut() {
        Some(endpoint) if endpoint.handle() == handle => Ok(endpoint),
        _ => Err(TransportError::StaleHandle(handle.side())),
    }
}

impl std::fmt::Debug for LoopbackTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackTransport")
            .field("config", &self.config)
            .field("client", &self.client())
            .field("server", &self.server())
            .field("connect_pending", &self.connect_pending)
            .finish()
    }
}
