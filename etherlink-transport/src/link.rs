//! Link state tracking
//!
//! Transports that can lose the peer (BLE, USB CDC, a detachable cable)
//! report connect/disconnect events here. A disconnect drops any partial
//! frame so stale bytes from the old session can't be glued to the first
//! bytes of the next one.

use etherlink_protocol::{Etherlink, FrameSink, MessageHandler};

/// Default BLE ATT MTU before negotiation
pub const DEFAULT_MTU: u16 = 23;

/// ATT notification header (opcode + handle)
pub const ATT_OVERHEAD: u16 = 3;

/// Transport link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// MTU assumed after (re)connect
    pub default_mtu: u16,
    /// Bytes of each MTU taken by the transport header
    pub att_overhead: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            default_mtu: DEFAULT_MTU,
            att_overhead: ATT_OVERHEAD,
        }
    }
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Disconnected,
    Connected { mtu: u16 },
}

/// Sink whose behaviour depends on the link
///
/// [`LinkMonitor`] calls this after every state change, so the sink's view
/// of the connection and MTU never drifts from the monitor's.
pub trait LinkSink: FrameSink {
    /// The link moved to `state`
    fn link_changed(&mut self, state: LinkState);
}

/// Tracks the transport connection and resets the parser on loss
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    config: LinkConfig,
    state: LinkState,
    sessions: u32,
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new(LinkConfig::default())
    }
}

impl LinkMonitor {
    /// Create a monitor in the disconnected state
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            state: LinkState::Disconnected,
            sessions: 0,
        }
    }

    /// Peer connected: sends are allowed at the default MTU
    pub fn on_connect<S, H>(&mut self, ctx: &mut Etherlink<S, H>)
    where
        S: LinkSink,
        H: MessageHandler,
    {
        if self.is_connected() {
            warn!("Connect while already connected");
        }
        self.state = LinkState::Connected {
            mtu: self.config.default_mtu,
        };
        self.sessions = self.sessions.saturating_add(1);
        ctx.sink_mut().link_changed(self.state);
        info!("Link connected (session {})", self.sessions);
    }

    /// Peer disconnected: back to default MTU, parser reset, sends refused
    ///
    /// Frame statistics are not touched.
    pub fn on_disconnect<S, H>(&mut self, ctx: &mut Etherlink<S, H>)
    where
        S: LinkSink,
        H: MessageHandler,
    {
        self.state = LinkState::Disconnected;
        ctx.reset();
        ctx.sink_mut().link_changed(self.state);
        info!("Link disconnected");
    }

    /// MTU negotiated
    ///
    /// Ignored while disconnected.
    pub fn on_mtu<S, H>(&mut self, mtu: u16, ctx: &mut Etherlink<S, H>)
    where
        S: LinkSink,
        H: MessageHandler,
    {
        if let LinkState::Connected { mtu: current } = &mut self.state {
            *current = mtu;
            ctx.sink_mut().link_changed(self.state);
            info!("MTU updated to {}", mtu);
        }
    }

    /// Current state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// True while a peer is connected
    pub fn is_connected(&self) -> bool {
        matches!(self.state, LinkState::Connected { .. })
    }

    /// Current MTU, or the default when disconnected
    pub fn mtu(&self) -> u16 {
        match self.state {
            LinkState::Connected { mtu } => mtu,
            LinkState::Disconnected => self.config.default_mtu,
        }
    }

    /// Number of connections seen
    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    /// Link settings
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}
