//! Channel-based bus client.
//!
//! Telegrams are pushed through a tokio mpsc channel. Useful when the bridge
//! is embedded next to a bus stack that already decodes telegrams, and in
//! tests.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use super::{BusClient, ChangeEvent, DeviceRegistry, Endpoint, SharedRegistry, Telegram};
use crate::datatype::DatatypeMap;

/// A bus client that receives telegrams through a channel.
///
/// # Example
///
/// ```
/// use knx_bridge::bus::{BusClient, ChannelBus, ChangeEvent, Endpoint, Telegram};
/// use knx_bridge::ValueKind;
/// use tokio::sync::mpsc;
///
/// # tokio_test::block_on(async {
/// let (mut bus, telegrams) = ChannelBus::new(16);
/// bus.register(Endpoint {
///     name: "Temp1".into(),
///     address: "1/0/7".into(),
///     value_kind: ValueKind::new("temperature"),
/// });
///
/// let (tx, mut rx) = mpsc::channel(16);
/// let _task = bus.spawn(tx);
///
/// telegrams.send(Telegram::new("1/0/7", 21.5)).await.unwrap();
/// assert_eq!(rx.recv().await.unwrap().name, "Temp1");
/// # });
/// ```
#[derive(Debug)]
pub struct ChannelBus {
    receiver: mpsc::Receiver<Telegram>,
    registry: SharedRegistry,
}

impl ChannelBus {
    /// Create a channel bus and the sender that feeds it telegrams.
    pub fn new(buffer: usize) -> (Self, mpsc::Sender<Telegram>) {
        let (tx, rx) = mpsc::channel(buffer);
        let bus = Self {
            receiver: rx,
            registry: DeviceRegistry::new().into_shared(),
        };
        (bus, tx)
    }

    /// Decode values and report units the way `map` describes each value kind.
    pub fn with_datatypes(self, map: &DatatypeMap) -> Self {
        {
            let mut registry = self.registry.write();
            *registry = std::mem::take(&mut *registry).with_datatypes(map);
        }
        self
    }

    /// Handle to the registrations, still readable after the bus is spawned.
    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }
}

impl BusClient for ChannelBus {
    fn register(&mut self, endpoint: Endpoint) {
        self.registry.write().insert(endpoint);
    }

    fn description(&self) -> &str {
        "channel"
    }

    fn spawn(self, events: mpsc::Sender<ChangeEvent>) -> JoinHandle<()> {
        let Self {
            mut receiver,
            registry,
        } = self;

        tokio::spawn(async move {
            while let Some(telegram) = receiver.recv().await {
                let changes = registry.read().events_for(&telegram);
                if changes.is_empty() {
                    trace!("No endpoint registered on {}", telegram.address);
                    continue;
                }

                for change in changes {
                    if events.send(change).await.is_err() {
                        return;
                    }
                }
            }
        })
    }
}
