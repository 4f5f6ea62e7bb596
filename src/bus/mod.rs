//! Bus collaborators.
//!
//! A [`BusClient`] accepts endpoint registrations during startup and then runs
//! as a spawned task, delivering a [`ChangeEvent`] for every value change of a
//! registered endpoint. The bridge ships two clients that need no KNX wire
//! protocol:
//!
//! - [`StreamBus`]: reads already-decoded telegrams as newline-delimited JSON
//!   from any async reader (a TCP gateway or stdin)
//! - [`ChannelBus`]: accepts telegrams through an in-memory channel

mod channel;
mod registry;
mod stream;

pub use channel::ChannelBus;
pub use registry::{DeviceRegistry, SharedRegistry};
pub use stream::StreamBus;

use knxbridge_types::{Value, ValueKind};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A monitored data point registered with the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Human-readable name, reported as the `GroupAddressName` tag.
    pub name: String,
    /// Group address in `main/middle/sub` form.
    pub address: String,
    /// Value kind the bus decodes telegrams into.
    pub value_kind: ValueKind,
}

/// A decoded value change of one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Name of the endpoint that changed.
    pub name: String,
    /// The new value.
    pub value: Value,
    /// Unit of measure, if the bus knows one.
    pub unit: Option<String>,
}

impl ChangeEvent {
    /// Create a change event.
    pub fn new(name: impl Into<String>, value: impl Into<Value>, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: unit.map(str::to_string),
        }
    }
}

/// One decoded telegram as delivered by a gateway.
///
/// ```json
/// {"address": "1/0/7", "value": 21.5}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telegram {
    /// Destination group address, e.g. `1/0/7`.
    pub address: String,
    /// Decoded payload. Coerced into the value class of each receiving
    /// endpoint's kind before it becomes a change event.
    pub value: Value,
}

impl Telegram {
    /// Create a telegram.
    pub fn new(address: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            address: address.into(),
            value: value.into(),
        }
    }
}

/// The bus protocol stack seen from the bridge.
pub trait BusClient {
    /// Register an endpoint. Registering the same endpoint twice registers it
    /// twice unless the client deduplicates.
    fn register(&mut self, endpoint: Endpoint);

    /// Human-readable description of the bus connection.
    fn description(&self) -> &str;

    /// Start delivering change events. The task ends when the bus closes or
    /// the receiver is dropped.
    fn spawn(self, events: mpsc::Sender<ChangeEvent>) -> JoinHandle<()>
    where
        Self: Sized;
}
