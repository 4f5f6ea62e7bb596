//! Stream-based bus client.
//!
//! Reads decoded telegrams from an async byte stream. A gateway that speaks
//! the KNX wire protocol publishes one JSON telegram per line; the bridge only
//! maps them onto registered endpoints.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{BusClient, ChangeEvent, DeviceRegistry, Endpoint, Telegram};
use crate::datatype::DatatypeMap;

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;

/// A bus client that reads newline-delimited JSON telegrams.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use knx_bridge::bus::{BusClient, StreamBus};
///
/// # tokio_test::block_on(async {
/// let data = b"{\"address\": \"1/0/7\", \"value\": 21.5}\n";
/// let bus = StreamBus::new(Cursor::new(data.to_vec()), "example");
/// assert_eq!(bus.description(), "stream: example");
/// # });
/// ```
pub struct StreamBus {
    reader: BoxedReader,
    description: String,
    registry: DeviceRegistry,
}

impl std::fmt::Debug for StreamBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamBus")
            .field("description", &self.description)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl StreamBus {
    /// Read telegrams from the given async reader.
    pub fn new<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            reader: Box::new(reader),
            description: format!("stream: {}", description),
            registry: DeviceRegistry::new(),
        }
    }

    /// Connect to a telegram gateway over TCP.
    pub async fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream, &format!("tcp://{}", addr)))
    }

    /// Read telegrams from standard input.
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin(), "stdin")
    }

    /// Decode values and report units the way `map` describes each value kind.
    pub fn with_datatypes(mut self, map: &DatatypeMap) -> Self {
        self.registry = self.registry.with_datatypes(map);
        self
    }

    /// Registrations made so far.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }
}

impl BusClient for StreamBus {
    fn register(&mut self, endpoint: Endpoint) {
        debug!(
            "Registering {} on {} as {}",
            endpoint.name, endpoint.address, endpoint.value_kind
        );
        self.registry.insert(endpoint);
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn spawn(self, events: mpsc::Sender<ChangeEvent>) -> JoinHandle<()> {
        let Self {
            reader,
            description,
            registry,
        } = self;

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        info!("Bus {} closed", description);
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }

                        let telegram = match serde_json::from_str::<Telegram>(trimmed) {
                            Ok(telegram) => telegram,
                            Err(e) => {
                                warn!("Skipping malformed telegram from {}: {}", description, e);
                                continue;
                            }
                        };

                        let changes = registry.events_for(&telegram);
                        if changes.is_empty() {
                            trace!("No endpoint registered on {}", telegram.address);
                            continue;
                        }

                        for change in changes {
                            if events.send(change).await.is_err() {
                                // Receiver dropped
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Read error on bus {}: {}", description, e);
                        break;
                    }
                }
            }
        })
    }
}
