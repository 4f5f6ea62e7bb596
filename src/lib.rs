//! # knx-bridge
//!
//! Bridges a KNX building-automation bus to a time-series metrics store.
//!
//! The bridge reads a project export describing the bus's group addresses,
//! resolves each address's datatype to a value kind the bus stack can decode,
//! registers an endpoint per resolved address and turns every value change
//! into a metric record written to a sink.
//!
//! ## Architecture
//!
//! ```text
//!  project export ──▶ AddressCatalog ◀── DatatypeMap ◀── decoder table
//!                          │
//!                          ▼
//!                  EndpointRegistrar ──▶ BusClient ──▶ ChangeEvent
//!                                                          │
//!                                                          ▼
//!                                   MetricSink ◀── ChangeDispatcher
//! ```
//!
//! - **[`datatype`]**: the decoder table and the [`DatatypeMap`] built from it
//! - **[`catalog`]**: project export loading and the resolved [`AddressCatalog`]
//! - **[`registrar`]**: registers resolved entries with a [`BusClient`]
//! - **[`bus`]**: bus collaborators ([`StreamBus`], [`ChannelBus`])
//! - **[`dispatch`]**: the [`ChangeDispatcher`] and its run loop
//! - **[`config`]**: layered [`BridgeConfig`]
//!
//! Registration is a one-time synchronous phase. Dispatch runs on the tokio
//! runtime for the lifetime of the process.
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Read telegrams from a gateway, write metrics to knx_metrics.jsonl
//! knx-bridge --project ets_export.json --config bridge.toml
//!
//! # Pipe telegrams through stdin
//! gateway-dump | knx-bridge --project ets_export.json
//! ```
//!
//! ### As a library
//!
//! ```rust
//! use knx_bridge::{
//!     AddressCatalog, BusClient, ChangeDispatcher, ChannelBus, DatatypeMap, EndpointRegistrar,
//!     RawAddress, Telegram,
//! };
//! use knxbridge_sinks::Output;
//! use tokio::sync::mpsc;
//!
//! # tokio_test::block_on(async {
//! let map = DatatypeMap::builtin().unwrap();
//! let catalog = AddressCatalog::resolve(
//!     vec![RawAddress::new("1/0/7", Some("DPST-9-1"), "Temp1")],
//!     &map,
//! );
//!
//! let (bus, telegrams) = ChannelBus::new(16);
//! let mut bus = bus.with_datatypes(&map);
//! EndpointRegistrar::register(&catalog, &mut bus);
//!
//! let (output, mut records) = Output::channel(16);
//! let (events_tx, events_rx) = mpsc::channel(16);
//! let _bus_task = bus.spawn(events_tx);
//! let dispatch = ChangeDispatcher::new(output).start(events_rx);
//!
//! telegrams.send(Telegram::new("1/0/7", 21.5)).await.unwrap();
//! let record = records.recv().await.unwrap();
//! assert_eq!(record.tag("Unit"), Some("°C"));
//!
//! let stats = dispatch.shutdown().await;
//! assert_eq!(stats.written, 1);
//! # });
//! ```

pub mod bus;
pub mod catalog;
pub mod config;
pub mod datatype;
pub mod dispatch;
pub mod error;
pub mod registrar;

pub use bus::{BusClient, ChangeEvent, ChannelBus, DeviceRegistry, Endpoint, StreamBus, Telegram};
pub use catalog::{AddressCatalog, ProjectFile, ProjectSource};
pub use config::BridgeConfig;
pub use datatype::{DatatypeMap, DecoderRow, DecoderTable, TableVersion};
pub use dispatch::{ChangeDispatcher, DispatchHandle, DispatchStatsSnapshot};
pub use error::{BridgeError, ResolutionError};
pub use registrar::{EndpointRegistrar, RegistrationSummary};

pub use knxbridge_types::{
    CanonicalDatatype, CatalogEntry, InternalTypeName, MetricRecord, RawAddress, Value, ValueClass,
    ValueKind,
};
