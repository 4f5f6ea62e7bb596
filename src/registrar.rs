//! Registers resolved catalog entries with the bus.

use tracing::{debug, info};

use crate::bus::{BusClient, Endpoint};
use crate::catalog::AddressCatalog;

/// Outcome of one registration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationSummary {
    /// Endpoints handed to the bus.
    pub registered: usize,
    /// Entries without a value kind.
    pub skipped: usize,
}

/// Turns resolved catalog entries into bus endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointRegistrar;

impl EndpointRegistrar {
    /// Register every resolved entry with `bus`.
    ///
    /// Unresolved entries are skipped. Calling this twice registers every
    /// endpoint twice.
    pub fn register<B>(catalog: &AddressCatalog, bus: &mut B) -> RegistrationSummary
    where
        B: BusClient + ?Sized,
    {
        let mut summary = RegistrationSummary::default();

        for entry in catalog {
            match &entry.value_kind {
                Some(kind) => {
                    bus.register(Endpoint {
                        name: entry.name.clone(),
                        address: entry.address.clone(),
                        value_kind: kind.clone(),
                    });
                    summary.registered += 1;
                }
                None => {
                    debug!("Skipping {} ({:?}): no value kind", entry.address, entry.name);
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "Registered {} endpoints on {}, skipped {}",
            summary.registered,
            bus.description(),
            summary.skipped
        );
        summary
    }
}
