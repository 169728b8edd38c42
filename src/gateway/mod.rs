//! External collaborators of the transaction engine.
//!
//! The engine only talks to storage and the network through the
//! [`PersistenceGateway`] and [`NetworkGateway`] traits, so both can be
//! replaced by platform bindings or test doubles.

mod carrier;
mod network;
mod persistence;

pub use carrier::{
    ApnError, ApnRecord, ApnSource, CarrierConfigResolver, CarrierConfigService, CarrierEntry,
    CarrierTable, MmsConfig, OperatorInfo, ProxyAddr,
};
pub use network::{HttpNetworkGateway, NetworkGateway};
pub use persistence::{Folder, MemoryPersister, MessageUri, PersistFlags, PersistenceGateway};
