//! Fleet Schema
//!
//! Entity model shared by the registry parser, the inventory parser and the
//! reconciliation engine:
//! - `Server` - one physical server as declared by the device registry
//! - `InventoryDocument` / `InventoryNode` - the Ansible-style group tree
//! - `Discrepancy` - one unit of detected drift

mod discrepancy;
mod inventory;
mod server;

pub use discrepancy::{Discrepancy, DiscrepancyKind, UNKNOWN_GROUP};
pub use inventory::{
    GroupClassification, HostVars, InventoryDocument, InventoryError, InventoryNode, OrderedMap,
    ROOT_GROUP,
};
pub use server::{CellSet, Classification, Server};
