//! Node model for the KQL type/value graph.
//!
//! The graph is a DAG of Type nodes and Literal nodes stored in an [`Env`]
//! arena and addressed by 32-bit [`NodeId`]s:
//!
//! - [`Node`]: closed sum type over every Type and Literal variant
//! - [`Kind`]: structural tag shared by both families, with wire values
//! - [`RuntimeNode`]: a node plus its immediacy flag
//! - [`Name`] / [`StringInterner`]: interned member names and tags
//! - [`DataSlot`] / [`DataValue`]: scheme types and scalar payloads
//! - [`GraphExplorer`]: stable enumeration of reachable nodes
//!
//! Construction always goes through `Env`, which validates every node
//! against its type before allocating it.

pub mod data;
mod env;
mod error;
mod explore;
mod interner;
mod kind;
mod name;
pub mod node;
mod node_id;

pub use data::{DataSlot, DataValue, DecimalParams, Layout};
pub use env::{structurally_equal, Env, TIMEZONE_COUNT};
pub use error::EnvError;
pub use explore::GraphExplorer;
pub use interner::{InternError, StringInterner};
pub use kind::Kind;
pub use name::Name;
pub use node::{BlockShape, CallableBody, CallableSig, Node, StructMember};
pub use node_id::{NodeId, RuntimeNode};

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{NodeId, RuntimeNode};
    const _: () = assert!(std::mem::size_of::<NodeId>() == 4);
    const _: () = assert!(std::mem::size_of::<RuntimeNode>() == 8);
}
