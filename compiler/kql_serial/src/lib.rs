//! Binary codec for the KQL type/value graph.
//!
//! Turns a DAG of Type and Literal nodes held in a [`kql_ir::Env`] into a
//! compact byte stream and back. Shared subgraphs are written once and
//! referenced afterwards, repeated names go into a table at the front of
//! the stream, and neither direction recurses, so graphs thousands of
//! levels deep are fine.
//!
//! # Stream layout
//!
//! ```text
//! Begin | BeginNotImmediate
//! var32 name count, then (var32 length, UTF-8 bytes) per name
//! root node, in post-order
//! End
//! ```
//!
//! # Debugging
//!
//! - `RUST_LOG=kql_serial=debug`: one span per serialize/deserialize call
//! - `RUST_LOG=kql_serial=trace`: name table sizes, cookie totals, reader
//!   passes
//!
//! # Example
//!
//! ```
//! use kql_ir::{DataSlot, DataValue, Env};
//!
//! let mut env = Env::new();
//! let int32 = env.data_type(DataSlot::Int32).unwrap();
//! let five = env.data_literal(int32, DataValue::I32(5)).unwrap();
//!
//! let bytes = kql_serial::serialize_node(&env, five);
//!
//! let mut fresh = Env::new();
//! let root = kql_serial::deserialize_node(&bytes, &mut fresh).unwrap();
//! assert_eq!(fresh.format_node(root), "5");
//! ```

mod cursor;
pub mod error;
pub mod header;
pub mod names;
pub mod options;
mod reader;
mod scalar;
mod session;
pub mod varint;
mod writer;

use std::sync::Once;

use kql_ir::{Env, GraphExplorer, NodeId, RuntimeNode};

pub use error::{Corruption, SerialError, SerialResult};
pub use names::NameTable;
pub use options::WriterOptions;

use reader::Reader;
use writer::Writer;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing from `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

// === Writing ===

/// Serialize the graph under `root`, treating the root as immediate.
pub fn serialize_node(env: &Env, root: NodeId) -> Vec<u8> {
    serialize_runtime_node(env, RuntimeNode::immediate(root))
}

/// Serialize the graph under `root`, recording the root's immediacy.
pub fn serialize_runtime_node(env: &Env, root: RuntimeNode) -> Vec<u8> {
    serialize_runtime_node_with(env, root, &WriterOptions::default())
}

/// Serialize with explicit options.
#[tracing::instrument(level = "debug", skip_all, fields(root = %root.node, nodes = tracing::field::Empty, bytes = tracing::field::Empty))]
pub fn serialize_runtime_node_with(env: &Env, root: RuntimeNode, options: &WriterOptions) -> Vec<u8> {
    let mut explorer = GraphExplorer::new();
    let nodes = explorer.walk(env, root.node);
    let names = if options.intern_names {
        NameTable::collect(env, nodes)
    } else {
        NameTable::empty()
    };
    tracing::Span::current().record("nodes", nodes.len());

    let out = write_stream(env, &names, root, options.initial_capacity);
    tracing::Span::current().record("bytes", out.len());
    out
}

/// Serialize using an explorer that has already walked `root`.
///
/// Lets a caller that needs the reachable-node list for its own purposes
/// avoid a second walk.
#[tracing::instrument(level = "debug", skip_all, fields(root = %root.node, nodes = explorer.len(), bytes = tracing::field::Empty))]
pub fn serialize_with_explorer(env: &Env, explorer: &GraphExplorer, root: RuntimeNode) -> Vec<u8> {
    debug_assert!(explorer.contains(root.node), "explorer has not walked {}", root.node);
    let names = NameTable::collect(env, explorer.nodes());
    let out = write_stream(env, &names, root, WriterOptions::DEFAULT_CAPACITY);
    tracing::Span::current().record("bytes", out.len());
    out
}

fn write_stream(env: &Env, names: &NameTable, root: RuntimeNode, capacity: usize) -> Vec<u8> {
    tracing::trace!(names = names.len(), "name table collected");
    Writer::new(env, names, capacity).write(root)
}

// === Reading ===

/// Deserialize a stream into `env` and return its root node.
///
/// The root's immediacy is dropped; use [`deserialize_runtime_node`] to
/// keep it.
pub fn deserialize_node(bytes: &[u8], env: &mut Env) -> SerialResult<NodeId> {
    deserialize_runtime_node(bytes, env).map(|root| root.node)
}

/// Deserialize a stream into `env` and return its root with immediacy.
///
/// On error, nodes built before the failure stay in `env` but nothing
/// refers to them.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
pub fn deserialize_runtime_node(bytes: &[u8], env: &mut Env) -> SerialResult<RuntimeNode> {
    let before = env.len();
    let root = Reader::new(bytes, env).read()?;
    tracing::debug!(built = env.len() - before, root = %root.node, "stream decoded");
    Ok(root)
}
