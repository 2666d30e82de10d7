//! Per-call writer state.
//!
//! Cookies number nodes in the order they finish writing, starting at 1.
//! They live in this map rather than on the nodes, so the graph is never
//! mutated and nothing needs resetting after a write.

use kql_ir::NodeId;
use rustc_hash::FxHashMap;

#[derive(Default, Debug)]
pub(crate) struct Session {
    cookies: FxHashMap<NodeId, u32>,
    last: u32,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cookie of a node already written in this session.
    #[inline]
    pub(crate) fn cookie(&self, id: NodeId) -> Option<u32> {
        self.cookies.get(&id).copied()
    }

    /// Assign the next cookie to a node that has just been fully written.
    pub(crate) fn register(&mut self, id: NodeId) -> u32 {
        debug_assert!(!self.cookies.contains_key(&id), "{id:?} registered twice");
        self.last += 1;
        self.cookies.insert(id, self.last);
        self.last
    }

    /// Number of cookies handed out.
    pub(crate) fn len(&self) -> u32 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cookies_start_at_one() {
        let mut session = Session::new();
        let a = NodeId::from_raw(10);
        let b = NodeId::from_raw(11);
        assert_eq!(session.cookie(a), None);
        assert_eq!(session.register(a), 1);
        assert_eq!(session.register(b), 2);
        assert_eq!(session.cookie(a), Some(1));
        assert_eq!(session.len(), 2);
    }
}
