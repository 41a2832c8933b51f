use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for node labels.
///
/// Entries live for the whole process. Every label a parse sees is
/// interned, including the partial labels of a line being typed, and none
/// are ever released. This is accepted: labels are short and an editing
/// session sees a bounded number of them.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A node's identity. The label *is* the id: two lines naming the same
/// label denote the same node.
///
/// Internally a 4-byte `Spur` index.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a label as a NodeId, or return the existing one.
    pub fn intern(label: &str) -> Self {
        NodeId(INTERNER.get_or_intern(label))
    }

    /// Look up an already interned label without interning it.
    ///
    /// Labels that were never interned cannot name a node in any graph,
    /// so edit-layer lookups use this to avoid growing the interner.
    pub fn get(label: &str) -> Option<Self> {
        INTERNER.get(label).map(NodeId)
    }

    /// Resolve back to the label.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}
