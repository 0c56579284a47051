mod node;

pub use node::{NodeKind, PreOrder, SourceContent, TreeNode};
