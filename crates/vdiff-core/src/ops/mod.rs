pub mod copy_ops;
pub mod graph_ops;
pub mod node_ops;

pub use copy_ops::{deep_copy, project, shallow_copy, unchanged};
pub use graph_ops::{
    add_below, add_child, add_children, drop_at, drop_node, insert_child, remove_child,
    remove_children, remove_node, steal_children_of,
};
