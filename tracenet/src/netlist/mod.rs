pub mod connectivity;
pub mod reconcile;
pub mod union_find;

pub use connectivity::{connectivity_groups, ConnectivityReport};
pub use reconcile::{NetMerge, NetSplit, ReconcileReport};
pub use union_find::UnionFind;
