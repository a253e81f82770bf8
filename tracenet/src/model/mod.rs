pub mod board;
pub mod bus;
pub mod feature;
pub mod net;

pub use board::{ConfirmedVia, Connector};
pub use bus::Bus;
pub use feature::{ExtendedTrace, Feature, FeatureKind, FeatureRef, Provenance, Side, Via};
pub use net::{
    better_net_name, format_net_id, is_auto_name, name_priority, ElectricalNet, ElementKind,
    NetElement,
};
