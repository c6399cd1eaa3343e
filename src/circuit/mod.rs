//! Static circuit data: the truth table rows, the feed-forward topology and
//! the NOR-style network semantics the constraint model encodes

pub mod network;
pub mod topology;
pub mod truth_table;

pub use network::{describe_gate, simulate, GateWiring};
pub use topology::{FeedLink, Topology};
pub use truth_table::{format_pattern, Channel, Row};
