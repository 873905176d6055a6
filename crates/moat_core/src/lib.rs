pub mod error;
pub mod model;
pub mod net;
pub mod set;
pub mod time;

pub use error::{StoreError, StoreResult};
pub use model::*;
pub use net::{PortRange, Prefix};
pub use set::{OrderedIntSet, OrderedSet, OrderedStringSet};
