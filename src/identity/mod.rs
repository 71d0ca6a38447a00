pub mod address;
pub mod gate;

pub use address::{Address, AddressError};
pub use gate::{Access, AccessGate, MembershipHandle};
