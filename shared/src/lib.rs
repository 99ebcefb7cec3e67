pub mod address;
pub mod guild;
pub mod lookup;
pub mod region;

pub use address::{AddressSearch, AddressState};
pub use guild::*;
pub use lookup::*;
pub use region::{Region, host_variant_for};
