//! Backend response models

mod record;

pub use record::{AddressFamily, IpRecord};
