pub mod analysis;
pub mod compare;
pub mod decode;
pub mod features;
