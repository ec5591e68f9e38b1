pub mod converter;
pub mod error;
pub mod registry;
pub mod spooler;

pub use converter::{Converter, Encoding, OnError};
pub use error::CodecError;
pub use registry::Registry;
pub use spooler::{EntitySpooler, SensedEncoding};
