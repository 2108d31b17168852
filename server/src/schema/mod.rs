pub mod album;
pub mod request;
pub use album::*;
pub use request::*;
