pub mod repository;
pub mod track_list;

mod album;
mod id_types;
mod upload;
pub use album::*;
pub use id_types::*;
pub use upload::*;

mod util;
