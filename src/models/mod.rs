pub mod entry;
pub mod image;
pub mod request;
pub mod user;

pub use entry::*;
pub use image::*;
pub use request::*;
pub use user::*;
