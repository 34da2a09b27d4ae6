pub mod booking;
pub mod generation;
pub mod image;

pub use booking::*;
pub use generation::*;
pub use self::image::*;
