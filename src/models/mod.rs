pub mod price;
pub mod projection;

pub use price::*;
pub use projection::*;
