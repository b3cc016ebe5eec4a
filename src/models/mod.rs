pub mod mention;
pub mod position;

pub use mention::Mention;
pub use position::DocPosition;
