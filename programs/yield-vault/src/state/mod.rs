pub mod allocation;
pub mod position;
pub mod router;
pub mod shares;
pub mod strategy;
pub mod vault;

pub use allocation::*;
pub use position::*;
pub use router::*;
pub use shares::*;
pub use strategy::*;
pub use vault::*;
