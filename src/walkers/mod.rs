pub mod traits;
pub mod random;
pub mod walklet;

pub use traits::{Walk, Walker, WalkerKind};
pub use random::RandomWalker;
pub use walklet::WalkletWalker;
