/// Domain layer - contains business logic and domain models
/// This layer has no dependencies on outer layers

pub mod entities;
pub mod repositories;
pub mod utils;

pub use entities::*;
pub use repositories::*;
pub use utils::*;
