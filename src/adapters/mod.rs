/// Adapters layer - interface adapters that convert between external formats and domain
pub mod documents;

pub use documents::DocumentSettings;
