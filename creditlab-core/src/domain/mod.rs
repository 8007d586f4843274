//! Domain types for creditlab

pub mod fill;
pub mod ids;
pub mod portfolio;
pub mod position;

pub use fill::Fill;
pub use ids::{ConfigHash, DatasetHash, RunId};
pub use portfolio::{Holding, PortfolioSnapshot};
pub use position::Position;

/// Symbol type alias
pub type Symbol = String;
