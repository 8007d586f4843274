//! PnL attribution of simulated fills.

pub mod attributor;
pub mod frame;
pub mod market_move;

pub use attributor::{cumulative_pnl, realized_pnl, AttributionRow, AttributionSummary, PnLAttributor};
pub use frame::{Enrichment, FillFrame};
pub use market_move::{BenchmarkMove, EntryReference, MarketMoveModel, NoMarketMove, SimulatedMove};
