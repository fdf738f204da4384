//! Topic names served by the hub.

/// Aggregated dashboard state: opportunities, metrics, summary updates.
pub const DASHBOARD: &str = "dashboard";

/// Live stream of observed and submitted transactions.
pub const TRANSACTIONS: &str = "transactions";

/// Model training progress updates.
pub const ML_TRAINING: &str = "ml-training";

/// Topics the server exposes out of the box.
pub const ALL: [&str; 3] = [DASHBOARD, TRANSACTIONS, ML_TRAINING];
