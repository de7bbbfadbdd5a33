pub mod client;
pub mod reader;
pub mod records;

pub use client::GraphClient;
pub use reader::{validate_network_depth, AlertGraphReader, GraphReadError, MAX_NETWORK_DEPTH};
pub use records::{
    AlertDetail, AlertSummary, NetworkConnection, NetworkPayload, OrderRecord, SearchCriteria,
    SearchPayload, TraderAlertsPayload, TypeAlertsPayload, TypedAlert,
};
