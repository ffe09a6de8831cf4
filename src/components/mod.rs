pub mod detail_panel;
pub mod identity_check;
pub mod ledger_table;
pub mod network_graph;
pub mod sidebar;
pub mod stats_row;
pub mod upload_panel;
