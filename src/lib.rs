pub mod data_feed;
pub mod http_cache;
pub mod http_client;
pub mod league_sources;
pub mod match_history;
pub mod predict;
pub mod state;
pub mod team_rates;
pub mod win_prob;
