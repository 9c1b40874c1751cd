pub mod backend;
pub mod box_score;
pub mod compare;
pub mod config;
pub mod export;
pub mod four_factors;
pub mod game_flow;
pub mod http_client;
pub mod leaderboard;
pub mod model;
pub mod persist;
pub mod play_by_play;
pub mod provider;
pub mod remote_backend;
pub mod scorekeeper;
pub mod shot_chart;
pub mod sqlite_backend;
pub mod state;
pub mod stats;
pub mod validation;
