pub mod game_engine;
pub mod game_state;
pub mod leaderboard;
pub mod option_generator;
pub mod randomness;
pub mod settings;
pub mod storage;

pub use game_engine::GameEngine;
pub use game_state::GameState;
