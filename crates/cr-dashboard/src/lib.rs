pub mod catalog;
pub mod clan;
pub mod gateway;
pub mod leaderboard;
pub mod level;
pub mod render;
pub mod stats;
pub mod view;

pub use gateway::{Error, Gateway, HttpGateway, Result};
