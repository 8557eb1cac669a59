pub mod config;
pub mod export;
pub mod inspect;
pub mod play;
