pub mod api;
pub mod chat;
pub mod clip;
pub mod clip_plan;
pub mod config;
pub mod ffmpeg;
pub mod init;
pub mod transcript;
