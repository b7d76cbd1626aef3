pub mod animation;
pub mod audio;
pub mod config;
pub mod controllers;
pub mod errors;
pub mod event_handling;
pub mod init;
pub mod models;
pub mod rig;
pub mod sensors;
pub mod simulation;
pub mod state_management;
pub mod utils;
