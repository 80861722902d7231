pub mod config;
pub mod login;
pub mod logout;
pub mod show;
pub mod status;
