pub mod config;
pub mod cutout;
pub mod fetch;
pub mod info;
pub mod list;
