pub mod archive;
pub mod config;
pub mod consts;
pub mod cutout;
pub mod error;
pub mod extract;
pub mod io;
pub mod resolve;
pub mod sky;
pub mod table;
pub mod tile;
pub mod wcs;
