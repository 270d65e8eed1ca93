#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

pub mod config;
mod error;
mod image;
pub mod storage;
mod tilemap;
mod tileset;

pub use {
	error::{Error, IntegrityError, Result},
	image::Image,
	storage::{Storage, TilemapSummary, TilesetSummary},
	tilemap::{Grid, Tilemap},
	tileset::Tileset,
};

/// Cells per side of every tilemap.
pub const GRID_SIZE: usize = 32;
/// Pixels per side of every tile.
pub const TILE_SIZE: usize = 16;
/// Pixels per side of a rendered tilemap.
pub const RENDER_SIZE: usize = GRID_SIZE * TILE_SIZE;

pub const RGBA_SIZE: usize = 4;

pub type TilesetId = i64;
pub type TilemapId = i64;
pub type TileIndex = usize;

pub type Vec2 = [usize; 2];
pub const X: usize = 0;
pub const Y: usize = 1;
pub const WIDTH: usize = 0;
pub const HEIGHT: usize = 1;

use std::{fs::File, os};

#[cfg(unix)]
pub fn stdoutRaw() -> File {
	use os::unix::io::FromRawFd;
	unsafe { File::from_raw_fd(1) }
}

#[cfg(windows)]
pub fn stdoutRaw() -> File {
	use {
		os::windows::io::{AsRawHandle, FromRawHandle},
		std::io,
	};
	unsafe { File::from_raw_handle(io::stdout().as_raw_handle()) }
}
