use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
	#[error("{entity} {id} not found")]
	NotFound { entity: &'static str, id: i64 },

	#[error("data integrity: {0}")]
	Integrity(#[from] IntegrityError),

	#[error("storage: {0}")]
	Connection(#[from] rusqlite::Error),

	#[error("cell ({x}, {y}) is outside the {size}x{size} grid")]
	Bounds { x: usize, y: usize, size: usize },

	#[error("png decode: {0}")]
	Decode(#[from] png::DecodingError),

	#[error("png encode: {0}")]
	Encode(#[from] png::EncodingError),

	#[error("unsupported png color type {0:?}")]
	UnsupportedColorType(png::ColorType),

	#[error("toml output: {0}")]
	Serialize(#[from] toml::ser::Error),

	#[error("config: {0}")]
	Config(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Stored rows that cannot form a valid tileset or tilemap.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntegrityError {
	#[error("tileset {tilesetId} has no tiles")]
	EmptyTileset { tilesetId: i64 },

	#[error("cell ({x}, {y}) references tile {index} but the tileset has {tileCount}")]
	TileIndexOutOfRange { x: usize, y: usize, index: usize, tileCount: usize },

	#[error("tile {index} is {width}x{height}, expected {expected}x{expected}")]
	TileDimensions { index: usize, width: usize, height: usize, expected: usize },

	#[error("tilemap {tilemapId} cell ({x}, {y}) holds negative tile number {number}")]
	NegativeTileNumber { tilemapId: i64, x: i64, y: i64, number: i64 },

	#[error("tilemap {tilemapId} is stored with tileset {stored}, not {given}")]
	TilesetMismatch { tilemapId: i64, stored: i64, given: i64 },
}

impl From<toml::de::Error> for Error {
	fn from(err: toml::de::Error) -> Self {
		Self::Config(err.to_string())
	}
}
