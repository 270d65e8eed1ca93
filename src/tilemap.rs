use {
	crate::{
		Error, Image, IntegrityError, Result, TileIndex, TilemapId, Tileset, GRID_SIZE, RENDER_SIZE, TILE_SIZE,
	},
	std::rc::Rc,
	tracing::{debug, warn},
};

/// Tile indices addressed as `grid[x][y]`.
pub type Grid = [[TileIndex; GRID_SIZE]; GRID_SIZE];

#[derive(Debug)]
pub struct Tilemap {
	id: TilemapId,
	name: String,
	tileset: Rc<Tileset>,
	grid: Grid,
}

impl Tilemap {
	/// A map whose every cell is tile 0.
	#[must_use]
	pub fn new(id: TilemapId, name: String, tileset: Rc<Tileset>) -> Self {
		Self { id, name, tileset, grid: [[0; GRID_SIZE]; GRID_SIZE] }
	}

	/// Fills the grid from stored `(posX, posY, number)` rows; cells outside the grid are skipped.
	pub(crate) fn fromRows(
		id: TilemapId,
		name: String,
		tileset: Rc<Tileset>,
		rows: impl IntoIterator<Item = (i64, i64, i64)>,
	) -> Result<Self> {
		let mut tilemap = Self::new(id, name, tileset);
		for (x, y, number) in rows {
			let index = TileIndex::try_from(number)
				.map_err(|_| IntegrityError::NegativeTileNumber { tilemapId: id, x, y, number })?;
			match (usize::try_from(x), usize::try_from(y)) {
				(Ok(x), Ok(y)) if x < GRID_SIZE && y < GRID_SIZE => tilemap.grid[x][y] = index,
				_ => warn!(tilemapId = id, x, y, "ignoring cell outside the grid"),
			}
		}
		Ok(tilemap)
	}

	#[inline(always)]
	#[must_use]
	pub fn id(&self) -> TilemapId {
		self.id
	}

	#[inline(always)]
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn rename(&mut self, name: String) {
		self.name = name;
	}

	#[inline(always)]
	#[must_use]
	pub fn tileset(&self) -> &Rc<Tileset> {
		&self.tileset
	}

	#[inline(always)]
	#[must_use]
	pub fn grid(&self) -> &Grid {
		&self.grid
	}

	pub fn tile(&self, x: usize, y: usize) -> Result<TileIndex> {
		checkBounds(x, y)?;
		Ok(self.grid[x][y])
	}

	/// The index is not checked against the tileset until render or save.
	pub fn setTile(&mut self, x: usize, y: usize, tileIndex: TileIndex) -> Result<()> {
		checkBounds(x, y)?;
		self.grid[x][y] = tileIndex;
		Ok(())
	}

	/// Every cell whose index has no tile in the tileset is reported, first one wins.
	pub fn validate(&self) -> Result<(), IntegrityError> {
		let tileCount = self.tileset.len();
		for (x, column) in self.grid.iter().enumerate() {
			for (y, &index) in column.iter().enumerate() {
				if index >= tileCount {
					return Err(IntegrityError::TileIndexOutOfRange { x, y, index, tileCount });
				}
			}
		}
		Ok(())
	}

	/// Composes a `RENDER_SIZE` square image. Cell `(x, y)` lands at pixel
	/// column `y * TILE_SIZE`, row `x * TILE_SIZE`.
	pub fn renderImage(&self) -> Result<Image> {
		self.validate()?;
		let tiles = self.tileset.tiles();
		let mut image = Image::fromWidthHeight(RENDER_SIZE, RENDER_SIZE);
		for (x, column) in self.grid.iter().enumerate() {
			for (y, &index) in column.iter().enumerate() {
				image.blitPixelsRectangle([y * TILE_SIZE, x * TILE_SIZE], [TILE_SIZE; 2], &tiles[index], [0, 0]);
			}
		}
		debug!(tilemapId = self.id, "rendered");
		Ok(image)
	}
}

fn checkBounds(x: usize, y: usize) -> Result<()> {
	if x < GRID_SIZE && y < GRID_SIZE {
		Ok(())
	} else {
		Err(Error::Bounds { x, y, size: GRID_SIZE })
	}
}
