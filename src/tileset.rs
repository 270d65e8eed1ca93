use {
	crate::{Image, IntegrityError, Result, TileIndex, TilesetId, TILE_SIZE},
	tracing::warn,
};

/// A named, ordered sequence of tiles. The position of a tile is its number.
#[derive(Debug)]
pub struct Tileset {
	id: TilesetId,
	name: String,
	tiles: Vec<Image>,
}

impl Tileset {
	/// Fails unless there is at least one tile and every tile is `TILE_SIZE` square.
	pub fn new(id: TilesetId, name: String, tiles: Vec<Image>) -> Result<Self> {
		if tiles.is_empty() {
			return Err(IntegrityError::EmptyTileset { tilesetId: id }.into());
		}
		for (index, tile) in tiles.iter().enumerate() {
			checkTileDimensions(index, tile)?;
		}
		Ok(Self { id, name, tiles })
	}

	/// Builds from `(number, png)` rows already sorted by number.
	pub(crate) fn fromRows(id: TilesetId, name: String, rows: Vec<(i64, Vec<u8>)>) -> Result<Self> {
		let mut tiles = Vec::with_capacity(rows.len());
		for (position, (number, png)) in rows.into_iter().enumerate() {
			if usize::try_from(number).ok() != Some(position) {
				warn!(tilesetId = id, number, position, "tile number does not match its position");
			}
			tiles.push(Image::fromPNG(png.as_slice())?);
		}
		Self::new(id, name, tiles)
	}

	#[inline(always)]
	#[must_use]
	pub fn id(&self) -> TilesetId {
		self.id
	}

	#[inline(always)]
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[inline(always)]
	#[must_use]
	pub fn tiles(&self) -> &[Image] {
		&self.tiles
	}

	#[inline(always)]
	#[must_use]
	pub fn len(&self) -> usize {
		self.tiles.len()
	}

	/// Always false for a constructed tileset.
	#[inline(always)]
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.tiles.is_empty()
	}

	#[must_use]
	pub fn tile(&self, index: TileIndex) -> Option<&Image> {
		self.tiles.get(index)
	}
}

pub(crate) fn checkTileDimensions(index: usize, tile: &Image) -> Result<(), IntegrityError> {
	if tile.dimensions() == [TILE_SIZE; 2] {
		Ok(())
	} else {
		Err(IntegrityError::TileDimensions {
			index,
			width: tile.width,
			height: tile.height,
			expected: TILE_SIZE,
		})
	}
}

#[cfg(test)]
mod tests {
	use {super::*, crate::Error};

	#[test]
	fn keeps_tiles_in_given_order() {
		let tiles = (0..3).map(|i| Image::filled(TILE_SIZE, TILE_SIZE, [i, 0, 0, 255])).collect();
		let tileset = Tileset::new(7, "grass".into(), tiles).unwrap();
		assert_eq!((tileset.id(), tileset.name(), tileset.len()), (7, "grass", 3));
		assert_eq!(tileset.tile(2).unwrap().pixel([0, 0]), [2, 0, 0, 255]);
		assert!(tileset.tile(3).is_none());
	}

	#[test]
	fn rejects_empty_tileset() {
		let err = Tileset::new(4, "void".into(), Vec::new()).unwrap_err();
		assert!(matches!(err, Error::Integrity(IntegrityError::EmptyTileset { tilesetId: 4 })));
	}

	#[test]
	fn rejects_wrongly_sized_tile() {
		let tiles = vec![Image::fromWidthHeight(TILE_SIZE, TILE_SIZE), Image::fromWidthHeight(8, TILE_SIZE)];
		let err = Tileset::new(1, "odd".into(), tiles).unwrap_err();
		assert!(matches!(
			err,
			Error::Integrity(IntegrityError::TileDimensions { index: 1, width: 8, height: TILE_SIZE, .. })
		));
	}

	#[test]
	fn rows_are_indexed_by_position() {
		let png = |shade| Image::filled(TILE_SIZE, TILE_SIZE, [shade; 4]).toPNG().unwrap();
		let tileset = Tileset::fromRows(2, "gappy".into(), vec![(0, png(1)), (5, png(2))]).unwrap();
		assert_eq!(tileset.len(), 2);
		assert_eq!(tileset.tile(1).unwrap().pixel([3, 3]), [2; 4]);
	}
}
