//! SQLite-backed storage for tilesets and tilemaps.
//!
//! [`Storage`] owns the one connection of the process. Multi-statement writes
//! run inside a transaction, so a failure never leaves a tileset without tiles
//! or a tilemap with half of its cells replaced.

use {
	crate::{
		tileset::checkTileDimensions, Error, Image, IntegrityError, Result, TileIndex, TilemapId, Tilemap, Tileset, TilesetId,
	},
	rusqlite::{params, Connection, OptionalExtension, Transaction},
	serde::Serialize,
	std::{path::Path, rc::Rc},
	tracing::{debug, info},
};

const SCHEMA_SQL: &str = "
	PRAGMA foreign_keys = ON;
	CREATE TABLE IF NOT EXISTS Tilesets (
		idTileset INTEGER PRIMARY KEY,
		name TEXT NOT NULL
	);
	CREATE TABLE IF NOT EXISTS Tiles (
		idTileset INTEGER NOT NULL REFERENCES Tilesets (idTileset),
		number INTEGER NOT NULL,
		image BLOB NOT NULL,
		PRIMARY KEY (idTileset, number)
	);
	CREATE TABLE IF NOT EXISTS Tilemaps (
		idTilemap INTEGER PRIMARY KEY,
		name TEXT NOT NULL,
		idTileset INTEGER NOT NULL REFERENCES Tilesets (idTileset)
	);
	CREATE TABLE IF NOT EXISTS TilesPosition (
		idTilemap INTEGER NOT NULL REFERENCES Tilemaps (idTilemap),
		posX INTEGER NOT NULL,
		posY INTEGER NOT NULL,
		number INTEGER NOT NULL,
		PRIMARY KEY (idTilemap, posX, posY)
	);
";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TilesetSummary {
	pub id: TilesetId,
	pub name: String,
	pub tileCount: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TilemapSummary {
	pub id: TilemapId,
	pub name: String,
	pub tilesetName: String,
}

pub struct Storage {
	connection: Connection,
}

impl Storage {
	/// Opens or creates the database file and its schema.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		info!(path = %path.display(), "opening database");
		Self::bootstrap(Connection::open(path)?)
	}

	pub fn openInMemory() -> Result<Self> {
		Self::bootstrap(Connection::open_in_memory()?)
	}

	fn bootstrap(connection: Connection) -> Result<Self> {
		connection.execute_batch(SCHEMA_SQL)?;
		Ok(Self { connection })
	}

	pub fn listTilesets(&self) -> Result<Vec<TilesetSummary>> {
		let mut statement = self.connection.prepare(
			"SELECT Tilesets.idTileset, Tilesets.name, COUNT(Tiles.idTileset)
			FROM Tilesets JOIN Tiles ON Tilesets.idTileset = Tiles.idTileset
			GROUP BY Tilesets.idTileset
			ORDER BY Tilesets.idTileset",
		)?;
		let rows = statement.query_map([], |row| {
			Ok(TilesetSummary { id: row.get(0)?, name: row.get(1)?, tileCount: row.get(2)? })
		})?;
		Ok(rows.collect::<rusqlite::Result<_>>()?)
	}

	pub fn listTilemaps(&self) -> Result<Vec<TilemapSummary>> {
		let mut statement = self.connection.prepare(
			"SELECT Tilemaps.idTilemap, Tilemaps.name, Tilesets.name
			FROM Tilemaps JOIN Tilesets ON Tilemaps.idTileset = Tilesets.idTileset
			ORDER BY Tilemaps.idTilemap",
		)?;
		let rows = statement.query_map([], |row| {
			Ok(TilemapSummary { id: row.get(0)?, name: row.get(1)?, tilesetName: row.get(2)? })
		})?;
		Ok(rows.collect::<rusqlite::Result<_>>()?)
	}

	pub fn getTileset(&self, id: TilesetId) -> Result<Tileset> {
		let name: String = self
			.connection
			.query_row("SELECT name FROM Tilesets WHERE idTileset = ?1", params![id], |row| row.get(0))
			.optional()?
			.ok_or(Error::NotFound { entity: "tileset", id })?;
		let rows = {
			let mut statement =
				self.connection.prepare("SELECT number, image FROM Tiles WHERE idTileset = ?1 ORDER BY number")?;
			let rows = statement.query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?;
			rows.collect::<rusqlite::Result<Vec<(i64, Vec<u8>)>>>()?
		};
		debug!(tilesetId = id, tiles = rows.len(), "loading tileset");
		Tileset::fromRows(id, name, rows)
	}

	pub fn getTilemap(&self, id: TilemapId) -> Result<Tilemap> {
		let (name, tilesetId): (String, TilesetId) = self
			.connection
			.query_row("SELECT name, idTileset FROM Tilemaps WHERE idTilemap = ?1", params![id], |row| {
				Ok((row.get(0)?, row.get(1)?))
			})
			.optional()?
			.ok_or(Error::NotFound { entity: "tilemap", id })?;
		let tileset = Rc::new(self.getTileset(tilesetId)?);
		let cells = {
			let mut statement = self.connection.prepare(
				"SELECT posX, posY, number FROM TilesPosition WHERE idTilemap = ?1 ORDER BY posX, posY",
			)?;
			let rows = statement.query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
			rows.collect::<rusqlite::Result<Vec<(i64, i64, i64)>>>()?
		};
		debug!(tilemapId = id, tilesetId, cells = cells.len(), "loading tilemap");
		Tilemap::fromRows(id, name, tileset, cells)
	}

	/// Creates a tileset holding `image` as tile 0 and returns its id.
	pub fn addTileset(&mut self, name: &str, image: &Image) -> Result<TilesetId> {
		checkTileDimensions(0, image)?;
		let png = image.toPNG()?;
		let transaction = self.connection.transaction()?;
		let id: TilesetId = transaction.query_row(
			"INSERT INTO Tilesets (name) VALUES (?1) RETURNING idTileset",
			params![name],
			|row| row.get(0),
		)?;
		insertTile(&transaction, id, 0, &png)?;
		transaction.commit()?;
		info!(tilesetId = id, name, "added tileset");
		Ok(id)
	}

	/// Appends `image` after the highest-numbered tile and returns its position in the tileset.
	pub fn appendTile(&mut self, tilesetId: TilesetId, image: &Image) -> Result<TileIndex> {
		let transaction = self.connection.transaction()?;
		let (number, tileCount): (i64, TileIndex) = transaction
			.query_row(
				"SELECT COALESCE(MAX(Tiles.number) + 1, 0), COUNT(Tiles.number) FROM Tilesets
				LEFT JOIN Tiles ON Tilesets.idTileset = Tiles.idTileset
				WHERE Tilesets.idTileset = ?1
				GROUP BY Tilesets.idTileset",
				params![tilesetId],
				|row| Ok((row.get(0)?, row.get(1)?)),
			)
			.optional()?
			.ok_or(Error::NotFound { entity: "tileset", id: tilesetId })?;
		// The new number is the highest, so the tile sorts last.
		let index = tileCount;
		checkTileDimensions(index, image)?;
		insertTile(&transaction, tilesetId, number, &image.toPNG()?)?;
		transaction.commit()?;
		debug!(tilesetId, number, index, "appended tile");
		Ok(index)
	}

	/// Creates an empty tilemap over an existing tileset and returns its id.
	pub fn addTilemap(&mut self, name: &str, tilesetId: TilesetId) -> Result<TilemapId> {
		let transaction = self.connection.transaction()?;
		if !tilesetExists(&transaction, tilesetId)? {
			return Err(Error::NotFound { entity: "tileset", id: tilesetId });
		}
		let id: TilemapId = transaction.query_row(
			"INSERT INTO Tilemaps (name, idTileset) VALUES (?1, ?2) RETURNING idTilemap",
			params![name, tilesetId],
			|row| row.get(0),
		)?;
		transaction.commit()?;
		info!(tilemapId = id, tilesetId, name, "added tilemap");
		Ok(id)
	}

	/// Writes the name and every non-zero cell of `tilemap`, replacing what was stored.
	/// The tilemap must carry the tileset it is stored with.
	pub fn saveTilemap(&mut self, tilemap: &Tilemap) -> Result<()> {
		tilemap.validate()?;
		let id = tilemap.id();
		let transaction = self.connection.transaction()?;
		let storedTilesetId: TilesetId = transaction
			.query_row("SELECT idTileset FROM Tilemaps WHERE idTilemap = ?1", params![id], |row| row.get(0))
			.optional()?
			.ok_or(Error::NotFound { entity: "tilemap", id })?;
		if storedTilesetId != tilemap.tileset().id() {
			return Err(IntegrityError::TilesetMismatch {
				tilemapId: id,
				stored: storedTilesetId,
				given: tilemap.tileset().id(),
			}
			.into());
		}
		transaction.execute("UPDATE Tilemaps SET name = ?1 WHERE idTilemap = ?2", params![tilemap.name(), id])?;
		transaction.execute("DELETE FROM TilesPosition WHERE idTilemap = ?1", params![id])?;
		let mut written = 0;
		{
			let mut insert = transaction.prepare(
				"INSERT INTO TilesPosition (idTilemap, posX, posY, number) VALUES (?1, ?2, ?3, ?4)",
			)?;
			for (x, column) in tilemap.grid().iter().enumerate() {
				for (y, &index) in column.iter().enumerate() {
					if index != 0 {
						insert.execute(params![id, x as i64, y as i64, index as i64])?;
						written += 1;
					}
				}
			}
		}
		transaction.commit()?;
		debug!(tilemapId = id, cells = written, "saved tilemap");
		Ok(())
	}
}

fn insertTile(transaction: &Transaction<'_>, tilesetId: TilesetId, number: i64, png: &[u8]) -> Result<()> {
	transaction.execute(
		"INSERT INTO Tiles (idTileset, number, image) VALUES (?1, ?2, ?3)",
		params![tilesetId, number, png],
	)?;
	Ok(())
}

fn tilesetExists(transaction: &Transaction<'_>, id: TilesetId) -> Result<bool> {
	Ok(transaction.query_row(
		"SELECT EXISTS(SELECT 1 FROM Tilesets WHERE idTileset = ?1)",
		params![id],
		|row| row.get(0),
	)?)
}
