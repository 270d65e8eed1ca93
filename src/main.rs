#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	clap::{Parser, Subcommand},
	serde::Serialize,
	std::{
		fs::File,
		io::{BufReader, BufWriter, Write},
		path::PathBuf,
		process::ExitCode,
	},
	tilemap_editor::{
		config::{initLogging, Config},
		stdoutRaw, Image, Result, Storage, TileIndex, TilemapId, TilemapSummary, TilesetId, TilesetSummary,
	},
	tracing::{error, info},
};

#[derive(Parser, Debug)]
#[clap(version, about = "Stores tilesets and 32x32 tilemaps in SQLite and renders maps to PNG")]
struct Args {
	/// TOML configuration file
	#[clap(long)]
	config: Option<PathBuf>,
	/// Overrides `database.path` from the configuration
	#[clap(long)]
	database: Option<PathBuf>,
	#[clap(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Prints every tileset with its tile count as TOML
	ListTilesets,
	/// Prints every tilemap with its tileset name as TOML
	ListTilemaps,
	/// Creates a tileset whose tile 0 is the given 16x16 PNG
	AddTileset { name: String, png: PathBuf },
	/// Appends a 16x16 PNG to an existing tileset
	AppendTile { tilesetId: TilesetId, png: PathBuf },
	/// Creates an all-zero tilemap over a tileset
	AddTilemap { name: String, tilesetId: TilesetId },
	/// Sets one cell of a stored tilemap
	SetTile { tilemapId: TilemapId, x: usize, y: usize, tileIndex: TileIndex },
	/// Writes the composed 512x512 PNG of a tilemap to stdout
	Render { tilemapId: TilemapId },
}

fn main() -> ExitCode {
	let args = Args::parse();
	let config = match Config::load(args.config.as_deref()) {
		Ok(config) => config,
		Err(err) => {
			eprintln!("{err}");
			return ExitCode::FAILURE;
		}
	};
	if let Err(err) = initLogging(&config.log) {
		eprintln!("{err}");
		return ExitCode::FAILURE;
	}
	let databasePath = args.database.unwrap_or(config.database.path);
	let result = Storage::open(&databasePath).and_then(|mut storage| {
		let stdout = &mut BufWriter::new(stdoutRaw());
		run(&mut storage, args.command, stdout)?;
		Ok(stdout.flush()?)
	});
	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{err}");
			ExitCode::FAILURE
		}
	}
}

fn run(storage: &mut Storage, command: Command, stdout: &mut impl Write) -> Result<()> {
	match command {
		Command::ListTilesets => {
			#[derive(Serialize)]
			struct Listing {
				#[serde(rename = "tileset")]
				tilesets: Vec<TilesetSummary>,
			}
			printTOML(stdout, &Listing { tilesets: storage.listTilesets()? })?;
		}
		Command::ListTilemaps => {
			#[derive(Serialize)]
			struct Listing {
				#[serde(rename = "tilemap")]
				tilemaps: Vec<TilemapSummary>,
			}
			printTOML(stdout, &Listing { tilemaps: storage.listTilemaps()? })?;
		}
		Command::AddTileset { name, png } => {
			let id = storage.addTileset(&name, &readPNG(&png)?)?;
			writeln!(stdout, "{id}")?;
		}
		Command::AppendTile { tilesetId, png } => {
			let number = storage.appendTile(tilesetId, &readPNG(&png)?)?;
			writeln!(stdout, "{number}")?;
		}
		Command::AddTilemap { name, tilesetId } => {
			let id = storage.addTilemap(&name, tilesetId)?;
			writeln!(stdout, "{id}")?;
		}
		Command::SetTile { tilemapId, x, y, tileIndex } => {
			let mut tilemap = storage.getTilemap(tilemapId)?;
			tilemap.setTile(x, y, tileIndex)?;
			storage.saveTilemap(&tilemap)?;
			info!(tilemapId, x, y, tileIndex, "cell updated");
		}
		Command::Render { tilemapId } => {
			storage.getTilemap(tilemapId)?.renderImage()?.writePNG(&mut *stdout)?;
		}
	}
	Ok(())
}

fn readPNG(path: &std::path::Path) -> Result<Image> {
	Image::fromPNG(BufReader::new(File::open(path)?))
}

fn printTOML(stdout: &mut impl Write, value: &impl Serialize) -> Result<()> {
	write!(stdout, "{}", toml::to_string_pretty(value)?)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		tilemap_editor::{GRID_SIZE, RENDER_SIZE, TILE_SIZE},
	};

	fn storageWithMap() -> (Storage, TilesetId, TilemapId) {
		let mut storage = Storage::openInMemory().unwrap();
		let tilesetId = storage.addTileset("terrain", &Image::filled(TILE_SIZE, TILE_SIZE, [0, 90, 0, 255])).unwrap();
		storage.appendTile(tilesetId, &Image::filled(TILE_SIZE, TILE_SIZE, [200, 0, 0, 255])).unwrap();
		let tilemapId = storage.addTilemap("village", tilesetId).unwrap();
		(storage, tilesetId, tilemapId)
	}

	fn runToString(storage: &mut Storage, command: Command) -> String {
		let output = &mut Vec::<u8>::new();
		run(storage, command, output).unwrap();
		String::from_utf8(output.clone()).unwrap()
	}

	#[test]
	fn listings_print_parseable_toml() {
		let (mut storage, tilesetId, tilemapId) = storageWithMap();
		let tilesets: toml::Value = runToString(&mut storage, Command::ListTilesets).parse().unwrap();
		let tileset = &tilesets["tileset"].as_array().unwrap()[0];
		assert_eq!(tileset["id"].as_integer(), Some(tilesetId));
		assert_eq!(tileset["name"].as_str(), Some("terrain"));
		assert_eq!(tileset["tileCount"].as_integer(), Some(2));

		let tilemaps: toml::Value = runToString(&mut storage, Command::ListTilemaps).parse().unwrap();
		let tilemap = &tilemaps["tilemap"].as_array().unwrap()[0];
		assert_eq!(tilemap["id"].as_integer(), Some(tilemapId));
		assert_eq!(tilemap["tilesetName"].as_str(), Some("terrain"));
	}

	#[test]
	fn set_tile_is_persisted() {
		let (mut storage, _, tilemapId) = storageWithMap();
		runToString(&mut storage, Command::SetTile { tilemapId, x: 3, y: 17, tileIndex: 1 });
		assert_eq!(storage.getTilemap(tilemapId).unwrap().tile(3, 17).unwrap(), 1);
	}

	#[test]
	fn set_tile_out_of_bounds_fails_and_saves_nothing() {
		let (mut storage, _, tilemapId) = storageWithMap();
		let command = Command::SetTile { tilemapId, x: GRID_SIZE, y: 0, tileIndex: 1 };
		assert!(matches!(run(&mut storage, command, &mut Vec::<u8>::new()), Err(tilemap_editor::Error::Bounds { .. })));
		assert!(storage.getTilemap(tilemapId).unwrap().grid().iter().flatten().all(|&i| i == 0));
	}

	#[test]
	fn render_writes_a_decodable_png() {
		let (mut storage, _, tilemapId) = storageWithMap();
		runToString(&mut storage, Command::SetTile { tilemapId, x: 0, y: 1, tileIndex: 1 });
		let output = &mut Vec::<u8>::new();
		run(&mut storage, Command::Render { tilemapId }, output).unwrap();
		let image = Image::fromPNG(output.as_slice()).unwrap();
		assert_eq!(image.dimensions(), [RENDER_SIZE, RENDER_SIZE]);
		assert_eq!(image.pixel([TILE_SIZE, 0]), [200, 0, 0, 255]);
		assert_eq!(image.pixel([0, TILE_SIZE]), [0, 90, 0, 255]);
	}

	#[test]
	fn add_commands_print_new_ids() {
		let (mut storage, tilesetId, tilemapId) = storageWithMap();
		let printed = runToString(&mut storage, Command::AddTilemap { name: "second".into(), tilesetId });
		let id: TilemapId = printed.trim().parse().unwrap();
		assert_ne!(id, tilemapId);
		assert_eq!(storage.getTilemap(id).unwrap().name(), "second");
	}
}
