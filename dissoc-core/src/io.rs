use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{DissocError, Result};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let path = filename.as_ref();
	let unreadable = |source: std::io::Error| DissocError::SourceUnreadable {
		source_name: path.display().to_string(),
		source,
	};

	let mut contents = String::new();
	File::open(path)
		.map_err(unreadable)?
		.read_to_string(&mut contents)
		.map_err(unreadable)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Deserializes a JSON document from a file.
pub(crate) fn read_json<T: DeserializeOwned, P: AsRef<Path>>(filename: P) -> Result<T> {
	let path = filename.as_ref();
	let file = File::open(path).map_err(|source| DissocError::SourceUnreadable {
		source_name: path.display().to_string(),
		source,
	})?;
	Ok(serde_json::from_reader(BufReader::new(file))?)
}
