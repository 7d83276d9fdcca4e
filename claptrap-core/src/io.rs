use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use crate::error::Result;

/// Extension of model files written by this crate.
pub const MODEL_EXTENSION: &str = "claptrap";

/// Reads a whole file into memory.
pub fn read_bytes<P: AsRef<Path>>(filename: P) -> Result<Vec<u8>> {
	let mut contents = Vec::new();
	File::open(filename)?.read_to_end(&mut contents)?;
	Ok(contents)
}

/// Reads a UTF-8 text file.
pub fn read_text<P: AsRef<Path>>(filename: P) -> Result<String> {
	Ok(fs::read_to_string(filename)?)
}

/// Writes `bytes` to a file, replacing any previous content.
pub fn write_bytes<P: AsRef<Path>>(filename: P, bytes: &[u8]) -> Result<()> {
	let mut file = File::create(filename)?;
	file.write_all(bytes)?;
	file.flush()?;
	Ok(())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `corpora/dracula.txt` + `"claptrap"` → `corpora/dracula.claptrap`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/dracula.claptrap"` → `"dracula"`
/// - `"dracula.claptrap"` → `"dracula"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

/// Names (file stems) of every model file in `dir`.
pub fn list_models<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
	list_files(dir, MODEL_EXTENSION)?
		.iter()
		.map(get_filename)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("corpora/dracula.txt", MODEL_EXTENSION).unwrap();
		assert_eq!(path, PathBuf::from("corpora/dracula.claptrap"));
	}

	#[test]
	fn filename_drops_extension() {
		assert_eq!(get_filename("./data/hockey.claptrap").unwrap(), "hockey");
	}

	#[test]
	fn lists_models_in_folder() {
		let dir = env::temp_dir().join(format!("claptrap-io-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		write_bytes(dir.join("b.claptrap"), b"x").unwrap();
		write_bytes(dir.join("a.claptrap"), b"x").unwrap();
		write_bytes(dir.join("notes.txt"), b"x").unwrap();

		assert_eq!(list_models(&dir).unwrap(), ["a", "b"]);
		assert_eq!(read_bytes(dir.join("a.claptrap")).unwrap(), b"x");

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn missing_file_is_a_resource_error() {
		let result = read_bytes("/definitely/not/here.claptrap");
		assert!(matches!(result, Err(crate::ClaptrapError::Resource(_))));
	}
}
