//! Image header sniffing and metadata extraction.
//!
//! [`Registry`] picks a format by magic prefix. Each format parses its own header for
//! dimensions (see [`bmp::decode_config`] and [`jpeg::decode_config`]) and hands full decodes to
//! the pixel engine in [`pixels`].
pub mod bmp;
mod config;
mod error;
pub mod jpeg;
pub mod pixels;
mod registry;

use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

pub use crate::{
	config::{Channels, ColorModel, DecodeOptions, ImageConfig},
	error::Error,
	pixels::PixelBuffer,
	registry::{ConfigFn, DecodeFn, FormatEntry, Registry},
};


pub fn load_image_from_reader<R: Read>(reader: R, options: &DecodeOptions) -> Result<(&'static str, PixelBuffer), Error> {
	Registry::default().decode(reader, options)
}


pub fn load_image<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<(&'static str, PixelBuffer), Error> {
	let file = File::open(path)?;
	let reader = BufReader::new(file);

	load_image_from_reader(reader, options)
}


/// Reads only as much of `reader` as the header needs.
pub fn load_config_from_reader<R: Read>(reader: R) -> Result<(&'static str, ImageConfig), Error> {
	Registry::default().decode_config(reader)
}


pub fn load_config<P: AsRef<Path>>(path: P) -> Result<(&'static str, ImageConfig), Error> {
	let file = File::open(path)?;
	let reader = BufReader::new(file);

	load_config_from_reader(reader)
}
