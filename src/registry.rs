use std::{
	fmt,
	io::{Chain, Cursor, Read},
};

use crate::{
	bmp,
	config::{DecodeOptions, ImageConfig},
	error::Error,
	jpeg,
	pixels::PixelBuffer,
};


pub type DecodeFn = fn(&mut dyn Read, &DecodeOptions) -> Result<PixelBuffer, Error>;
pub type ConfigFn = fn(&mut dyn Read) -> Result<ImageConfig, Error>;


/// A format known to a [`Registry`]. Both functions receive the stream from its first byte,
/// magic included.
#[derive(Clone, Copy)]
pub struct FormatEntry {
	pub name: &'static str,
	pub magic: &'static [u8],
	pub decode: DecodeFn,
	pub decode_config: ConfigFn,
}

impl fmt::Debug for FormatEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormatEntry").field("name", &self.name).field("magic", &self.magic).finish_non_exhaustive()
	}
}


/// An ordered table of formats, selected by magic prefix.
///
/// Build it once, then share it by reference; nothing mutates it while decoding.
#[derive(Debug, Clone)]
pub struct Registry {
	entries: Vec<FormatEntry>,
}

impl Default for Registry {
	fn default() -> Self {
		Self::with_default_formats()
	}
}

impl Registry {
	/// An empty registry that recognizes nothing.
	pub fn new() -> Registry {
		Registry { entries: Vec::new() }
	}

	/// BMP and JPEG, in that order.
	pub fn with_default_formats() -> Registry {
		let mut registry = Registry::new();
		registry
			.register(FormatEntry {
				name: "bmp",
				magic: bmp::MAGIC,
				decode: |r, options| bmp::decode(r, options),
				decode_config: |r| bmp::decode_config(r),
			})
			.register(FormatEntry {
				name: "jpeg",
				magic: jpeg::MAGIC,
				decode: |r, options| jpeg::decode(r, options),
				decode_config: |r| jpeg::decode_config(r),
			});
		registry
	}

	/// Appends a format. If two entries share a magic prefix, the one registered first wins.
	pub fn register(&mut self, entry: FormatEntry) -> &mut Self {
		self.entries.push(entry);
		self
	}

	pub fn entries(&self) -> &[FormatEntry] {
		&self.entries
	}

	/// Finds the first entry whose magic is a prefix of `prefix`.
	///
	/// Fails with [`Error::TruncatedInput`] when nothing matches but a longer magic is still
	/// consistent with the available bytes.
	pub fn match_prefix(&self, prefix: &[u8]) -> Result<&FormatEntry, Error> {
		if let Some(entry) = self.entries.iter().find(|entry| prefix.starts_with(entry.magic)) {
			return Ok(entry);
		}

		if self.entries.iter().any(|entry| entry.magic.len() > prefix.len() && entry.magic.starts_with(prefix)) {
			return Err(Error::TruncatedInput);
		}

		Err(Error::UnrecognizedFormat)
	}

	/// Identifies the format of `reader` without seeking.
	///
	/// The bytes consumed for the comparison are replayed at the front of the returned reader,
	/// so it still starts at the magic.
	pub fn sniff<R: Read>(&self, mut reader: R) -> Result<(&FormatEntry, Chain<Cursor<Vec<u8>>, R>), Error> {
		let wanted = self.entries.iter().map(|entry| entry.magic.len()).max().unwrap_or(0);
		let mut prefix = Vec::with_capacity(wanted);
		reader.by_ref().take(wanted as u64).read_to_end(&mut prefix)?;

		let entry = self.match_prefix(&prefix)?;
		log::debug!("sniffed {} image", entry.name);

		Ok((entry, Cursor::new(prefix).chain(reader)))
	}

	/// Fully decodes `reader` with whichever format its magic selects.
	pub fn decode<R: Read>(&self, reader: R, options: &DecodeOptions) -> Result<(&'static str, PixelBuffer), Error> {
		let (entry, mut stream) = self.sniff(reader)?;
		let pixels = (entry.decode)(&mut stream, options)?;
		Ok((entry.name, pixels))
	}

	/// Reads only the header of `reader` with whichever format its magic selects.
	pub fn decode_config<R: Read>(&self, reader: R) -> Result<(&'static str, ImageConfig), Error> {
		let (entry, mut stream) = self.sniff(reader)?;
		let config = (entry.decode_config)(&mut stream)?;
		Ok((entry.name, config))
	}
}
