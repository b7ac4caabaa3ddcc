use image::Limits;


/// Color model reported for every parsed header. Decoded output is always expanded to RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModel {
	Rgba,
}


/// Structural metadata read from an image header, without decoding any pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageConfig {
	pub width: u32,
	pub height: u32,
	pub color_model: ColorModel,
}

impl ImageConfig {
	pub fn new(width: u32, height: u32) -> Self {
		ImageConfig {
			width,
			height,
			color_model: ColorModel::Rgba,
		}
	}
}


/// Samples per pixel requested from the pixel engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Channels {
	Grey,
	GreyAlpha,
	Rgb,
	#[default]
	Rgba,
}

impl Channels {
	pub fn count(self) -> u8 {
		match self {
			Channels::Grey => 1,
			Channels::GreyAlpha => 2,
			Channels::Rgb => 3,
			Channels::Rgba => 4,
		}
	}
}


/// Per-call settings for the full decode path.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
	pub flip_vertically: bool,
	pub channels: Channels,
	pub limits: Limits,
}

impl DecodeOptions {
	/// Store rows bottom-up in the output buffer.
	pub fn flip_vertically(mut self, flip: bool) -> Self {
		self.flip_vertically = flip;
		self
	}

	pub fn channels(mut self, channels: Channels) -> Self {
		self.channels = channels;
		self
	}

	/// Dimension and allocation limits, checked against the header before the engine runs.
	pub fn limits(mut self, limits: Limits) -> Self {
		self.limits = limits;
		self
	}
}
