use std::io::{Cursor, Read};

use image::{DynamicImage, ImageFormat, ImageReader, Limits, RgbaImage};
use zune_core::{bytestream::ZCursor, colorspace::ColorSpace, options::DecoderOptions};
use zune_jpeg::JpegDecoder;

use crate::{
	config::{Channels, DecodeOptions, ImageConfig},
	error::Error,
};


/// Fully decoded pixels, row-major with `channels` interleaved 8-bit samples per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
	pub width: u32,
	pub height: u32,
	/// Samples per pixel in the source image, before conversion.
	pub channels_in_file: u8,
	pub channels: Channels,
	pub pixels: Vec<u8>,
}

impl PixelBuffer {
	pub fn stride(&self) -> usize {
		self.width as usize * usize::from(self.channels.count())
	}
}


/// Runs the pixel engine over an in-memory image.
///
/// Engine failures are surfaced as [`Error::DecodeFailed`] carrying the engine's own message.
pub fn decode_bytes(bytes: &[u8], format: ImageFormat, options: &DecodeOptions) -> Result<PixelBuffer, Error> {
	let (img, channels_in_file) = match format {
		ImageFormat::Jpeg => decode_jpeg(bytes, &options.limits)?,
		_ => {
			let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
			reader.limits(options.limits.clone());
			let img = reader.decode()?;
			let channels = img.color().channel_count();
			(img, channels)
		},
	};

	let img = if options.flip_vertically { img.flipv() } else { img };
	let (width, height) = (img.width(), img.height());
	let pixels = match options.channels {
		Channels::Grey => img.into_luma8().into_raw(),
		Channels::GreyAlpha => img.into_luma_alpha8().into_raw(),
		Channels::Rgb => img.into_rgb8().into_raw(),
		Channels::Rgba => img.into_rgba8().into_raw(),
	};

	Ok(PixelBuffer {
		width,
		height,
		channels_in_file,
		channels: options.channels,
		pixels,
	})
}


/// Buffers the rest of `reader`, checks the header against the configured limits, then decodes.
pub(crate) fn decode_stream<R, F>(mut reader: R, format: ImageFormat, parse_config: F, options: &DecodeOptions) -> Result<PixelBuffer, Error>
where
	R: Read,
	F: FnOnce(&[u8]) -> Result<ImageConfig, Error>,
{
	let mut bytes = Vec::new();
	reader.read_to_end(&mut bytes)?;

	let config = parse_config(&bytes)?;
	options.limits.check_dimensions(config.width, config.height)?;

	decode_bytes(&bytes, format, options)
}


fn decode_jpeg(bytes: &[u8], limits: &Limits) -> Result<(DynamicImage, u8), Error> {
	// Limits are checked below against the frame header, so lift zune's defaults
	let options = DecoderOptions::default()
		.jpeg_set_out_colorspace(ColorSpace::RGBA)
		.set_max_width(usize::MAX)
		.set_max_height(usize::MAX);
	let mut decoder = JpegDecoder::new_with_options(ZCursor::new(bytes), options);
	decoder.decode_headers().map_err(|err| Error::DecodeFailed(err.to_string()))?;

	let Some((width, height)) = decoder.dimensions() else {
		return Err(Error::DecodeFailed("JPEG decoder reported no dimensions".to_string()));
	};
	let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
		return Err(Error::DecodeFailed("JPEG dimensions out of range".to_string()));
	};
	limits.check_dimensions(width, height)?;

	let channels_in_file = decoder.input_colorspace().map(|c| c.num_components() as u8).unwrap_or(0);
	let pixels = decoder.decode().map_err(|err| Error::DecodeFailed(err.to_string()))?;
	let Some(img) = RgbaImage::from_raw(width, height, pixels) else {
		return Err(Error::DecodeFailed("JPEG decoder returned a short pixel buffer".to_string()));
	};

	Ok((DynamicImage::ImageRgba8(img), channels_in_file))
}
