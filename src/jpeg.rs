use std::io::{self, Read};

use byteorder_lite::{BigEndian, ReadBytesExt};
use image::ImageFormat;

use crate::{
	config::{DecodeOptions, ImageConfig},
	error::Error,
	pixels::{self, PixelBuffer},
};


/// The magic string at the start of a JPEG file (SOI marker).
pub const MAGIC: &[u8] = b"\xff\xd8";

const SENTINEL: u8 = 0xff;

// Baseline, extended sequential and progressive DCT
const SOF0: u8 = 0xc0;
const SOF1: u8 = 0xc1;
const SOF2: u8 = 0xc2;


/// Reads the dimensions of the JPEG backed by `reader`.
///
/// Walks the marker segments following SOI, skipping each one by its declared length, until the
/// first start-of-frame segment. Nothing bounds the number of segments; a stream without a
/// frame header ends in a truncation error.
pub fn decode_config<R: Read>(mut reader: R) -> Result<ImageConfig, Error> {
	let mut magic = [0; 2];
	reader.read_exact(&mut magic)?;
	if magic[..] != *MAGIC {
		return Err(Error::InvalidFormat("JPEG SOI marker missing"));
	}

	loop {
		let mut marker = [0; 2];
		reader.read_exact(&mut marker)?;
		let [sentinel, code] = marker;
		if sentinel != SENTINEL {
			return Err(Error::InvalidFormat("malformed JPEG marker"));
		}

		match code {
			SOF0 | SOF1 | SOF2 => {
				let _precision = reader.read_u8()?;
				let height = reader.read_u16::<BigEndian>()?;
				let width = reader.read_u16::<BigEndian>()?;
				return Ok(ImageConfig::new(u32::from(width), u32::from(height)));
			},
			_ => {
				// The length includes its own two bytes
				let length = reader.read_u16::<BigEndian>()?;
				let payload = u64::from(length.checked_sub(2).ok_or(Error::InvalidFormat("JPEG segment length below 2"))?);
				let skipped = io::copy(&mut reader.by_ref().take(payload), &mut io::sink())?;
				if skipped < payload {
					return Err(Error::TruncatedInput);
				}
				log::trace!("skipped JPEG segment {:#04x} ({} bytes)", code, payload);
			},
		}
	}
}


/// Decodes the JPEG backed by `reader` through the pixel engine.
///
/// Limits are checked against the engine's own reading of the frame header, which includes the
/// segment length that [`decode_config`] does not expect after a start-of-frame marker.
pub fn decode<R: Read>(mut reader: R, options: &DecodeOptions) -> Result<PixelBuffer, Error> {
	let mut bytes = Vec::new();
	reader.read_to_end(&mut bytes)?;
	pixels::decode_bytes(&bytes, ImageFormat::Jpeg, options)
}


#[cfg(test)]
mod tests {
	use super::*;

	struct Denied;

	impl Read for Denied {
		fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
			Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
		}
	}

	fn app0_then_sof(sof: u8) -> Vec<u8> {
		let mut data = vec![0xff, 0xd8];
		data.extend_from_slice(&[0xff, 0xe0, 0x00, 0x10]);
		data.extend_from_slice(&[0xaa; 14]);
		data.extend_from_slice(&[0xff, sof, 0x08, 0x01, 0x40, 0x00, 0xf0]);
		data
	}

	#[test]
	fn skips_segment_and_reads_height_before_width() {
		let config = decode_config(app0_then_sof(SOF0).as_slice()).unwrap();
		assert_eq!(config, ImageConfig::new(240, 320));
	}

	#[test]
	fn all_frame_markers_terminate_the_walk() {
		for sof in [SOF0, SOF1, SOF2] {
			let config = decode_config(app0_then_sof(sof).as_slice()).unwrap();
			assert_eq!((config.width, config.height), (240, 320), "marker {:#04x}", sof);
		}
	}

	#[test]
	fn many_segments_are_skipped() {
		let mut data = vec![0xff, 0xd8];
		for i in 0..50u8 {
			let payload = vec![i; 1000];
			data.extend_from_slice(&[0xff, 0xe1]);
			data.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
			data.extend_from_slice(&payload);
		}
		// Empty payload
		data.extend_from_slice(&[0xff, 0xfe, 0x00, 0x02]);
		data.extend_from_slice(&[0xff, SOF2, 0x08, 0x00, 0x02, 0x00, 0x03]);
		let config = decode_config(data.as_slice()).unwrap();
		assert_eq!((config.width, config.height), (3, 2));
	}

	#[test]
	fn missing_sentinel_after_skip_is_invalid() {
		let mut data = app0_then_sof(SOF0);
		data[20] = 0x00;
		let err = decode_config(data.as_slice()).unwrap_err();
		assert!(matches!(err, Error::InvalidFormat(_)));
	}

	#[test]
	fn wrong_magic_is_invalid() {
		let err = decode_config([0xff, 0xd9, 0xff, 0xc0].as_slice()).unwrap_err();
		assert!(matches!(err, Error::InvalidFormat(_)));
	}

	#[test]
	fn short_segment_length_is_invalid() {
		let data = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x01];
		let err = decode_config(data.as_slice()).unwrap_err();
		assert!(matches!(err, Error::InvalidFormat(_)));
	}

	#[test]
	fn truncation_anywhere_is_reported() {
		let data = app0_then_sof(SOF0);
		for len in 0..data.len() {
			let err = decode_config(&data[..len]).unwrap_err();
			assert!(err.is_truncation(), "prefix of {} bytes gave {:?}", len, err);
		}
	}

	#[test]
	fn stream_without_frame_header_is_truncated() {
		let data = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x04, 0x01, 0x02];
		assert!(decode_config(data.as_slice()).unwrap_err().is_truncation());
	}

	#[test]
	fn io_error_inside_skipped_payload_is_kept() {
		let data = app0_then_sof(SOF0);
		let err = decode_config((&data[..12]).chain(Denied)).unwrap_err();
		match err {
			Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::PermissionDenied),
			other => panic!("expected Io, got {:?}", other),
		}
	}
}
