use std::io::Read;

use byteorder_lite::{LittleEndian, ReadBytesExt};
use image::ImageFormat;

use crate::{
	config::{DecodeOptions, ImageConfig},
	error::Error,
	pixels::{self, PixelBuffer},
};


/// The magic string at the start of a BMP file.
pub const MAGIC: &[u8] = b"BM";


// BITMAPFILEHEADER followed by the size field of whichever info header comes next.
#[allow(dead_code)]
struct FileHeader {
	magic: [u8; 2],
	file_size: u32,
	reserved: [u16; 2],
	data_offset: u32,
	info_size: u32,
}

impl FileHeader {
	fn read<R: Read>(reader: &mut R) -> Result<FileHeader, Error> {
		let mut magic = [0; 2];
		reader.read_exact(&mut magic)?;
		Ok(FileHeader {
			magic,
			file_size: reader.read_u32::<LittleEndian>()?,
			reserved: [reader.read_u16::<LittleEndian>()?, reader.read_u16::<LittleEndian>()?],
			data_offset: reader.read_u32::<LittleEndian>()?,
			info_size: reader.read_u32::<LittleEndian>()?,
		})
	}
}


/// Reads the dimensions of the BMP backed by `reader`.
///
/// The OS/2 core header (12 bytes) stores unsigned 16-bit dimensions; the Windows info headers
/// (40, 56, 108 and 124 bytes) store signed 32-bit ones. Any other header size is rejected.
pub fn decode_config<R: Read>(mut reader: R) -> Result<ImageConfig, Error> {
	let header = FileHeader::read(&mut reader)?;
	if header.magic[..] != *MAGIC {
		return Err(Error::InvalidFormat("BMP magic mismatch"));
	}

	let (width, height) = match header.info_size {
		12 => {
			let width = reader.read_u16::<LittleEndian>()?;
			let height = reader.read_u16::<LittleEndian>()?;
			(u32::from(width), u32::from(height))
		},
		40 | 56 | 108 | 124 => {
			let width = reader.read_i32::<LittleEndian>()?;
			let height = reader.read_i32::<LittleEndian>()?;
			let width = u32::try_from(width).map_err(|_| Error::InvalidFormat("negative BMP width"))?;
			// A negative height only marks top-down row order
			(width, height.unsigned_abs())
		},
		_ => return Err(Error::InvalidFormat("unsupported BMP info header size")),
	};

	Ok(ImageConfig::new(width, height))
}


/// Decodes the BMP backed by `reader` through the pixel engine.
pub fn decode<R: Read>(reader: R, options: &DecodeOptions) -> Result<PixelBuffer, Error> {
	pixels::decode_stream(reader, ImageFormat::Bmp, |bytes| decode_config(bytes), options)
}


#[cfg(test)]
mod tests {
	use std::io;

	use super::*;

	struct Denied;

	impl Read for Denied {
		fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
			Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
		}
	}

	fn header(info_size: u32, dims: &[u8]) -> Vec<u8> {
		let mut data = b"BM".to_vec();
		data.extend_from_slice(&1234u32.to_le_bytes());
		data.extend_from_slice(&[0, 0, 0, 0]);
		data.extend_from_slice(&54u32.to_le_bytes());
		data.extend_from_slice(&info_size.to_le_bytes());
		data.extend_from_slice(dims);
		data
	}

	fn signed_dims(width: i32, height: i32) -> Vec<u8> {
		let mut dims = width.to_le_bytes().to_vec();
		dims.extend_from_slice(&height.to_le_bytes());
		dims
	}

	#[test]
	fn core_header_dimensions() {
		let mut dims = 65535u16.to_le_bytes().to_vec();
		dims.extend_from_slice(&7u16.to_le_bytes());
		let config = decode_config(header(12, &dims).as_slice()).unwrap();
		assert_eq!(config, ImageConfig::new(65535, 7));
	}

	#[test]
	fn info_header_variants() {
		for size in [40, 56, 108, 124] {
			let config = decode_config(header(size, &signed_dims(640, 480)).as_slice()).unwrap();
			assert_eq!((config.width, config.height), (640, 480), "info header size {}", size);
		}
	}

	#[test]
	fn top_down_height_reports_magnitude() {
		let config = decode_config(header(40, &signed_dims(17, -23)).as_slice()).unwrap();
		assert_eq!((config.width, config.height), (17, 23));

		let config = decode_config(header(124, &signed_dims(1, i32::MIN)).as_slice()).unwrap();
		assert_eq!(config.height, 1 << 31);
	}

	#[test]
	fn zero_dimensions_pass_through() {
		let config = decode_config(header(40, &signed_dims(0, 0)).as_slice()).unwrap();
		assert_eq!((config.width, config.height), (0, 0));
	}

	#[test]
	fn negative_width_is_invalid() {
		let err = decode_config(header(40, &signed_dims(-5, 5)).as_slice()).unwrap_err();
		assert!(matches!(err, Error::InvalidFormat(_)));
	}

	#[test]
	fn unknown_variant_is_invalid() {
		let err = decode_config(header(20, &signed_dims(5, 5)).as_slice()).unwrap_err();
		assert!(matches!(err, Error::InvalidFormat(_)));
	}

	#[test]
	fn wrong_magic_is_invalid() {
		let mut data = header(40, &signed_dims(5, 5));
		data[1] = b'A';
		let err = decode_config(data.as_slice()).unwrap_err();
		assert!(matches!(err, Error::InvalidFormat(_)));
	}

	#[test]
	fn truncation_anywhere_is_reported() {
		let data = header(40, &signed_dims(5, 5));
		for len in 0..data.len() {
			let err = decode_config(&data[..len]).unwrap_err();
			assert!(err.is_truncation(), "prefix of {} bytes gave {:?}", len, err);
		}
	}

	#[test]
	fn io_error_inside_dimensions_is_kept() {
		let data = header(40, &signed_dims(5, 5));
		let err = decode_config((&data[..20]).chain(Denied)).unwrap_err();
		match err {
			Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::PermissionDenied),
			other => panic!("expected Io, got {:?}", other),
		}
	}
}
