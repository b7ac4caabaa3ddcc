use std::error::Error as StdError;

pub enum Error {
	TruncatedInput,
	InvalidFormat(&'static str),
	UnrecognizedFormat,
	DecodeFailed(String), // Raw failure reason from the pixel engine
	Io(std::io::Error),
	Limits(image::error::LimitError),
}

impl Error {
	/// Returns true if the stream ended before a required field could be read.
	pub fn is_truncation(&self) -> bool {
		matches!(self, Error::TruncatedInput)
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		match err.kind() {
			std::io::ErrorKind::UnexpectedEof => Error::TruncatedInput,
			_ => Error::Io(err),
		}
	}
}

impl From<image::ImageError> for Error {
	fn from(err: image::ImageError) -> Self {
		match err {
			image::ImageError::IoError(io_err) => Error::from(io_err),
			image::ImageError::Limits(err) => Error::Limits(err),
			err => Error::DecodeFailed(err.to_string()),
		}
	}
}

impl StdError for Error {}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::TruncatedInput => write!(f, "unexpected end of input"),
			Error::InvalidFormat(reason) => write!(f, "invalid format: {}", reason),
			Error::UnrecognizedFormat => write!(f, "unrecognized image format"),
			Error::DecodeFailed(reason) => write!(f, "decode failed: {}", reason),
			Error::Io(err) => write!(f, "I/O error: {}", err),
			Error::Limits(err) => write!(f, "limits error: {}", err),
		}
	}
}

impl std::fmt::Debug for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Display::fmt(self, f)
	}
}
