use imgsniff::DecodeOptions;

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	// Usage: decode [--flip] <path to image file> [<path to output raw file>]
	let args: Vec<String> = std::env::args().collect();
	let flip = args.iter().skip(1).any(|arg| arg == "--flip");
	let paths: Vec<&String> = args.iter().skip(1).filter(|arg| *arg != "--flip").collect();
	if paths.is_empty() || paths.len() > 2 {
		eprintln!("Usage: {} [--flip] <input image path> [<output raw path>]", args[0]);
		std::process::exit(1);
	}

	let input_path = paths[0];

	let Some(output_path) = paths.get(1) else {
		match imgsniff::load_config(input_path) {
			Ok((format, config)) => println!("{}: {} {}x{} {:?}", input_path, format, config.width, config.height, config.color_model),
			Err(e) => {
				eprintln!("Failed to read header of {}: {:?}", input_path, e);
				std::process::exit(1);
			},
		}
		return;
	};

	let options = DecodeOptions::default().flip_vertically(flip);
	let (format, img) = match imgsniff::load_image(input_path, &options) {
		Ok(v) => v,
		Err(e) => {
			eprintln!("Failed to load image {}: {:?}", input_path, e);
			std::process::exit(1);
		},
	};

	if let Err(e) = std::fs::write(output_path, &img.pixels) {
		eprintln!("Failed to write {}: {}", output_path, e);
		std::process::exit(1);
	}
	log::info!("Decoded {} image {} to raw RGBA8, wrote {} bytes to {}", format, input_path, img.pixels.len(), output_path);
}
