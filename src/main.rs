use std::path::{Path, PathBuf};

use image::error::ImageError;

use frame_reformat::{Frame, FrameError, PixelFormat};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// Output path next to the input, named after its stem and the target format.
fn default_output(input_path: &str, bits: &str) -> PathBuf {
	let path = Path::new(input_path);
	let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
	path.with_file_name(format!("{}.{}bpp.png", stem, bits))
}

/// Parses a bit count argument into a pixel format.
fn format_arg(value: &str) -> PixelFormat {
	match value.parse().ok().and_then(PixelFormat::from_bit_count) {
		Some(f) => f,
		None => error_exit(&format!("Unknown pixel format '{}'; use 1, 4, 8, 15, 16 or 24", value), 2)
	}
}

/// `clap`-based CLI for reformatting image files.
///
/// May exit process with status code if there are errors:
///
/// 1: `clap` error
///
/// 2: invalid arguments
///
/// 3: file I/O issues
///
/// 4: invalid image data
///
/// 5: computation limits exceeded
///
/// 6: unsupported conversion
///
/// 10: other, potentially unknown error
fn main() {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "frame_reformat=warn".into()),
		)
		.with(tracing_subscriber::fmt::layer().without_time())
		.init();

	let clap_matches = clap::App::new("frame_reformat")
		.version("0.2.0")
		.author("vkcz")
		.about("Converts an image between indexed and truecolor pixel formats and saves it as PNG.")
		.arg_from_usage("-f, --format=<BITS> 'Target pixel format: 1, 4 or 8 (indexed), 15 (5-5-5), 16 (5-6-5) or 24'")
		.arg_from_usage("-s, --source=[BITS] 'Reformat the loaded image into this format first; defaults to 24'")
		.arg_from_usage("<INPUT> 'Path to input file'")
		.arg_from_usage("[OUTPUT] 'Path to output file; defaults to INPUT with a modified file name'")
		.get_matches();

	let input_path = clap_matches.value_of("INPUT").unwrap_or_default();
	let target_bits = clap_matches.value_of("format").unwrap_or_default();
	let target = format_arg(target_bits);
	let source_format = format_arg(clap_matches.value_of("source").unwrap_or("24"));

	let source = match image::open(input_path) {
		Ok(i) => i,
		Err(e) => {
			let (msg, code) = match e {
				ImageError::Decoding(_) => ("Invalid image data", 4),
				ImageError::Limits(_) => ("Computation limits exceeded", 5),
				ImageError::IoError(_) => ("File not found or could not be read", 3),
				_ => ("An error occurred", 10)
			};
			error_exit(msg, code)
		}
	}.into_rgba8();
	let loaded = Frame::from_rgba_image(&source);

	let converted = match loaded.reformat(source_format)
		.and_then(|f| f.reformat(target)) {
		Ok(f) => f,
		Err(e) => {
			let code = match e {
				FrameError::UnsupportedConversion { .. } => 6,
				FrameError::InvalidArgument(_) => 4,
				FrameError::PaletteLookupFailure { .. } => 10,
			};
			error_exit(&e.to_string(), code)
		}
	};
	if let Some(palette) = converted.palette() {
		eprintln!("{} colors in palette ({} bits per index)", palette.len(), palette.width());
	}

	// Every format can be rendered, so this only fails on a corrupt frame.
	let output = match converted.to_rgba_image() {
		Ok(i) => i,
		Err(e) => error_exit(&e.to_string(), 10)
	};
	let output_path = match clap_matches.value_of("OUTPUT") {
		Some(p) => PathBuf::from(p),
		None => default_output(input_path, target_bits)
	};
	match output.save(output_path) {
		Ok(_) => (),
		Err(_) => error_exit("Could not save output", 3)
	}
}
