//! PNG output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::ImageError;
use overmapper::Canvas;
use tracing::debug;

use crate::error::CliError;

/// Encode `canvas` as PNG into `path`, replacing any existing file.
pub fn write_png(canvas: &Canvas, path: &Path) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| CliError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;

    let encode_error = |source| CliError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(file);
    canvas
        .write_with_encoder(PngEncoder::new(&mut writer))
        .map_err(encode_error)?;
    writer
        .flush()
        .map_err(|e| encode_error(ImageError::IoError(e)))?;

    debug!(
        path = %path.display(),
        width = canvas.width(),
        height = canvas.height(),
        "PNG written"
    );

    Ok(())
}
