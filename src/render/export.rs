//! PNG export of rendered frames.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use super::{Frame, RenderError};

/// Encode a frame as PNG (RGBA8, top row first).
pub fn export_png(frame: &Frame) -> Result<Vec<u8>, RenderError> {
    let width = frame.width() as u32;
    let height = frame.height() as u32;
    let img = RgbaImage::from_raw(width, height, frame.to_rgba8()).ok_or(
        RenderError::FrameSize {
            width: frame.width(),
            height: frame.height(),
        },
    )?;

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Cell, SimulationState};
    use crate::render::RenderPipeline;
    use crate::schema::RenderSettings;

    #[test]
    fn test_png_decodes_to_same_pixels() {
        let mut state = SimulationState::new(5, 3).unwrap();
        let cells: Vec<Cell> = (0..15).map(|i| Cell::new(0.5, i as f32 / 14.0, 0.0)).collect();
        state.fill_both(&cells).unwrap();

        let mut pipeline = RenderPipeline::default();
        let frame = pipeline.render(&state, &RenderSettings::default());
        let png = export_png(frame).unwrap();

        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (5, 3));
        assert_eq!(decoded.into_raw(), frame.to_rgba8());
    }
}
