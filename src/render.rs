use crate::assign::AssignmentMap;
use crate::buffer::PixelBuffer;
use crate::color::Color;

/// Paint every pixel with its assigned cluster's color.
///
/// The output has the input's dimensions and at most `clusters.len()` distinct colors.
pub fn render(buffer: &PixelBuffer, map: &AssignmentMap, clusters: &[Color]) -> PixelBuffer {
    debug_assert_eq!(buffer.len(), map.len());
    let pixels = map
        .indices()
        .iter()
        .map(|&i| clusters[i as usize])
        .collect();
    PixelBuffer::from_parts(buffer.width(), buffer.height(), pixels)
}
