/// Output buffer that follows the viewport
pub trait OutputSurface {
    /// Logical size in pixels
    fn set_size(&mut self, width: u32, height: u32);

    /// Already clamped by the caller
    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Physical buffer size, logical size times pixel ratio
    fn buffer_size(&self) -> (u32, u32);
}
