//! Trait for object detection inference backends.

use crate::detection::RawFrame;

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection or segmentation model to
/// the frame pipeline. Inference itself happens outside this crate.
///
/// # Example
///
/// ```ignore
/// use zonetrack_rs::{DetectionSource, Letterbox, RawFrame};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<RawFrame, Self::Error> {
///         let letterbox = Letterbox::fit((width, height), (640, 640));
///         // Run inference on the letterboxed input
///         Ok(RawFrame::new(vec![], letterbox))
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    ///
    /// # Returns
    /// Unfiltered boxes and masks in inference-input coordinates, together
    /// with the letterbox geometry used to produce that input.
    fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<RawFrame, Self::Error>;
}
