use crate::tracker::Rect;

/// Resize-and-pad geometry mapping a frame into the inference input.
///
/// The frame is scaled by `gain` (preserving aspect ratio) and centered,
/// with `pad` pixels of border on the left and top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Original frame (width, height)
    pub frame_size: (u32, u32),
    /// Inference input (width, height)
    pub input_size: (u32, u32),
    pub gain: f32,
    /// Left and top border in input pixels
    pub pad: (f32, f32),
}

impl Letterbox {
    /// Compute the letterbox that fits `frame_size` into `input_size`.
    pub fn fit(frame_size: (u32, u32), input_size: (u32, u32)) -> Self {
        let (fw, fh) = (frame_size.0 as f32, frame_size.1 as f32);
        let (iw, ih) = (input_size.0 as f32, input_size.1 as f32);
        let gain = (iw / fw).min(ih / fh);
        let unpad_w = (fw * gain).round();
        let unpad_h = (fh * gain).round();
        let pad = (
            ((iw - unpad_w) / 2.0 - 0.1).round().max(0.0),
            ((ih - unpad_h) / 2.0 - 0.1).round().max(0.0),
        );
        Self {
            frame_size,
            input_size,
            gain,
            pad,
        }
    }

    /// Detector ran on the frame itself.
    pub fn identity(frame_size: (u32, u32)) -> Self {
        Self {
            frame_size,
            input_size: frame_size,
            gain: 1.0,
            pad: (0.0, 0.0),
        }
    }

    /// Size of the scaled frame inside the input, without border.
    pub fn unpadded_size(&self) -> (f32, f32) {
        (
            (self.frame_size.0 as f32 * self.gain).round(),
            (self.frame_size.1 as f32 * self.gain).round(),
        )
    }

    /// Map an input-space (x1, y1, x2, y2) box to rounded, clipped frame coordinates.
    pub fn to_frame(&self, tlbr: [f32; 4]) -> Rect {
        let (fw, fh) = (self.frame_size.0 as f32, self.frame_size.1 as f32);
        let unmap = |v: f32, pad: f32, limit: f32| ((v - pad) / self.gain).round().clamp(0.0, limit);
        Rect::from_tlbr(
            unmap(tlbr[0], self.pad.0, fw),
            unmap(tlbr[1], self.pad.1, fh),
            unmap(tlbr[2], self.pad.0, fw),
            unmap(tlbr[3], self.pad.1, fh),
        )
    }
}
