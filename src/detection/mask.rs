use ndarray::Array2;

use super::letterbox::Letterbox;
use crate::tracker::Rect;

/// Map a soft instance mask from inference space back to the original frame.
///
/// `mask` covers the whole letterboxed input, possibly downscaled. The
/// border is cropped away, the remainder is bilinearly resized to the frame
/// resolution, and pixels are set where the value exceeds 0.5 and the pixel
/// center lies inside `bbox`.
pub fn recover_mask(mask: &Array2<f32>, letterbox: &Letterbox, bbox: &Rect) -> Array2<bool> {
    let (frame_w, frame_h) = (letterbox.frame_size.0 as usize, letterbox.frame_size.1 as usize);
    let (mask_h, mask_w) = mask.dim();
    if mask_h == 0 || mask_w == 0 {
        return Array2::from_elem((frame_h, frame_w), false);
    }

    let sx = mask_w as f32 / letterbox.input_size.0 as f32;
    let sy = mask_h as f32 / letterbox.input_size.1 as f32;
    let (unpad_w, unpad_h) = letterbox.unpadded_size();
    let x0 = letterbox.pad.0 * sx;
    let y0 = letterbox.pad.1 * sy;
    let step_x = unpad_w * sx / frame_w as f32;
    let step_y = unpad_h * sy / frame_h as f32;

    let [bx1, by1, bx2, by2] = bbox.to_tlbr();

    Array2::from_shape_fn((frame_h, frame_w), |(row, col)| {
        let (px, py) = (col as f32 + 0.5, row as f32 + 0.5);
        if px < bx1 || px > bx2 || py < by1 || py > by2 {
            return false;
        }
        let src_x = x0 + px * step_x - 0.5;
        let src_y = y0 + py * step_y - 0.5;
        bilinear(mask, src_x, src_y) > 0.5
    })
}

fn bilinear(mask: &Array2<f32>, x: f32, y: f32) -> f32 {
    let (h, w) = mask.dim();
    let x = x.clamp(0.0, (w - 1) as f32);
    let y = y.clamp(0.0, (h - 1) as f32);
    let (x_lo, y_lo) = (x.floor() as usize, y.floor() as usize);
    let (x_hi, y_hi) = ((x_lo + 1).min(w - 1), (y_lo + 1).min(h - 1));
    let (fx, fy) = (x - x_lo as f32, y - y_lo as f32);

    let top = mask[[y_lo, x_lo]] * (1.0 - fx) + mask[[y_lo, x_hi]] * fx;
    let bottom = mask[[y_hi, x_lo]] * (1.0 - fx) + mask[[y_hi, x_hi]] * fx;
    top * (1.0 - fy) + bottom * fy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_removed() {
        // 40x20 frame letterboxed into 40x40: 10 rows of border above and below.
        let lb = Letterbox::fit((40, 20), (40, 40));
        assert_eq!(lb.pad, (0.0, 10.0));

        // Foreground covers the left half of the real image area only.
        let mut mask = Array2::zeros((40, 40));
        for row in 10..30 {
            for col in 0..20 {
                mask[[row, col]] = 1.0;
            }
        }
        let full = Rect::new(0.0, 0.0, 40.0, 20.0);
        let out = recover_mask(&mask, &lb, &full);

        assert_eq!(out.dim(), (20, 40));
        assert!(out[[0, 0]]);
        assert!(out[[19, 5]]);
        assert!(!out[[0, 35]]);
        assert!(!out[[10, 39]]);
    }

    #[test]
    fn test_downscaled_mask_upsampled() {
        let lb = Letterbox::identity((8, 8));
        let mask = Array2::from_elem((4, 4), 0.9);
        let out = recover_mask(&mask, &lb, &Rect::new(0.0, 0.0, 8.0, 8.0));
        assert_eq!(out.dim(), (8, 8));
        assert!(out.iter().all(|&v| v));
    }

    #[test]
    fn test_cropped_to_box() {
        let lb = Letterbox::identity((10, 10));
        let mask = Array2::from_elem((10, 10), 1.0);
        let out = recover_mask(&mask, &lb, &Rect::new(2.0, 2.0, 3.0, 3.0));
        assert_eq!(out.iter().filter(|&&v| v).count(), 9);
        assert!(out[[3, 3]]);
        assert!(!out[[0, 0]]);
    }
}
