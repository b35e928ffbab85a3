use crate::tracker::Rect;

/// Greedy non-maximum suppression.
///
/// Visits boxes by descending score (ties keep input order) and keeps a box
/// only if its IoU with every kept box is at most `iou_threshold`. When
/// `classes` is given, boxes of different classes never suppress each other.
///
/// Returns the indices of kept boxes, highest score first.
pub fn non_max_suppression(
    boxes: &[Rect],
    scores: &[f32],
    classes: Option<&[usize]>,
    iou_threshold: f32,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len().min(scores.len())).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut keep: Vec<usize> = Vec::with_capacity(order.len());
    for index in order {
        let suppressed = keep.iter().any(|&kept| {
            let same_class = classes.is_none_or(|c| c[kept] == c[index]);
            same_class && boxes[kept].iou(&boxes[index]) > iou_threshold
        });
        if !suppressed {
            keep.push(index);
        }
    }
    keep
}
