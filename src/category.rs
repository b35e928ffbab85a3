//! COCO category table used by the detector's class ids.

use crate::error::{Error, Result};

/// The 80 COCO categories, indexed by detector class id.
pub const CATEGORIES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Resolve a category name to its class id.
pub fn category_id(name: &str) -> Result<usize> {
    CATEGORIES
        .iter()
        .position(|&c| c == name)
        .ok_or_else(|| Error::UnknownCategory(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories() {
        assert_eq!(category_id("person").unwrap(), 0);
        assert_eq!(category_id("car").unwrap(), 2);
        assert_eq!(category_id("toothbrush").unwrap(), 79);
        assert_eq!(CATEGORIES[5], "bus");
    }

    #[test]
    fn test_unknown_category_fails() {
        let err = category_id("unicorn").unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(ref c) if c == "unicorn"));
        assert_eq!(CATEGORIES.len(), 80);
    }
}
