//! Keypad geometry: where each key sits on the display area.

use serde::{Deserialize, Serialize};

use super::label::{KEYPAD_LABELS, KeyLabel};

/// Gap in pixels left on the right and bottom edge of every key.
const KEY_GAP: i32 = 2;

/// A pixel position on the display area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        f64::from(self.x - other.x).hypot(f64::from(self.y - other.y))
    }
}

/// A labeled rectangular hit zone. Bounds are inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub label: KeyLabel,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Key {
    /// Check if the point lies inside the key, edges included.
    pub fn contains(&self, point: Point) -> bool {
        (self.x1..=self.x2).contains(&point.x) && (self.y1..=self.y2).contains(&point.y)
    }

    /// Check if two keys share at least one pixel.
    pub fn intersects(&self, other: &Key) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }
}

/// Placement of the keypad within the display area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub columns: u32,
    pub rows: u32,
    /// Fraction of the area width taken by the keypad
    pub width_ratio: f64,
    /// Fraction of the area height taken by the keypad
    pub height_ratio: f64,
    /// Distance in pixels from the right edge
    pub margin: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 4,
            width_ratio: 0.35,
            height_ratio: 0.7,
            margin: 20,
        }
    }
}

/// The keys of one display area, in row-major order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub keys: Vec<Key>,
}

impl Layout {
    /// Find the key under a point. The first key in layout order wins.
    pub fn key_at(&self, point: Point) -> Option<&Key> {
        self.keys.iter().find(|key| key.contains(point))
    }

    /// Find a key by its label.
    pub fn key(&self, label: KeyLabel) -> Option<&Key> {
        self.keys.iter().find(|key| key.label == label)
    }

    /// Check if this layout was built for the given area size.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

/// Build the keypad for a display area of `width` x `height` pixels.
///
/// The keypad is right-aligned `margin` pixels from the right edge and
/// vertically centered. Cells are equal; labels are assigned row-major
/// from [`KEYPAD_LABELS`] and cells beyond the sixteenth stay empty.
/// Degenerate sizes produce zero-sized keys rather than failing.
pub fn build_layout(width: u32, height: u32, config: &LayoutConfig) -> Layout {
    let mut keys = Vec::with_capacity(KEYPAD_LABELS.len());

    if config.columns > 0 && config.rows > 0 {
        let frame_w = clamp_i32(width);
        let frame_h = clamp_i32(height);

        let area_w = scale(frame_w, config.width_ratio);
        let area_h = scale(frame_h, config.height_ratio);
        let area_x = frame_w - area_w - config.margin;
        let area_y = (frame_h - area_h) / 2;

        let columns = clamp_i32(config.columns);
        let rows = clamp_i32(config.rows);
        let cell_w = (area_w / columns).max(0);
        let cell_h = (area_h / rows).max(0);

        let cells = (0..rows).flat_map(|r| (0..columns).map(move |c| (r, c)));
        for ((r, c), label) in cells.zip(KEYPAD_LABELS) {
            let x1 = area_x + c * cell_w;
            let y1 = area_y + r * cell_h;
            keys.push(Key {
                label,
                x1,
                y1,
                x2: x1 + (cell_w - KEY_GAP).max(0),
                y2: y1 + (cell_h - KEY_GAP).max(0),
            });
        }
    }

    Layout {
        width,
        height,
        keys,
    }
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// `value * ratio`, truncated toward zero.
fn scale(value: i32, ratio: f64) -> i32 {
    // Saturating float-to-int cast; NaN maps to zero
    (f64::from(value) * ratio) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(layout: &Layout) -> Vec<&'static str> {
        layout.keys.iter().map(|k| k.label.as_str()).collect()
    }

    #[test]
    fn test_default_layout_geometry() {
        let layout = build_layout(640, 480, &LayoutConfig::default());
        assert_eq!(layout.keys.len(), 16);

        // area 224x336 at (396, 72), cells 56x84
        let first = &layout.keys[0];
        assert_eq!((first.x1, first.y1, first.x2, first.y2), (396, 72, 450, 154));

        let last = &layout.keys[15];
        assert_eq!((last.x1, last.y1, last.x2, last.y2), (564, 324, 618, 406));
    }

    #[test]
    fn test_label_order() {
        let layout = build_layout(640, 480, &LayoutConfig::default());
        assert_eq!(
            labels(&layout),
            vec![
                "1", "2", "3", "+", "4", "5", "6", "-", "7", "8", "9", "*", "C", "0", "=", "/"
            ]
        );
    }

    #[test]
    fn test_keys_never_overlap() {
        for (w, h) in [(640, 480), (1280, 720), (1920, 1080), (320, 240), (333, 777)] {
            let layout = build_layout(w, h, &LayoutConfig::default());
            for (i, a) in layout.keys.iter().enumerate() {
                assert!(a.x1 < a.x2 && a.y1 < a.y2, "{}x{} key {}", w, h, a.label);
                for b in &layout.keys[i + 1..] {
                    assert!(!a.intersects(b), "{}x{}: {} overlaps {}", w, h, a.label, b.label);
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let config = LayoutConfig::default();
        assert_eq!(build_layout(800, 600, &config), build_layout(800, 600, &config));
    }

    #[test]
    fn test_hit_testing_inclusive() {
        let layout = build_layout(640, 480, &LayoutConfig::default());
        let seven = layout.key(KeyLabel::Seven).unwrap().clone();

        assert_eq!(layout.key_at(Point::new(seven.x1, seven.y1)), Some(&seven));
        assert_eq!(layout.key_at(Point::new(seven.x2, seven.y2)), Some(&seven));
        // gap between "7" and "8"
        assert_eq!(layout.key_at(Point::new(seven.x2 + 1, seven.y1)), None);
        assert_eq!(layout.key_at(Point::new(10, 10)), None);
    }

    #[test]
    fn test_degenerate_area_does_not_panic() {
        let layout = build_layout(0, 0, &LayoutConfig::default());
        assert_eq!(layout.keys.len(), 16);
        assert!(layout.keys.iter().all(|k| k.x2 >= k.x1 && k.y2 >= k.y1));

        let empty = build_layout(
            640,
            480,
            &LayoutConfig {
                columns: 0,
                ..LayoutConfig::default()
            },
        );
        assert!(empty.keys.is_empty());
    }

    #[test]
    fn test_other_grid_shapes() {
        let config = LayoutConfig {
            columns: 3,
            rows: 3,
            ..LayoutConfig::default()
        };
        let layout = build_layout(640, 480, &config);
        assert_eq!(labels(&layout), vec!["1", "2", "3", "+", "4", "5", "6", "-", "7"]);

        let config = LayoutConfig {
            columns: 5,
            rows: 4,
            ..LayoutConfig::default()
        };
        assert_eq!(build_layout(640, 480, &config).keys.len(), 16);
    }
}
