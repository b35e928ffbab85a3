use serde::Serialize;

/// Simple polygon over integer pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Polygon {
    points: Vec<[i32; 2]>,
}

impl Polygon {
    /// Build a polygon; `None` with fewer than three vertices.
    pub fn new(points: Vec<[i32; 2]>) -> Option<Self> {
        (points.len() >= 3).then_some(Self { points })
    }

    pub fn points(&self) -> &[[i32; 2]] {
        &self.points
    }

    /// Point-in-polygon test by ray casting. Points on an edge or vertex are inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (px, py) = (x as f64, y as f64);
        let mut inside = false;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let (xi, yi) = (self.points[i][0] as f64, self.points[i][1] as f64);
            let (xj, yj) = (self.points[j][0] as f64, self.points[j][1] as f64);

            if on_segment(px, py, xi, yi, xj, yj) {
                return true;
            }
            if (yi > py) != (yj > py) {
                let x_cross = (xj - xi) * (py - yi) / (yj - yi) + xi;
                if px < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

fn on_segment(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> bool {
    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
    if cross.abs() > 1e-9 {
        return false;
    }
    px >= ax.min(bx) && px <= ax.max(bx) && py >= ay.min(by) && py <= ay.max(by)
}
