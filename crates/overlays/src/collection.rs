use earcutr::earcut;
use foundation::math::{Vec3, ellipsoid_normal};

use crate::overlay::Overlay;

/// Render-side sink for overlays. Adding is fire-and-forget.
pub trait OverlayRenderer {
    fn add(&mut self, overlay: Overlay);
}

impl<R: OverlayRenderer + ?Sized> OverlayRenderer for &mut R {
    fn add(&mut self, overlay: Overlay) {
        (**self).add(overlay)
    }
}

/// Persistent visible overlays, append-only from the placer's side.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OverlayCollection {
    overlays: Vec<Overlay>,
}

/// Geometry a renderer can upload directly.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMesh {
    /// Closed outline (first vertex repeated at the end) in ECEF.
    pub outline: Vec<Vec3>,
    /// Flat triangle list (3 vertices per triangle) in ECEF.
    pub fill_triangles: Vec<Vec3>,
    pub fill: [f32; 4],
    pub outline_color: [f32; 4],
    pub outline_width: f32,
    pub ground_clamped: bool,
}

impl OverlayCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Removes everything, returning how many overlays were dropped.
    pub fn clear_all(&mut self) -> usize {
        let n = self.overlays.len();
        self.overlays.clear();
        n
    }

    pub fn meshes(&self) -> Vec<OverlayMesh> {
        self.overlays.iter().map(build_mesh).collect()
    }
}

impl OverlayRenderer for OverlayCollection {
    fn add(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
    }
}

fn build_mesh(overlay: &Overlay) -> OverlayMesh {
    let mut ring: Vec<Vec3> = overlay
        .positions_ecef()
        .into_iter()
        .map(Vec3::from)
        .collect();
    drop_closing_duplicate(&mut ring);

    let fill_triangles = triangulate_ring(&ring);

    let mut outline = ring;
    if let Some(first) = outline.first().copied() {
        outline.push(first);
    }

    OverlayMesh {
        outline,
        fill_triangles,
        fill: overlay.style.fill,
        outline_color: overlay.style.outline,
        outline_width: overlay.style.outline_width,
        ground_clamped: overlay.ground_clamped(),
    }
}

fn triangulate_ring(ring: &[Vec3]) -> Vec<Vec3> {
    // Earcut in the tangent plane at the ring's centroid.
    if ring.len() < 3 {
        return Vec::new();
    }

    let n = ring.len() as f64;
    let origin = ring
        .iter()
        .fold(Vec3::new(0.0, 0.0, 0.0), |acc, p| acc + *p)
        .scale(1.0 / n);
    let normal = ellipsoid_normal(origin);

    let up = if normal.z.abs() < 0.99 { Vec3::Z } else { Vec3::Y };
    let east = up.cross(normal).normalize();
    let north = normal.cross(east);

    let mut coords_2d: Vec<f64> = Vec::with_capacity(ring.len() * 2);
    for p in ring {
        let v = *p - origin;
        coords_2d.push(v.dot(east));
        coords_2d.push(v.dot(north));
    }

    let indices = match earcut(&coords_2d, &[], 2) {
        Ok(ix) => ix,
        Err(_) => return Vec::new(),
    };

    indices
        .into_iter()
        .filter_map(|idx| ring.get(idx).copied())
        .collect()
}

fn drop_closing_duplicate(points: &mut Vec<Vec3>) {
    if let [first, .., last] = points.as_slice() {
        let d = *first - *last;
        if d.x.abs() < 1e-9 && d.y.abs() < 1e-9 && d.z.abs() < 1e-9 {
            points.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OverlayCollection, OverlayRenderer};
    use crate::overlay::Overlay;
    use crate::style::OverlayStyle;
    use formats::GeoPoint;

    fn ring(closed: bool) -> Vec<GeoPoint> {
        let mut r = vec![
            GeoPoint::new(-47.884, -15.799),
            GeoPoint::new(-47.884, -15.796),
            GeoPoint::new(-47.881, -15.796),
            GeoPoint::new(-47.881, -15.799),
        ];
        if closed {
            r.push(r[0]);
        }
        r
    }

    #[test]
    fn keeps_submission_order_and_clears() {
        let mut collection = OverlayCollection::new();
        collection.add(Overlay::fixed("a", &ring(false), 10.0, OverlayStyle::default()));
        collection.add(Overlay::clamped_to_ground("b", &ring(false), OverlayStyle::default()));

        let names: Vec<&str> = collection
            .overlays()
            .iter()
            .map(|o| o.feature.as_str())
            .collect();
        assert_eq!(names, ["a", "b"]);

        assert_eq!(collection.clear_all(), 2);
        assert!(collection.is_empty());
    }

    #[test]
    fn square_fills_with_two_triangles() {
        let mut collection = OverlayCollection::new();
        collection.add(Overlay::fixed("a", &ring(true), 1_100.0, OverlayStyle::default()));

        let meshes = collection.meshes();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].fill_triangles.len(), 6);
        // Closing duplicate dropped, then re-added for the outline.
        assert_eq!(meshes[0].outline.len(), 5);
        assert_eq!(meshes[0].outline.first(), meshes[0].outline.last());
        assert!(!meshes[0].ground_clamped);
    }

    fn submit<R: OverlayRenderer>(mut renderer: R, overlay: Overlay) {
        renderer.add(overlay);
    }

    #[test]
    fn renderer_works_through_a_mutable_borrow() {
        let mut collection = OverlayCollection::new();
        submit(
            &mut collection,
            Overlay::clamped_to_ground("a", &ring(false), OverlayStyle::default()),
        );
        assert_eq!(collection.len(), 1);
        assert!(collection.meshes()[0].ground_clamped);
    }
}
