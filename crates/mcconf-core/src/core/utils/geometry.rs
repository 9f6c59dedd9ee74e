use nalgebra::{Point3, Rotation3, Unit, Vector3};

pub fn vector_between(from: &Point3<f64>, to: &Point3<f64>) -> Vector3<f64> {
    to - from
}

/// Expresses `point` relative to `origin`.
pub fn translate_to_origin(point: &Point3<f64>, origin: &Point3<f64>) -> Point3<f64> {
    Point3::from(point - origin)
}

/// Returns a unit vector perpendicular to `direction`.
///
/// The Cartesian axes are tried in X, Y, Z order and the first one exactly
/// orthogonal to `direction` is returned. Otherwise `direction` is crossed with
/// the axis it is most parallel to. Callers may only rely on perpendicularity.
/// Returns `None` for a zero-length direction.
pub fn perpendicular(direction: &Vector3<f64>) -> Option<Vector3<f64>> {
    if direction.norm_squared() == 0.0 {
        return None;
    }

    let axes = [Vector3::x(), Vector3::y(), Vector3::z()];
    if let Some(axis) = axes.iter().find(|&&axis| direction.dot(&axis) == 0.0) {
        return Some(*axis);
    }

    let most_parallel = axes.iter().fold(axes[0], |best, axis| {
        if direction.dot(axis).abs() > direction.dot(&best).abs() {
            *axis
        } else {
            best
        }
    });
    direction.cross(&most_parallel).try_normalize(f64::EPSILON)
}

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

/// Rotates `vector` about `axis` by `angle_degrees` (right-hand rule).
pub fn rotate_about_axis(
    vector: &Vector3<f64>,
    axis: &Vector3<f64>,
    angle_degrees: f64,
) -> Vector3<f64> {
    rotation_from_axis_angle(axis, angle_degrees) * vector
}

pub fn distance(p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    (p1 - p2).norm()
}

/// Angle a-b-c in degrees, from the law of cosines.
///
/// Returns `None` if `a` or `c` coincides with `b`.
pub fn bond_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<f64> {
    let ab = distance(a, b);
    let cb = distance(c, b);
    if ab == 0.0 || cb == 0.0 {
        return None;
    }
    let ac = distance(a, c);
    // Rounding can push the cosine just outside [-1, 1] for linear arrangements.
    let cosine = ((ab * ab + cb * cb - ac * ac) / (2.0 * ab * cb)).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Signed dihedral angle a-b-c-d in degrees, in (-180, 180].
pub fn dihedral_angle(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> f64 {
    let b1 = b - a;
    let b2 = c - b;
    let b3 = d - c;
    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let y = b2.norm() * b1.dot(&n2);
    let x = n1.dot(&n2);
    let angle = y.atan2(x).to_degrees();
    if angle <= -180.0 { angle + 360.0 } else { angle }
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}
