/// 2D point type, used for texture coordinates.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix, used to transform normals and tangents.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance used when checking that normals and tangents are unit length.
pub const UNIT_TOLERANCE: f64 = 1e-6;

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    if (v.w - 1.0).abs() > TOLERANCE && v.w.abs() > TOLERANCE {
        Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
    } else {
        Point3::new(v.x, v.y, v.z)
    }
}

/// Derives the matrix that transforms normals for a given position matrix.
///
/// This is the inverse transpose of the upper 3x3 block. Singular matrices
/// fall back to the plain upper block, which keeps directions but loses the
/// orthogonality guarantee.
#[must_use]
pub fn normal_matrix(matrix: &Matrix4) -> Matrix3 {
    let upper: Matrix3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    upper
        .try_inverse()
        .map_or(upper, |inverse| inverse.transpose())
}

/// Transforms a direction by a 3x3 matrix and renormalizes it.
///
/// Zero-length results are returned unnormalized.
#[must_use]
pub fn transform_direction(matrix: &Matrix3, dir: &Vector3) -> Vector3 {
    let v = matrix * dir;
    let len = v.norm();
    if len < TOLERANCE {
        v
    } else {
        v / len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn translation_moves_points() {
        let matrix = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0));
        let p = transform_point(&matrix, &Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn normal_matrix_of_non_uniform_scale_keeps_normals_perpendicular() {
        let matrix = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0));
        let nm = normal_matrix(&matrix);
        // Tangent of the plane x = y before scaling, and its normal.
        let tangent = Vector3::new(1.0, 1.0, 0.0);
        let normal = Vector3::new(1.0, -1.0, 0.0).normalize();
        let upper: Matrix3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let t = upper * tangent;
        let n = transform_direction(&nm, &normal);
        assert_relative_eq!(t.dot(&n), 0.0, epsilon = 1e-12);
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
    }
}
