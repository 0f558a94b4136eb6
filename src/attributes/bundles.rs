use crate::error::AttributeError;
use crate::math::{
    transform_direction, transform_point, Matrix3, Matrix4, Point2, Point3, Vector3,
    UNIT_TOLERANCE,
};

use super::Attributes;

/// A bare position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub point: Point3,
}

/// A bare unit normal. Used as the default face payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    pub normal: Vector3,
}

/// Position and unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionNormal {
    pub point: Point3,
    pub normal: Vector3,
}

/// Position, unit normal and texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionNormalTexCoord {
    pub point: Point3,
    pub normal: Vector3,
    pub texcoord: Point2,
}

/// Position, unit normal, texture coordinate and unit tangent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionNormalTexCoordTangent {
    pub point: Point3,
    pub normal: Vector3,
    pub texcoord: Point2,
    pub tangent: Vector3,
}

impl Default for Normal {
    fn default() -> Self {
        Self {
            normal: Vector3::z(),
        }
    }
}

impl From<Point3> for Position {
    fn from(point: Point3) -> Self {
        Self { point }
    }
}

impl From<Point3> for PositionNormal {
    fn from(point: Point3) -> Self {
        Self {
            point,
            normal: Vector3::z(),
        }
    }
}

impl From<Point3> for PositionNormalTexCoord {
    /// Projects the position onto the XY plane for the texture coordinate,
    /// clamped into the unit square.
    fn from(point: Point3) -> Self {
        Self {
            point,
            normal: Vector3::z(),
            texcoord: Point2::new(point.x.clamp(0.0, 1.0), point.y.clamp(0.0, 1.0)),
        }
    }
}

impl From<Point3> for PositionNormalTexCoordTangent {
    fn from(point: Point3) -> Self {
        let base = PositionNormalTexCoord::from(point);
        Self {
            point,
            normal: base.normal,
            texcoord: base.texcoord,
            tangent: Vector3::x(),
        }
    }
}

fn check_point(point: &Point3, errors: &mut Vec<AttributeError>) {
    if !point.iter().all(|c| c.is_finite()) {
        errors.push(AttributeError::NonFinite("position"));
    }
}

fn check_normal(normal: &Vector3, errors: &mut Vec<AttributeError>) {
    let length = normal.norm();
    if !length.is_finite() {
        errors.push(AttributeError::NonFinite("normal"));
    } else if (length - 1.0).abs() > UNIT_TOLERANCE {
        errors.push(AttributeError::NormalNotUnit { length });
    }
}

fn check_tangent(tangent: &Vector3, errors: &mut Vec<AttributeError>) {
    let length = tangent.norm();
    if !length.is_finite() {
        errors.push(AttributeError::NonFinite("tangent"));
    } else if (length - 1.0).abs() > UNIT_TOLERANCE {
        errors.push(AttributeError::TangentNotUnit { length });
    }
}

fn check_texcoord(texcoord: &Point2, errors: &mut Vec<AttributeError>) {
    let in_range = |c: f64| (-UNIT_TOLERANCE..=1.0 + UNIT_TOLERANCE).contains(&c);
    if !in_range(texcoord.x) || !in_range(texcoord.y) {
        errors.push(AttributeError::TexCoordOutOfRange {
            u: texcoord.x,
            v: texcoord.y,
        });
    }
}

impl Attributes for Position {
    fn transform_with_normals(&mut self, position_matrix: &Matrix4, _: &Matrix3) {
        self.point = transform_point(position_matrix, &self.point);
    }

    fn invert(&mut self, _: &dyn Fn(Point2) -> Point2) {}

    fn validate_into(&self, errors: &mut Vec<AttributeError>) {
        check_point(&self.point, errors);
    }

    fn position(&self) -> Option<Point3> {
        Some(self.point)
    }
}

impl Attributes for Normal {
    fn transform_with_normals(&mut self, _: &Matrix4, normal_matrix: &Matrix3) {
        self.normal = transform_direction(normal_matrix, &self.normal);
    }

    fn invert(&mut self, _: &dyn Fn(Point2) -> Point2) {
        self.normal = -self.normal;
    }

    fn validate_into(&self, errors: &mut Vec<AttributeError>) {
        check_normal(&self.normal, errors);
    }
}

impl Attributes for PositionNormal {
    fn transform_with_normals(&mut self, position_matrix: &Matrix4, normal_matrix: &Matrix3) {
        self.point = transform_point(position_matrix, &self.point);
        self.normal = transform_direction(normal_matrix, &self.normal);
    }

    fn invert(&mut self, _: &dyn Fn(Point2) -> Point2) {
        self.normal = -self.normal;
    }

    fn validate_into(&self, errors: &mut Vec<AttributeError>) {
        check_point(&self.point, errors);
        check_normal(&self.normal, errors);
    }

    fn position(&self) -> Option<Point3> {
        Some(self.point)
    }
}

impl Attributes for PositionNormalTexCoord {
    fn transform_with_normals(&mut self, position_matrix: &Matrix4, normal_matrix: &Matrix3) {
        self.point = transform_point(position_matrix, &self.point);
        self.normal = transform_direction(normal_matrix, &self.normal);
    }

    fn invert(&mut self, texcoord: &dyn Fn(Point2) -> Point2) {
        self.normal = -self.normal;
        self.texcoord = texcoord(self.texcoord);
    }

    fn validate_into(&self, errors: &mut Vec<AttributeError>) {
        check_point(&self.point, errors);
        check_normal(&self.normal, errors);
        check_texcoord(&self.texcoord, errors);
    }

    fn position(&self) -> Option<Point3> {
        Some(self.point)
    }
}

impl Attributes for PositionNormalTexCoordTangent {
    fn transform_with_normals(&mut self, position_matrix: &Matrix4, normal_matrix: &Matrix3) {
        self.point = transform_point(position_matrix, &self.point);
        self.normal = transform_direction(normal_matrix, &self.normal);
        // Tangents lie in the surface, so they follow the position matrix.
        let upper: Matrix3 = position_matrix.fixed_view::<3, 3>(0, 0).into_owned();
        self.tangent = transform_direction(&upper, &self.tangent);
    }

    fn invert(&mut self, texcoord: &dyn Fn(Point2) -> Point2) {
        self.normal = -self.normal;
        self.tangent = -self.tangent;
        self.texcoord = texcoord(self.texcoord);
    }

    fn validate_into(&self, errors: &mut Vec<AttributeError>) {
        check_point(&self.point, errors);
        check_normal(&self.normal, errors);
        check_tangent(&self.tangent, errors);
        check_texcoord(&self.texcoord, errors);
    }

    fn position(&self) -> Option<Point3> {
        Some(self.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotation_keeps_normal_unit_length() {
        let mut attrs = PositionNormal {
            point: Point3::new(1.0, 0.0, 0.0),
            normal: Vector3::x(),
        };
        let rotation =
            Matrix4::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        attrs.transform(&rotation);
        assert_relative_eq!(attrs.point, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(attrs.normal, Vector3::y(), epsilon = 1e-12);
        assert!(attrs.validate());
    }

    #[test]
    fn invert_negates_normal_and_tangent_and_remaps_texcoord() {
        let mut attrs = PositionNormalTexCoordTangent {
            point: Point3::origin(),
            normal: Vector3::z(),
            texcoord: Point2::new(0.25, 0.5),
            tangent: Vector3::x(),
        };
        attrs.invert(&|uv| Point2::new(1.0 - uv.x, uv.y));
        assert_eq!(attrs.normal, -Vector3::z());
        assert_eq!(attrs.tangent, -Vector3::x());
        assert_relative_eq!(attrs.texcoord, Point2::new(0.75, 0.5));
    }

    #[test]
    fn validation_reports_each_problem() {
        let attrs = PositionNormalTexCoordTangent {
            point: Point3::origin(),
            normal: Vector3::new(0.0, 0.0, 2.0),
            texcoord: Point2::new(1.5, 0.0),
            tangent: Vector3::x(),
        };
        let mut errors = Vec::new();
        attrs.validate_into(&mut errors);
        assert_eq!(
            errors,
            vec![
                AttributeError::NormalNotUnit { length: 2.0 },
                AttributeError::TexCoordOutOfRange { u: 1.5, v: 0.0 },
            ]
        );
        assert!(!attrs.validate());
    }

    #[test]
    fn non_finite_position_is_reported() {
        let attrs = Position {
            point: Point3::new(f64::NAN, 0.0, 0.0),
        };
        let mut errors = Vec::new();
        attrs.validate_into(&mut errors);
        assert_eq!(errors, vec![AttributeError::NonFinite("position")]);
    }
}
