//! Transform component and utilities for spatial positioning.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotate around the Y axis (yaw).
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = Quat::from_rotation_y(angle) * self.rotation;
    }

    /// Rotate around the local X axis (pitch).
    pub fn rotate_x(&mut self, angle: f32) {
        self.rotation = self.rotation * Quat::from_rotation_x(angle);
    }

    /// Look at a target position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize();
        if forward.length_squared() > 0.0001 {
            self.rotation = Quat::from_mat4(&Mat4::look_at_rh(self.position, target, up)).inverse();
        }
    }

    /// Rotate the forward axis towards `target_forward` by at most `max_angle` radians
    /// this tick, keeping up/right orthonormal. Used by kinematic bodies turning to
    /// face their desired velocity at a bounded rotation rate.
    pub fn rotate_toward(&mut self, target_forward: Vec3, max_angle: f32) {
        let current = self.forward();
        if target_forward.length_squared() < 1e-12 {
            return;
        }
        let target_forward = target_forward.normalize();
        let cos_angle = current.dot(target_forward).clamp(-1.0, 1.0);
        let angle = cos_angle.acos();
        if angle <= max_angle || angle < 1e-6 {
            self.look_rotation(target_forward, self.up());
            return;
        }
        let axis = current.cross(target_forward);
        let axis = if axis.length_squared() < 1e-12 {
            self.up()
        } else {
            axis.normalize()
        };
        let step = Quat::from_axis_angle(axis, max_angle);
        self.rotation = (step * self.rotation).normalize();
    }

    /// Set rotation directly from a forward/up pair (orthonormalised via Gram-Schmidt).
    ///
    /// `forward()` is defined as `rotation * -Z`, so the resulting basis matrix's Z
    /// column is `-forward`.
    pub fn look_rotation(&mut self, forward: Vec3, up: Vec3) {
        let forward = forward.normalize();
        let right = up.cross(forward).normalize();
        let up = forward.cross(right).normalize();
        self.rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));
    }
}

/// Raw transform data for GPU upload (instance data).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 4]; 4],
}

impl From<&Transform> for TransformRaw {
    fn from(transform: &Transform) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
        }
    }
}

impl From<Transform> for TransformRaw {
    fn from(transform: Transform) -> Self {
        Self::from(&transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basis_is_orthonormal(t: &Transform) -> bool {
        let (f, u, r) = (t.forward(), t.up(), t.right());
        let unit = |v: Vec3| (v.length() - 1.0).abs() < 1e-4;
        let ortho = |a: Vec3, b: Vec3| a.dot(b).abs() < 1e-4;
        unit(f) && unit(u) && unit(r) && ortho(f, u) && ortho(f, r) && ortho(u, r)
    }

    #[test]
    fn default_transform_has_orthonormal_basis() {
        assert!(basis_is_orthonormal(&Transform::default()));
    }

    #[test]
    fn look_rotation_reproduces_forward_direction() {
        let mut t = Transform::default();
        let forward = Vec3::new(1.0, 0.0, 1.0).normalize();
        t.look_rotation(forward, Vec3::Y);
        assert!(t.forward().abs_diff_eq(forward, 1e-4));
        assert!(basis_is_orthonormal(&t));
    }

    #[test]
    fn rotate_toward_stays_within_max_angle_per_tick() {
        let mut t = Transform::default();
        let target = Vec3::new(0.0, 0.0, 1.0); // pointing directly opposite default forward (-Z)
        let max_angle = 0.1_f32;
        let before = t.forward();
        t.rotate_toward(target, max_angle);
        let turned = before.dot(t.forward()).clamp(-1.0, 1.0).acos();
        assert!(turned <= max_angle + 1e-4);
        assert!(basis_is_orthonormal(&t));
    }

    #[test]
    fn rotate_toward_converges_when_angle_within_budget() {
        let mut t = Transform::default();
        let target = t.forward(); // already facing it
        t.rotate_toward(target, 1.0);
        assert!(t.forward().abs_diff_eq(target, 1e-3));
    }
}
