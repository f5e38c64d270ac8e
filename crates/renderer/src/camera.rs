//! A minimal space-sim camera: construction and view/projection matrices only.
//! Camera *control* (mouse-look, flight input) is the external collaborator's job;
//! the core only needs somewhere to read a view-projection matrix from.

use bytemuck::{Pod, Zeroable};
use engine_core::Transform;
use glam::{Mat4, Vec3};

#[derive(Debug, Clone)]
pub struct Camera {
    pub transform: Transform,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov_degrees: 60.0,
            near: 0.1,
            far: 100_000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Default::default()
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.transform.position;
        let target = eye + self.transform.forward();
        Mat4::look_at_rh(eye, target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }
}

/// Camera uniform data uploaded to the GPU once per frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 4],
        }
    }

    pub fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.view_projection_matrix().to_cols_array_2d();
        let pos = camera.position();
        self.position = [pos.x, pos.y, pos.z, 1.0];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}
