//! Orbit camera controls: rotate, zoom and pan around a target point

use std::f32::consts::{PI, TAU};

use nalgebra::{Point3, Vector3};

use crate::projection::PerspectiveCamera;

const EPS: f32 = 1e-6;

/// Closest the camera may get to the target, whatever `min_distance` says
const MIN_RADIUS: f32 = 1e-3;

/// Spherical coordinates of the camera offset from the target.
/// `theta` is the azimuth around +Y measured from +Z, `phi` the polar
/// angle from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: &Vector3<f32>) -> Self {
        let radius = offset.norm();
        if radius < EPS {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi = self.phi.sin();
        Vector3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit manipulator driving a [`PerspectiveCamera`].
///
/// Input methods queue changes; [`OrbitControls::update`] applies them to
/// the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enabled: bool,
    pub auto_rotate: bool,
    /// Full turns per minute while auto-rotating
    pub auto_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
}

impl OrbitControls {
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            target,
            enabled: true,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zeros(),
        }
    }

    /// Orbit horizontally by `angle` radians
    pub fn rotate_left(&mut self, angle: f32) {
        if self.enabled {
            self.delta_theta -= angle * self.rotate_speed;
        }
    }

    /// Orbit vertically by `angle` radians
    pub fn rotate_up(&mut self, angle: f32) {
        if self.enabled {
            self.delta_phi -= angle * self.rotate_speed;
        }
    }

    /// Move toward the target; `factor > 1` zooms in
    pub fn dolly_in(&mut self, factor: f32) {
        if self.enabled && factor > 0.0 {
            self.scale /= factor.powf(self.zoom_speed);
        }
    }

    /// Move away from the target; `factor > 1` zooms out
    pub fn dolly_out(&mut self, factor: f32) {
        if self.enabled && factor > 0.0 {
            self.scale *= factor.powf(self.zoom_speed);
        }
    }

    /// Shift camera and target along the view plane, in units of the
    /// current target distance
    pub fn pan(&mut self, camera: &PerspectiveCamera, dx: f32, dy: f32) {
        if !self.enabled {
            return;
        }
        let distance = (camera.position - self.target).norm();
        let (right, up) = camera.basis();
        self.pan_offset += (right * dx + up * dy) * distance;
    }

    /// Apply queued input and auto-rotation to `camera`.
    ///
    /// `dt` is the elapsed time in seconds. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, dt: f32) -> bool {
        if self.auto_rotate && self.enabled {
            let angle = TAU / 60.0 * self.auto_rotate_speed * dt;
            self.delta_theta -= angle;
        }

        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(&offset);
        spherical.theta += self.delta_theta;
        spherical.phi += self.delta_phi;

        let min_phi = self.min_polar_angle.max(EPS);
        let max_phi = self.max_polar_angle.min(PI - EPS);
        spherical.phi = spherical.phi.clamp(min_phi, max_phi.max(min_phi));
        let min_radius = self.min_distance.max(MIN_RADIUS);
        spherical.radius =
            (spherical.radius * self.scale).clamp(min_radius, self.max_distance.max(min_radius));

        self.target += self.pan_offset;
        let previous = camera.position;
        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vector3::zeros();

        (camera.position - previous).norm_squared() > EPS
    }

    /// Stop reacting to input and drop anything queued
    pub fn dispose(&mut self) {
        self.enabled = false;
        self.auto_rotate = false;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vector3::zeros();
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(Point3::origin())
    }
}
