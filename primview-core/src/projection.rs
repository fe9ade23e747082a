/// Perspective camera used by every demo scene
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// A perspective-projection camera looking at a target point
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Point3::origin(),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::y(),
            fov,
            aspect,
            near,
            far,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Point3::new(x, y, z);
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Direction the camera faces
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position)
            .try_normalize(1e-9)
            .unwrap_or_else(|| -Vector3::z())
    }

    /// Orthonormal right and up vectors of the view plane
    pub fn basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = self.forward();
        let right = forward
            .cross(&self.up)
            .try_normalize(1e-9)
            .unwrap_or_else(Vector3::x);
        let up = right.cross(&forward);
        (right, up)
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &(self.position + self.forward()), &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov.to_radians(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world-space point to normalised device coordinates.
    ///
    /// Returns `None` for points behind the camera or outside the near/far
    /// range; x and y are not clipped.
    pub fn project(&self, point: &Point3<f32>) -> Option<Point3<f32>> {
        let clip: Vector4<f32> = self.view_projection() * point.to_homogeneous();
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = Point3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w);
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some(ndc)
    }

    /// World-space frustum corners: near plane then far plane, each
    /// ordered bottom-left, bottom-right, top-right, top-left
    pub fn frustum_corners(&self) -> [Point3<f32>; 8] {
        let forward = self.forward();
        let (right, up) = self.basis();
        let half_tan = (self.fov.to_radians() / 2.0).tan();
        let plane = |distance: f32| {
            let half_h = distance * half_tan;
            let half_w = half_h * self.aspect;
            let center = self.position + forward * distance;
            [
                center - right * half_w - up * half_h,
                center + right * half_w - up * half_h,
                center + right * half_w + up * half_h,
                center - right * half_w + up * half_h,
            ]
        };
        let near = plane(self.near);
        let far = plane(self.far);
        [
            near[0], near[1], near[2], near[3], far[0], far[1], far[2], far[3],
        ]
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}
