use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_4, PI};

pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 50.0, 50.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 75.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, fov_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            fov: fov_degrees.to_radians(),
            aspect,
            ..Default::default()
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}

/// Orbit camera rig: the camera sits on a sphere of `radius` around `center`,
/// `theta` measured around +Y from +X and `phi` down from +Y.
pub struct OrbitController {
    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_phi: f32,
    pub max_phi: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    /// Fraction of velocity kept per update. `None` applies input in full on
    /// the next update and then stops.
    pub damping: Option<f32>,
    velocity_theta: f32,
    velocity_phi: f32,
    velocity_radius: f32,
    velocity_pan: Vec3,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 5.0,
            theta: 0.0,
            phi: FRAC_PI_4,
            min_radius: 0.5,
            max_radius: 500.0,
            min_phi: 0.05,
            max_phi: PI - 0.05,
            rotate_speed: 0.005,
            pan_speed: 0.002,
            zoom_speed: 0.1,
            damping: None,
            velocity_theta: 0.0,
            velocity_phi: 0.0,
            velocity_radius: 0.0,
            velocity_pan: Vec3::ZERO,
        }
    }
}

impl OrbitController {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            ..Default::default()
        }
    }

    /// Rig whose camera sits exactly at `position` looking at `center`.
    pub fn from_position(center: Vec3, position: Vec3) -> Self {
        let mut orbit = Self::new(center, 1.0);
        orbit.set_spherical_from(position);
        orbit
    }

    fn set_spherical_from(&mut self, position: Vec3) {
        let offset = position - self.center;
        let radius = offset.length();
        if radius < 1e-6 {
            return;
        }
        self.radius = radius;
        self.phi = (offset.y / radius)
            .clamp(-1.0, 1.0)
            .acos()
            .clamp(self.min_phi, self.max_phi);
        self.theta = offset.z.atan2(offset.x);
        self.max_radius = self.max_radius.max(radius);
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.velocity_theta -= delta_x * self.rotate_speed;
        self.velocity_phi -= delta_y * self.rotate_speed;
    }

    pub fn zoom(&mut self, delta: f32) {
        self.velocity_radius -= delta * self.zoom_speed * self.radius;
    }

    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let right = Vec3::new(self.theta.sin(), 0.0, -self.theta.cos());
        let up_dir = Vec3::new(
            -self.phi.cos() * self.theta.cos(),
            self.phi.sin(),
            -self.phi.cos() * self.theta.sin(),
        )
        .normalize();

        let pan_factor = self.pan_speed * self.radius;
        self.velocity_pan += right * delta_x * pan_factor + up_dir * delta_y * pan_factor;
    }

    /// Re-aims the rig at `point` without moving the camera.
    pub fn look_at(&mut self, point: Vec3) {
        let position = self.camera_position();
        self.center = point;
        self.set_spherical_from(position);
        self.stop();
    }

    fn stop(&mut self) {
        self.velocity_theta = 0.0;
        self.velocity_phi = 0.0;
        self.velocity_radius = 0.0;
        self.velocity_pan = Vec3::ZERO;
    }

    pub fn is_moving(&self) -> bool {
        self.velocity_theta != 0.0
            || self.velocity_phi != 0.0
            || self.velocity_radius != 0.0
            || self.velocity_pan != Vec3::ZERO
    }

    pub fn update(&mut self) {
        self.theta += self.velocity_theta;
        self.phi = (self.phi + self.velocity_phi).clamp(self.min_phi, self.max_phi);
        self.radius = (self.radius + self.velocity_radius).clamp(self.min_radius, self.max_radius);
        self.center += self.velocity_pan;

        let Some(damping) = self.damping else {
            self.stop();
            return;
        };

        self.velocity_theta *= damping;
        self.velocity_phi *= damping;
        self.velocity_radius *= damping;
        self.velocity_pan *= damping;

        if self.velocity_theta.abs() < 0.0001 {
            self.velocity_theta = 0.0;
        }
        if self.velocity_phi.abs() < 0.0001 {
            self.velocity_phi = 0.0;
        }
        if self.velocity_radius.abs() < 0.0001 {
            self.velocity_radius = 0.0;
        }
        if self.velocity_pan.length_squared() < 0.000001 {
            self.velocity_pan = Vec3::ZERO;
        }
    }

    pub fn camera_position(&self) -> Vec3 {
        let x = self.radius * self.phi.sin() * self.theta.cos();
        let y = self.radius * self.phi.cos();
        let z = self.radius * self.phi.sin() * self.theta.sin();
        self.center + Vec3::new(x, y, z)
    }

    pub fn update_camera(&self, camera: &mut Camera) {
        camera.position = self.camera_position();
        camera.target = self.center;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MouseAction {
    None,
    Orbit,
    Pan,
    Zoom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
}

/// Maps pointer, touch and wheel input onto an [`OrbitController`].
pub struct CameraController {
    pub orbit: OrbitController,
    pub left_mouse_action: MouseAction,
    pub right_mouse_action: MouseAction,
    pub middle_mouse_action: MouseAction,
    pub pinch_speed: f32,
    left_pressed: bool,
    right_pressed: bool,
    middle_pressed: bool,
    last_mouse_pos: Option<(f32, f32)>,
    touches: Vec<(u64, (f32, f32))>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::with_orbit(OrbitController::default())
    }
}

impl CameraController {
    pub fn with_orbit(orbit: OrbitController) -> Self {
        Self {
            orbit,
            left_mouse_action: MouseAction::Orbit,
            right_mouse_action: MouseAction::Pan,
            middle_mouse_action: MouseAction::Zoom,
            pinch_speed: 0.01,
            left_pressed: false,
            right_pressed: false,
            middle_pressed: false,
            last_mouse_pos: None,
            touches: Vec::with_capacity(2),
        }
    }

    pub fn on_mouse_button(&mut self, button: u8, pressed: bool) {
        match button {
            0 => self.left_pressed = pressed,
            1 => self.right_pressed = pressed,
            2 => self.middle_pressed = pressed,
            _ => {}
        }
    }

    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        let Some((last_x, last_y)) = self.last_mouse_pos.replace((x, y)) else {
            return;
        };
        let dx = x - last_x;
        let dy = y - last_y;

        let action = if self.left_pressed {
            self.left_mouse_action
        } else if self.right_pressed {
            self.right_mouse_action
        } else if self.middle_pressed {
            self.middle_mouse_action
        } else {
            MouseAction::None
        };

        match action {
            MouseAction::Orbit => self.orbit.rotate(dx, dy),
            MouseAction::Pan => self.orbit.pan(-dx, dy),
            MouseAction::Zoom => self.orbit.zoom(dy * 0.1),
            MouseAction::None => {}
        }
    }

    pub fn on_mouse_left(&mut self) {
        self.last_mouse_pos = None;
    }

    pub fn on_scroll(&mut self, delta: f32) {
        self.orbit.zoom(delta);
    }

    /// One finger orbits, two fingers pinch-zoom. Further touches are ignored.
    pub fn on_touch(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) {
        match phase {
            TouchPhase::Started => {
                if self.touches.len() < 2 {
                    self.touches.push((id, (x, y)));
                }
            }
            TouchPhase::Moved => {
                let Some(idx) = self.touches.iter().position(|(t, _)| *t == id) else {
                    return;
                };
                let before = self.pinch_distance();
                let (last_x, last_y) = std::mem::replace(&mut self.touches[idx].1, (x, y));
                match (before, self.pinch_distance()) {
                    (Some(before), Some(after)) => {
                        self.orbit.zoom((after - before) * self.pinch_speed);
                    }
                    _ => self.orbit.rotate(x - last_x, y - last_y),
                }
            }
            TouchPhase::Ended => self.touches.retain(|(t, _)| *t != id),
        }
    }

    fn pinch_distance(&self) -> Option<f32> {
        match self.touches.as_slice() {
            [(_, a), (_, b)] => Some(((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()),
            _ => None,
        }
    }

    pub fn update(&mut self, camera: &mut Camera) {
        self.orbit.update();
        self.orbit.update_camera(camera);
    }

    pub fn look_at(&mut self, point: Vec3) {
        self.orbit.look_at(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_from_position_round_trips() {
        let position = Vec3::new(0.0, 50.0, 50.0);
        let orbit = OrbitController::from_position(Vec3::ZERO, position);
        assert!(approx(orbit.camera_position(), position));
        assert!((orbit.phi - FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn test_look_at_keeps_camera_position() {
        let position = Vec3::new(0.0, 50.0, 50.0);
        let mut orbit = OrbitController::from_position(Vec3::ZERO, position);
        orbit.look_at(Vec3::new(2.0, 1.0, 0.0));

        let mut camera = Camera::default();
        orbit.update_camera(&mut camera);
        assert!(approx(camera.position, position));
        assert_eq!(camera.target, Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_look_at_point_straight_below_does_not_jump() {
        let mut orbit = OrbitController::from_position(Vec3::ZERO, Vec3::new(0.0, 50.0, 50.0));
        orbit.look_at(Vec3::new(0.0, 0.0, 50.0));
        assert_eq!(orbit.phi, orbit.min_phi);

        let settled = orbit.camera_position();
        orbit.update();
        assert!(approx(orbit.camera_position(), settled));
    }

    #[test]
    fn test_undamped_input_applies_once() {
        let mut orbit = OrbitController::new(Vec3::ZERO, 10.0);
        let theta = orbit.theta;
        orbit.rotate(-100.0, 0.0);
        orbit.update();
        let after_first = orbit.theta;
        assert!((after_first - theta - 0.5).abs() < 1e-5);
        orbit.update();
        assert_eq!(orbit.theta, after_first);
        assert!(!orbit.is_moving());
    }

    #[test]
    fn test_damped_input_decays() {
        let mut orbit = OrbitController::new(Vec3::ZERO, 10.0);
        orbit.damping = Some(0.5);
        orbit.rotate(-100.0, 0.0);
        orbit.update();
        let first = orbit.theta;
        orbit.update();
        assert!(orbit.theta > first);
        for _ in 0..64 {
            orbit.update();
        }
        assert!(!orbit.is_moving());
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut orbit = OrbitController::new(Vec3::ZERO, 1.0);
        orbit.zoom(1000.0);
        orbit.update();
        assert_eq!(orbit.radius, orbit.min_radius);
    }

    #[test]
    fn test_pan_moves_center_sideways() {
        let mut orbit = OrbitController::new(Vec3::ZERO, 10.0);
        orbit.theta = std::f32::consts::FRAC_PI_2;
        let before = orbit.camera_position();
        orbit.pan(10.0, 0.0);
        orbit.update();
        // Camera looks down -Z here, so screen-right is world +X.
        assert!(orbit.center.x > 0.0);
        assert!(orbit.center.y.abs() < 1e-6);
        assert!((orbit.camera_position() - before).x > 0.0);
    }

    #[test]
    fn test_drag_orbits_only_while_pressed() {
        let mut controller = CameraController::with_orbit(OrbitController::new(Vec3::ZERO, 10.0));
        let theta = controller.orbit.theta;
        controller.on_mouse_move(0.0, 0.0);
        controller.on_mouse_move(50.0, 0.0);
        controller.orbit.update();
        assert_eq!(controller.orbit.theta, theta);

        controller.on_mouse_button(0, true);
        controller.on_mouse_move(100.0, 0.0);
        controller.orbit.update();
        assert!(controller.orbit.theta < theta);
    }

    #[test]
    fn test_pinch_out_zooms_in() {
        let mut controller = CameraController::with_orbit(OrbitController::new(Vec3::ZERO, 10.0));
        controller.on_touch(1, TouchPhase::Started, 100.0, 100.0);
        controller.on_touch(2, TouchPhase::Started, 200.0, 100.0);
        controller.on_touch(2, TouchPhase::Moved, 300.0, 100.0);

        let mut camera = Camera::default();
        controller.update(&mut camera);
        assert!(controller.orbit.radius < 10.0);

        controller.on_touch(2, TouchPhase::Ended, 300.0, 100.0);
        let theta = controller.orbit.theta;
        controller.on_touch(1, TouchPhase::Moved, 150.0, 100.0);
        controller.update(&mut camera);
        assert!(controller.orbit.theta < theta);
    }
}
