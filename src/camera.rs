use cgmath::*;

use wgpu::util::DeviceExt;

use crate::{
    constants::{WORLD_HEIGHT, WORLD_WIDTH},
    geom::Bounds,
};

// CGMath uses an OpenGL clipspace of [-1,+1] on z, where wgpu uses [0,+1] for z
// We need to scale and translate the cgmath clipspace to wgpu's.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UniformData {
    view_proj: [[f32; 4]; 4],
}

impl Default for UniformData {
    fn default() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }
}

impl UniformData {
    fn for_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.calc_matrix().into(),
        }
    }
}

/// The camera's projection, uploaded to a uniform buffer and bound at group 1 of the sprite
/// pipeline.
pub struct Uniforms {
    data: UniformData,
    buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl Uniforms {
    pub fn new(device: &wgpu::Device) -> Self {
        let data = UniformData::default();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[data]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            data,
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Recomputes the projection from `camera` and writes it to the GPU.
    pub fn update(&mut self, queue: &wgpu::Queue, camera: &Camera) {
        self.data = UniformData::for_camera(camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.data]));
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// A fixed-aspect 2D camera over the game world. The world is letterboxed into whatever
/// window size is available so gameplay pixels keep their proportions.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Top-left of the visible world region.
    pub position: Point2<f32>,
    pub world_size: Vector2<f32>,
    window_size: Vector2<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(WORLD_WIDTH, WORLD_HEIGHT)
    }
}

impl Camera {
    pub fn new(world_width: f32, world_height: f32) -> Self {
        Self {
            position: point2(0.0, 0.0),
            world_size: vec2(world_width, world_height),
            window_size: vec2(world_width, world_height),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.window_size = vec2(width.max(1) as f32, height.max(1) as f32);
    }

    /// Projection mapping world pixels (y down) onto the viewport.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX
            * ortho(
                self.position.x,
                self.position.x + self.world_size.x,
                self.position.y + self.world_size.y,
                self.position.y,
                -1.0,
                1.0,
            )
    }

    /// The largest window-space rectangle with the world's aspect ratio, centered in the window.
    pub fn viewport(&self) -> Bounds {
        let scale = (self.window_size.x / self.world_size.x)
            .min(self.window_size.y / self.world_size.y);
        let extent = self.world_size * scale;
        let origin = point2(
            (self.window_size.x - extent.x) * 0.5,
            (self.window_size.y - extent.y) * 0.5,
        );
        Bounds::new(origin, extent)
    }

    /// Converts a window-space position (physical pixels) to world coordinates.
    pub fn window_to_world(&self, window_position: Point2<f32>) -> Point2<f32> {
        let viewport = self.viewport();
        let scale = self.world_size.x / viewport.width();
        self.position + (window_position - viewport.origin) * scale
    }
}

#[cfg(test)]
mod camera_tests {
    use super::*;

    #[test]
    fn viewport_letterboxes_wide_windows() {
        let mut camera = Camera::default();
        camera.resize(1920, 600);
        let vp = camera.viewport();
        assert_eq!(vp, Bounds::from_xywh(480.0, 0.0, 960.0, 600.0));
    }

    #[test]
    fn viewport_scales_to_fit() {
        let mut camera = Camera::default();
        camera.resize(1920, 1200);
        assert_eq!(camera.viewport(), Bounds::from_xywh(0.0, 0.0, 1920.0, 1200.0));
        assert_eq!(camera.window_to_world(point2(960.0, 600.0)), point2(480.0, 300.0));
    }

    #[test]
    fn projection_maps_world_corners_to_clip_space() {
        let camera = Camera::default();
        let m = camera.calc_matrix();
        let top_left = m * vec4(0.0, 0.0, 0.0, 1.0);
        let bottom_right = m * vec4(960.0, 600.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-5 && (top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5 && (bottom_right.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn uniform_data_carries_camera_projection() {
        let mut camera = Camera::default();
        camera.position = point2(10.0, 20.0);
        let data = UniformData::for_camera(&camera);
        let expected: [[f32; 4]; 4] = camera.calc_matrix().into();
        assert_eq!(data.view_proj, expected);
        assert_ne!(data.view_proj, UniformData::default().view_proj);
    }
}
