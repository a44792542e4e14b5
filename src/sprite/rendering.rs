use cgmath::*;
use image::{Rgba, RgbaImage};
use std::{collections::HashMap, ops::Range, path::Path};
use wgpu::util::DeviceExt;

use crate::{
    assets, camera,
    font::{self, RetroFont},
    geom::Bounds,
    texture::Texture,
};

use super::core::Sprite;

// --------------------------------------------------------------------------------------------------------------------

pub fn color(rgb: u32, alpha: f32) -> Vector4<f32> {
    vec4(
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
        alpha,
    )
}

pub const WHITE: Vector4<f32> = Vector4::new(1.0, 1.0, 1.0, 1.0);

/// Identifies the texture a Quad samples from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    /// An image or spritesheet from the asset manifest
    Image(String),
    /// A single opaque white texel, for flat colored shapes
    Solid,
    /// The bitmap font atlas
    Font,
}

/// A textured, tinted rectangle in world pixels. A negative uv extent mirrors the texture.
#[derive(Clone, Debug, PartialEq)]
pub struct Quad {
    pub texture: TextureKey,
    pub dest: Bounds,
    pub uv: Bounds,
    pub color: Vector4<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    /// Drawn in world space, beneath the overlay.
    World,
    /// Fixed to the camera, drawn over the world.
    Overlay,
}

fn unit_uv() -> Bounds {
    Bounds::new(point2(0.0, 0.0), vec2(1.0, 1.0))
}

/// DrawList collects the quads for one frame, in paint order, for each layer.
///
/// Spritesheet frames are located on a grid derived from each sheet's pixel size. Sizes default
/// to the manifest's single-row layout until `set_sheet_size` records the loaded image's size.
#[derive(Debug, Default)]
pub struct DrawList {
    world: Vec<Quad>,
    overlay: Vec<Quad>,
    sheet_sizes: HashMap<String, (u32, u32)>,
}

impl DrawList {
    pub fn set_sheet_size(&mut self, key: &str, size: (u32, u32)) {
        self.sheet_sizes.insert(key.to_string(), size);
    }

    fn sheet_size(&self, asset: &assets::ImageAsset) -> (u32, u32) {
        self.sheet_sizes
            .get(asset.key)
            .copied()
            .unwrap_or_else(|| asset.sheet_size())
    }

    pub fn clear(&mut self) {
        self.world.clear();
        self.overlay.clear();
    }

    pub fn layer(&self, layer: Layer) -> &[Quad] {
        match layer {
            Layer::World => &self.world,
            Layer::Overlay => &self.overlay,
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.world.is_empty() && self.overlay.is_empty()
    }

    pub fn push(&mut self, layer: Layer, quad: Quad) {
        match layer {
            Layer::World => self.world.push(quad),
            Layer::Overlay => self.overlay.push(quad),
        }
    }

    /// Adds a visible, live sprite, offset by `offset` (e.g. the position of its parent group).
    /// Positions snap to whole pixels.
    pub fn sprite(&mut self, layer: Layer, sprite: &Sprite, offset: Vector2<f32>) {
        if !sprite.visible || !sprite.alive {
            return;
        }
        let asset = match assets::image(&sprite.key) {
            Some(a) => a,
            None => return,
        };

        let size = vec2(
            sprite.size.x * sprite.scale.x.abs(),
            sprite.size.y * sprite.scale.y.abs(),
        );
        let origin = sprite.position + offset
            - vec2(sprite.anchor.x * size.x, sprite.anchor.y * size.y);
        let origin = point2(origin.x.round(), origin.y.round());

        let uv = frame_uv(
            self.sheet_size(asset),
            asset.frame_size,
            sprite.current_frame(),
            sprite.scale.x < 0.0,
        );

        self.push(
            layer,
            Quad {
                texture: TextureKey::Image(sprite.key.clone()),
                dest: Bounds::new(origin, size),
                uv,
                color: vec4(1.0, 1.0, 1.0, sprite.alpha),
            },
        );
    }

    pub fn rect(&mut self, layer: Layer, dest: Bounds, color: Vector4<f32>) {
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return;
        }
        self.push(
            layer,
            Quad {
                texture: TextureKey::Solid,
                dest,
                uv: unit_uv(),
                color,
            },
        );
    }

    /// Fills a rectangle with rounded corners, built from one-pixel scanline strips in the
    /// corner rows and a single quad for the straight middle section.
    pub fn rounded_rect(&mut self, layer: Layer, dest: Bounds, radius: f32, color: Vector4<f32>) {
        let r = radius.min(dest.width() * 0.5).min(dest.height() * 0.5).max(0.0);
        if r < 1.0 {
            self.rect(layer, dest, color);
            return;
        }

        let rows = r.ceil() as usize;
        for i in 0..rows {
            let y = i as f32;
            let strip_height = (r - y).min(1.0);
            let dy = r - (y + strip_height * 0.5);
            let inset = r - (r * r - dy * dy).max(0.0).sqrt();
            let width = dest.width() - inset * 2.0;
            let top = Bounds::from_xywh(dest.left() + inset, dest.top() + y, width, strip_height);
            let bottom = Bounds::from_xywh(
                dest.left() + inset,
                dest.bottom() - y - strip_height,
                width,
                strip_height,
            );
            self.rect(layer, top, color);
            self.rect(layer, bottom, color);
        }

        self.rect(
            layer,
            Bounds::from_xywh(dest.left(), dest.top() + r, dest.width(), dest.height() - r * 2.0),
            color,
        );
    }

    /// A rounded box with an outline of `line_width` centered on its edge.
    pub fn rounded_box(
        &mut self,
        layer: Layer,
        dest: Bounds,
        radius: f32,
        fill: Vector4<f32>,
        line_width: f32,
        line_color: Vector4<f32>,
    ) {
        let half = line_width * 0.5;
        if line_width > 0.0 {
            let outer = dest.inset(vec2(-line_width, -line_width));
            self.rounded_rect(layer, outer, radius + half, line_color);
        }
        let inner = dest.inset(vec2(line_width, line_width));
        self.rounded_rect(layer, inner, (radius - half).max(0.0), fill);
    }

    /// Lays out text with the bitmap font; `origin` is the top-left of the first glyph.
    pub fn text(
        &mut self,
        layer: Layer,
        text: &str,
        origin: Point2<f32>,
        size: f32,
        color: Vector4<f32>,
    ) {
        let advance = font::advance(size);
        let glyph_width = font::glyph_width(size);
        for (i, c) in text.chars().enumerate() {
            if let Some(uv) = font::glyph_uv(c) {
                let x = origin.x + advance * i as f32;
                self.push(
                    layer,
                    Quad {
                        texture: TextureKey::Font,
                        dest: Bounds::from_xywh(x.round(), origin.y.round(), glyph_width, size),
                        uv,
                        color,
                    },
                );
            }
        }
    }

    /// Text with an outline, drawn as offset copies of the text under the fill.
    #[allow(clippy::too_many_arguments)]
    pub fn stroked_text(
        &mut self,
        layer: Layer,
        text: &str,
        origin: Point2<f32>,
        size: f32,
        fill: Vector4<f32>,
        stroke: Vector4<f32>,
        stroke_thickness: f32,
    ) {
        let d = stroke_thickness * 0.5;
        if d > 0.0 {
            for (dx, dy) in [
                (-d, -d),
                (0.0, -d),
                (d, -d),
                (-d, 0.0),
                (d, 0.0),
                (-d, d),
                (0.0, d),
                (d, d),
            ] {
                self.text(layer, text, origin + vec2(dx, dy), size, stroke);
            }
        }
        self.text(layer, text, origin, size, fill);
    }

    /// Draws retro font text, one spritesheet frame per character cell. `origin` is the top-left
    /// of the first cell.
    pub fn retro_text(
        &mut self,
        layer: Layer,
        font: &RetroFont,
        origin: Point2<f32>,
        color: Vector4<f32>,
    ) {
        let asset = match assets::image(&font.key) {
            Some(a) => a,
            None => return,
        };
        let sheet_size = self.sheet_size(asset);
        for (i, c) in font.text().chars().enumerate() {
            if let Some(frame) = font.frame_for(c) {
                let x = origin.x + font.cell.x * i as f32;
                self.push(
                    layer,
                    Quad {
                        texture: TextureKey::Image(font.key.clone()),
                        dest: Bounds::new(point2(x.round(), origin.y.round()), font.cell),
                        uv: frame_uv(sheet_size, asset.frame_size, frame, false),
                        color,
                    },
                );
            }
        }
    }
}

/// Texture coordinates of `frame` in a spritesheet of `sheet_size` pixels cut into `frame_size`
/// cells. Frames are numbered left to right, then top to bottom; leftover pixels at the right
/// and bottom edges are ignored. Out of range frames clamp to the last one.
pub fn frame_uv(
    sheet_size: (u32, u32),
    frame_size: (u32, u32),
    frame: u32,
    mirrored: bool,
) -> Bounds {
    let (sheet_w, sheet_h) = (sheet_size.0.max(1), sheet_size.1.max(1));
    let (frame_w, frame_h) = (frame_size.0.clamp(1, sheet_w), frame_size.1.clamp(1, sheet_h));
    let columns = sheet_w / frame_w;
    let rows = sheet_h / frame_h;
    let frame = frame.min(columns * rows - 1);

    let du = frame_w as f32 / sheet_w as f32;
    let dv = frame_h as f32 / sheet_h as f32;
    let u0 = (frame % columns) as f32 * du;
    let v0 = (frame / columns) as f32 * dv;
    if mirrored {
        Bounds::new(point2(u0 + du, v0), vec2(-du, dv))
    } else {
        Bounds::new(point2(u0, v0), vec2(du, dv))
    }
}

// --------------------------------------------------------------------------------------------------------------------

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A run of consecutive quads sharing a texture.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub texture: TextureKey,
    pub indices: Range<u32>,
}

/// Flattens the draw list into indexed triangles, world layer first, merging consecutive quads
/// which share a texture into one batch.
pub fn build_batches(draw_list: &DrawList) -> (Vec<Vertex>, Vec<u32>, Vec<Batch>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut batches: Vec<Batch> = Vec::new();

    let quads = draw_list
        .layer(Layer::World)
        .iter()
        .chain(draw_list.layer(Layer::Overlay).iter());

    for quad in quads {
        let base = vertices.len() as u32;
        let d = &quad.dest;
        let uv = &quad.uv;
        let color: [f32; 4] = quad.color.into();
        let corners = [
            ([d.left(), d.top()], [uv.left(), uv.top()]),
            ([d.right(), d.top()], [uv.right(), uv.top()]),
            ([d.right(), d.bottom()], [uv.right(), uv.bottom()]),
            ([d.left(), d.bottom()], [uv.left(), uv.bottom()]),
        ];
        for (position, tex_coord) in corners {
            vertices.push(Vertex {
                position,
                tex_coord,
                color,
            });
        }

        let start = indices.len() as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        let end = indices.len() as u32;

        match batches.last_mut() {
            Some(batch) if batch.texture == quad.texture => batch.indices.end = end,
            _ => batches.push(Batch {
                texture: quad.texture.clone(),
                indices: start..end,
            }),
        }
    }

    (vertices, indices, batches)
}

// --------------------------------------------------------------------------------------------------------------------

pub fn create_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::include_wgsl!("../shaders/sprite.wgsl"));

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Sprite Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[Vertex::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            // Since we're rendering sprites, we don't care about backface culling
            front_face: wgpu::FrontFace::Cw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

// --------------------------------------------------------------------------------------------------------------------

pub struct Material {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        texture: Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some(name),
        });

        Self {
            texture,
            bind_group,
        }
    }

    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("Material Bind Group Layout"),
        })
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// Draws a DrawList: one pipeline, one material per texture.
pub struct SpriteRenderer {
    pipeline: wgpu::RenderPipeline,
    camera_uniforms: camera::Uniforms,
    materials: HashMap<TextureKey, Material>,
    clear_color: wgpu::Color,
}

impl SpriteRenderer {
    /// Builds the pipeline and loads every manifest image from `res_dir`. Images which fail to
    /// load are replaced by generated placeholders.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        res_dir: &Path,
    ) -> Self {
        let material_layout = Material::bind_group_layout(device);
        let camera_uniforms = camera::Uniforms::new(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&material_layout, &camera_uniforms.bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = create_render_pipeline(device, &pipeline_layout, color_format);

        let mut materials = HashMap::new();
        for asset in assets::IMAGES {
            let path = res_dir.join(asset.path);
            let texture = match Texture::load(device, queue, &path) {
                Ok(texture) => {
                    log::debug!("Loaded image \"{}\" from {}", asset.key, path.display());
                    texture
                }
                Err(e) => {
                    log::warn!("{:#}; using placeholder for \"{}\"", e, asset.key);
                    Texture::from_image(device, queue, &assets::placeholder_sheet(asset), asset.key)
                }
            };
            materials.insert(
                TextureKey::Image(asset.key.to_string()),
                Material::new(device, asset.key, texture, &material_layout),
            );
        }

        let solid = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        materials.insert(
            TextureKey::Solid,
            Material::new(
                device,
                "Solid",
                Texture::from_image(device, queue, &solid, "Solid"),
                &material_layout,
            ),
        );
        materials.insert(
            TextureKey::Font,
            Material::new(
                device,
                "Font",
                Texture::from_image(device, queue, &font::build_atlas(), "Font"),
                &material_layout,
            ),
        );

        Self {
            pipeline,
            camera_uniforms,
            materials,
            clear_color: wgpu::Color::BLACK,
        }
    }

    /// Pixel size of every loaded manifest image, by key.
    pub fn sheet_sizes(&self) -> impl Iterator<Item = (&str, (u32, u32))> + '_ {
        self.materials
            .iter()
            .filter_map(|(key, material)| match key {
                TextureKey::Image(name) => Some((name.as_str(), material.texture.size())),
                _ => None,
            })
    }

    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &camera::Camera,
        draw_list: &DrawList,
        target: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        self.camera_uniforms.update(queue, camera);

        let (vertices, indices, batches) = build_batches(draw_list);
        let buffers = if batches.is_empty() {
            None
        } else {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Index Buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            Some((vertex_buffer, index_buffer))
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Sprite Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Some((vertex_buffer, index_buffer)) = &buffers {
            let viewport = camera.viewport();
            render_pass.set_viewport(
                viewport.left(),
                viewport.top(),
                viewport.width(),
                viewport.height(),
                0.0,
                1.0,
            );
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(1, &self.camera_uniforms.bind_group, &[]);
            render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for batch in &batches {
                match self.materials.get(&batch.texture) {
                    Some(material) => {
                        render_pass.set_bind_group(0, &material.bind_group, &[]);
                        render_pass.draw_indexed(batch.indices.clone(), 0, 0..1);
                    }
                    None => log::warn!("No material for {:?}", batch.texture),
                }
            }
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------
