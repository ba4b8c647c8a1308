use glow::HasContext;

use super::camera::ArcBallCamera;
use super::layer::MeasureLayer;
use super::mesh::{self, FillMeshData, MeshData};
use crate::state::settings::{AxisSettings, GridSettings};

// ── Render parameters ────────────────────────────────────────

/// Parameters for rendering the viewport
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    pub grid_visible: bool,
    pub axes_visible: bool,
    /// Background color RGB
    pub bg_color: [u8; 3],
}

// ── GPU mesh handles ─────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

/// Non-indexed buffer with the 7-float line layout (lines or triangles)
struct GpuLines {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

/// Registry version and marker radius bits the measurement buffers were built from
pub type LayerKey = (u64, u32);

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    mesh_program: glow::Program,
    line_program: glow::Program,
    grid: Option<GpuLines>,
    axes: Option<GpuLines>,
    /// Cached grid settings to detect changes
    cached_grid_settings: Option<(i32, f32, f32)>,
    cached_axes_length: Option<f32>,
    model: Option<GpuMesh>,
    model_revision: u64,
    markers: Option<GpuMesh>,
    lines: Option<GpuLines>,
    fills: Option<GpuLines>,
    layer_key: Option<LayerKey>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG)?;
        let line_program = compile_program(gl, LINE_VERT, LINE_FRAG)?;

        Ok(Self {
            mesh_program,
            line_program,
            grid: None,
            axes: None,
            cached_grid_settings: None,
            cached_axes_length: None,
            model: None,
            model_revision: 0,
            markers: None,
            lines: None,
            fills: None,
            layer_key: None,
        })
    }

    /// Update grid mesh based on settings
    pub fn update_grid(&mut self, gl: &glow::Context, settings: &GridSettings) {
        let new_settings = (settings.range, settings.size, settings.opacity);
        if self.cached_grid_settings == Some(new_settings) {
            return;
        }
        delete_lines(gl, self.grid.take());
        let grid_data = mesh::grid(settings.range, settings.size, settings.opacity);
        self.grid = upload_lines(gl, &grid_data.vertices);
        self.cached_grid_settings = Some(new_settings);
    }

    pub fn update_axes(&mut self, gl: &glow::Context, settings: &AxisSettings) {
        if self.cached_axes_length == Some(settings.length) {
            return;
        }
        delete_lines(gl, self.axes.take());
        let axes_data = mesh::axes(settings.length);
        self.axes = upload_lines(gl, &axes_data.vertices);
        self.cached_axes_length = Some(settings.length);
    }

    pub fn needs_model(&self, revision: u64) -> bool {
        revision != self.model_revision
    }

    /// Replace the model buffers when the model revision changed
    pub fn sync_model(&mut self, gl: &glow::Context, model: Option<&MeshData>, revision: u64) {
        if revision == self.model_revision {
            return;
        }
        self.model_revision = revision;
        delete_mesh(gl, self.model.take());
        self.model = model.and_then(|m| upload_mesh(gl, m));
    }

    pub fn layer_stale(&self, key: LayerKey) -> bool {
        self.layer_key != Some(key)
    }

    /// Replace the marker, line and fill buffers
    pub fn sync_layer(&mut self, gl: &glow::Context, layer: &MeasureLayer, key: LayerKey) {
        delete_mesh(gl, self.markers.take());
        delete_lines(gl, self.lines.take());
        delete_lines(gl, self.fills.take());
        self.markers = upload_mesh(gl, &layer.markers);
        self.lines = upload_lines(gl, &layer.lines.vertices);
        self.fills = upload_fills(gl, &layer.fills);
        self.layer_key = Some(key);
    }

    /// Render the scene
    pub fn paint(&self, gl: &glow::Context, camera: &ArcBallCamera, params: &RenderParams) {
        let aspect = params.viewport[2] / params.viewport[3];
        let vp = camera.view_projection(aspect);
        let [x, y, w, h] = params.viewport.map(|v| v as i32);

        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            gl.clear_color(
                params.bg_color[0] as f32 / 255.0,
                params.bg_color[1] as f32 / 255.0,
                params.bg_color[2] as f32 / 255.0,
                1.0,
            );
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);

            // Model
            gl.use_program(Some(self.mesh_program));
            set_uniform_mat4(gl, self.mesh_program, "u_mvp", &vp);
            let light_dir = glam::Vec3::new(0.3, 0.8, 0.5).normalize();
            set_uniform_vec3(gl, self.mesh_program, "u_light_dir", &light_dir);
            if let Some(model) = &self.model {
                draw_mesh(gl, model);
            }

            // Grid and axes
            gl.use_program(Some(self.line_program));
            set_uniform_mat4(gl, self.line_program, "u_mvp", &vp);
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            if params.grid_visible {
                if let Some(grid) = &self.grid {
                    draw_lines(gl, grid, glow::LINES);
                }
            }
            if params.axes_visible {
                if let Some(axes) = &self.axes {
                    draw_lines(gl, axes, glow::LINES);
                }
            }

            // Area fills: translucent, depth-tested but not depth-writing
            if let Some(fills) = &self.fills {
                gl.depth_mask(false);
                gl.disable(glow::CULL_FACE);
                draw_lines(gl, fills, glow::TRIANGLES);
                gl.depth_mask(true);
            }

            // Measurement lines and markers stay visible through the model
            gl.disable(glow::DEPTH_TEST);
            if let Some(lines) = &self.lines {
                gl.line_width(2.0);
                draw_lines(gl, lines, glow::LINES);
                gl.line_width(1.0);
            }
            gl.disable(glow::BLEND);

            if let Some(markers) = &self.markers {
                gl.enable(glow::DEPTH_TEST);
                gl.clear(glow::DEPTH_BUFFER_BIT);
                gl.use_program(Some(self.mesh_program));
                draw_mesh(gl, markers);
            }

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Option<GpuMesh> {
    if data.indices.is_empty() {
        return None;
    }
    unsafe {
        let vao = gl.create_vertex_array().ok()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().ok()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = 9 * 4;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride, 6 * 4);

        let ibo = gl.create_buffer().ok()?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            cast_slice(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        Some(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

/// Upload 7-float vertices (position + RGBA)
fn upload_lines(gl: &glow::Context, vertices: &[f32]) -> Option<GpuLines> {
    if vertices.is_empty() {
        return None;
    }
    unsafe {
        let vao = gl.create_vertex_array().ok()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().ok()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, cast_slice(vertices), glow::STATIC_DRAW);

        let stride = 7 * 4;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 3 * 4);

        gl.bind_vertex_array(None);

        Some(GpuLines {
            vao,
            vbo,
            vertex_count: (vertices.len() / 7) as i32,
        })
    }
}

fn upload_fills(gl: &glow::Context, data: &FillMeshData) -> Option<GpuLines> {
    upload_lines(gl, &data.vertices)
}

fn delete_mesh(gl: &glow::Context, mesh: Option<GpuMesh>) {
    if let Some(mesh) = mesh {
        unsafe {
            gl.delete_vertex_array(mesh.vao);
            gl.delete_buffer(mesh.vbo);
            gl.delete_buffer(mesh.ibo);
        }
    }
}

fn delete_lines(gl: &glow::Context, lines: Option<GpuLines>) {
    if let Some(lines) = lines {
        unsafe {
            gl.delete_vertex_array(lines.vao);
            gl.delete_buffer(lines.vbo);
        }
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

unsafe fn draw_lines(gl: &glow::Context, lines: &GpuLines, mode: u32) {
    gl.bind_vertex_array(Some(lines.vao));
    gl.draw_arrays(mode, 0, lines.vertex_count);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_shader(gl: &glow::Context, kind: u32, src: &str) -> Result<glow::Shader, String> {
    unsafe {
        let shader = gl.create_shader(kind)?;
        gl.shader_source(shader, src);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(format!("shader compile error: {log}"));
        }
        Ok(shader)
    }
}

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;
        let vert = compile_shader(gl, glow::VERTEX_SHADER, vert_src)?;
        let frag = compile_shader(gl, glow::FRAGMENT_SHADER, frag_src)?;

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(format!("program link error: {log}"));
        }
        Ok(program)
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &glam::Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_normal;
out vec3 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_normal = a_normal;
    v_color = a_color;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;

in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    // Two-sided: scanned models often have inconsistent winding
    float diffuse = abs(dot(n, u_light_dir));
    float light = 0.3 + diffuse * 0.7;
    frag_color = vec4(v_color * light, 1.0);
}
"#;

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;

out vec4 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_color = a_color;
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = v_color;
}
"#;
