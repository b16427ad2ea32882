/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use frustview_core::{
    projection::project_with, transform::mvp_matrix, Camera, Frustum, MeshBuffer, ModelTransform,
};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const WIREFRAME_CHAR: char = '~';
const FRUSTUM_CHAR: char = 'o';

/// Lines win depth ties against the surface they lie on
const LINE_DEPTH_BIAS: f32 = 1e-3;

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Flat-shade every triangle of the buffer with a headlight.
    pub fn render_mesh(&mut self, mesh: &MeshBuffer, transform: &ModelTransform, camera: &Camera) {
        let mvp = mvp_matrix(&transform.matrix(), &camera.view_matrix(), &camera.projection_matrix());
        let normal_matrix = transform.normal_matrix();
        let light_dir = (camera.position - camera.target).normalize();

        if mesh.position_dim() < 3 || mesh.normal_dim() < 3 {
            return;
        }

        for run in mesh.triangles() {
            let mut screen_coords = [(0.0, 0.0, 0.0); 3];
            let mut normal = Vector3::zeros();
            let mut clipped = false;

            for (coord, vertex) in screen_coords.iter_mut().zip(run.iter()) {
                let (Some(position), Some(n)) = (to_point(vertex.position()), to_vector(vertex.normal()))
                else {
                    clipped = true;
                    continue;
                };
                normal += n;
                match project_with(&mvp, &position, self.width as u32, self.height as u32) {
                    Some(projected) => *coord = projected,
                    None => clipped = true,
                }
            }

            if clipped {
                continue;
            }

            let world_normal = normal_matrix * normal;
            let brightness = if world_normal.norm() > 0.0 {
                world_normal.normalize().dot(&light_dir).abs()
            } else {
                0.0
            };

            // Map brightness to character
            let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
            let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
            let character = LUMINOSITY_RAMP[char_index];

            self.rasterize_triangle(&screen_coords, character, ramp_color(character));
        }
    }

    /// Draw the edges of every triangle on top of the shaded surface.
    pub fn render_wireframe(&mut self, mesh: &MeshBuffer, model: &Matrix4<f32>, camera: &Camera) {
        let mvp = mvp_matrix(model, &camera.view_matrix(), &camera.projection_matrix());

        if mesh.position_dim() < 3 {
            return;
        }

        for run in mesh.triangles() {
            let points: Vec<Point3<f32>> = run.iter().filter_map(|v| to_point(v.position())).collect();
            if points.len() != 3 {
                continue;
            }
            for i in 0..3 {
                self.draw_line_3d(&mvp, &points[i], &points[(i + 1) % 3], WIREFRAME_CHAR, Color::DarkBlue);
            }
        }
    }

    /// Draw the twelve edges of another camera's view volume.
    pub fn render_frustum(&mut self, frustum: &Frustum, camera: &Camera) {
        let vp = camera.projection_matrix() * camera.view_matrix();
        for (start, end) in frustum.segments() {
            self.draw_line_3d(&vp, &start, &end, FRUSTUM_CHAR, Color::Red);
        }
    }

    /// Clip a world-space segment to the view volume in clip space, then
    /// rasterize what is left.
    fn draw_line_3d(
        &mut self,
        mvp: &Matrix4<f32>,
        start: &Point3<f32>,
        end: &Point3<f32>,
        character: char,
        color: Color,
    ) {
        let Some((a, b)) = clip_segment(mvp * start.to_homogeneous(), mvp * end.to_homogeneous()) else {
            return;
        };
        let a = self.to_screen(&a);
        let b = self.to_screen(&b);
        self.rasterize_line(a, b, character, color);
    }

    fn to_screen(&self, clip: &Vector4<f32>) -> (f32, f32, f32) {
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        (
            (ndc_x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc_y) * 0.5 * self.height as f32,
            clip.z / clip.w,
        )
    }

    fn rasterize_line(&mut self, a: (f32, f32, f32), b: (f32, f32, f32), character: char, color: Color) {
        let dx = b.0 - a.0;
        let dy = b.1 - a.1;
        // Endpoints are already clipped to the screen rectangle
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = (a.0 + dx * t).floor();
            let y = (a.1 + dy * t).floor();
            if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                continue;
            }

            let depth = a.2 + (b.2 - a.2) * t - LINE_DEPTH_BIAS;
            let idx = y as usize * self.width + x as usize;
            if depth < self.depth_buffer[idx] {
                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = character;
                self.color_buffer[idx] = color;
            }
        }
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                            self.color_buffer[idx] = color;
                        }
                    }
                }
            }
        }
    }

    /// Character at a cell, mainly for inspection in tests
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Color based on character intensity
fn ramp_color(c: char) -> Color {
    match c {
        ' ' | '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        '#' | '%' | '@' => Color::Cyan,
        _ => Color::White,
    }
}

fn to_point(components: &[f32]) -> Option<Point3<f32>> {
    match components {
        [x, y, z, ..] => Some(Point3::new(*x, *y, *z)),
        _ => None,
    }
}

fn to_vector(components: &[f32]) -> Option<Vector3<f32>> {
    to_point(components).map(|p| p.coords)
}

/// Clip a clip-space segment to `-w <= x, y, z <= w`.
fn clip_segment(mut a: Vector4<f32>, mut b: Vector4<f32>) -> Option<(Vector4<f32>, Vector4<f32>)> {
    // Signed distances inside the near, far, left, right, bottom and top planes
    let planes: [fn(&Vector4<f32>) -> f32; 6] = [
        |v: &Vector4<f32>| v.w + v.z,
        |v: &Vector4<f32>| v.w - v.z,
        |v: &Vector4<f32>| v.w + v.x,
        |v: &Vector4<f32>| v.w - v.x,
        |v: &Vector4<f32>| v.w + v.y,
        |v: &Vector4<f32>| v.w - v.y,
    ];

    for distance in planes {
        let da = distance(&a);
        let db = distance(&b);
        if da < 0.0 && db < 0.0 {
            return None;
        }
        if da < 0.0 {
            a = a + (b - a) * (da / (da - db));
        } else if db < 0.0 {
            b = b + (a - b) * (db / (db - da));
        }
    }

    (a.w > 1e-6 && b.w > 1e-6).then_some((a, b))
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
