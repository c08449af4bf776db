//! GPU-side records packed from a [`FrameOutput`].
//!
//! All records are `#[repr(C)]` and std140-compatible: every member is a
//! vec4, a mat4, or padded out to 16 bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use orrery_sim::{ClockState, FrameOutput, OrbitPath};

/// Points per orbit circle in [`FrameUniforms::orbit_vertices`].
pub const ORBIT_PATH_SEGMENTS: usize = 128;

/// [`BodyInstance::flags`] bit: body emits light and is drawn unlit.
pub const INSTANCE_EMISSIVE: u32 = 1 << 0;
/// [`BodyInstance::flags`] bit: body is inside an eclipse shadow.
pub const INSTANCE_SHADOWED: u32 = 1 << 1;

/// Camera uniform, 208 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye position, w = simulated time (wrapped to a day of seconds).
    pub position_time: [f32; 4],
}

impl CameraUniform {
    #[must_use]
    pub fn new(view: Mat4, projection: Mat4, eye: Vec3, simulated_time: f64) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            view_proj: (projection * view).to_cols_array_2d(),
            position_time: eye
                .extend(simulated_time.rem_euclid(86_400.0) as f32)
                .to_array(),
        }
    }
}

/// Point light uniform, 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightUniform {
    /// xyz = world position, w = 1.
    pub position: [f32; 4],
    /// rgb = color, a = 1 while the clock runs, 0 while frozen.
    pub color: [f32; 4],
}

/// Per-body instance record, 128 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BodyInstance {
    pub model: [[f32; 4]; 4],
    /// Columns of the inverse-transpose of the model's upper 3×3, w = 0.
    pub normal_x: [f32; 4],
    pub normal_y: [f32; 4],
    pub normal_z: [f32; 4],
    /// Index into the scene's body list; picks texture and mesh.
    pub body_index: u32,
    /// [`INSTANCE_EMISSIVE`] | [`INSTANCE_SHADOWED`].
    pub flags: u32,
    pub _pad: [u32; 2],
}

impl BodyInstance {
    #[must_use]
    pub fn new(model: Mat4, body_index: u32, emissive: bool, shadowed: bool) -> Self {
        let normal = glam::Mat3::from_mat4(model).inverse().transpose();
        let mut flags = 0;
        if emissive {
            flags |= INSTANCE_EMISSIVE;
        }
        if shadowed {
            flags |= INSTANCE_SHADOWED;
        }
        Self {
            model: model.to_cols_array_2d(),
            normal_x: normal.x_axis.extend(0.0).to_array(),
            normal_y: normal.y_axis.extend(0.0).to_array(),
            normal_z: normal.z_axis.extend(0.0).to_array(),
            body_index,
            flags,
            _pad: [0; 2],
        }
    }

    #[must_use]
    pub fn is_emissive(&self) -> bool {
        self.flags & INSTANCE_EMISSIVE != 0
    }

    #[must_use]
    pub fn is_shadowed(&self) -> bool {
        self.flags & INSTANCE_SHADOWED != 0
    }
}

/// Everything a backend uploads for one frame.
#[derive(Debug, Clone)]
pub struct FrameUniforms {
    pub camera: CameraUniform,
    pub light: LightUniform,
    /// Translation-free camera for the skybox pass; `None` skips the pass.
    pub skybox: Option<CameraUniform>,
    /// One instance per body, in scene order.
    pub instances: Vec<BodyInstance>,
    /// Line-list vertices, [`ORBIT_PATH_SEGMENTS`] × 2 per orbit path.
    pub orbit_vertices: Vec<[f32; 4]>,
}

impl FrameUniforms {
    /// Packs `output` into GPU records.
    #[must_use]
    pub fn from_output(output: &FrameOutput<'_>) -> Self {
        let projection = output.projection.matrix();
        let camera = CameraUniform::new(
            output.view,
            projection,
            output.camera_position,
            output.simulated_time,
        );
        let skybox = output
            .skybox_view
            .map(|view| CameraUniform::new(view, projection, Vec3::ZERO, output.simulated_time));

        let running = match output.clock_state {
            ClockState::Running { .. } => 1.0,
            ClockState::Frozen { .. } => 0.0,
        };
        let light = LightUniform {
            position: output.light.position.extend(1.0).to_array(),
            color: output.light.color.extend(running).to_array(),
        };

        let instances = output
            .bodies
            .iter()
            .map(|b| BodyInstance::new(b.model, b.id.index() as u32, b.emissive, b.shadowed))
            .collect();

        let orbit_vertices = output
            .orbit_paths
            .iter()
            .flat_map(orbit_line_list)
            .collect();

        Self {
            camera,
            light,
            skybox,
            instances,
            orbit_vertices,
        }
    }
}

fn orbit_line_list(path: &OrbitPath) -> Vec<[f32; 4]> {
    let points = path.points(ORBIT_PATH_SEGMENTS);
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .flat_map(|(a, b)| [a.extend(1.0).to_array(), b.extend(1.0).to_array()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_sim::{
        Command, Features, FrameInput, Orrery, OrrerySettings, ScenarioDef, Scene,
    };

    fn orrery(features: Features) -> Orrery {
        let scene = Scene::from_scenario(&ScenarioDef::solar_system_basic()).unwrap();
        Orrery::new(
            scene,
            OrrerySettings {
                features,
                ..OrrerySettings::default()
            },
        )
    }

    #[test]
    fn test_gpu_struct_sizes() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 208);
        assert_eq!(std::mem::size_of::<LightUniform>(), 32);
        assert_eq!(std::mem::size_of::<BodyInstance>(), 128);
        assert_eq!(std::mem::size_of::<BodyInstance>() % 16, 0);
    }

    #[test]
    fn test_instance_flags() {
        let sun = BodyInstance::new(Mat4::IDENTITY, 0, true, false);
        assert!(sun.is_emissive());
        assert!(!sun.is_shadowed());
        let moon = BodyInstance::new(Mat4::IDENTITY, 2, false, true);
        assert_eq!(moon.flags, INSTANCE_SHADOWED);
        assert_eq!(moon.body_index, 2);
    }

    #[test]
    fn test_normal_matrix_undoes_uniform_scale() {
        let instance = BodyInstance::new(Mat4::from_scale(Vec3::splat(2.0)), 0, false, false);
        assert!((instance.normal_x[0] - 0.5).abs() < 1e-6);
        assert!((instance.normal_y[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_camera_uniform_view_proj_is_product() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 5.0, 20.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(0.8, 1.5, 0.1, 100.0);
        let uniform = CameraUniform::new(view, projection, Vec3::new(0.0, 5.0, 20.0), 3.0);
        let expected = (projection * view).to_cols_array_2d();
        assert_eq!(uniform.view_proj, expected);
        assert_eq!(uniform.position_time, [0.0, 5.0, 20.0, 3.0]);
    }

    #[test]
    fn test_from_output_packs_every_body() {
        let mut orrery = orrery(Features::default());
        let output = orrery.step(0.016, &FrameInput::idle());
        let uniforms = FrameUniforms::from_output(&output);

        assert_eq!(uniforms.instances.len(), output.bodies.len());
        for (instance, body) in uniforms.instances.iter().zip(&output.bodies) {
            assert_eq!(instance.model, body.model.to_cols_array_2d());
            assert_eq!(instance.body_index as usize, body.id.index());
            assert_eq!(instance.is_emissive(), body.emissive);
        }
        assert_eq!(uniforms.camera.view_proj, output.view_projection().to_cols_array_2d());
        assert!(uniforms.skybox.is_some());
        assert!(uniforms.orbit_vertices.is_empty());
        assert_eq!(uniforms.light.color[3], 1.0);
    }

    #[test]
    fn test_skybox_camera_has_no_translation() {
        let mut orrery = orrery(Features::default());
        let output = orrery.step(0.016, &FrameInput::idle());
        let skybox = FrameUniforms::from_output(&output).skybox.unwrap();
        assert_eq!(skybox.view[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_orbit_paths_become_closed_line_lists() {
        let mut orrery = orrery(Features {
            orbit_paths: true,
            skybox: false,
            ..Features::default()
        });
        let output = orrery.step(0.016, &FrameInput::idle());
        let uniforms = FrameUniforms::from_output(&output);

        assert!(uniforms.skybox.is_none());
        assert_eq!(
            uniforms.orbit_vertices.len(),
            output.orbit_paths.len() * ORBIT_PATH_SEGMENTS * 2
        );
        let first = uniforms.orbit_vertices[0];
        let last = uniforms.orbit_vertices[ORBIT_PATH_SEGMENTS * 2 - 1];
        assert_eq!(first, last);
    }

    #[test]
    fn test_frozen_clock_dims_light_alpha() {
        let mut orrery = orrery(Features::default());
        let frozen = orrery
            .step(0.016, &FrameInput::idle().with_command(Command::EnterLunarEclipseWatch));
        let uniforms = FrameUniforms::from_output(&frozen);
        assert!(matches!(frozen.clock_state, ClockState::Frozen { .. }));
        assert_eq!(uniforms.light.color[3], 0.0);
    }

    #[test]
    fn test_instances_cast_to_bytes() {
        let mut orrery = orrery(Features::default());
        let output = orrery.step(0.016, &FrameInput::idle());
        let uniforms = FrameUniforms::from_output(&output);
        let bytes: &[u8] = bytemuck::cast_slice(&uniforms.instances);
        assert_eq!(bytes.len(), uniforms.instances.len() * std::mem::size_of::<BodyInstance>());
    }
}
