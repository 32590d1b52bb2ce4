use std::fs;
use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use sheen_brdf::{compute_uniform, save_lut, SampleSequence};
use sheen_core::{Error as CoreError, LinearRgba, MaterialInputs};
use sheen_render::{
    Camera, EnvironmentConfig, HostError, InitState, LutOrigin, MaterialKind, NodeId, PbrPipeline,
    PipelineConfig, RenderError, ScreenSpaceSettings, ShaderFlags, ShaderInput,
};
use sheen_shaders::{CustomCode, ShaderError, SlotFills};

use crate::{HostCall, RecordingHost};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("sheen-pipeline").join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig::new()
        .with_shader_dir(dir.join("shaders"))
        .with_lut_path(dir.join("brdf_lut.png"))
}

fn active_toggles(host: &RecordingHost) -> usize {
    host.calls()
        .iter()
        .filter(|call| matches!(call, HostCall::SetTargetActive(_, true)))
        .count()
}

#[test]
fn setup_without_lut_binds_placeholder() {
    let dir = scratch("placeholder");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));

    pipeline.setup(&mut host).unwrap();

    insta::assert_snapshot!(
        host.call_log(),
        @"load_texture solid_texture set_shader_input create_cube_map set_shader_input set_position set_orientation"
    );
    let lut = pipeline.lut().unwrap();
    assert!(lut.is_placeholder());
    assert_eq!(lut.origin(), &LutOrigin::Placeholder(LinearRgba::LUT_FALLBACK));
    assert_eq!(
        pipeline.state(),
        InitState::SHADERS_EXPORTED | InitState::LUT_BOUND | InitState::ENVIRONMENT
    );
    assert!(dir.join("shaders").join("pbr_f.frag").is_file());
}

#[test]
fn setup_is_idempotent() {
    let dir = scratch("idempotent");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir).with_screen_space(ScreenSpaceSettings::new()));

    pipeline.setup(&mut host).unwrap();
    let first = host.calls().len();
    pipeline.setup(&mut host).unwrap();
    pipeline.bind_lut(&mut host).unwrap();
    pipeline.setup_environment(&mut host).unwrap();
    pipeline.setup_screen_space(&mut host).unwrap();

    assert_eq!(host.calls().len(), first);
    assert_eq!(pipeline.state(), InitState::all());
}

#[test]
fn existing_lut_file_is_loaded() {
    let dir = scratch("lut-file");
    let lut_path = dir.join("brdf_lut.png");
    let table = compute_uniform(4, 4, SampleSequence::Hammersley).unwrap();
    save_lut(&table, &lut_path).unwrap();

    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));
    pipeline.bind_lut(&mut host).unwrap();

    assert_eq!(pipeline.lut().unwrap().origin(), &LutOrigin::File(lut_path));
    assert_eq!(host.call_log(), "load_texture set_shader_input");
}

#[test]
fn malformed_lut_file_is_an_error() {
    let dir = scratch("lut-malformed");
    fs::write(dir.join("brdf_lut.png"), b"not a png").unwrap();

    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));
    let err = pipeline.bind_lut(&mut host).unwrap_err();

    assert!(matches!(
        err,
        RenderError::Host(HostError::Malformed { .. })
    ));
    assert!(!pipeline.state().lut_bound());
    assert!(!host.calls().iter().any(|c| c.name() == "solid_texture"));
}

#[test]
fn in_memory_lut_is_uploaded_as_rg32f() {
    let dir = scratch("lut-upload");
    let table = compute_uniform(8, 4, SampleSequence::Hammersley).unwrap();

    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));
    pipeline.use_lut(&mut host, &table).unwrap();

    assert_eq!(
        host.calls()[0],
        HostCall::CreateTextureRg32f {
            width: 8,
            height: 4,
            len: 64
        }
    );
    assert_eq!(
        pipeline.lut().unwrap().origin(),
        &LutOrigin::Generated {
            width: 8,
            height: 4
        }
    );
    let texture = pipeline.lut().unwrap().texture();
    assert_eq!(
        host.inputs_on(NodeId(0))["brdf_lut"],
        ShaderInput::Texture(texture)
    );
}

#[test]
fn scene_material_replaces_previous_shader() {
    let dir = scratch("material-scene");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));
    let node = NodeId(42);

    pipeline
        .apply_material(&mut host, node, MaterialKind::Scene)
        .unwrap();

    insta::assert_snapshot!(
        host.call_log(),
        @"load_shader clear_shader set_shader set_shader_input set_shader_input set_shader_input set_shader_input"
    );
    let (vertex, fragment) = host.last_shader_paths().unwrap();
    assert!(vertex.ends_with("pbr_v.vert"));
    assert!(fragment.ends_with("pbr_f.frag"));
    assert!(matches!(
        host.calls()[2],
        HostCall::SetShader { flags, .. } if flags.is_empty()
    ));
    assert_eq!(
        host.inputs_on(node)["ibl_intensity"],
        ShaderInput::Float(1.0)
    );
}

#[test]
fn skinned_material_uses_hardware_skinning() {
    let dir = scratch("material-skinned");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));

    pipeline
        .apply_material(&mut host, NodeId(7), MaterialKind::Skinned)
        .unwrap();

    let (vertex, fragment) = host.last_shader_paths().unwrap();
    assert!(vertex.ends_with("pbr_v_arm.vert"));
    assert!(fragment.ends_with("pbr_f.frag"));
    assert!(matches!(
        host.calls()[2],
        HostCall::SetShader { flags, .. } if flags == ShaderFlags::HARDWARE_SKINNING
    ));
}

#[test]
fn tracer_material_is_unsupported() {
    let dir = scratch("material-tracer");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));

    let err = pipeline
        .apply_material(&mut host, NodeId(7), MaterialKind::Tracer)
        .unwrap_err();

    assert!(matches!(err, RenderError::Unsupported(_)));
    assert!(host.calls().is_empty());
}

#[test]
fn material_binds_lut_and_environment_after_setup() {
    let dir = scratch("material-bindings");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));
    pipeline.setup(&mut host).unwrap();

    let node = NodeId(100);
    pipeline
        .apply_material(&mut host, node, MaterialKind::Scene)
        .unwrap();

    let inputs = host.inputs_on(node);
    let lut = pipeline.lut().unwrap().texture();
    let cube = pipeline.environment().unwrap().texture();
    assert_eq!(inputs["brdf_lut"], ShaderInput::Texture(lut));
    assert_eq!(inputs["cube_map"], ShaderInput::Texture(cube));
}

#[test]
fn replacing_lut_rebinds_existing_material_nodes() {
    let dir = scratch("lut-rebind");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));
    pipeline.setup(&mut host).unwrap();

    let node = NodeId(77);
    pipeline
        .apply_material(&mut host, node, MaterialKind::Scene)
        .unwrap();
    let placeholder = pipeline.lut().unwrap().texture();

    let table = compute_uniform(4, 4, SampleSequence::Hammersley).unwrap();
    pipeline.use_lut(&mut host, &table).unwrap();
    let uploaded = pipeline.lut().unwrap().texture();
    assert_ne!(placeholder, uploaded);

    assert_eq!(host.inputs_on(node)["brdf_lut"], ShaderInput::Texture(uploaded));
    assert_eq!(
        host.inputs_on(NodeId(0))["brdf_lut"],
        ShaderInput::Texture(uploaded)
    );
    assert_eq!(pipeline.material_nodes().collect::<Vec<_>>(), vec![node]);
}

#[test]
fn environment_built_after_material_reaches_the_node() {
    let dir = scratch("environment-late");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));

    let node = NodeId(12);
    pipeline
        .apply_material(&mut host, node, MaterialKind::Scene)
        .unwrap();
    assert!(!host.inputs_on(node).contains_key("cube_map"));

    pipeline.setup(&mut host).unwrap();
    let cube = pipeline.environment().unwrap().texture();
    let lut = pipeline.lut().unwrap().texture();
    assert_eq!(host.inputs_on(node)["cube_map"], ShaderInput::Texture(cube));
    assert_eq!(host.inputs_on(node)["brdf_lut"], ShaderInput::Texture(lut));
}

#[test]
fn invalid_material_inputs_are_rejected() {
    let dir = scratch("material-invalid");
    let mut host = RecordingHost::new();
    let material = MaterialInputs {
        ibl_intensity: -1.0,
        ..MaterialInputs::default()
    };
    let mut pipeline = PbrPipeline::new(config(&dir).with_material(material));

    let err = pipeline
        .apply_material(&mut host, NodeId(1), MaterialKind::Scene)
        .unwrap_err();
    assert!(matches!(err, RenderError::Core(CoreError::OutOfRange(_))));
}

#[test]
fn custom_material_is_exported_per_node() {
    let dir = scratch("material-custom");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));
    let code = CustomCode {
        vertex: SlotFills::new(),
        fragment: SlotFills::new()
            .with("fragment_declarations", "uniform float tint_strength;")
            .with("fragment_main", "    o_color.rgb *= tint_strength;"),
    };

    pipeline
        .apply_custom_material(&mut host, NodeId(5), MaterialKind::Scene, &code)
        .unwrap();

    let (_, fragment) = host.last_shader_paths().unwrap();
    assert!(fragment.ends_with("node5_pbr_f.frag"));
    let source = fs::read_to_string(fragment).unwrap();
    assert!(source.contains("uniform float tint_strength;"));
    assert!(source.contains("o_color.rgb *= tint_strength;"));
}

#[test]
fn custom_material_with_unknown_slot_never_reaches_host() {
    let dir = scratch("material-custom-unknown");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));
    let code = CustomCode {
        vertex: SlotFills::new().with("vertex_epilogue", "gl_Position.z = 0.0;"),
        fragment: SlotFills::new(),
    };

    let err = pipeline
        .apply_custom_material(&mut host, NodeId(5), MaterialKind::Scene, &code)
        .unwrap_err();

    assert!(matches!(
        err,
        RenderError::Shader(ShaderError::UnknownSlot { .. })
    ));
    assert!(host.calls().is_empty());
}

#[test]
fn update_tracks_camera() {
    let dir = scratch("update-camera");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir));
    pipeline.setup(&mut host).unwrap();
    host.clear_calls();

    let position = Vec3::new(1.0, 2.0, 3.0);
    host.set_camera(Camera::looking_at(position, Vec3::ZERO, Vec3::Z));
    pipeline.update(&mut host);

    insta::assert_snapshot!(host.call_log(), @"set_shader_input set_position set_orientation");
    let rig = pipeline.environment().unwrap().host_rig().node;
    assert_eq!(host.calls()[1], HostCall::SetPosition(rig, position));
    assert_eq!(host.calls()[2], HostCall::SetOrientation(rig, Quat::IDENTITY));
    assert_eq!(
        host.inputs_on(NodeId(0))["camera_world_pos"],
        ShaderInput::Vec3(position)
    );
    assert_eq!(pipeline.frame(), 1);
}

#[test]
fn screen_space_setup_pauses_environment_once() {
    let dir = scratch("screenspace-pause");
    let mut host = RecordingHost::new();
    let environment = EnvironmentConfig::new().with_pause_frames(2);
    let mut pipeline = PbrPipeline::new(config(&dir).with_environment(environment));
    pipeline.setup(&mut host).unwrap();
    host.clear_calls();

    pipeline.setup_screen_space(&mut host).unwrap();
    let prefix: Vec<&str> = host.calls()[..6].iter().map(HostCall::name).collect();
    insta::assert_snapshot!(
        prefix.join(" "),
        @"set_target_active render_scene_into create_filter_quad load_shader set_shader set_shader_input"
    );

    let target = pipeline.environment().unwrap().target();
    assert!(!host.is_target_active(target));

    pipeline.update(&mut host);
    pipeline.update(&mut host);
    assert!(!host.is_target_active(target));

    pipeline.update(&mut host);
    assert!(host.is_target_active(target));

    for _ in 0..10 {
        pipeline.update(&mut host);
    }
    assert_eq!(active_toggles(&host), 1);
    assert_eq!(pipeline.toggles().pending_count(), 0);
}

#[test]
fn disabled_effects_bind_zero() {
    let dir = scratch("screenspace-disabled");
    let mut host = RecordingHost::new();
    let mut pipeline =
        PbrPipeline::new(config(&dir).with_screen_space(ScreenSpaceSettings::disabled()));
    pipeline.setup(&mut host).unwrap();

    let quad = pipeline.screen_space().unwrap().quad();
    let inputs = host.inputs_on(quad);
    assert_eq!(inputs["bloom_intensity"], ShaderInput::Float(0.0));
    assert_eq!(inputs["bloom_samples"], ShaderInput::Int(0));
    assert_eq!(inputs["ssr_intensity"], ShaderInput::Float(0.0));
    assert_eq!(inputs["ssr_samples"], ShaderInput::Int(0));
    assert_eq!(inputs["ssao_samples"], ShaderInput::Int(0));
    assert_eq!(inputs["gamma"], ShaderInput::Float(1.0));
    assert_eq!(inputs["exposure"], ShaderInput::Float(1.0));
}

#[test]
fn screen_space_binds_captures_and_projection() {
    let dir = scratch("screenspace-bindings");
    let mut host = RecordingHost::new().with_screen_size(640, 360);
    let mut pipeline = PbrPipeline::new(config(&dir).with_screen_space(ScreenSpaceSettings::new()));
    pipeline.setup(&mut host).unwrap();

    let chain = *pipeline.screen_space().unwrap();
    let capture = chain.capture();
    {
        let inputs = host.inputs_on(chain.quad());
        assert_eq!(inputs["screen_texture"], ShaderInput::Texture(capture.color));
        assert_eq!(inputs["depth_texture"], ShaderInput::Texture(capture.depth));
        assert_eq!(inputs["normal_texture"], ShaderInput::Texture(capture.aux));
        assert_eq!(inputs["bloom_samples"], ShaderInput::Int(8));
    }

    let camera = Camera::default().with_aspect(2.0);
    host.set_camera(camera);
    pipeline.update(&mut host);

    let inputs = host.inputs_on(chain.quad());
    assert_eq!(
        inputs["proj_mat"],
        ShaderInput::Mat4(camera.projection_matrix())
    );
    assert_eq!(
        inputs["inv_proj_mat"],
        ShaderInput::Mat4(camera.inverse_projection_matrix())
    );
}

#[test]
fn invalid_screen_space_settings_leave_state_untouched() {
    let dir = scratch("screenspace-invalid");
    let mut host = RecordingHost::new();
    let mut settings = ScreenSpaceSettings::new();
    settings.ssr.samples = 10_000;
    let mut pipeline = PbrPipeline::new(config(&dir).with_screen_space(settings));

    let err = pipeline.setup(&mut host).unwrap_err();
    assert!(matches!(err, RenderError::Core(CoreError::OutOfRange(_))));
    assert!(!pipeline.state().screen_space());
    assert!(!host.calls().iter().any(|c| c.name() == "render_scene_into"));
}

#[test]
fn teardown_removes_screen_space_shaders() {
    let dir = scratch("teardown");
    let mut host = RecordingHost::new();
    let mut pipeline = PbrPipeline::new(config(&dir).with_screen_space(ScreenSpaceSettings::new()));
    pipeline.setup(&mut host).unwrap();

    let report = pipeline.teardown().unwrap();
    assert_eq!(report.removed.len(), 2);
    assert!(report.missing.is_empty());
    assert!(!pipeline.state().screen_space());
    assert!(pipeline.screen_space().is_none());
    assert!(!dir.join("shaders").join("screenspace_f.frag").exists());
    assert!(dir.join("shaders").join("pbr_f.frag").exists());

    let again = pipeline.teardown().unwrap();
    assert!(again.removed.is_empty());
    assert_eq!(again.missing.len(), 2);

    pipeline.setup_screen_space(&mut host).unwrap();
    assert!(pipeline.state().screen_space());
    assert!(dir.join("shaders").join("screenspace_f.frag").exists());
}
