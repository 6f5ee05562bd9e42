// src/gfx/scene/demo_scene.rs
//! The street scene: floor, walls, props, the copper device and two portals
//!
//! Procedural geometry is always present. OBJ props and image textures come
//! from the asset directory; a missing prop is skipped with a warning and a
//! missing texture falls back to the checkerboard.

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Point3, Vector3};

use crate::config::RiftConfig;
use crate::error::SceneError;
use crate::gfx::camera::{CameraRig, FreeCamera, TargetCamera};
use crate::gfx::geometry::{generate_box, generate_disk, generate_plane, generate_torus, load_obj};
use crate::gfx::resources::material::Material;
use crate::gfx::resources::texture_library::{TextureId, TextureKind, TextureLibrary};
use crate::gfx::scene::animation::DeviceAnimator;
use crate::gfx::scene::light::{DirectionalLight, LightSet, PointLight, SpotLight};
use crate::gfx::scene::mesh::{MeshId, MeshLibrary};
use crate::gfx::scene::node::{NodeHandle, RenderData, SceneGraph, SceneNode};
use crate::gfx::scene::portal::{Portal, PortalPair, PortalWobble};
use crate::gfx::scene::scene::SceneState;
use crate::gfx::scene::transform::Transform;

const LAMP_COLOUR: [f32; 4] = [1.0, 0.9, 0.63, 1.0];
const WHITE: [f32; 4] = [1.0; 4];

struct Loader<'a> {
    config: &'a RiftConfig,
    graph: SceneGraph,
    meshes: MeshLibrary,
    textures: TextureLibrary,
}

impl Loader<'_> {
    fn texture(&mut self, file: &str, kind: TextureKind) -> Option<TextureId> {
        let path = self.config.asset("textures").join(file);
        self.textures.load(&path, kind)
    }

    fn model(&mut self, file: &str) -> Option<MeshId> {
        let path = self.config.asset("models").join(file);
        match load_obj(&path) {
            Ok(geometry) => Some(self.meshes.add(file, geometry)),
            Err(err) => {
                log::warn!("{err}; prop skipped");
                None
            }
        }
    }

    fn node(&mut self, name: &str, transform: Transform, render: RenderData) -> Result<NodeHandle, SceneError> {
        self.graph
            .insert(SceneNode::new(name, transform).with_render(render))
    }

    fn child(
        &mut self,
        name: &str,
        parent: NodeHandle,
        transform: Transform,
        render: RenderData,
    ) -> Result<NodeHandle, SceneError> {
        self.graph.insert(
            SceneNode::new(name, transform)
                .with_parent(parent)
                .with_render(render),
        )
    }
}

/// Builds the demo scene. Nothing is uploaded to the GPU yet.
pub fn build(config: &RiftConfig) -> Result<SceneState, SceneError> {
    let mut loader = Loader {
        config,
        graph: SceneGraph::new(),
        meshes: MeshLibrary::new(),
        textures: TextureLibrary::new(),
    };

    let plastic = Material::white_plastic();
    let no_shine = Material::white_plastic_no_shine();
    let copper = Material::white_copper();

    // Ground and walls
    let floor_mesh = loader.meshes.add("floor", generate_plane(100.0, 100.0, 10, 10.0));
    let asphalt = loader.texture("Asphalt.jpg", TextureKind::Albedo);
    loader.node(
        "floor",
        Transform::default(),
        RenderData::new(floor_mesh, no_shine).with_texture(asphalt),
    )?;

    let wall0_mesh = loader.meshes.add("wall0", generate_box([2.0, 12.0, 60.0]));
    let brick = loader.texture("CeramicBrick_albedo_M.jpg", TextureKind::Albedo);
    let brick_normals = loader.texture("CeramicBrick_normalmap_M.jpg", TextureKind::NormalMap);
    loader.node(
        "wall0",
        Transform::from_position(-20.0, 6.0, 0.0),
        RenderData::new(wall0_mesh, plastic)
            .with_texture(brick)
            .with_normal_map(brick_normals),
    )?;

    let wall1_mesh = loader.meshes.add("wall1", generate_box([60.0, 12.0, 2.0]));
    let map = loader.texture("map-8.jpg", TextureKind::Albedo);
    loader.node(
        "wall1",
        Transform::from_position(10.0, 6.0, -30.0),
        RenderData::new(wall1_mesh, no_shine).with_texture(map),
    )?;

    // Props
    let concrete = loader.texture("concrete.jpg", TextureKind::Albedo);
    let metal = loader.texture("st-metal.jpg", TextureKind::Albedo);
    if let Some(arch) = loader.model("arch.obj") {
        loader.node(
            "arch0",
            Transform::from_position(-19.0, 5.0, -1.0).with_orientation(0.0, FRAC_PI_2, 0.0),
            RenderData::new(arch, plastic).with_texture(concrete),
        )?;
    }
    if let Some(lamp) = loader.model("lamp.obj") {
        for (name, z) in [("lamppost0", 18.0), ("lamppost1", 0.0)] {
            loader.node(
                name,
                Transform::from_position(25.0, 0.0, z).with_uniform_scale(0.05),
                RenderData::new(lamp, plastic).with_texture(metal),
            )?;
        }
    }
    if let Some(street_lamp) = loader.model("street lamp.obj") {
        loader.node(
            "spotlight0",
            Transform::from_position(-18.5, 0.0, 5.0).with_uniform_scale(0.1),
            RenderData::new(street_lamp, Material::default()).with_texture(metal),
        )?;
    }
    if let Some(flashlight) = loader.model("Flashlight.obj") {
        loader.node(
            "flashlight0",
            Transform::from_position(0.0, 0.0, 0.25)
                .with_uniform_scale(0.2)
                .with_orientation(0.0, PI, 0.0),
            RenderData::new(flashlight, Material::default()),
        )?;
    }

    // Copper device, rooted at the bottom frame
    let copper_albedo = loader.texture("Copper_A_albedo_M.png", TextureKind::Albedo);
    let copper_normals = loader.texture("Copper_A_normalmap_M.png", TextureKind::NormalMap);
    let copper_part = move |mesh: MeshId| {
        RenderData::new(mesh, copper)
            .with_texture(copper_albedo)
            .with_normal_map(copper_normals)
    };

    let rail = loader.meshes.add("device rail", generate_box([20.0, 0.5, 0.5]));
    let post = loader.meshes.add("device post", generate_box([0.5, 8.0, 0.5]));
    let vertical_arm = loader.meshes.add("device vertical arm", generate_box([0.29, 7.0, 0.1]));
    let horizontal_arm = loader.meshes.add("device horizontal arm", generate_box([20.0, 0.3, 0.1]));
    let ring = loader.meshes.add("device ring", generate_torus(32, 20, 0.2, 1.2));

    let bottom = loader.node(
        "deviceFrameBottom",
        Transform::from_position(0.0, 0.25, -24.0),
        copper_part(rail),
    )?;
    let arm_v = loader.child(
        "deviceArmVertical",
        bottom,
        Transform::from_position(0.0, 3.75, 0.0),
        copper_part(vertical_arm),
    )?;
    loader.child(
        "deviceArmHorizontal",
        bottom,
        Transform::from_position(0.0, 3.5, 0.0),
        copper_part(horizontal_arm),
    )?;
    loader.child(
        "deviceRing",
        arm_v,
        Transform::default().with_orientation(FRAC_PI_2, 0.0, 0.0),
        copper_part(ring),
    )?;
    loader.child(
        "deviceFrameTop",
        bottom,
        Transform::from_position(0.0, 7.5, 0.0),
        copper_part(rail),
    )?;
    loader.child(
        "deviceFrameLeft",
        bottom,
        Transform::from_position(-10.25, 3.75, 0.0),
        copper_part(post),
    )?;
    loader.child(
        "deviceFrameRight",
        bottom,
        Transform::from_position(10.25, 3.75, 0.0),
        copper_part(post),
    )?;

    // Portals
    let portal_config = &config.portal;
    let mask = loader
        .meshes
        .add("portal mask", generate_disk(portal_config.slices, portal_config.radii));
    let anchor = |position: Point3<f32>, yaw: f32| {
        Transform::from_position(position.x, position.y, position.z).with_orientation(0.0, yaw, 0.0)
    };
    let a = Portal::insert(
        &mut loader.graph,
        "portal_a",
        anchor(portal_config.a_position, portal_config.a_yaw.0),
        mask,
        portal_config.radii,
    )?;
    let b = Portal::insert(
        &mut loader.graph,
        "portal_b",
        anchor(portal_config.b_position, portal_config.b_yaw.0),
        mask,
        portal_config.radii,
    )?;
    let mut portals = PortalPair::new(a, b);
    portals.wobble = PortalWobble {
        enabled: portal_config.wobble_enabled,
        amplitude: portal_config.wobble_amplitude,
    };

    let lights = lights(config.evening)?;

    let camera = &config.camera;
    let (width, height) = config.window_size;
    let projection = camera.projection(width as f32 / height.max(1) as f32);
    let cameras = CameraRig::new(
        FreeCamera::looking_at(camera.free_position, camera.free_target, projection),
        TargetCamera::from_eye(camera.target_eye, camera.target_point, projection),
        camera.start_mode,
    );

    let Loader {
        graph,
        meshes,
        textures,
        ..
    } = loader;
    log::info!(
        "demo scene: {} nodes, {} meshes, {} textures",
        graph.len(),
        meshes.len(),
        textures.len()
    );

    let animator = DeviceAnimator::from_graph(&graph)?;
    let mut state = SceneState::new(graph, meshes, textures, lights, portals, cameras).with_animator(animator);
    state.free_controller.move_speed = camera.move_speed;
    state.free_controller.sensitivity = camera.sensitivity;
    Ok(state)
}

fn lights(evening: bool) -> Result<LightSet, SceneError> {
    let direction = Vector3::new(0.6, -1.0, 0.3);
    let directional = if evening {
        DirectionalLight::new([0.003, 0.003, 0.003, 1.0], [0.2, 0.08, 0.06, 1.0], direction)
    } else {
        DirectionalLight::new([1.0, 1.0, 1.0, 1.0], [0.0, 0.0, 0.0, 1.0], direction)
    };

    let mut lights = LightSet::new(directional);
    lights.add_point(PointLight::new(LAMP_COLOUR, Point3::new(25.0, 11.5, 18.0), 0.0, 0.01, 0.01))?;
    lights.add_point(PointLight::new(LAMP_COLOUR, Point3::new(25.0, 11.5, 0.0), 0.0, 0.01, 0.01))?;

    // street spotlight, then flashlight
    lights.add_spot(SpotLight::new(
        WHITE,
        Point3::new(-16.5, 14.3, 5.0),
        Vector3::new(0.0, -1.0, 0.0),
        0.0,
        0.05,
        0.005,
        10.0,
    ))?;
    lights.add_spot(SpotLight::new(
        WHITE,
        Point3::new(0.0, 0.4, -1.0),
        Vector3::new(0.0, 0.0, -1.0),
        0.0,
        0.05,
        0.0,
        10.0,
    ))?;
    Ok(lights)
}
