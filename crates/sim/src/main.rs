//! Binary entry point: a thin winit/wgpu adapter around the simulation core. Owns
//! the window, the event loop, and per-frame input -> tick -> draw wiring; the core
//! (`world`, `ai`, `entities`) never touches `winit` or `wgpu` directly.

mod ai;
mod config;
mod constants;
mod entities;
mod error;
mod world;

use std::sync::Arc;

use engine_core::{EntityId, Time, FACTION_NATURE, FACTION_PLAYER};
use glam::Vec3;
use input::{InputState, KeyCode};
use renderer::{Camera, DrawBatch, InstanceData, MeshHandle, RenderAdapter, Renderer};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use config::{GameConfig, SimConfig};
use world::World;

/// Free-fly camera speed in units/second, driven directly by `InputState` axes. The
/// core has no concept of a player-controlled body (camera construction is an
/// external-adapter concern), so this lives entirely in the binary.
const CAMERA_SPEED: f32 = 400.0;
const CAMERA_TURN_RATE: f32 = 1.5;
const SHIP_SPHERE_SEGMENTS: u32 = 12;
const SHIP_SPHERE_RINGS: u32 = 8;
const PLANETOID_SPHERE_SEGMENTS: u32 = 24;
const PLANETOID_SPHERE_RINGS: u32 = 16;
const RING_PARTICLE_SPHERE_SEGMENTS: u32 = 6;
const RING_PARTICLE_SPHERE_RINGS: u32 = 4;

struct GameState {
    renderer: Renderer,
    camera: Camera,
    input: InputState,
    world: World,
    #[allow(dead_code)]
    game_config: GameConfig,
    #[allow(dead_code)]
    sim_config: SimConfig,
    ship_mesh: MeshHandle,
    bullet_mesh: MeshHandle,
    planetoid_mesh: MeshHandle,
    ring_particle_mesh: MeshHandle,
    billboard_mesh: MeshHandle,
    time: Time,
}

impl GameState {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let game_config = GameConfig::load();
        let sim_config = SimConfig::load();

        let mut renderer = Renderer::new(window.clone()).await?;
        renderer.resize(game_config.window_width, game_config.window_height);

        let ship_mesh = renderer.sphere_mesh(SHIP_SPHERE_SEGMENTS, SHIP_SPHERE_RINGS);
        let bullet_mesh = renderer.sphere_mesh(4, 3);
        let planetoid_mesh = renderer.sphere_mesh(PLANETOID_SPHERE_SEGMENTS, PLANETOID_SPHERE_RINGS);
        let ring_particle_mesh = renderer.sphere_mesh(RING_PARTICLE_SPHERE_SEGMENTS, RING_PARTICLE_SPHERE_RINGS);
        let billboard_mesh = renderer.billboard_mesh();

        let mut world = World::new(sim_config.seed, sim_config.ring.to_ring_parameters())?;
        seed_demo_scene(&mut world);

        let mut camera = Camera::new(Vec3::new(0.0, 200.0, 600.0));
        camera.set_aspect(game_config.window_width, game_config.window_height);

        Ok(Self {
            renderer,
            camera,
            input: InputState::new(),
            world,
            game_config,
            sim_config,
            ship_mesh,
            bullet_mesh,
            planetoid_mesh,
            ring_particle_mesh,
            billboard_mesh,
            time: Time::new(),
        })
    }

    fn handle_window_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.renderer.resize(size.width, size.height);
                self.camera.set_aspect(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let PhysicalKey::Code(code) = key_event.physical_key {
                    self.input.process_keyboard(code, key_event.state);
                }
                if self.input.is_key_pressed(KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    log::warn!("render error: {e}");
                }
                self.input.begin_frame();
                self.renderer.window.request_redraw();
            }
            _ => {}
        }
    }

    fn update(&mut self) {
        self.time.update();
        let dt = self.time.smoothed_duration_seconds();

        let axes = self.input.movement_axes();
        let forward = self.camera.transform.forward();
        let right = self.camera.transform.right();
        self.camera.transform.position += (forward * axes.y + right * axes.x) * CAMERA_SPEED * dt;
        if self.input.is_key_held(KeyCode::KeyE) {
            self.camera.transform.rotate_y(-CAMERA_TURN_RATE * dt);
        }
        if self.input.is_key_held(KeyCode::KeyQ) {
            self.camera.transform.rotate_y(CAMERA_TURN_RATE * dt);
        }

        if self.input.is_fire_pressed() {
            self.world.add_bullet(self.camera.position(), self.camera.forward(), EntityId::NOTHING);
        }

        self.world.tick(dt);
        let overshoot = self.world.ai_time_overshot();
        if !overshoot.is_zero() {
            log::debug!("AI pass overshot its diagnostic budget by {overshoot:?}");
        }
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let mut ship_instances = Vec::new();
        let mut bullet_instances = Vec::new();
        let mut planetoid_instances = Vec::new();
        let mut ring_particle_instances = Vec::new();
        let mut explosion_instances = Vec::new();

        for ship in self.world.ships() {
            if !ship.is_alive() {
                continue;
            }
            let color = faction_color(ship.faction);
            let mut transform = ship.body.transform;
            transform.scale = Vec3::splat(ship.body.radius);
            ship_instances.push(InstanceData::new(transform.to_matrix().to_cols_array_2d(), color));
        }

        for bullet in self.world.bullets() {
            if !bullet.is_alive() {
                continue;
            }
            let mut transform = bullet.body.transform;
            transform.scale = Vec3::splat(bullet.body.radius.max(1.0));
            bullet_instances.push(InstanceData::new(transform.to_matrix().to_cols_array_2d(), [1.0, 0.9, 0.4, 1.0]));
        }

        for planetoid in self.world.planetoids() {
            let color = faction_color(planetoid.owner_faction);
            let mut transform = planetoid.body.transform;
            transform.scale = Vec3::splat(planetoid.body.radius);
            planetoid_instances.push(InstanceData::new(transform.to_matrix().to_cols_array_2d(), color));
        }

        for particle in self.world.ring_particles_to_draw(
            self.camera.position(),
            constants::DRAW_HALO_SECTORS,
            constants::SCAN_DISTANCE_RING_PARTICLE,
        ) {
            let transform = engine_core::Transform {
                position: particle.position,
                rotation: glam::Quat::from_axis_angle(particle.orientation_axis, particle.orientation_angle),
                scale: Vec3::splat(particle.radius),
            };
            ring_particle_instances.push(InstanceData::new(transform.to_matrix().to_cols_array_2d(), [0.6, 0.6, 0.65, 1.0]));
        }

        for explosion in self.world.explosions() {
            let transform = engine_core::Transform {
                position: explosion.position,
                rotation: glam::Quat::IDENTITY,
                scale: Vec3::splat(explosion.size),
            };
            explosion_instances.push(InstanceData::new(transform.to_matrix().to_cols_array_2d(), [1.0, 0.5, 0.1, 0.8]));
        }

        let bodies = [
            DrawBatch { mesh_handle: self.ship_mesh, instances: ship_instances },
            DrawBatch { mesh_handle: self.bullet_mesh, instances: bullet_instances },
            DrawBatch { mesh_handle: self.planetoid_mesh, instances: planetoid_instances },
            DrawBatch { mesh_handle: self.ring_particle_mesh, instances: ring_particle_instances },
        ];
        let billboards = [DrawBatch { mesh_handle: self.billboard_mesh, instances: explosion_instances }];

        self.renderer.draw_frame(&self.camera, &bodies, &billboards)
    }
}

fn faction_color(faction: engine_core::Faction) -> [f32; 4] {
    if faction == FACTION_NATURE {
        [0.5, 0.5, 0.5, 1.0]
    } else if faction == FACTION_PLAYER {
        [0.2, 0.6, 1.0, 1.0]
    } else {
        [1.0, 0.3, 0.2, 1.0]
    }
}

/// Populate a small demo scene: two planetoids, a guarded moon around each, and a
/// handful of moon-guard ships per moon. There is no level-loading format (no
/// persistence across runs); the binary always starts from this scene.
fn seed_demo_scene(world: &mut World) {
    let planetoid_a_pos = Vec3::new(0.0, 0.0, -3000.0);
    let planetoid_b_pos = Vec3::new(4000.0, 0.0, -6000.0);
    let planetoid_a = world.spawn_planetoid(planetoid_a_pos, 400.0, FACTION_NATURE);
    let planetoid_b = world.spawn_planetoid(planetoid_b_pos, 600.0, 2);

    let moon_a_centre = planetoid_a_pos + Vec3::new(900.0, 0.0, 0.0);
    let moon_b_centre = planetoid_b_pos + Vec3::new(0.0, 0.0, 1100.0);
    let moon_a = world.spawn_moon(moon_a_centre, 150.0, planetoid_a);
    let moon_b = world.spawn_moon(moon_b_centre, 200.0, planetoid_b);

    for i in 0..3 {
        let angle = i as f32 * std::f32::consts::TAU / 3.0;
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * 300.0;
        world.spawn_moon_guard_ship(
            2,
            moon_a_centre + offset,
            Vec3::new(0.0, 0.0, -1.0),
            constants::SHIP_RADIUS,
            200.0,
            80.0,
            2.0,
            100.0,
            moon_a,
        );
    }

    for i in 0..3 {
        let angle = i as f32 * std::f32::consts::TAU / 3.0;
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * 400.0;
        world.spawn_moon_guard_ship(
            3,
            moon_b_centre + offset,
            Vec3::new(0.0, 0.0, -1.0),
            constants::SHIP_RADIUS,
            220.0,
            80.0,
            2.0,
            100.0,
            moon_b,
        );
    }
}

struct App {
    state: Option<GameState>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attrs = Window::default_attributes().with_title("opensst");
        let window = event_loop.create_window(attrs).expect("failed to create window");
        let window = Arc::new(window);
        match pollster::block_on(GameState::new(window.clone())) {
            Ok(state) => {
                window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("failed to initialize renderer: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(state) = self.state.as_mut() {
            state.handle_window_event(event_loop, event);
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, _event: DeviceEvent) {}
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("starting opensst");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App { state: None };
    event_loop.run_app(&mut app)?;
    Ok(())
}
