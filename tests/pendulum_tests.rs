//! Pendulum Engine Tests
//!
//! Tests for:
//! - Swing envelope and side flipping
//! - Rest pose reset and zero time steps
//! - Hook pivots staying fixed while the arms swing
//! - Rigs with missing nodes
//! - Scenes repeating a node name

use glam::{Mat4, Vec3};

use hala_cradle::animation::pendulum::pivot_rotation;
use hala_cradle::animation::{HalaPendulumEngine, HalaSwingSide};
use hala_cradle::config::{HalaPendulumConfig, HalaPendulumGroup};
use hala_cradle::scene::HalaScene;
use hala_cradle::scene::cpu::{mesh::HalaMesh, node::HalaNode};
use hala_cradle::renderer::{HalaDrawSource, collect_draw_calls};
use hala_cradle::scene::hierarchy::{HalaTransformMap, resolve_world_transforms};

const EPSILON: f32 = 1e-5;

/// Five arms hanging from a bar at y = 2, spaced along x.
fn cradle_scene() -> HalaScene {
  let hook_mesh = HalaMesh::new(
    "Hook_0",
    vec![Vec3::new(-0.1, 2.0, 0.0), Vec3::new(0.1, 2.0, 0.0), Vec3::new(0.0, 2.2, 0.0)],
    vec![0, 1, 2],
  );
  let mut nodes = vec![HalaNode::new("root", None, Mat4::IDENTITY)];
  for arm in 0..5 {
    let offset = Mat4::from_translation(Vec3::new(arm as f32 - 2.0, 0.0, 0.0));
    nodes.push(HalaNode::new(&format!("hook{arm}"), Some(0), offset).with_meshes(&[0]));
    nodes.push(HalaNode::new(&format!("ball{arm}"), Some(0), offset * Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0))));
    nodes.push(HalaNode::new(&format!("wire{arm}"), Some(0), offset));
  }
  HalaScene::from_parts(nodes, vec![hook_mesh], vec![], vec![]).unwrap()
}

fn cradle_config() -> HalaPendulumConfig {
  HalaPendulumConfig {
    groups: (0..5)
      .map(|arm| HalaPendulumGroup::new(&format!("hook{arm}"), &format!("ball{arm}"), &format!("wire{arm}")))
      .collect(),
    ..Default::default()
  }
}

fn running_engine(scene: &HalaScene) -> HalaPendulumEngine {
  let mut engine = HalaPendulumEngine::new(scene, cradle_config());
  engine.set_running(true);
  engine
}

#[test]
fn zero_time_step_is_idempotent() {
  let scene = cradle_scene();
  let mut engine = running_engine(&scene);
  engine.update(&scene, 0.3);
  let phase = engine.phase();
  let pose = engine.current_transforms().clone();
  for _ in 0..10 {
    engine.update(&scene, 0.0);
  }
  assert_eq!(engine.phase(), phase);
  assert_eq!(engine.current_transforms(), &pose);
}

#[test]
fn active_arm_is_at_rest_on_swing_boundaries() {
  let scene = cradle_scene();
  let mut engine = running_engine(&scene);
  for side in [HalaSwingSide::Left, HalaSwingSide::Right] {
    assert_eq!(engine.active_side(), side);
    let angles = engine.group_angles();
    assert!(angles.iter().all(|angle| angle.abs() < 1e-3), "angles {angles:?}");

    engine.update(&scene, 0.999_98);
    let angles = engine.group_angles();
    assert!(angles.iter().all(|angle| angle.abs() < 1e-3), "angles {angles:?}");

    // Cross just past the end, into the start of the next swing.
    engine.update(&scene, 0.000_03);
  }
  assert_eq!(engine.active_side(), HalaSwingSide::Left);
}

#[test]
fn side_flips_once_with_the_remainder() {
  let scene = cradle_scene();
  let mut engine = running_engine(&scene);
  let dt = 0.3;
  let mut flips = 0;
  let mut side = engine.active_side();
  for _ in 0..4 {
    engine.update(&scene, dt);
    if engine.active_side() != side {
      flips += 1;
      side = engine.active_side();
      assert!(engine.phase() < dt, "phase {}", engine.phase());
    }
  }
  assert_eq!(flips, 1);
  assert_eq!(engine.active_side(), HalaSwingSide::Right);
  assert!((engine.phase() - 0.2).abs() < EPSILON);
}

#[test]
fn only_the_active_side_swings_wide() {
  let scene = cradle_scene();
  let mut engine = running_engine(&scene);
  engine.update(&scene, 0.5);
  let angles = engine.group_angles();
  assert!((angles[0].abs() - 0.3).abs() < EPSILON);
  assert_eq!(angles[4], 0.0);
  assert!(angles[1..4].iter().all(|angle| angle.abs() <= 0.05 + EPSILON));

  engine.update(&scene, 1.0);
  let angles = engine.group_angles();
  assert_eq!(engine.active_side(), HalaSwingSide::Right);
  assert!((angles[4].abs() - 0.3).abs() < EPSILON);
  assert_eq!(angles[0], 0.0);
}

#[test]
fn every_update_starts_from_the_rest_pose() {
  let scene = cradle_scene();
  let mut engine = running_engine(&scene);
  engine.update(&scene, 0.5);
  let first = engine.current_transforms()["ball0"];
  engine.update(&scene, 1.0);
  engine.update(&scene, 1.0);
  assert_eq!(engine.active_side(), HalaSwingSide::Left);
  assert!(engine.current_transforms()["ball0"].abs_diff_eq(first, EPSILON));

  // Arms at rest keep their original transforms exactly.
  assert_eq!(engine.current_transforms()["ball4"], engine.original_transforms()["ball4"]);
}

#[test]
fn hook_pivot_stays_fixed_while_swinging() {
  let scene = cradle_scene();
  let mut engine = running_engine(&scene);
  let pivot = engine.pivot("hook0").unwrap();
  assert!(pivot.abs_diff_eq(Vec3::new(-2.0, 2.0 + 0.2 / 3.0, 0.0), EPSILON));

  for _ in 0..7 {
    engine.update(&scene, 0.13);
    assert_eq!(engine.pivot("hook0"), Some(pivot));
    let world = resolve_world_transforms(&scene, engine.current_transforms());
    let rest_world = resolve_world_transforms(&scene, engine.original_transforms());
    let moved_pivot = world["hook0"].transform_point3(rest_world["hook0"].inverse().transform_point3(pivot));
    assert!(moved_pivot.abs_diff_eq(pivot, 1e-4), "pivot moved to {moved_pivot}");
  }
}

/// Get the expected pose of a node rotated about its group's cached hook pivot.
fn rotated_about_hook(engine: &HalaPendulumEngine, hook: &str, node: &str, angle: f32) -> Mat4 {
  let pivot = engine.pivot(hook).expect("hook pivots are cached");
  pivot_rotation(pivot, Vec3::Z, angle) * engine.original_transforms()[node]
}

#[test]
fn missing_group_leaves_the_other_groups_animated() {
  let scene = cradle_scene();
  let mut config = cradle_config();
  config.groups[0] = HalaPendulumGroup::new("ghost_hook", "ghost_ball", "ghost_wire");
  let mut engine = HalaPendulumEngine::new(&scene, config);
  engine.toggle();
  engine.update(&scene, 0.5);
  assert_eq!(engine.active_side(), HalaSwingSide::Left);

  let current = engine.current_transforms();
  assert!(!current.contains_key("ghost_ball"));
  assert_eq!(engine.pivot("ghost_hook"), Some(Vec3::ZERO));

  let angles = engine.group_angles();
  for arm in 1..4 {
    assert!(angles[arm].abs() > 0.01, "arm {arm} angle {}", angles[arm]);
    for name in [format!("hook{arm}"), format!("ball{arm}"), format!("wire{arm}")] {
      let expected = rotated_about_hook(&engine, &format!("hook{arm}"), &name, angles[arm]);
      assert!(current[&name].abs_diff_eq(expected, EPSILON), "node {name}");
      assert!(!current[&name].abs_diff_eq(engine.original_transforms()[&name], 1e-4), "node {name} did not move");
    }
  }
  assert_eq!(current["ball4"], engine.original_transforms()["ball4"]);
}

#[test]
fn group_missing_its_ball_still_swings_hook_and_wire() {
  let scene = cradle_scene();
  let mut config = cradle_config();
  config.groups[0] = HalaPendulumGroup::new("hook0", "ghost_ball", "wire0");
  let mut engine = HalaPendulumEngine::new(&scene, config);
  engine.toggle();
  engine.update(&scene, 0.5);

  let angle = engine.group_angles()[0];
  assert!((angle + 0.3).abs() < EPSILON, "angle {angle}");
  let current = engine.current_transforms();
  for name in ["hook0", "wire0"] {
    let expected = rotated_about_hook(&engine, "hook0", name, angle);
    assert!(current[name].abs_diff_eq(expected, EPSILON), "node {name}");
  }
  assert!(!current.contains_key("ghost_ball"));
  assert_eq!(current["ball0"], engine.original_transforms()["ball0"]);
}

#[test]
fn duplicate_names_draw_the_same_at_rest_and_animated() {
  let triangle = HalaMesh::new("tri", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]);
  let nodes = vec![
    HalaNode::new("root", None, Mat4::IDENTITY),
    HalaNode::new("twin", Some(0), Mat4::from_translation(Vec3::X)).with_meshes(&[0]),
    HalaNode::new("twin", Some(0), Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))).with_meshes(&[0]),
  ];
  let scene = HalaScene::from_parts(nodes, vec![triangle], vec![], vec![]).unwrap();
  let mut engine = running_engine(&scene);
  engine.update(&scene, 0.25);

  let at_rest = collect_draw_calls(HalaDrawSource::Cradle, &scene, &HalaTransformMap::new(), Mat4::IDENTITY, None);
  let animated = collect_draw_calls(HalaDrawSource::Cradle, &scene, engine.current_transforms(), Mat4::IDENTITY, None);
  assert_eq!(at_rest.len(), 2);
  assert_eq!(at_rest[0].world_transform.w_axis.truncate(), Vec3::X);
  assert_eq!(at_rest[1].world_transform.w_axis.truncate(), Vec3::new(5.0, 0.0, 0.0));
  for (rest, moved) in at_rest.iter().zip(animated.iter()) {
    assert!(rest.world_transform.abs_diff_eq(moved.world_transform, EPSILON));
  }
}

#[test]
fn pivot_rotation_matches_plain_rotation_at_origin() {
  let rotation = pivot_rotation(Vec3::ZERO, Vec3::Z, std::f32::consts::FRAC_PI_2);
  let point = rotation.transform_point3(Vec3::X);
  assert!(point.abs_diff_eq(Vec3::Y, EPSILON));
}
