//! Animation System Tests
//!
//! Tests for:
//! - TransformData blend boundary idempotence and midpoints
//! - TransformChannel sampling (interpolation, clamping)
//! - ClipSource loop modes and end-of-clip reporting
//! - Transition percent law: 0 at start, clamped at 1, non-decreasing
//! - FadeIn inverted ramp (effective = 1 - base)
//! - Transition self-elimination into the destination steady state
//! - Trigger arm/fire/disarm
//! - Layer lookup chains, interactive entry, and the multilayer blend

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glam::{Quat, Vec3};

use kiln::animation::{
    AnimationClip, AnimationLayer, AnimationManager, BlendStyle, ClipSource, LoopMode,
    ManagedTransformSource, SteadyState, TransformChannel, TransformData, TransformSource,
    TransitionDef, TransitionKind, TriggerChannel,
};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn translation(x: f32) -> TransformData {
    TransformData {
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        translation: Vec3::new(x, 0.0, 0.0),
    }
}

/// A steady state whose pose holds one fixed translation for "target".
fn fixed_state(name: &str, x: f32) -> SteadyState {
    let mut source = ManagedTransformSource::new();
    source.set_transform("target", translation(x));
    SteadyState::new(name, Box::new(source))
}

fn fade(target: &str, duration: f64) -> TransitionDef {
    TransitionDef::new(target, duration, TransitionKind::FadeOut, BlendStyle::Linear)
        .expect("valid transition")
}

// ============================================================================
// TransformData blending
// ============================================================================

#[test]
fn blend_weight_zero_returns_first_exactly() {
    let a = TransformData::new(
        Quat::from_rotation_y(0.3),
        Vec3::new(1.0, 2.0, 3.0),
        Vec3::new(4.0, 5.0, 6.0),
    );
    let b = TransformData::new(Quat::from_rotation_x(1.1), Vec3::ONE, Vec3::ZERO);

    let out = a.blend(&b, 0.0);
    assert_eq!(out.rotation, a.rotation);
    assert_eq!(out.scale, a.scale);
    assert_eq!(out.translation, a.translation);
}

#[test]
fn blend_weight_one_returns_second_exactly() {
    let a = TransformData::new(Quat::from_rotation_y(0.3), Vec3::ONE, Vec3::ZERO);
    let b = TransformData::new(
        Quat::from_rotation_x(1.1),
        Vec3::new(2.0, 2.0, 2.0),
        Vec3::new(7.0, 8.0, 9.0),
    );

    let out = a.blend(&b, 1.0);
    assert_eq!(out.rotation, b.rotation);
    assert_eq!(out.scale, b.scale);
    assert_eq!(out.translation, b.translation);
}

#[test]
fn blend_midpoint_lerps_translation_and_scale() {
    let a = TransformData::new(Quat::IDENTITY, Vec3::ONE, Vec3::ZERO);
    let b = TransformData::new(Quat::IDENTITY, Vec3::splat(3.0), Vec3::new(10.0, 0.0, 0.0));

    let out = a.blend(&b, 0.5);
    assert!(approx(out.translation.x, 5.0));
    assert!(approx(out.scale.x, 2.0));
}

#[test]
fn blend_midpoint_slerps_rotation() {
    let a = TransformData::new(Quat::IDENTITY, Vec3::ONE, Vec3::ZERO);
    let b = TransformData::new(
        Quat::from_rotation_y(std::f32::consts::PI),
        Vec3::ONE,
        Vec3::ZERO,
    );

    let out = a.blend(&b, 0.5);
    let expected = a.rotation.slerp(b.rotation, 0.5);
    let angle = out.rotation.angle_between(expected);
    assert!(angle < 1e-4, "slerp mismatch: angle={angle}");
}

// ============================================================================
// TransformChannel sampling
// ============================================================================

#[test]
fn channel_sample_midpoint() {
    let channel = TransformChannel::new(
        "joint",
        vec![0.0, 1.0],
        vec![translation(0.0), translation(10.0)],
    )
    .unwrap();

    let out = channel.sample(0.5);
    assert!(approx(out.translation.x, 5.0), "got {}", out.translation.x);
}

#[test]
fn channel_sample_clamps_outside_range() {
    let channel = TransformChannel::new(
        "joint",
        vec![1.0, 2.0],
        vec![translation(1.0), translation(2.0)],
    )
    .unwrap();

    assert!(approx(channel.sample(0.0).translation.x, 1.0));
    assert!(approx(channel.sample(5.0).translation.x, 2.0));
}

#[test]
fn channel_rejects_mismatched_lengths() {
    assert!(TransformChannel::new("joint", vec![0.0, 1.0], vec![translation(0.0)]).is_err());
    assert!(TransformChannel::new("joint", vec![], vec![]).is_err());
}

#[test]
fn channel_rejects_unsorted_times() {
    assert!(
        TransformChannel::new(
            "joint",
            vec![1.0, 0.5],
            vec![translation(0.0), translation(1.0)],
        )
        .is_err()
    );
}

#[test]
fn clip_duration_is_max_across_channels() {
    let clip = AnimationClip::new(
        "walk",
        vec![
            TransformChannel::new(
                "a",
                vec![0.0, 1.5],
                vec![translation(0.0), translation(1.0)],
            )
            .unwrap(),
            TransformChannel::new(
                "b",
                vec![0.0, 3.0],
                vec![translation(0.0), translation(1.0)],
            )
            .unwrap(),
        ],
    );
    assert!(approx(clip.max_time(), 3.0));
}

// ============================================================================
// ClipSource playback
// ============================================================================

fn ramp_clip(duration: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        "ramp",
        vec![
            TransformChannel::new(
                "target",
                vec![0.0, duration],
                vec![translation(0.0), translation(duration)],
            )
            .unwrap(),
        ],
    ))
}

#[test]
fn clip_source_loops_past_duration() {
    let mut source = ClipSource::new(ramp_clip(2.0));
    assert!(source.set_time(2.5), "looping source never ends");
    let x = source.source_data()["target"].translation.x;
    assert!(approx(x, 0.5), "wrapped local time expected 0.5, got {x}");
}

#[test]
fn clip_source_once_clamps_and_ends() {
    let mut source = ClipSource::new(ramp_clip(2.0)).with_loop_mode(LoopMode::Once);
    assert!(source.set_time(1.0), "still playing at half-way");
    assert!(!source.set_time(3.0), "past the end a Once clip reports done");
    let x = source.source_data()["target"].translation.x;
    assert!(approx(x, 2.0), "clamped at the last keyframe, got {x}");
    assert!(!source.is_active());
}

#[test]
fn clip_source_reset_restarts_playback() {
    let mut source = ClipSource::new(ramp_clip(2.0)).with_loop_mode(LoopMode::Once);
    source.set_time(3.0);
    assert!(!source.is_active());

    source.reset(10.0);
    assert!(source.set_time(10.5));
    let x = source.source_data()["target"].translation.x;
    assert!(approx(x, 0.5), "after reset, local time restarts, got {x}");
}

#[test]
fn clip_source_time_scale_stretches_playback() {
    let mut source = ClipSource::new(ramp_clip(2.0))
        .with_loop_mode(LoopMode::Once)
        .with_time_scale(0.5);
    source.set_time(2.0); // local = 1.0
    let x = source.source_data()["target"].translation.x;
    assert!(approx(x, 1.0), "got {x}");
}

// ============================================================================
// Triggers
// ============================================================================

#[test]
fn trigger_fires_once_when_window_crossed() {
    let clip = Arc::new(
        AnimationClip::new(
            "swing",
            vec![
                TransformChannel::new(
                    "target",
                    vec![0.0, 2.0],
                    vec![translation(0.0), translation(2.0)],
                )
                .unwrap(),
            ],
        )
        .with_trigger_channel(TriggerChannel::new(vec![1.0], vec!["footstep".into()]).unwrap()),
    );

    let fired = Rc::new(RefCell::new(Vec::new()));
    let sink = fired.clone();
    let mut source = ClipSource::new(clip);
    source
        .trigger_state()
        .expect("clip sources carry a trigger machine")
        .add_listener(move |key| sink.borrow_mut().push(key.to_string()));

    source.set_time(0.5);
    source.trigger_state().unwrap().fire_armed();
    assert!(fired.borrow().is_empty(), "window not crossed yet");

    source.set_time(1.2);
    source.trigger_state().unwrap().fire_armed();
    assert_eq!(*fired.borrow(), ["footstep"]);

    source.set_time(1.4);
    source.trigger_state().unwrap().fire_armed();
    assert_eq!(fired.borrow().len(), 1, "no refire without re-crossing");
}

// ============================================================================
// Transition percent law
// ============================================================================

/// Arm a 2-second fade on a fresh layer and return it for inspection.
fn layer_with_armed_fade(duration: f64, kind: TransitionKind) -> AnimationLayer {
    let mut layer = AnimationLayer::new("test");
    layer.add_steady_state(fixed_state("from", 0.0));
    layer.add_steady_state(fixed_state("to", 10.0));
    layer
        .steady_state_mut("from")
        .unwrap()
        .add_transition("go", TransitionDef::new("to", duration, kind, BlendStyle::Linear).unwrap());
    layer.set_current_state("from", true, 0.0);
    assert!(layer.transition_to("go", 0.0));
    assert!(layer.is_transitioning());
    layer
}

#[test]
fn percent_is_zero_at_start_half_mid_and_clamped_past_end() {
    let layer = layer_with_armed_fade(2.0, TransitionKind::FadeOut);
    let transition = layer.current_transition().unwrap();

    assert!(approx(transition.base_percent(0.0), 0.0));
    assert!(approx(transition.base_percent(1.0), 0.5));
    assert!(approx(transition.base_percent(2.0), 1.0));
    assert!(approx(transition.base_percent(3.0), 1.0), "clamped past end");
}

#[test]
fn percent_is_non_decreasing_in_time() {
    let layer = layer_with_armed_fade(2.0, TransitionKind::FadeOut);
    let transition = layer.current_transition().unwrap();

    let mut last = -1.0_f32;
    for i in 0..=40 {
        let t = f64::from(i) * 0.1;
        let percent = transition.base_percent(t);
        assert!(
            percent >= last,
            "percent decreased at t={t}: {percent} < {last}"
        );
        last = percent;
    }
}

#[test]
fn fade_in_effective_percent_is_inverted() {
    let layer = layer_with_armed_fade(2.0, TransitionKind::FadeIn);
    let transition = layer.current_transition().unwrap();

    for t in [0.0, 1.0, 2.0] {
        let base = transition.base_percent(t);
        let effective = transition.effective_percent(t);
        assert!(
            approx(effective, 1.0 - base),
            "t={t}: effective {effective} != 1 - base {base}"
        );
    }
}

#[test]
fn smoothstep_style_still_hits_both_endpoints() {
    let layer = layer_with_armed_fade(2.0, TransitionKind::FadeOut);
    // Compare against an independently armed smoothstep layer.
    let mut smooth_layer = AnimationLayer::new("smooth");
    smooth_layer.add_steady_state(fixed_state("from", 0.0));
    smooth_layer.add_steady_state(fixed_state("to", 1.0));
    smooth_layer.steady_state_mut("from").unwrap().add_transition(
        "go",
        TransitionDef::new("to", 2.0, TransitionKind::FadeOut, BlendStyle::SmoothStep).unwrap(),
    );
    smooth_layer.set_current_state("from", true, 0.0);
    smooth_layer.transition_to("go", 0.0);

    let linear = layer.current_transition().unwrap();
    let smooth = smooth_layer.current_transition().unwrap();
    assert!(approx(smooth.base_percent(0.0), linear.base_percent(0.0)));
    assert!(approx(smooth.base_percent(2.0), linear.base_percent(2.0)));
    // Smoothstep lags linear in the first half.
    assert!(smooth.base_percent(0.5) < linear.base_percent(0.5));
}

// ============================================================================
// Transition lifecycle through the manager
// ============================================================================

#[test]
fn transition_blends_and_self_eliminates() {
    let mut manager = AnimationManager::new();
    let base = manager.base_layer_mut();
    base.add_steady_state(fixed_state("idle", 0.0));
    base.add_steady_state(fixed_state("walk", 10.0));
    base.steady_state_mut("idle")
        .unwrap()
        .add_transition("walk", fade("walk", 2.0));
    base.set_current_state("idle", true, 0.0);

    manager.update(0.0);
    assert!(manager.base_layer_mut().transition_to("walk", 0.0));

    // Mid-fade: the pose is the weighted blend of both states.
    manager.update(1.0);
    let x = manager.current_source_data()["target"].translation.x;
    assert!(approx(x, 5.0), "midpoint blend expected 5.0, got {x}");

    // Past the end: the transition replaces itself with the destination.
    manager.update(3.0);
    assert!(!manager.base_layer_mut().is_transitioning());
    assert_eq!(
        manager.base_layer_mut().current_state_name(),
        Some("walk"),
        "completed transition must leave the destination steady state current"
    );
    let x = manager.current_source_data()["target"].translation.x;
    assert!(approx(x, 10.0));
}

#[test]
fn force_complete_finishes_immediately() {
    let mut manager = AnimationManager::new();
    let base = manager.base_layer_mut();
    base.add_steady_state(fixed_state("idle", 0.0));
    base.add_steady_state(fixed_state("run", 4.0));
    base.steady_state_mut("idle")
        .unwrap()
        .add_transition("run", fade("run", 100.0));
    base.set_current_state("idle", true, 0.0);
    base.transition_to("run", 0.0);

    manager.base_layer_mut().force_complete_transition();
    manager.update(0.1);
    assert_eq!(manager.base_layer_mut().current_state_name(), Some("run"));
}

#[test]
fn missing_transition_target_leaves_layer_unchanged() {
    let mut layer = AnimationLayer::new("test");
    layer.add_steady_state(fixed_state("idle", 0.0));
    layer
        .steady_state_mut("idle")
        .unwrap()
        .add_transition("go", fade("nonexistent", 1.0));
    layer.set_current_state("idle", true, 0.0);

    assert!(!layer.transition_to("go", 0.0));
    assert_eq!(layer.current_state_name(), Some("idle"));
}

#[test]
fn missing_transition_key_is_a_noop() {
    let mut layer = AnimationLayer::new("test");
    layer.add_steady_state(fixed_state("idle", 0.0));
    layer.set_current_state("idle", true, 0.0);

    assert!(!layer.transition_to("no-such-key", 0.0));
    assert_eq!(layer.current_state_name(), Some("idle"));
}

#[test]
fn wildcard_transition_catches_unknown_keys() {
    let mut layer = AnimationLayer::new("test");
    layer.add_steady_state(fixed_state("idle", 0.0));
    layer.add_steady_state(fixed_state("flail", 1.0));
    layer
        .steady_state_mut("idle")
        .unwrap()
        .add_transition("*", fade("flail", 1.0));
    layer.set_current_state("idle", true, 0.0);

    assert!(layer.transition_to("anything", 0.0));
    assert!(layer.is_transitioning());
}

#[test]
fn requests_are_ignored_while_transitioning() {
    let mut layer = layer_with_armed_fade(2.0, TransitionKind::FadeOut);
    assert!(!layer.transition_to("go", 0.5), "mid-fade requests are gated");
}

#[test]
fn steady_end_transition_arms_when_source_ends() {
    let mut layer = AnimationLayer::new("test");
    let swing = SteadyState::new(
        "swing",
        Box::new(ClipSource::new(ramp_clip(1.0)).with_loop_mode(LoopMode::Once)),
    );
    layer.add_steady_state(swing);
    layer.add_steady_state(fixed_state("idle", 0.0));
    layer
        .steady_state_mut("swing")
        .unwrap()
        .set_end_transition(Some(fade("idle", 0.5)));
    layer.set_current_state("swing", true, 0.0);

    layer.update(0.5);
    assert_eq!(layer.current_state_name(), Some("swing"));

    layer.update(2.0); // clip over; end transition arms
    assert!(layer.is_transitioning());

    layer.update(3.0); // fade over; destination takes the layer
    assert_eq!(layer.current_state_name(), Some("idle"));
}

#[test]
fn steady_without_end_transition_clears_layer() {
    let mut layer = AnimationLayer::new("test");
    layer.add_steady_state(SteadyState::new(
        "once",
        Box::new(ClipSource::new(ramp_clip(1.0)).with_loop_mode(LoopMode::Once)),
    ));
    layer.set_current_state("once", true, 0.0);

    layer.update(2.0);
    assert_eq!(layer.current_state_name(), None);
}

// ============================================================================
// Layer composition
// ============================================================================

#[test]
fn interactive_layer_enters_requested_state_directly() {
    let mut layer = AnimationLayer::interactive("gesture");
    layer.add_steady_state(fixed_state("wave", 1.0));

    assert!(layer.transition_to("wave", 0.0));
    assert!(!layer.is_transitioning(), "empty interactive layer jumps straight in");
    assert_eq!(layer.current_state_name(), Some("wave"));
}

#[test]
fn non_interactive_empty_layer_requires_a_transition() {
    let mut layer = AnimationLayer::new("gesture");
    layer.add_steady_state(fixed_state("wave", 1.0));
    assert!(!layer.transition_to("wave", 0.0));
    assert_eq!(layer.current_state_name(), None);
}

#[test]
fn multilayer_fade_blends_against_base_layer() {
    let mut manager = AnimationManager::new();
    let base = manager.base_layer_mut();
    base.add_steady_state(fixed_state("idle", 0.0));
    base.set_current_state("idle", true, 0.0);

    let mut upper = AnimationLayer::new("upper");
    upper.add_steady_state(fixed_state("point", 8.0));
    upper.add_transition(
        "point",
        TransitionDef::new("point", 2.0, TransitionKind::Multilayer, BlendStyle::Linear).unwrap(),
    );
    manager.add_layer(upper);

    manager.update(0.0);
    assert!(manager.layer_mut("upper").unwrap().transition_to("point", 0.0));

    // Half-way: base (0.0) blended toward the upper state (8.0).
    manager.update(1.0);
    let x = manager.current_source_data()["target"].translation.x;
    assert!(approx(x, 4.0), "multilayer midpoint expected 4.0, got {x}");

    // Completed: the upper layer owns the key outright.
    manager.update(3.0);
    let x = manager.current_source_data()["target"].translation.x;
    assert!(approx(x, 8.0), "got {x}");
}

#[test]
fn upper_layer_overrides_base_per_key_after_merge() {
    let mut manager = AnimationManager::new();
    let base = manager.base_layer_mut();
    let mut base_source = ManagedTransformSource::new();
    base_source.set_transform("shared", translation(1.0));
    base_source.set_transform("base-only", translation(2.0));
    base.add_steady_state(SteadyState::new("pose", Box::new(base_source)));
    base.set_current_state("pose", true, 0.0);

    let mut upper = AnimationLayer::new("upper");
    let mut upper_source = ManagedTransformSource::new();
    upper_source.set_transform("shared", translation(9.0));
    upper.add_steady_state(SteadyState::new("override", Box::new(upper_source)));
    manager.add_layer(upper);
    manager
        .layer_mut("upper")
        .unwrap()
        .set_current_state("override", true, 0.0);

    manager.update(0.5);
    let pose = manager.current_source_data();
    assert!(approx(pose["shared"].translation.x, 9.0));
    assert!(approx(pose["base-only"].translation.x, 2.0));
}
