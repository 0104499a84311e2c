// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense and sparse storage must be indistinguishable through
//! `ObjectPaintProperties`.

use std::rc::Rc;

use kurbo::{Affine, Point, Rect, Size};
use understory_paint_property::{
    AnimationState, ClipPaintPropertyNode, ClipSlot, ClipState, DenseStorage,
    EffectPaintPropertyNode, EffectSlot, EffectState, NodeSlot, ObjectPaintProperties,
    PaintPropertyChangeType, PaintPropertyStorage, ScrollPaintPropertyNode, ScrollState,
    SparseStorage, TransformAndOrigin, TransformPaintPropertyNode, TransformSlot, TransformState,
};

const TRANSFORM_SLOTS: [TransformSlot; 11] = [
    TransformSlot::PaintOffsetTranslation,
    TransformSlot::StickyTranslation,
    TransformSlot::AnchorPositionScrollTranslation,
    TransformSlot::Translate,
    TransformSlot::Rotate,
    TransformSlot::Scale,
    TransformSlot::Offset,
    TransformSlot::Transform,
    TransformSlot::Perspective,
    TransformSlot::ReplacedContentTransform,
    TransformSlot::ScrollTranslation,
];

const EFFECT_SLOTS: [EffectSlot; 8] = [
    EffectSlot::Effect,
    EffectSlot::Filter,
    EffectSlot::Mask,
    EffectSlot::ClipPathMask,
    EffectSlot::ElementCaptureEffect,
    EffectSlot::VerticalScrollbarEffect,
    EffectSlot::HorizontalScrollbarEffect,
    EffectSlot::ScrollCornerEffect,
];

const CLIP_SLOTS: [ClipSlot; 9] = [
    ClipSlot::ClipPathClip,
    ClipSlot::MaskClip,
    ClipSlot::CssClip,
    ClipSlot::CssClipFixedPosition,
    ClipSlot::PixelMovingFilterClipExpander,
    ClipSlot::OverflowControlsClip,
    ClipSlot::BackgroundClip,
    ClipSlot::InnerBorderRadiusClip,
    ClipSlot::OverflowClip,
];

struct Roots {
    transform: Rc<TransformPaintPropertyNode>,
    other_transform: Rc<TransformPaintPropertyNode>,
    effect: Rc<EffectPaintPropertyNode>,
    clip: Rc<ClipPaintPropertyNode>,
    scroll: Rc<ScrollPaintPropertyNode>,
}

impl Roots {
    fn new() -> Self {
        let transform = TransformPaintPropertyNode::root(TransformState::default());
        let other_transform = TransformPaintPropertyNode::create(
            &transform,
            TransformState::new(TransformAndOrigin::translation(3.0, 3.0)),
            AnimationState::empty(),
        );
        let clip = ClipPaintPropertyNode::root(ClipState::from_rect(
            &transform,
            Rect::new(0.0, 0.0, 800.0, 600.0),
        ));
        Self {
            transform,
            other_transform,
            effect: EffectPaintPropertyNode::root(EffectState::default()),
            clip,
            scroll: ScrollPaintPropertyNode::root(ScrollState::default()),
        }
    }
}

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

#[derive(Debug)]
enum Op {
    UpdateTransform(TransformSlot, bool, TransformState),
    ClearTransform(TransformSlot),
    UpdateEffect(EffectSlot, EffectState, AnimationState),
    ClearEffect(EffectSlot),
    UpdateClip(ClipSlot, ClipState),
    ClearClip(ClipSlot),
    UpdateScroll(ScrollState),
    ClearScroll,
    UpdateIsolation,
    ClearIsolation,
    DirectOpacity(f32),
    DirectTransform(f64),
}

fn random_op(rng: &mut Lcg, roots: &Roots) -> Op {
    match rng.below(12) {
        0 | 1 => {
            let slot = TRANSFORM_SLOTS[rng.below(TRANSFORM_SLOTS.len())];
            let matrix = if rng.below(4) == 0 {
                Affine::rotate(rng.below(3) as f64)
            } else {
                Affine::translate((rng.below(3) as f64, 0.0))
            };
            let state = TransformState::new(TransformAndOrigin {
                matrix,
                origin: Point::ORIGIN,
            });
            Op::UpdateTransform(slot, rng.below(5) == 0, state)
        }
        2 => Op::ClearTransform(TRANSFORM_SLOTS[rng.below(TRANSFORM_SLOTS.len())]),
        3 | 4 => {
            let slot = EFFECT_SLOTS[rng.below(EFFECT_SLOTS.len())];
            let animation = if rng.below(3) == 0 {
                AnimationState::OPACITY_ON_COMPOSITOR
            } else {
                AnimationState::empty()
            };
            Op::UpdateEffect(slot, EffectState::with_opacity(rng.below(3) as f32 / 2.0), animation)
        }
        5 => Op::ClearEffect(EFFECT_SLOTS[rng.below(EFFECT_SLOTS.len())]),
        6 => {
            let slot = CLIP_SLOTS[rng.below(CLIP_SLOTS.len())];
            let size = 10.0 * (1 + rng.below(3)) as f64;
            Op::UpdateClip(slot, ClipState::from_rect(&roots.transform, Rect::new(0.0, 0.0, size, size)))
        }
        7 => Op::ClearClip(CLIP_SLOTS[rng.below(CLIP_SLOTS.len())]),
        8 => Op::UpdateScroll(ScrollState {
            contents_size: Size::new(100.0, 100.0 * (1 + rng.below(2)) as f64),
            user_scrollable_vertical: rng.below(2) == 0,
            ..ScrollState::default()
        }),
        9 => {
            if rng.below(2) == 0 {
                Op::ClearScroll
            } else if rng.below(2) == 0 {
                Op::UpdateIsolation
            } else {
                Op::ClearIsolation
            }
        }
        10 => Op::DirectOpacity(rng.below(4) as f32 / 4.0),
        _ => Op::DirectTransform(rng.below(4) as f64),
    }
}

type Outcome = Result<PaintPropertyChangeType, understory_paint_property::PaintPropertyError>;

fn apply<B: PaintPropertyStorage>(
    properties: &mut ObjectPaintProperties<B>,
    roots: &Roots,
    op: &Op,
) -> Outcome {
    let none = AnimationState::empty();
    let removed = |cleared: bool| {
        if cleared {
            PaintPropertyChangeType::NodeAddedOrRemoved
        } else {
            PaintPropertyChangeType::Unchanged
        }
    };
    match op {
        Op::UpdateTransform(slot, reparent, state) => {
            let parent = if *reparent { &roots.other_transform } else { &roots.transform };
            properties.update_transform(*slot, parent, state.clone(), none)
        }
        Op::ClearTransform(slot) => properties.clear_transform(*slot).map(removed),
        Op::UpdateEffect(slot, state, animation) => {
            properties.update_effect(*slot, &roots.effect, state.clone(), *animation)
        }
        Op::ClearEffect(slot) => properties.clear_effect(*slot).map(removed),
        Op::UpdateClip(slot, state) => properties.update_clip(*slot, &roots.clip, state.clone(), none),
        Op::ClearClip(slot) => properties.clear_clip(*slot).map(removed),
        Op::UpdateScroll(state) => properties.update_scroll(&roots.scroll, state.clone()),
        Op::ClearScroll => properties.clear_scroll().map(removed),
        Op::UpdateIsolation => {
            let t = properties.update_transform_isolation_node(&roots.transform)?;
            let e = properties.update_effect_isolation_node(&roots.effect)?;
            let c = properties.update_clip_isolation_node(&roots.clip)?;
            Ok(t.max(e).max(c))
        }
        Op::ClearIsolation => {
            let t = properties.clear_transform_isolation_node()?;
            let e = properties.clear_effect_isolation_node()?;
            let c = properties.clear_clip_isolation_node()?;
            Ok(removed(t || e || c))
        }
        Op::DirectOpacity(opacity) => properties.directly_update_opacity(*opacity, none),
        Op::DirectTransform(x) => properties
            .directly_update_transform_and_origin(TransformAndOrigin::translation(*x, 0.0), none),
    }
}

fn assert_equivalent(dense: &ObjectPaintProperties<DenseStorage>, sparse: &ObjectPaintProperties<SparseStorage>) {
    assert_eq!(dense.has_transform_node(), sparse.has_transform_node());
    assert_eq!(dense.has_effect_node(), sparse.has_effect_node());
    assert_eq!(dense.has_clip_node(), sparse.has_clip_node());
    assert_eq!(dense.has_scroll_node(), sparse.has_scroll_node());
    assert_eq!(dense.node_count(), sparse.node_count());
    assert_eq!(dense.validate(), sparse.validate());

    for slot in TRANSFORM_SLOTS {
        let (d, s) = (dense.transform(slot), sparse.transform(slot));
        assert_eq!(d.is_some(), s.is_some(), "{slot:?}");
        if let (Some(d), Some(s)) = (d, s) {
            assert_eq!(d.transform_and_origin(), s.transform_and_origin());
            assert!(Rc::ptr_eq(&d.parent().unwrap(), &s.parent().unwrap()));
            assert_eq!(d.changed(), s.changed());
        }
    }
    for slot in EFFECT_SLOTS {
        let (d, s) = (dense.effect(slot), sparse.effect(slot));
        assert_eq!(d.is_some(), s.is_some(), "{slot:?}");
        if let (Some(d), Some(s)) = (d, s) {
            assert_eq!(d.opacity(), s.opacity());
            assert_eq!(d.animation_state(), s.animation_state());
        }
    }
    for slot in CLIP_SLOTS {
        let (d, s) = (dense.clip(slot), sparse.clip(slot));
        assert_eq!(d.is_some(), s.is_some(), "{slot:?}");
        if let (Some(d), Some(s)) = (d, s) {
            assert_eq!(d.state().layout_clip_rect, s.state().layout_clip_rect);
        }
    }
    let css_transforms = dense
        .all_css_transform_properties_outside_to_inside()
        .into_iter()
        .zip(sparse.all_css_transform_properties_outside_to_inside());
    for (d, s) in css_transforms {
        assert_eq!(
            d.map(|node| node.transform_and_origin()),
            s.map(|node| node.transform_and_origin())
        );
    }
    match (dense.scroll(), sparse.scroll()) {
        (Some(d), Some(s)) => assert_eq!(*d.state(), *s.state()),
        (None, None) => {}
        _ => panic!("scroll presence differs"),
    }
    assert_eq!(
        dense.transform_isolation_node().is_some(),
        sparse.transform_isolation_node().is_some()
    );
    let dense_changed: Vec<_> = dense.changed_slots().collect();
    let sparse_changed: Vec<_> = sparse.changed_slots().collect();
    assert_eq!(dense_changed, sparse_changed);
}

#[test]
fn random_operation_sequences_agree() {
    for seed in 0..16_u64 {
        let roots = Roots::new();
        let mut rng = Lcg(seed);
        let mut dense = ObjectPaintProperties::<DenseStorage>::default();
        let mut sparse = ObjectPaintProperties::<SparseStorage>::default();

        for step in 0..300 {
            let op = random_op(&mut rng, &roots);
            let d = apply(&mut dense, &roots, &op);
            let s = apply(&mut sparse, &roots, &op);
            assert_eq!(d, s, "seed {seed} step {step}: {op:?}");
            if step % 50 == 49 {
                dense.clear_all_changed();
                sparse.clear_all_changed();
            }
            assert_equivalent(&dense, &sparse);
        }
    }
}

#[test]
fn immutable_objects_agree() {
    let roots = Roots::new();
    let mut dense = ObjectPaintProperties::<DenseStorage>::default();
    let mut sparse = ObjectPaintProperties::<SparseStorage>::default();
    let mut rng = Lcg(99);
    for _ in 0..40 {
        let op = random_op(&mut rng, &roots);
        let _ = apply(&mut dense, &roots, &op);
        let _ = apply(&mut sparse, &roots, &op);
    }
    dense.set_immutable();
    sparse.set_immutable();

    for step in 0..200 {
        let op = random_op(&mut rng, &roots);
        let count = dense.node_count();
        let d = apply(&mut dense, &roots, &op);
        let s = apply(&mut sparse, &roots, &op);
        assert_eq!(d, s, "step {step}: {op:?}");
        // Nothing structural can get through.
        assert_eq!(dense.node_count(), count);
        assert_ne!(d, Ok(PaintPropertyChangeType::NodeAddedOrRemoved));
        assert_equivalent(&dense, &sparse);
    }
}

#[test]
fn first_update_is_structural_then_value_only() {
    let roots = Roots::new();
    let mut properties = ObjectPaintProperties::<SparseStorage>::default();
    let state = EffectState::with_opacity(0.5);

    assert_eq!(
        properties.update_effect(EffectSlot::Filter, &roots.effect, state.clone(), AnimationState::empty()),
        Ok(PaintPropertyChangeType::NodeAddedOrRemoved)
    );
    assert_eq!(
        properties.update_effect(EffectSlot::Filter, &roots.effect, state, AnimationState::empty()),
        Ok(PaintPropertyChangeType::Unchanged)
    );
    assert_eq!(
        properties.update_effect(
            EffectSlot::Filter,
            &roots.effect,
            EffectState::with_opacity(0.75),
            AnimationState::empty()
        ),
        Ok(PaintPropertyChangeType::ChangedOnlySimpleValues)
    );
    let reparent_target = EffectPaintPropertyNode::create(
        &roots.effect,
        EffectState::default(),
        AnimationState::empty(),
    );
    assert_eq!(
        properties.update_effect(
            EffectSlot::Filter,
            &reparent_target,
            EffectState::with_opacity(0.75),
            AnimationState::empty()
        ),
        Ok(PaintPropertyChangeType::NodeAddedOrRemoved)
    );
    assert!(properties.node_ref(NodeSlot::Filter).is_some());
}
