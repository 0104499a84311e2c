// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node state payloads for the four property trees.
//!
//! Each state knows how to classify the difference to a successor state
//! ([`NodeState::compute_change`]). References to other nodes inside a state
//! (local transform spaces, output clips, scroll nodes) compare by identity.

use alloc::rc::Rc;
use core::fmt;

use kurbo::{Affine, Point, Rect, RoundedRect, Size};
use peniko::{BlendMode, Compose, Mix};

use crate::change::{AnimationState, PaintPropertyChangeType};
use crate::node::{
    ClipPaintPropertyNode, PaintPropertyNode, ScrollPaintPropertyNode, TransformPaintPropertyNode,
};
use crate::slot::PropertyTree;
use crate::storage::stored::StoredState;

/// State payload of a property node.
///
/// Implemented by [`TransformState`], [`EffectState`], [`ClipState`], and
/// [`ScrollState`]; sealed.
pub trait NodeState: StoredState + Clone + Default + fmt::Debug + Sized + 'static {
    /// The tree nodes with this state belong to.
    const TREE: PropertyTree;

    /// Classifies the change from `self` to `next`.
    fn compute_change(&self, next: &Self, animation: AnimationState) -> PaintPropertyChangeType;
}

fn same_node<S>(a: &Option<Rc<PaintPropertyNode<S>>>, b: &Option<Rc<PaintPropertyNode<S>>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Opaque compositor-side identifier of a property node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositorElementId(pub u64);

bitflags::bitflags! {
    /// Reasons a node must be composited on its own.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CompositingReasons: u32 {
        /// 3D transform.
        const TRANSFORM_3D = 1 << 0;
        /// `will-change: transform`.
        const WILL_CHANGE_TRANSFORM = 1 << 1;
        /// `will-change: opacity`.
        const WILL_CHANGE_OPACITY = 1 << 2;
        /// Running transform animation.
        const ACTIVE_TRANSFORM_ANIMATION = 1 << 3;
        /// Running opacity animation.
        const ACTIVE_OPACITY_ANIMATION = 1 << 4;
        /// Running filter animation.
        const ACTIVE_FILTER_ANIMATION = 1 << 5;
        /// Running backdrop-filter animation.
        const ACTIVE_BACKDROP_FILTER_ANIMATION = 1 << 6;
        /// Fixed position element.
        const FIXED_POSITION = 1 << 7;
        /// Sticky position element.
        const STICKY_POSITION = 1 << 8;
        /// Composited scroll container.
        const OVERFLOW_SCROLLING = 1 << 9;
        /// Backdrop filter.
        const BACKDROP_FILTER = 1 << 10;
    }
}

/// Whether the back face of transformed content is visible.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackfaceVisibility {
    /// Inherit from the parent 3D rendering context.
    #[default]
    Inherited,
    /// Always visible.
    Visible,
    /// Hidden when facing away.
    Hidden,
}

/// A transform matrix together with its origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransformAndOrigin {
    /// The transform, excluding the origin offset.
    pub matrix: Affine,
    /// The transform origin in the local space.
    pub origin: Point,
}

impl TransformAndOrigin {
    /// Identity transform about the local origin.
    pub const IDENTITY: Self = Self {
        matrix: Affine::IDENTITY,
        origin: Point::ORIGIN,
    };

    /// A pure translation.
    #[must_use]
    pub fn translation(x: f64, y: f64) -> Self {
        Self {
            matrix: Affine::translate((x, y)),
            origin: Point::ORIGIN,
        }
    }

    /// Returns `true` if the matrix is an identity or a 2D translation.
    #[must_use]
    pub fn is_identity_or_2d_translation(&self) -> bool {
        let [a, b, c, d, _, _] = self.matrix.as_coeffs();
        a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
    }
}

impl Default for TransformAndOrigin {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// State of a transform node.
#[derive(Clone, Debug)]
pub struct TransformState {
    /// The local transform.
    pub transform_and_origin: TransformAndOrigin,
    /// Whether the inherited 3D transform is flattened.
    pub flattens_inherited_transform: bool,
    /// Back face visibility.
    pub backface_visibility: BackfaceVisibility,
    /// 3D rendering context, `0` for none.
    pub rendering_context_id: u32,
    /// Direct compositing reasons.
    pub direct_compositing_reasons: CompositingReasons,
    /// Compositor element id, if the node is animated or scrolled.
    pub compositor_element_id: Option<CompositorElementId>,
    /// Scroll node, for scroll translations.
    pub scroll: Option<Rc<ScrollPaintPropertyNode>>,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            transform_and_origin: TransformAndOrigin::IDENTITY,
            flattens_inherited_transform: true,
            backface_visibility: BackfaceVisibility::Inherited,
            rendering_context_id: 0,
            direct_compositing_reasons: CompositingReasons::empty(),
            compositor_element_id: None,
            scroll: None,
        }
    }
}

impl TransformState {
    /// A state holding only `transform_and_origin`.
    #[must_use]
    pub fn new(transform_and_origin: TransformAndOrigin) -> Self {
        Self {
            transform_and_origin,
            ..Self::default()
        }
    }
}

impl NodeState for TransformState {
    const TREE: PropertyTree = PropertyTree::Transform;

    fn compute_change(&self, next: &Self, animation: AnimationState) -> PaintPropertyChangeType {
        if self.flattens_inherited_transform != next.flattens_inherited_transform
            || self.backface_visibility != next.backface_visibility
            || self.rendering_context_id != next.rendering_context_id
            || self.transform_and_origin.origin != next.transform_and_origin.origin
            || !same_node(&self.scroll, &next.scroll)
        {
            return PaintPropertyChangeType::ChangedOnlyValues;
        }

        let matrix_change = if self.transform_and_origin.matrix == next.transform_and_origin.matrix
        {
            PaintPropertyChangeType::Unchanged
        } else if animation.contains(AnimationState::TRANSFORM_ON_COMPOSITOR) {
            PaintPropertyChangeType::ChangedOnlyCompositedValues
        } else if self.transform_and_origin.is_identity_or_2d_translation()
            && next.transform_and_origin.is_identity_or_2d_translation()
        {
            PaintPropertyChangeType::ChangedOnlySimpleValues
        } else {
            PaintPropertyChangeType::ChangedOnlyValues
        };

        let non_raster_change = if self.direct_compositing_reasons
            != next.direct_compositing_reasons
            || self.compositor_element_id != next.compositor_element_id
        {
            PaintPropertyChangeType::ChangedOnlyNonRerasterValues
        } else {
            PaintPropertyChangeType::Unchanged
        };

        matrix_change.max(non_raster_change)
    }
}

/// State of an effect node.
#[derive(Clone, Debug)]
pub struct EffectState {
    /// Transform space the effect is applied in.
    pub local_transform_space: Option<Rc<TransformPaintPropertyNode>>,
    /// Clip applied to the effect's output.
    pub output_clip: Option<Rc<ClipPaintPropertyNode>>,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Blend mode used when compositing into the parent.
    pub blend_mode: BlendMode,
    /// Direct compositing reasons.
    pub direct_compositing_reasons: CompositingReasons,
    /// Compositor element id, if the node is animated.
    pub compositor_element_id: Option<CompositorElementId>,
}

impl Default for EffectState {
    fn default() -> Self {
        Self {
            local_transform_space: None,
            output_clip: None,
            opacity: 1.0,
            blend_mode: BlendMode::new(Mix::Normal, Compose::SrcOver),
            direct_compositing_reasons: CompositingReasons::empty(),
            compositor_element_id: None,
        }
    }
}

impl EffectState {
    /// A normal-blended state with the given opacity.
    #[must_use]
    pub fn with_opacity(opacity: f32) -> Self {
        Self {
            opacity,
            ..Self::default()
        }
    }
}

impl NodeState for EffectState {
    const TREE: PropertyTree = PropertyTree::Effect;

    fn compute_change(&self, next: &Self, animation: AnimationState) -> PaintPropertyChangeType {
        if self.blend_mode != next.blend_mode
            || !same_node(&self.local_transform_space, &next.local_transform_space)
            || !same_node(&self.output_clip, &next.output_clip)
        {
            return PaintPropertyChangeType::ChangedOnlyValues;
        }

        let opacity_change = if self.opacity == next.opacity {
            PaintPropertyChangeType::Unchanged
        } else if animation.contains(AnimationState::OPACITY_ON_COMPOSITOR) {
            PaintPropertyChangeType::ChangedOnlyCompositedValues
        } else {
            PaintPropertyChangeType::ChangedOnlySimpleValues
        };

        let non_raster_change = if self.direct_compositing_reasons
            != next.direct_compositing_reasons
            || self.compositor_element_id != next.compositor_element_id
        {
            PaintPropertyChangeType::ChangedOnlyNonRerasterValues
        } else {
            PaintPropertyChangeType::Unchanged
        };

        opacity_change.max(non_raster_change)
    }
}

/// State of a clip node.
#[derive(Clone, Debug)]
pub struct ClipState {
    /// Transform space the clip rect is expressed in.
    pub local_transform_space: Option<Rc<TransformPaintPropertyNode>>,
    /// Clip rect used for layout-side geometry mapping.
    pub layout_clip_rect: Rect,
    /// Clip rect used for painting, possibly rounded.
    pub paint_clip_rect: RoundedRect,
}

impl Default for ClipState {
    fn default() -> Self {
        Self {
            local_transform_space: None,
            layout_clip_rect: Rect::ZERO,
            paint_clip_rect: RoundedRect::from_rect(Rect::ZERO, 0.0),
        }
    }
}

impl ClipState {
    /// A square-cornered clip to `rect`.
    #[must_use]
    pub fn from_rect(local_transform_space: &Rc<TransformPaintPropertyNode>, rect: Rect) -> Self {
        Self {
            local_transform_space: Some(Rc::clone(local_transform_space)),
            layout_clip_rect: rect,
            paint_clip_rect: RoundedRect::from_rect(rect, 0.0),
        }
    }
}

impl NodeState for ClipState {
    const TREE: PropertyTree = PropertyTree::Clip;

    fn compute_change(&self, next: &Self, _animation: AnimationState) -> PaintPropertyChangeType {
        if self.layout_clip_rect != next.layout_clip_rect
            || self.paint_clip_rect != next.paint_clip_rect
            || !same_node(&self.local_transform_space, &next.local_transform_space)
        {
            PaintPropertyChangeType::ChangedOnlyValues
        } else {
            PaintPropertyChangeType::Unchanged
        }
    }
}

/// State of a scroll node.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollState {
    /// The scroll container's visible rect.
    pub container_rect: Rect,
    /// Size of the scrollable contents.
    pub contents_size: Size,
    /// Whether the user can scroll horizontally.
    pub user_scrollable_horizontal: bool,
    /// Whether the user can scroll vertically.
    pub user_scrollable_vertical: bool,
    /// Compositor element id of the scroller.
    pub compositor_element_id: Option<CompositorElementId>,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            container_rect: Rect::ZERO,
            contents_size: Size::ZERO,
            user_scrollable_horizontal: false,
            user_scrollable_vertical: false,
            compositor_element_id: None,
        }
    }
}

impl NodeState for ScrollState {
    const TREE: PropertyTree = PropertyTree::Scroll;

    fn compute_change(&self, next: &Self, _animation: AnimationState) -> PaintPropertyChangeType {
        if self.container_rect != next.container_rect || self.contents_size != next.contents_size {
            PaintPropertyChangeType::ChangedOnlyValues
        } else if self != next {
            PaintPropertyChangeType::ChangedOnlyNonRerasterValues
        } else {
            PaintPropertyChangeType::Unchanged
        }
    }
}
