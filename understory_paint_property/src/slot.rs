// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property node slots.
//!
//! Every [`ObjectPaintProperties`](crate::ObjectPaintProperties) has one slot
//! per [`NodeSlot`]. Slots are grouped by the tree their node lives in and are
//! numbered contiguously per tree, so "any node in this tree" is a range test.

use understory_sparse_vec::FieldId;

/// The four independent property trees.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyTree {
    /// Transform tree (translations, transforms, perspective, scroll offsets).
    Transform,
    /// Effect tree (opacity, filters, masks).
    Effect,
    /// Clip tree.
    Clip,
    /// Scroll tree.
    Scroll,
}

impl PropertyTree {
    /// First slot of this tree.
    #[must_use]
    pub const fn first_slot(self) -> NodeSlot {
        match self {
            Self::Transform => NodeSlot::PaintOffsetTranslation,
            Self::Effect => NodeSlot::Effect,
            Self::Clip => NodeSlot::ClipPathClip,
            Self::Scroll => NodeSlot::Scroll,
        }
    }

    /// Last slot of this tree.
    #[must_use]
    pub const fn last_slot(self) -> NodeSlot {
        match self {
            Self::Transform => NodeSlot::TransformIsolationNode,
            Self::Effect => NodeSlot::EffectIsolationNode,
            Self::Clip => NodeSlot::ClipIsolationNode,
            Self::Scroll => NodeSlot::Scroll,
        }
    }

    /// Number of slots in this tree.
    #[must_use]
    pub const fn slot_count(self) -> usize {
        self.last_slot() as usize - self.first_slot() as usize + 1
    }
}

/// One slot per property node kind, in tree order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum NodeSlot {
    // Transform tree.
    /// Translation by the paint offset.
    PaintOffsetTranslation,
    /// `position: sticky` offset.
    StickyTranslation,
    /// Anchor positioning scroll adjustment.
    AnchorPositionScrollTranslation,
    /// The `translate` property.
    Translate,
    /// The `rotate` property.
    Rotate,
    /// The `scale` property.
    Scale,
    /// The `offset` (motion path) property.
    Offset,
    /// The `transform` property.
    Transform,
    /// The `perspective` property.
    Perspective,
    /// Transform of replaced content (SVG viewBox, `object-fit`).
    ReplacedContentTransform,
    /// Scroll offset translation of a scroll container.
    ScrollTranslation,
    /// Alias marking a transform isolation boundary.
    TransformIsolationNode,

    // Effect tree.
    /// Opacity, blend mode, and compositing effects.
    Effect,
    /// The `filter` property.
    Filter,
    /// Mask layer.
    Mask,
    /// Mask produced by a non-rectangular `clip-path`.
    ClipPathMask,
    /// Element capture.
    ElementCaptureEffect,
    /// Vertical scrollbar layer.
    VerticalScrollbarEffect,
    /// Horizontal scrollbar layer.
    HorizontalScrollbarEffect,
    /// Scroll corner layer.
    ScrollCornerEffect,
    /// Alias marking an effect isolation boundary.
    EffectIsolationNode,

    // Clip tree.
    /// Clip from a rectangular `clip-path`.
    ClipPathClip,
    /// Clip bounding a mask.
    MaskClip,
    /// The CSS `clip` property.
    CssClip,
    /// The CSS `clip` property for fixed-position descendants.
    CssClipFixedPosition,
    /// Expands the clip to cover pixel-moving filters.
    PixelMovingFilterClipExpander,
    /// Clip for overflow controls.
    OverflowControlsClip,
    /// `background-clip: text` and friends.
    BackgroundClip,
    /// Clip to the inner border radius.
    InnerBorderRadiusClip,
    /// Overflow clip.
    OverflowClip,
    /// Alias marking a clip isolation boundary.
    ClipIsolationNode,

    // Scroll tree.
    /// Scroll node of a scroll container.
    Scroll,
}

impl NodeSlot {
    /// Number of slots.
    pub const COUNT: usize = 32;

    /// All slots in tree order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::PaintOffsetTranslation,
        Self::StickyTranslation,
        Self::AnchorPositionScrollTranslation,
        Self::Translate,
        Self::Rotate,
        Self::Scale,
        Self::Offset,
        Self::Transform,
        Self::Perspective,
        Self::ReplacedContentTransform,
        Self::ScrollTranslation,
        Self::TransformIsolationNode,
        Self::Effect,
        Self::Filter,
        Self::Mask,
        Self::ClipPathMask,
        Self::ElementCaptureEffect,
        Self::VerticalScrollbarEffect,
        Self::HorizontalScrollbarEffect,
        Self::ScrollCornerEffect,
        Self::EffectIsolationNode,
        Self::ClipPathClip,
        Self::MaskClip,
        Self::CssClip,
        Self::CssClipFixedPosition,
        Self::PixelMovingFilterClipExpander,
        Self::OverflowControlsClip,
        Self::BackgroundClip,
        Self::InnerBorderRadiusClip,
        Self::OverflowClip,
        Self::ClipIsolationNode,
        Self::Scroll,
    ];

    /// Returns the tree this slot's node lives in.
    #[must_use]
    pub const fn tree(self) -> PropertyTree {
        let index = self as u8;
        if index <= PropertyTree::Transform.last_slot() as u8 {
            PropertyTree::Transform
        } else if index <= PropertyTree::Effect.last_slot() as u8 {
            PropertyTree::Effect
        } else if index <= PropertyTree::Clip.last_slot() as u8 {
            PropertyTree::Clip
        } else {
            PropertyTree::Scroll
        }
    }

    /// Position of this slot within its tree.
    #[must_use]
    pub const fn tree_index(self) -> usize {
        self as usize - self.tree().first_slot() as usize
    }

    /// Returns `true` for the isolation alias slots.
    #[must_use]
    pub const fn is_isolation(self) -> bool {
        matches!(
            self,
            Self::TransformIsolationNode | Self::EffectIsolationNode | Self::ClipIsolationNode
        )
    }
}

impl FieldId for NodeSlot {
    const NUM_FIELDS: usize = Self::COUNT;

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// State-carrying transform slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransformSlot {
    /// See [`NodeSlot::PaintOffsetTranslation`].
    PaintOffsetTranslation,
    /// See [`NodeSlot::StickyTranslation`].
    StickyTranslation,
    /// See [`NodeSlot::AnchorPositionScrollTranslation`].
    AnchorPositionScrollTranslation,
    /// See [`NodeSlot::Translate`].
    Translate,
    /// See [`NodeSlot::Rotate`].
    Rotate,
    /// See [`NodeSlot::Scale`].
    Scale,
    /// See [`NodeSlot::Offset`].
    Offset,
    /// See [`NodeSlot::Transform`].
    Transform,
    /// See [`NodeSlot::Perspective`].
    Perspective,
    /// See [`NodeSlot::ReplacedContentTransform`].
    ReplacedContentTransform,
    /// See [`NodeSlot::ScrollTranslation`].
    ScrollTranslation,
}

impl From<TransformSlot> for NodeSlot {
    fn from(slot: TransformSlot) -> Self {
        match slot {
            TransformSlot::PaintOffsetTranslation => Self::PaintOffsetTranslation,
            TransformSlot::StickyTranslation => Self::StickyTranslation,
            TransformSlot::AnchorPositionScrollTranslation => Self::AnchorPositionScrollTranslation,
            TransformSlot::Translate => Self::Translate,
            TransformSlot::Rotate => Self::Rotate,
            TransformSlot::Scale => Self::Scale,
            TransformSlot::Offset => Self::Offset,
            TransformSlot::Transform => Self::Transform,
            TransformSlot::Perspective => Self::Perspective,
            TransformSlot::ReplacedContentTransform => Self::ReplacedContentTransform,
            TransformSlot::ScrollTranslation => Self::ScrollTranslation,
        }
    }
}

/// State-carrying effect slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EffectSlot {
    /// See [`NodeSlot::Effect`].
    Effect,
    /// See [`NodeSlot::Filter`].
    Filter,
    /// See [`NodeSlot::Mask`].
    Mask,
    /// See [`NodeSlot::ClipPathMask`].
    ClipPathMask,
    /// See [`NodeSlot::ElementCaptureEffect`].
    ElementCaptureEffect,
    /// See [`NodeSlot::VerticalScrollbarEffect`].
    VerticalScrollbarEffect,
    /// See [`NodeSlot::HorizontalScrollbarEffect`].
    HorizontalScrollbarEffect,
    /// See [`NodeSlot::ScrollCornerEffect`].
    ScrollCornerEffect,
}

impl From<EffectSlot> for NodeSlot {
    fn from(slot: EffectSlot) -> Self {
        match slot {
            EffectSlot::Effect => Self::Effect,
            EffectSlot::Filter => Self::Filter,
            EffectSlot::Mask => Self::Mask,
            EffectSlot::ClipPathMask => Self::ClipPathMask,
            EffectSlot::ElementCaptureEffect => Self::ElementCaptureEffect,
            EffectSlot::VerticalScrollbarEffect => Self::VerticalScrollbarEffect,
            EffectSlot::HorizontalScrollbarEffect => Self::HorizontalScrollbarEffect,
            EffectSlot::ScrollCornerEffect => Self::ScrollCornerEffect,
        }
    }
}

/// State-carrying clip slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClipSlot {
    /// See [`NodeSlot::ClipPathClip`].
    ClipPathClip,
    /// See [`NodeSlot::MaskClip`].
    MaskClip,
    /// See [`NodeSlot::CssClip`].
    CssClip,
    /// See [`NodeSlot::CssClipFixedPosition`].
    CssClipFixedPosition,
    /// See [`NodeSlot::PixelMovingFilterClipExpander`].
    PixelMovingFilterClipExpander,
    /// See [`NodeSlot::OverflowControlsClip`].
    OverflowControlsClip,
    /// See [`NodeSlot::BackgroundClip`].
    BackgroundClip,
    /// See [`NodeSlot::InnerBorderRadiusClip`].
    InnerBorderRadiusClip,
    /// See [`NodeSlot::OverflowClip`].
    OverflowClip,
}

impl From<ClipSlot> for NodeSlot {
    fn from(slot: ClipSlot) -> Self {
        match slot {
            ClipSlot::ClipPathClip => Self::ClipPathClip,
            ClipSlot::MaskClip => Self::MaskClip,
            ClipSlot::CssClip => Self::CssClip,
            ClipSlot::CssClipFixedPosition => Self::CssClipFixedPosition,
            ClipSlot::PixelMovingFilterClipExpander => Self::PixelMovingFilterClipExpander,
            ClipSlot::OverflowControlsClip => Self::OverflowControlsClip,
            ClipSlot::BackgroundClip => Self::BackgroundClip,
            ClipSlot::InnerBorderRadiusClip => Self::InnerBorderRadiusClip,
            ClipSlot::OverflowClip => Self::OverflowClip,
        }
    }
}
