// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide backend selection.
//!
//! The backend used by [`ObjectPaintProperties::new`](crate::ObjectPaintProperties::new)
//! is chosen once per process. It defaults to [`BackendKind::DEFAULT`] (dense,
//! or sparse with the `sparse` Cargo feature) and may be overridden by calling
//! [`select_backend`] before the first object is created. After the choice is
//! observed it cannot change, so all objects in a process share one layout.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::error::PaintPropertyError;

/// Storage layout for [`ObjectPaintProperties`](crate::ObjectPaintProperties).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// One pointer per slot.
    Dense,
    /// Present nodes only.
    Sparse,
}

impl BackendKind {
    /// Backend used when none is selected explicitly.
    #[cfg(not(feature = "sparse"))]
    pub const DEFAULT: Self = Self::Dense;
    /// Backend used when none is selected explicitly.
    #[cfg(feature = "sparse")]
    pub const DEFAULT: Self = Self::Sparse;

    const fn to_raw(self) -> u8 {
        match self {
            Self::Dense => 1,
            Self::Sparse => 2,
        }
    }

    const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Dense),
            2 => Some(Self::Sparse),
            _ => None,
        }
    }
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const UNSELECTED: u8 = 0;

static SELECTED: AtomicU8 = AtomicU8::new(UNSELECTED);

/// Selects the process-wide backend.
///
/// Selecting the backend that is already in use is a no-op. Selecting a
/// different one after the choice was made, explicitly or by creating an
/// object, fails with [`PaintPropertyError::BackendAlreadySelected`].
pub fn select_backend(kind: BackendKind) -> Result<(), PaintPropertyError> {
    match SELECTED.compare_exchange(
        UNSELECTED,
        kind.to_raw(),
        Ordering::AcqRel,
        Ordering::Acquire,
    ) {
        Ok(_) => {
            tracing::debug!(backend = ?kind, "selected paint property backend");
            Ok(())
        }
        Err(current) => match BackendKind::from_raw(current) {
            Some(selected) if selected == kind => Ok(()),
            Some(selected) => Err(PaintPropertyError::BackendAlreadySelected {
                requested: kind,
                selected,
            }),
            None => unreachable!("backend latch holds an invalid value"),
        },
    }
}

/// Returns the process-wide backend, latching the default if none was selected.
#[must_use]
pub fn selected_backend() -> BackendKind {
    if let Some(kind) = BackendKind::from_raw(SELECTED.load(Ordering::Acquire)) {
        return kind;
    }
    match select_backend(BackendKind::DEFAULT) {
        Ok(()) => BackendKind::DEFAULT,
        // Lost a race against an explicit selection.
        Err(PaintPropertyError::BackendAlreadySelected { selected, .. }) => selected,
        Err(_) => BackendKind::DEFAULT,
    }
}
