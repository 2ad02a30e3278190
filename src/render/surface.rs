use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(u64);

impl SurfaceId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to the host node a chart draws into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceHandle {
    id: SurfaceId,
    width: u32,
    height: u32,
    attached: bool,
}

impl SurfaceHandle {
    #[must_use]
    pub const fn attached(id: SurfaceId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            attached: true,
        }
    }

    /// A node that exists but is not part of the live tree yet.
    #[must_use]
    pub const fn detached(id: SurfaceId) -> Self {
        Self {
            id,
            width: 0,
            height: 0,
            attached: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> SurfaceId {
        self.id
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub const fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}
