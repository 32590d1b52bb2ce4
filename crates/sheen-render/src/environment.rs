//! Image-based-lighting environment rig.
//!
//! A cube-map render target follows the camera so reflections are captured
//! from the viewer's position. While something else renders from the scene
//! (the screen-space capture, for one) the cube map is paused for a few
//! frames to avoid feeding its own output back into itself. Pauses are
//! resolved by frame number in [`DeferredToggleQueue`], not by timers.

use std::collections::VecDeque;

use glam::Quat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::host::{CubeMapRig, RenderHost, TargetId, TextureId};

/// Environment rig settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Edge length of each cube face in pixels.
    pub cube_map_size: u32,
    /// Name of the rig node in the host scene graph.
    pub name: String,
    /// Frames the cube map stays inactive when paused.
    pub pause_frames: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            cube_map_size: 256,
            name: "sheen_environment".to_string(),
            pause_frames: 2,
        }
    }
}

impl EnvironmentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cube_map_size(mut self, size: u32) -> Self {
        self.cube_map_size = size;
        self
    }

    #[must_use]
    pub fn with_pause_frames(mut self, frames: u64) -> Self {
        self.pause_frames = frames;
        self
    }
}

/// A render-target toggle waiting for its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingToggle {
    pub target: TargetId,
    pub active: bool,
    /// Frame at which the toggle is applied.
    pub due_frame: u64,
}

/// Render-target activity changes deferred to a later frame.
///
/// Each target has at most one pending toggle; scheduling again replaces it.
#[derive(Debug, Default)]
pub struct DeferredToggleQueue {
    /// Sorted by `due_frame`.
    pending: VecDeque<PendingToggle>,
}

impl DeferredToggleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `target` to `active` once `due_frame` is reached.
    pub fn schedule(&mut self, target: TargetId, active: bool, due_frame: u64) {
        self.pending.retain(|p| p.target != target);
        let index = self.pending.partition_point(|p| p.due_frame <= due_frame);
        self.pending.insert(
            index,
            PendingToggle {
                target,
                active,
                due_frame,
            },
        );
    }

    /// Apply every toggle due at or before `current_frame`.
    ///
    /// Returns the number of toggles applied.
    pub fn process(&mut self, host: &mut dyn RenderHost, current_frame: u64) -> usize {
        let mut applied = 0;
        while let Some(toggle) = self
            .pending
            .front()
            .filter(|p| p.due_frame <= current_frame)
            .copied()
        {
            self.pending.pop_front();
            host.set_target_active(toggle.target, toggle.active);
            debug!(
                "Frame {}: render target {} active = {}",
                current_frame, toggle.target.0, toggle.active
            );
            applied += 1;
        }
        applied
    }

    /// Drop every pending toggle.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Get the number of pending toggles.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, target: TargetId) -> bool {
        self.pending.iter().any(|p| p.target == target)
    }
}

/// Cube-map rig that tracks the camera.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentRig {
    rig: CubeMapRig,
}

impl EnvironmentRig {
    /// Create the cube map under the scene root.
    pub fn build(host: &mut dyn RenderHost, config: &EnvironmentConfig) -> Result<Self> {
        let root = host.scene_root();
        let rig = host.create_cube_map(&config.name, config.cube_map_size, root)?;
        info!(
            "Created {}px environment cube map '{}'",
            config.cube_map_size, config.name
        );
        Ok(Self { rig })
    }

    /// Texture the cube map renders into.
    pub const fn texture(&self) -> TextureId {
        self.rig.texture
    }

    pub const fn target(&self) -> TargetId {
        self.rig.target
    }

    pub const fn host_rig(&self) -> &CubeMapRig {
        &self.rig
    }

    /// Move the rig to the camera, keeping its faces world-aligned.
    pub fn follow_camera(&self, host: &mut dyn RenderHost) {
        let position = host.camera().position;
        host.set_position(self.rig.node, position);
        host.set_orientation(self.rig.node, Quat::IDENTITY);
    }

    /// Deactivate the cube map now and reactivate it `frames` frames later.
    pub fn pause(
        &self,
        host: &mut dyn RenderHost,
        toggles: &mut DeferredToggleQueue,
        current_frame: u64,
        frames: u64,
    ) {
        host.set_target_active(self.rig.target, false);
        let due = current_frame + frames.max(1);
        toggles.schedule(self.rig.target, true, due);
        debug!("Paused environment cube map until frame {}", due);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_keeps_due_order() {
        let mut queue = DeferredToggleQueue::new();
        queue.schedule(TargetId(1), true, 10);
        queue.schedule(TargetId(2), true, 4);
        queue.schedule(TargetId(3), false, 7);
        let order: Vec<u64> = queue.pending.iter().map(|p| p.due_frame).collect();
        assert_eq!(order, [4, 7, 10]);
    }

    #[test]
    fn rescheduling_replaces_pending_toggle() {
        let mut queue = DeferredToggleQueue::new();
        queue.schedule(TargetId(1), true, 3);
        queue.schedule(TargetId(1), true, 8);
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(queue.pending[0].due_frame, 8);
        assert!(queue.is_pending(TargetId(1)));
        queue.clear();
        assert!(!queue.is_pending(TargetId(1)));
    }

    #[test]
    fn default_config_matches_documented_values() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.cube_map_size, 256);
        assert_eq!(config.pause_frames, 2);
    }
}
