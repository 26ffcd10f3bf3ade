/// Last known player location, as reported by the upstream relay.
#[derive(Clone, Copy, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct PlayerPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

/// Positions within this distance of each other are considered unchanged for
/// broadcast purposes (see the fan-out loop's "player position unchanged"
/// rule).
pub const POSITION_EPSILON: f64 = 0.01;

impl PlayerPose {
    pub const fn new(x: f64, y: f64, z: f64, yaw: f32, pitch: f32) -> Self {
        Self { x, y, z, yaw, pitch }
    }

    /// Whether `self` has moved beyond [`POSITION_EPSILON`] from `other`.
    pub fn moved_beyond_epsilon(&self, other: &PlayerPose) -> bool {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt() > POSITION_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_jitter_does_not_count_as_movement() {
        let a = PlayerPose::new(0.0, 64.0, 0.0, 0.0, 0.0);
        let b = PlayerPose::new(0.001, 64.0, 0.0, 0.0, 0.0);
        assert!(!a.moved_beyond_epsilon(&b));
    }

    #[test]
    fn real_movement_counts() {
        let a = PlayerPose::new(0.0, 64.0, 0.0, 0.0, 0.0);
        let b = PlayerPose::new(1.0, 64.0, 0.0, 0.0, 0.0);
        assert!(a.moved_beyond_epsilon(&b));
    }
}
