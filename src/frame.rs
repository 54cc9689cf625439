//! Orthonormal turtle frame.
//!
//! A [`TurtleFrame`] is the right-handed triad the turtle steers with. The
//! convention throughout the crate is `left = heading × up`, so the columns
//! `(left, heading, up)` form a proper rotation that maps local +X, +Y, +Z
//! onto the turtle's left, heading and up axes.

use bevy::prelude::*;

/// Below this `|heading · Z|` the world vertical is a usable reference for
/// building the initial frame.
const VERTICAL_DOT_LIMIT: f32 = 0.99;

/// One of the three frame axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAxis {
    Heading,
    Up,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleFrame {
    pub heading: Vec3,
    pub up: Vec3,
    pub left: Vec3,
}

impl Default for TurtleFrame {
    fn default() -> Self {
        Self::from_heading(Vec3::Z)
    }
}

impl TurtleFrame {
    /// Builds a frame whose heading points along `heading`.
    ///
    /// World Z is used as the up reference unless the heading is nearly
    /// vertical, in which case world Y takes over. A zero heading falls back
    /// to +Z.
    pub fn from_heading(heading: Vec3) -> Self {
        let heading = heading.try_normalize().unwrap_or(Vec3::Z);
        let reference = if heading.dot(Vec3::Z).abs() < VERTICAL_DOT_LIMIT {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let left = heading.cross(reference).normalize();
        let up = left.cross(heading).normalize();
        Self { heading, up, left }
    }

    pub fn axis(&self, axis: FrameAxis) -> Vec3 {
        match axis {
            FrameAxis::Heading => self.heading,
            FrameAxis::Up => self.up,
            FrameAxis::Left => self.left,
        }
    }

    /// Rotates the two axes other than `axis` by `angle` radians about it.
    pub fn rotate(&mut self, axis: FrameAxis, angle: f32) {
        let rotation = Quat::from_axis_angle(self.axis(axis), angle);
        match axis {
            FrameAxis::Up => {
                self.heading = rotation * self.heading;
                self.left = rotation * self.left;
            }
            FrameAxis::Left => {
                self.heading = rotation * self.heading;
                self.up = rotation * self.up;
            }
            FrameAxis::Heading => {
                self.up = rotation * self.up;
                self.left = rotation * self.left;
            }
        }
        self.orthonormalize();
    }

    /// Gram-Schmidt pass: heading wins, up is made perpendicular to it and
    /// left is rebuilt from the two.
    pub fn orthonormalize(&mut self) {
        self.heading = self.heading.normalize();
        self.up = self
            .up
            .reject_from_normalized(self.heading)
            .try_normalize()
            .unwrap_or_else(|| self.heading.any_orthonormal_vector());
        self.left = self.heading.cross(self.up);
    }

    /// Rotation mapping local (X, Y, Z) onto (left, heading, up).
    pub fn rotation(&self) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.left, self.heading, self.up)).normalize()
    }

    /// Maps a point in frame-local coordinates into world space around `origin`.
    pub fn transform_point(&self, origin: Vec3, local: Vec3) -> Vec3 {
        origin + self.left * local.x + self.heading * local.y + self.up * local.z
    }

    /// Largest deviation from unit length or mutual orthogonality.
    pub fn orthonormality_error(&self) -> f32 {
        [
            (self.heading.length() - 1.0).abs(),
            (self.up.length() - 1.0).abs(),
            (self.left.length() - 1.0).abs(),
            self.heading.dot(self.up).abs(),
            self.heading.dot(self.left).abs(),
            self.up.dot(self.left).abs(),
        ]
        .into_iter()
        .fold(0.0, f32::max)
    }
}
