//! Parameter records for both generators.
//!
//! These are plain values: hosts build them (Bevy users keep them as
//! resources and edit them from their UI) and call [`PhyllotaxisParams::validated`]
//! / [`LSystemParams::validated`] before a run to clamp every field into the
//! range the generators are designed for. Generators themselves trust their
//! input.

use bevy::prelude::*;

pub const MAX_POINTS: u32 = 10_000;
/// Upper bound on rewriting rounds; expansion grows geometrically.
pub const MAX_ITERATIONS: u32 = 8;
pub const MAX_TUBE_RESOLUTION: u32 = 128;
pub const MIN_TUBE_RESOLUTION: u32 = 3;

/// How custom instances on a phyllotaxis field are oriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LeafOrientation {
    /// Face outwards from the center, tilted toward vertical.
    #[default]
    Normal,
    /// Every instance points straight up.
    Upward,
}

/// Vogel spiral settings.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PhyllotaxisParams {
    pub num_points: u32,
    /// Spiral scaling factor `c`: the radius of point `n` is `c * sqrt(n)`.
    pub scale: f32,
    /// Sphere radius in icosphere mode.
    pub point_radius: f32,
    pub use_icospheres: bool,
    /// Instance the point prototype at every point. Takes priority over
    /// icospheres when the host supplies a prototype.
    pub use_custom_instance: bool,
    /// Height added per point: `z_offset * sqrt(n)`.
    pub z_offset: f32,
    /// Dome/bowl term: `z_curvature * radius²`.
    pub z_curvature: f32,
    pub instance_scale: f32,
    pub orientation: LeafOrientation,
    /// In [0, 90]; how far `Normal` orientation is bent toward vertical.
    pub tilt_degrees: f32,
}

impl Default for PhyllotaxisParams {
    fn default() -> Self {
        Self {
            num_points: 200,
            scale: 0.1,
            point_radius: 0.02,
            use_icospheres: true,
            use_custom_instance: false,
            z_offset: 0.0,
            z_curvature: 0.0,
            instance_scale: 0.1,
            orientation: LeafOrientation::Normal,
            tilt_degrees: 0.0,
        }
    }
}

impl PhyllotaxisParams {
    /// Returns a copy with every field clamped into its supported range.
    pub fn validated(&self) -> Self {
        Self {
            num_points: self.num_points.clamp(1, MAX_POINTS),
            scale: self.scale.clamp(0.001, 10.0),
            point_radius: self.point_radius.clamp(0.001, 1.0),
            use_icospheres: self.use_icospheres,
            use_custom_instance: self.use_custom_instance,
            z_offset: self.z_offset.clamp(-1.0, 1.0),
            z_curvature: self.z_curvature.clamp(-5.0, 5.0),
            instance_scale: self.instance_scale.clamp(0.001, 10.0),
            orientation: self.orientation,
            tilt_degrees: self.tilt_degrees.clamp(0.0, 90.0),
        }
    }
}

/// How `F` segments are turned into geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StemStyle {
    /// One edge per segment.
    #[default]
    Lines,
    /// Segments swept into tubes of quads.
    Tubes { radius: f32, resolution: u32 },
}

/// L-System plant settings.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LSystemParams {
    pub axiom: String,
    /// Comma-separated `Symbol:Replacement` list, e.g. `F:F[+F]F[-F]F`.
    pub rules: String,
    pub iterations: u32,
    /// Turn angle for `+ - & ^ \ /`.
    pub angle_degrees: f32,
    /// Distance covered by `F` and `G`.
    pub step_length: f32,
    pub initial_heading: Vec3,
    pub leaf_symbol: char,
    pub leaves_enabled: bool,
    pub leaf_scale: f32,
    pub stem: StemStyle,
}

impl Default for LSystemParams {
    fn default() -> Self {
        Self {
            axiom: "F".to_string(),
            rules: "F:F[+F]F[-F]F".to_string(),
            iterations: 3,
            angle_degrees: 25.7,
            step_length: 0.2,
            initial_heading: Vec3::Z,
            leaf_symbol: 'L',
            leaves_enabled: false,
            leaf_scale: 0.1,
            stem: StemStyle::Lines,
        }
    }
}

impl LSystemParams {
    /// Returns a copy with every field clamped into its supported range.
    pub fn validated(&self) -> Self {
        let stem = match self.stem {
            StemStyle::Lines => StemStyle::Lines,
            StemStyle::Tubes { radius, resolution } => StemStyle::Tubes {
                radius: radius.clamp(0.001, 1.0),
                resolution: resolution.clamp(MIN_TUBE_RESOLUTION, MAX_TUBE_RESOLUTION),
            },
        };

        Self {
            axiom: self.axiom.clone(),
            rules: self.rules.clone(),
            iterations: self.iterations.clamp(1, MAX_ITERATIONS),
            angle_degrees: self.angle_degrees.clamp(0.0, 360.0),
            step_length: self.step_length.clamp(0.01, 5.0),
            initial_heading: self.initial_heading.try_normalize().unwrap_or(Vec3::Z),
            leaf_symbol: self.leaf_symbol,
            leaves_enabled: self.leaves_enabled,
            leaf_scale: self.leaf_scale.clamp(0.01, 2.0),
            stem,
        }
    }
}
