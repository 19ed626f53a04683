use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::Distance;

use crate::corners::CornerStrategy;

/// Global settings for a rebuild. Every field has a default, so a partial JSON object works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The width of one lane. A road's width is its total lane count times this.
    pub lane_width: Distance,
    /// Two strips closer than this multiple of `lane_width` count as crossing, even if they don't
    /// quite overlap. This absorbs floating point noise and near-tangent roads.
    pub crossing_threshold_factor: f64,
    /// Kept pieces shorter than this are dropped. Junction trimming never cuts a piece below it.
    pub min_kept_piece_length: Distance,
    /// The radius used to round the corners of junction footprints.
    pub junction_fillet_radius: Distance,
    /// If false, pieces are still trimmed and grouped into nodes, but no junction footprints are
    /// built.
    pub junctions_enabled: bool,
    /// Fillet arcs are sampled at least this densely...
    pub max_sample_spacing: Distance,
    /// ... and densely enough that no chord strays further than this from the true arc.
    pub max_chord_error: Distance,
    /// How many meters one texture repeat covers, for generated meshes.
    pub texture_scale: f64,
    pub corner_strategy: CornerStrategy,
    /// Run the narrow phase of crossing detection and the junction pass on a thread pool. The
    /// output is identical either way.
    pub parallel: bool,
    /// Record intermediate geometry in `RoadNetworkResult::trace`.
    pub record_trace: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            lane_width: Distance::meters(3.5),
            crossing_threshold_factor: 0.1,
            min_kept_piece_length: Distance::meters(1.0),
            junction_fillet_radius: Distance::meters(3.0),
            junctions_enabled: true,
            max_sample_spacing: Distance::meters(1.0),
            max_chord_error: Distance::meters(0.05),
            texture_scale: 4.0,
            corner_strategy: CornerStrategy::OddWins,
            parallel: false,
            record_trace: false,
        }
    }
}

impl Config {
    /// A malformed config is a programming error, not a problem with the road data, so it fails
    /// the whole rebuild.
    pub fn validate(&self) -> Result<()> {
        if self.lane_width <= Distance::ZERO {
            bail!("lane_width must be positive, not {}", self.lane_width);
        }
        if !self.crossing_threshold_factor.is_finite() || self.crossing_threshold_factor <= 0.0 {
            bail!(
                "crossing_threshold_factor must be positive, not {}",
                self.crossing_threshold_factor
            );
        }
        if self.min_kept_piece_length < Distance::ZERO {
            bail!(
                "min_kept_piece_length can't be negative: {}",
                self.min_kept_piece_length
            );
        }
        if self.junction_fillet_radius < Distance::ZERO {
            bail!(
                "junction_fillet_radius can't be negative: {}",
                self.junction_fillet_radius
            );
        }
        if self.max_sample_spacing <= Distance::ZERO {
            bail!(
                "max_sample_spacing must be positive, not {}",
                self.max_sample_spacing
            );
        }
        if self.max_chord_error <= Distance::ZERO {
            bail!(
                "max_chord_error must be positive, not {}",
                self.max_chord_error
            );
        }
        if !self.texture_scale.is_finite() || self.texture_scale <= 0.0 {
            bail!("texture_scale must be positive, not {}", self.texture_scale);
        }
        Ok(())
    }

    /// Strips closer than this are crossing.
    pub fn crossing_threshold(&self) -> Distance {
        self.lane_width * self.crossing_threshold_factor
    }
}
