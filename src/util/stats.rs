use std::fmt::Display;

/// Running summary of a sequence of small integer samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub avg: f64,
}

impl Stats {
    pub fn add_sample(&mut self, value: usize) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.avg += (value as f64 - self.avg) / (self.count as f64);
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn merge(&self, other: &Self) -> Self {
        Stats {
            count: self.count + other.count,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            avg: if self.count > 0 || other.count > 0 {
                (self.avg * self.count as f64 + other.avg * other.count as f64)
                    / (self.count + other.count) as f64
            } else {
                0.0
            },
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            min: usize::MAX,
            max: 0,
            avg: 0.0,
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "no samples");
        }
        write!(
            f,
            "{} - {}; avg {:.2}; {} samples",
            self.min, self.max, self.avg, self.count
        )
    }
}

/// Counters collected by a tracer while rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceStatistics {
    /// Primary, depth of field and reflected rays resolved against the scene
    pub rays: usize,
    pub shadow_rays: usize,
    pub misses: usize,
    /// Rays whose nearest hit was shared by several primitives
    pub ambiguous_hits: usize,
    /// Rays that could not be constructed because their direction was degenerate
    pub degenerate_rays: usize,
    /// Deepest reflection level reached by each traced sample
    pub reflection_depth: Stats,
}

impl TraceStatistics {
    pub fn merge(&self, other: &Self) -> Self {
        TraceStatistics {
            rays: self.rays + other.rays,
            shadow_rays: self.shadow_rays + other.shadow_rays,
            misses: self.misses + other.misses,
            ambiguous_hits: self.ambiguous_hits + other.ambiguous_hits,
            degenerate_rays: self.degenerate_rays + other.degenerate_rays,
            reflection_depth: self.reflection_depth.merge(&other.reflection_depth),
        }
    }
}

impl Display for TraceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rays ({} missed, {} ambiguous, {} degenerate), {} shadow rays, reflection depth {}",
            self.rays,
            self.misses,
            self.ambiguous_hits,
            self.degenerate_rays,
            self.shadow_rays,
            self.reflection_depth
        )
    }
}
