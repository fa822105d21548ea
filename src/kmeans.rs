use super::nearest::nearest_index;
use super::{Color, Error, PaletteGenerator};
use log::{debug, warn};
use rand::{SeedableRng, prelude::*, rngs::StdRng};
use rayon::prelude::*;

/// Iteration cap used by [`KMeans::default`].
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// K-means palette builder.
///
/// Centroids are seeded from randomly picked input colors and refined by
/// alternating an assignment pass (every color joins its nearest centroid)
/// and an update pass (every centroid moves to the mean of its colors) until
/// nothing moves or `max_iterations` update passes have run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KMeans {
    /// Upper bound on update passes. When it is reached the centroids of the
    /// last pass are returned as they are.
    pub max_iterations: usize,
    /// Seed for centroid initialization. `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for KMeans {
    fn default() -> Self {
        KMeans {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
        }
    }
}

impl KMeans {
    /// Default configuration with a fixed seed, for reproducible palettes.
    pub fn with_seed(seed: u64) -> Self {
        KMeans {
            seed: Some(seed),
            ..KMeans::default()
        }
    }

    /// Groups `colors` into `k` clusters and returns their centroids.
    ///
    /// The result always holds exactly `k` colors in cluster order. When `k`
    /// exceeds the number of distinct input colors some centroids will be
    /// duplicates.
    pub fn build_palette(&self, colors: &[Color], k: usize) -> Result<Vec<Color>, Error> {
        if k == 0 {
            return Err(KMeansError::ZeroClusters.into());
        }
        if colors.is_empty() {
            return Err(KMeansError::EmptyColors.into());
        }
        if self.max_iterations == 0 {
            return Err(KMeansError::ZeroIterations.into());
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut centroids = initialize_centroids(colors, k, &mut rng);
        let mut assignments = vec![0usize; colors.len()];

        // reused by every update pass
        let mut sums_r = vec![0u64; k];
        let mut sums_g = vec![0u64; k];
        let mut sums_b = vec![0u64; k];
        let mut counts = vec![0usize; k];

        for iteration in 1..=self.max_iterations {
            assign_clusters(colors, &centroids, &mut assignments);
            let moved = update_centroids(
                colors,
                &assignments,
                &mut centroids,
                &mut sums_r,
                &mut sums_g,
                &mut sums_b,
                &mut counts,
            );
            if !moved {
                debug!(
                    "k-means converged after {} iterations ({} colors, k = {})",
                    iteration,
                    colors.len(),
                    k
                );
                return Ok(centroids);
            }
        }

        warn!(
            "k-means stopped at the {} iteration cap without converging",
            self.max_iterations
        );
        Ok(centroids)
    }
}

impl PaletteGenerator for KMeans {
    fn generate_palette(&self, colors: &[Color], k: usize) -> Result<Vec<Color>, Error> {
        self.build_palette(colors, k)
    }
}

/// Builds a `k` color palette with the default iteration cap.
///
/// Passing a `seed` makes the result reproducible.
pub fn build_palette(colors: &[Color], k: usize, seed: Option<u64>) -> Result<Vec<Color>, Error> {
    KMeans {
        seed,
        ..KMeans::default()
    }
    .build_palette(colors, k)
}

/// Represents an error that can occur during the K-Means algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KMeansError {
    /// Zero clusters were requested.
    #[error("palette size must be at least 1")]
    ZeroClusters,
    /// There are no colors to cluster.
    #[error("no colors to cluster")]
    EmptyColors,
    /// The iteration cap does not allow a single pass.
    #[error("max_iterations must be at least 1")]
    ZeroIterations,
}

fn initialize_centroids(colors: &[Color], k: usize, rng: &mut dyn RngCore) -> Vec<Color> {
    let mut centroids: Vec<Color> = colors
        .choose_multiple(rng, k.min(colors.len()))
        .cloned()
        .collect();

    // k > colors.len(): draw the rest with replacement
    while centroids.len() < k {
        match colors.choose(rng) {
            Some(&c) => centroids.push(c),
            None => break,
        }
    }

    centroids
}

fn assign_clusters(colors: &[Color], centroids: &[Color], assignments: &mut [usize]) {
    assignments
        .par_iter_mut()
        .zip(colors.par_iter())
        .for_each(|(slot, color)| *slot = nearest_index(color, centroids));
}

/// Moves every non-empty cluster's centroid to the truncated mean of its
/// colors. Returns whether any centroid changed.
fn update_centroids(
    colors: &[Color],
    assignments: &[usize],
    centroids: &mut [Color],
    sums_r: &mut [u64],
    sums_g: &mut [u64],
    sums_b: &mut [u64],
    counts: &mut [usize],
) -> bool {
    let k = centroids.len();
    debug_assert_eq!(sums_r.len(), k);
    debug_assert_eq!(sums_g.len(), k);
    debug_assert_eq!(sums_b.len(), k);
    debug_assert_eq!(counts.len(), k);

    sums_r.fill(0);
    sums_g.fill(0);
    sums_b.fill(0);
    counts.fill(0);

    for (c, &cluster) in colors.iter().zip(assignments.iter()) {
        counts[cluster] += 1;
        sums_r[cluster] += c.r as u64;
        sums_g[cluster] += c.g as u64;
        sums_b[cluster] += c.b as u64;
    }

    let mut moved = false;
    for i in 0..k {
        // an empty cluster keeps its centroid
        if counts[i] == 0 {
            continue;
        }
        let n = counts[i] as u64;
        let centroid = Color::new(
            (sums_r[i] / n) as u8,
            (sums_g[i] / n) as u8,
            (sums_b[i] / n) as u8,
            255,
        );
        if centroid != centroids[i] {
            centroids[i] = centroid;
            moved = true;
        }
    }
    moved
}
