use crate::{
    assignment,
    buffer::PixelBuffer,
    centroid::{self, Centroid, Color},
    convergence::{ConvergenceTracker, Status, Stop},
    relocation,
    swatch::Swatch,
    DEFAULT_CLUSTER_COUNT, DEFAULT_MAX_ITERATIONS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one cluster is required")]
    NoClusters,

    #[error("the maximum iteration count must be at least 1")]
    NoIterations,
}

/// Parameters of a clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Number of clusters, i.e. the number of colors in the reduced image.
    pub clusters: usize,
    /// Hard cap on the number of convergence checks.
    pub max_iterations: usize,
    /// Seed for the centroid initialization. `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTER_COUNT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
        }
    }
}

impl Config {
    pub fn with_clusters(self, clusters: usize) -> Self {
        Self { clusters, ..self }
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self { max_iterations, ..self }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clusters == 0 {
            return Err(ConfigError::NoClusters);
        }

        if self.max_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }

        Ok(())
    }
}

/// A validated k-means color reducer. Cheap to keep around and reuse; every [`KMeans::run`] is independent.
#[derive(Debug, Clone)]
pub struct KMeans {
    config: Config,
}

impl KMeans {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Cluster the buffer's colors and repaint every pixel with its cluster's mean color.
    ///
    /// Blocks until the run converges or hits the iteration limit.
    pub fn run<B>(&self, buffer: &mut B) -> Clustering
    where
        B: PixelBuffer + ?Sized,
    {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut run = ClusteringRun::new(self.config.clusters, self.config.max_iterations, &mut rng);
        run.run_to_completion(buffer);
        run.repaint(buffer);

        let clustering = run.finish();
        info!(
            iterations = clustering.iterations(),
            stop = ?clustering.stop(),
            colors = clustering.swatches().len(),
            "clustering finished"
        );

        clustering
    }
}

/// State of one clustering run: the centroids, the convergence tracker and the per-pixel owner grid.
#[derive(Debug)]
pub struct ClusteringRun {
    centroids: Vec<Centroid>,
    tracker: ConvergenceTracker,
    owners: Vec<Option<usize>>,
    // width of the buffer the owner grid was built from
    width: u32,
    stop: Option<Stop>,
}

impl ClusteringRun {
    /// Seed `clusters` centroids at random colors drawn from `rng`.
    pub fn new<R>(clusters: usize, max_iterations: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let centroids = (0..clusters).map(|_| Centroid::random(rng)).collect();
        Self::from_centroids(centroids, max_iterations)
    }

    /// Start a run from explicitly placed centroids.
    pub fn from_centroids(centroids: Vec<Centroid>, max_iterations: usize) -> Self {
        Self {
            centroids,
            tracker: ConvergenceTracker::new(max_iterations),
            owners: Vec::new(),
            width: 0,
            stop: None,
        }
    }

    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// Why the run stopped, once a check has asked it to.
    pub fn stop(&self) -> Option<Stop> {
        self.stop
    }

    /// One assign, relocate and check round.
    pub fn step<B>(&mut self, buffer: &B) -> Status
    where
        B: PixelBuffer + ?Sized,
    {
        assignment::assign(buffer, &mut self.centroids, &mut self.owners);
        self.width = buffer.width();
        relocation::relocate(buffer, &mut self.centroids);

        let status = self.tracker.check(&self.centroids);
        debug!(iteration = self.tracker.iteration(), ?status, "clustering iteration");

        if let Status::Stop(stop) = status {
            self.stop = Some(stop);
        }

        status
    }

    pub fn run_to_completion<B>(&mut self, buffer: &B) -> Stop
    where
        B: PixelBuffer + ?Sized,
    {
        loop {
            if let Status::Stop(stop) = self.step(buffer) {
                return stop;
            }
        }
    }

    /// Paint every member pixel with its centroid's color. Pixels without an owner are left alone.
    pub fn repaint<B>(&self, buffer: &mut B)
    where
        B: PixelBuffer + ?Sized,
    {
        for centroid in &self.centroids {
            let rgb = centroid::clamp_to_rgb(centroid.color());

            for &(x, y) in centroid.members() {
                buffer.set_rgb(x, y, rgb);
            }
        }
    }

    /// Summarize the run. The owner grid and stop reason are the ones recorded by the last [`ClusteringRun::step`].
    pub fn finish(self) -> Clustering {
        let swatches = self
            .centroids
            .iter()
            .enumerate()
            .map(|(index, centroid)| Swatch::from_centroid(index, centroid))
            .collect();

        Clustering {
            colors: self.centroids.iter().map(Centroid::color).collect(),
            swatches,
            owners: self.owners,
            width: self.width,
            iterations: self.tracker.iteration(),
            stop: self.stop,
        }
    }
}

/// Outcome of a clustering run.
#[derive(Debug, Clone)]
pub struct Clustering {
    colors: Vec<Color>,
    swatches: Vec<Swatch>,
    owners: Vec<Option<usize>>,
    width: u32,
    iterations: usize,
    stop: Option<Stop>,
}

impl Clustering {
    /// Final centroid colors, in the order the centroids were created.
    pub fn centroids(&self) -> &[Color] {
        &self.colors
    }

    /// Number of pixels in each cluster, by centroid index.
    pub fn populations(&self) -> Vec<u32> {
        self.swatches.iter().map(|swatch| swatch.population()).collect()
    }

    /// Swatches of every cluster that ended up with at least one pixel.
    pub fn swatches(&self) -> Vec<Swatch> {
        self.swatches
            .iter()
            .copied()
            .filter(|swatch| swatch.population() > 0)
            .collect()
    }

    /// Index of the centroid the pixel at `(x, y)` belongs to.
    pub fn owner(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width {
            return None;
        }

        let index = y as usize * self.width as usize + x as usize;
        self.owners.get(index).copied().flatten()
    }

    /// Number of convergence checks performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Why the run stopped. `None` if it was finished before any check asked it to stop.
    pub fn stop(&self) -> Option<Stop> {
        self.stop
    }

    pub fn converged(&self) -> bool {
        self.stop == Some(Stop::Converged)
    }

    pub fn most_prominent_color(&self) -> Option<(u8, u8, u8)> {
        self.swatches
            .iter()
            .filter(|swatch| swatch.population() > 0)
            .max_by_key(|swatch| swatch.population())
            .map(|swatch| swatch.rgb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn black_and_white() -> RgbImage {
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, Rgb([0, 0, 0]));
        image.put_pixel(1, 0, Rgb([255, 255, 255]));
        image.put_pixel(0, 1, Rgb([0, 0, 0]));
        image.put_pixel(1, 1, Rgb([255, 255, 255]));
        image
    }

    #[test]
    fn config_validation() {
        assert!(Config::default().validate().is_ok());
        assert_eq!(Config::default().clusters, 10);
        assert_eq!(Config::default().max_iterations, 100);

        assert_eq!(
            KMeans::new(Config::default().with_clusters(0)).unwrap_err(),
            ConfigError::NoClusters
        );
        assert_eq!(
            KMeans::new(Config::default().with_max_iterations(0)).unwrap_err(),
            ConfigError::NoIterations
        );
    }

    #[test]
    fn two_colors_two_clusters() {
        let original = black_and_white();

        for seed in 0..16 {
            let mut image = original.clone();
            let kmeans = KMeans::new(Config::default().with_clusters(2).with_seed(seed)).unwrap();
            let clustering = kmeans.run(&mut image);

            let mut colors = clustering.centroids().to_vec();
            colors.sort();

            // both random centroids can land nearer to the same color, leaving one cluster empty
            if clustering.swatches().len() == 2 {
                assert_eq!(colors, vec![(0, 0, 0), (255, 255, 255)]);
                assert_eq!(image, original);
            }

            assert!(clustering.converged());
        }
    }

    #[test]
    fn explicit_centroids_find_both_colors() {
        let mut image = black_and_white();
        let mut run = ClusteringRun::from_centroids(vec![Centroid::new((10, 10, 10)), Centroid::new((200, 200, 200))], 100);

        run.run_to_completion(&image);
        run.repaint(&mut image);
        let clustering = run.finish();

        assert_eq!(clustering.centroids(), &[(0, 0, 0), (255, 255, 255)]);
        assert_eq!(clustering.populations(), vec![2, 2]);
        assert_eq!(image, black_and_white());
        assert_eq!(clustering.owner(0, 1), Some(0));
        assert_eq!(clustering.owner(1, 1), Some(1));
        assert_eq!(clustering.owner(2, 0), None);
        assert_eq!(clustering.owner(0, 2), None);
    }

    #[test]
    fn run_records_width_and_stop() {
        let image = RgbImage::from_fn(3, 2, |x, _| if x == 0 { Rgb([0, 0, 0]) } else { Rgb([250, 250, 250]) });
        let mut run = ClusteringRun::from_centroids(vec![Centroid::new((10, 10, 10)), Centroid::new((200, 200, 200))], 100);

        assert_eq!(run.step(&image), Status::Continue);
        assert_eq!(run.stop(), None);

        let stop = run.run_to_completion(&image);
        assert_eq!(run.stop(), Some(stop));

        let clustering = run.finish();
        assert_eq!(clustering.stop(), Some(Stop::Converged));
        assert_eq!(clustering.owner(0, 1), Some(0));
        assert_eq!(clustering.owner(2, 0), Some(1));
        assert_eq!(clustering.owner(2, 1), Some(1));
        assert_eq!(clustering.owner(3, 0), None);
    }

    #[test]
    fn unfinished_run_has_no_stop() {
        let image = black_and_white();
        let mut run = ClusteringRun::from_centroids(vec![Centroid::new((10, 10, 10))], 100);

        run.step(&image);
        let clustering = run.finish();

        assert_eq!(clustering.stop(), None);
        assert!(!clustering.converged());
        assert_eq!(clustering.iterations(), 1);
        assert_eq!(clustering.owner(1, 1), Some(0));
    }

    #[test]
    fn converges_after_stable_iteration() {
        let image = black_and_white();
        let mut run = ClusteringRun::from_centroids(vec![Centroid::new((10, 10, 10)), Centroid::new((200, 200, 200))], 100);

        // the first check only snapshots; both centroids are already on their colors by then
        assert_eq!(run.step(&image), Status::Continue);
        assert_eq!(run.step(&image), Status::Stop(Stop::Converged));
    }

    #[test]
    fn iteration_cap_bounds_checks() {
        let image = RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, ((x * y) % 256) as u8]));

        for max_iterations in 1..5 {
            let mut buffer = image.clone();
            let kmeans = KMeans::new(
                Config::default()
                    .with_clusters(6)
                    .with_max_iterations(max_iterations)
                    .with_seed(3),
            )
            .unwrap();

            let clustering = kmeans.run(&mut buffer);
            assert!(clustering.iterations() <= max_iterations);
        }
    }

    #[test]
    fn single_iteration_stops_at_limit() {
        let mut image = black_and_white();
        let kmeans = KMeans::new(Config::default().with_clusters(2).with_max_iterations(1).with_seed(9)).unwrap();

        let clustering = kmeans.run(&mut image);
        assert_eq!(clustering.iterations(), 1);
        assert_eq!(clustering.stop(), Some(Stop::IterationLimit));
    }

    #[test]
    fn empty_buffer_converges_immediately() {
        let mut image = RgbImage::new(0, 0);
        let kmeans = KMeans::new(Config::default().with_clusters(4).with_seed(1)).unwrap();

        let clustering = kmeans.run(&mut image);
        assert_eq!(clustering.iterations(), 2);
        assert!(clustering.converged());
        assert!(clustering.swatches().is_empty());
        assert_eq!(clustering.most_prominent_color(), None);
        assert_eq!(clustering.centroids().len(), 4);
    }

    #[test]
    fn same_seed_same_result() {
        let image = RgbImage::from_fn(12, 9, |x, y| Rgb([(x * 20) as u8, (y * 27) as u8, 128]));
        let kmeans = KMeans::new(Config::default().with_clusters(5).with_seed(1234)).unwrap();

        let mut first = image.clone();
        let mut second = image.clone();
        let a = kmeans.run(&mut first);
        let b = kmeans.run(&mut second);

        assert_eq!(a.centroids(), b.centroids());
        assert_eq!(a.iterations(), b.iterations());
        assert_eq!(first, second);
    }

    #[test]
    fn repainted_image_uses_only_palette_colors() {
        let mut image = RgbImage::from_fn(10, 10, |x, y| Rgb([(x * 25) as u8, (y * 25) as u8, ((x + y) * 12) as u8]));
        let kmeans = KMeans::new(Config::default().with_clusters(3).with_seed(77)).unwrap();

        let clustering = kmeans.run(&mut image);
        let palette: Vec<(u8, u8, u8)> = clustering.swatches().iter().map(|swatch| swatch.rgb()).collect();

        assert!(palette.len() <= 3);
        assert_eq!(clustering.populations().iter().sum::<u32>(), 100);
        for (x, y, pixel) in image.enumerate_pixels() {
            let rgb = (pixel.0[0], pixel.0[1], pixel.0[2]);
            assert!(palette.contains(&rgb));

            let owner = clustering.owner(x, y).unwrap();
            assert_eq!(centroid::clamp_to_rgb(clustering.centroids()[owner]), rgb);
        }
    }

    #[test]
    fn most_prominent_is_largest_cluster() {
        let mut image = RgbImage::from_pixel(3, 1, Rgb([250, 0, 0]));
        image.put_pixel(2, 0, Rgb([0, 0, 250]));
        let mut run = ClusteringRun::from_centroids(vec![Centroid::new((0, 0, 255)), Centroid::new((255, 0, 0))], 100);

        run.run_to_completion(&image);
        let clustering = run.finish();

        assert_eq!(clustering.most_prominent_color(), Some((250, 0, 0)));
    }
}
