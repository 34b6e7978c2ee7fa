// Copyright 2022 Spanfile
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A library to reduce the color palette of an image with k-means clustering.
//!
//! Every pixel is assigned to the nearest of K centroids in RGB space, each centroid is moved to the mean color of its
//! pixels, and this repeats until no centroid moves further than [`MOVEMENT_THRESHOLD`] or the iteration limit is hit.
//! Finally each pixel is repainted with its centroid's color.
//!
//! ```no_run
//! use kmeans_reduce::Reduction;
//!
//! let image = kmeans_reduce::image::open("photo.png").unwrap().to_rgb8();
//! let reduction = Reduction::from_image(image).clusters(8).seed(42).generate().unwrap();
//!
//! for swatch in reduction.swatches() {
//!     println!("{:?} x {}", swatch.rgb(), swatch.population());
//! }
//! ```

mod assignment;
mod buffer;
mod centroid;
mod convergence;
mod engine;
mod relocation;
mod swatch;

pub const DEFAULT_CLUSTER_COUNT: usize = 10;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
/// Centroids moving at most this far between iterations count as stationary.
pub const MOVEMENT_THRESHOLD: f64 = 1.0;

pub use crate::{
    assignment::{assign, nearest_centroid},
    buffer::PixelBuffer,
    centroid::{distance, Centroid, Color},
    convergence::{ConvergenceTracker, Status, Stop},
    engine::{Clustering, ClusteringRun, Config, ConfigError, KMeans},
    relocation::{mean_color, relocate},
    swatch::Swatch,
};
pub use image;
pub use palette;

use palette::IntoColor;

/// A reduced image together with the clustering that produced it.
#[derive(Debug)]
pub struct Reduction<B> {
    image: B,
    clustering: Clustering,
}

pub struct ReductionBuilder<B>
where
    B: PixelBuffer,
{
    image: B,
    config: Config,
}

impl<B> Reduction<B>
where
    B: PixelBuffer,
{
    pub fn from_image(image: B) -> ReductionBuilder<B> {
        ReductionBuilder::from_image(image)
    }

    /// The repainted image.
    pub fn image(&self) -> &B {
        &self.image
    }

    pub fn into_image(self) -> B {
        self.image
    }

    pub fn clustering(&self) -> &Clustering {
        &self.clustering
    }

    pub fn swatches(&self) -> Vec<Swatch> {
        self.clustering.swatches()
    }

    pub fn most_prominent_color(&self) -> Option<(u8, u8, u8)> {
        self.clustering.most_prominent_color()
    }
}

impl<B> ReductionBuilder<B>
where
    B: PixelBuffer,
{
    pub fn from_image(image: B) -> Self {
        Self {
            image,
            config: Config::default(),
        }
    }

    pub fn clusters(self, clusters: usize) -> Self {
        Self {
            config: self.config.with_clusters(clusters),
            ..self
        }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            config: self.config.with_max_iterations(max_iterations),
            ..self
        }
    }

    pub fn seed(self, seed: u64) -> Self {
        Self {
            config: self.config.with_seed(seed),
            ..self
        }
    }

    pub fn clear_seed(self) -> Self {
        Self {
            config: Config {
                seed: None,
                ..self.config
            },
            ..self
        }
    }

    /// Replace the whole configuration.
    pub fn config(self, config: Config) -> Self {
        Self { config, ..self }
    }

    pub fn generate(mut self) -> Result<Reduction<B>, ConfigError> {
        let kmeans = KMeans::new(self.config)?;
        let clustering = kmeans.run(&mut self.image);

        Ok(Reduction {
            image: self.image,
            clustering,
        })
    }
}

fn rgb_to_hsl(rgb: (u8, u8, u8)) -> (f32, f32, f32) {
    let raw = palette::Srgb::from_components(rgb);
    let raw_float: palette::Srgb<f32> = raw.into_format();
    let hsl: palette::Hsl = raw_float.into_color();
    let (h, s, l) = hsl.into_components();

    (h.into_positive_degrees(), s, l)
}
