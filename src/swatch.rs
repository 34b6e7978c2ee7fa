use crate::centroid::{self, Centroid};

/// One color of the reduced palette: a final centroid color and how many pixels were painted with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swatch {
    cluster: usize,
    red: u8,
    green: u8,
    blue: u8,
    population: u32,
}

impl Swatch {
    pub fn new(cluster: usize, (red, green, blue): (u8, u8, u8), population: u32) -> Swatch {
        Self {
            cluster,
            red,
            green,
            blue,
            population,
        }
    }

    pub(crate) fn from_centroid(cluster: usize, centroid: &Centroid) -> Swatch {
        Self::new(
            cluster,
            centroid::clamp_to_rgb(centroid.color()),
            centroid.members().len() as u32,
        )
    }

    /// Index of the centroid this swatch was taken from.
    pub fn cluster(self) -> usize {
        self.cluster
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    pub fn hsl(self) -> (f32, f32, f32) {
        crate::rgb_to_hsl(self.rgb())
    }

    pub fn population(self) -> u32 {
        self.population
    }
}
