use rand::Rng;

/// A point in RGB space. Channels are conceptually in `0..=255` but are not clamped while clustering.
pub type Color = (i32, i32, i32);

/// Euclidean distance between two colors.
pub fn distance(lhs: Color, rhs: Color) -> f64 {
    (squared_distance(lhs, rhs) as f64).sqrt()
}

// exact for any pair of i32 channels, so comparing squared distances orders the same way as comparing distances
pub(crate) fn squared_distance((r1, g1, b1): Color, (r2, g2, b2): Color) -> i128 {
    let dr = r2 as i128 - r1 as i128;
    let dg = g2 as i128 - g1 as i128;
    let db = b2 as i128 - b1 as i128;

    dr * dr + dg * dg + db * db
}

pub(crate) fn clamp_to_rgb((r, g, b): Color) -> (u8, u8, u8) {
    (
        r.clamp(0, u8::MAX as i32) as u8,
        g.clamp(0, u8::MAX as i32) as u8,
        b.clamp(0, u8::MAX as i32) as u8,
    )
}

/// A cluster center and the pixel coordinates currently assigned to it.
#[derive(Debug, Clone, Default)]
pub struct Centroid {
    color: Color,
    members: Vec<(u32, u32)>,
}

impl Centroid {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            members: Vec::new(),
        }
    }

    /// Create a centroid at a uniformly random color.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut centroid = Self::default();
        centroid.initialize_random(rng);
        centroid
    }

    /// Draw each channel independently and uniformly from `0..=255`. Membership is left alone.
    pub fn initialize_random<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.color = (
            rng.gen::<u8>() as i32,
            rng.gen::<u8>() as i32,
            rng.gen::<u8>() as i32,
        );
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn members(&self) -> &[(u32, u32)] {
        &self.members
    }

    /// Empty the membership, keeping the allocation for the next pass.
    pub fn clear_members(&mut self) {
        self.members.clear();
    }

    /// Append a coordinate. Duplicates are not checked for.
    pub fn add_member(&mut self, coord: (u32, u32)) {
        self.members.push(coord);
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
