use crate::{
    buffer::PixelBuffer,
    centroid::{self, Centroid, Color},
};

/// Index of the centroid closest to `color`. On exact ties the earliest centroid wins.
pub fn nearest_centroid(centroids: &[Centroid], color: Color) -> Option<usize> {
    let mut min_distance = i128::MAX;
    let mut closest = None;

    for (index, centroid) in centroids.iter().enumerate() {
        let distance = centroid::squared_distance(color, centroid.color());

        // strictly less, so an equally close later centroid never steals the pixel
        if distance < min_distance {
            min_distance = distance;
            closest = Some(index);
        }
    }

    closest
}

/// Assign every pixel in the buffer to its nearest centroid.
///
/// All memberships are cleared first, then the buffer is scanned row by row. Each coordinate ends up in exactly one
/// centroid's membership, and `owners` is rewritten to hold the owning centroid index of every pixel in row-major
/// order so ownership can be looked up without scanning the memberships.
pub fn assign<B>(buffer: &B, centroids: &mut [Centroid], owners: &mut Vec<Option<usize>>)
where
    B: PixelBuffer + ?Sized,
{
    for centroid in centroids.iter_mut() {
        centroid.clear_members();
    }

    owners.clear();
    owners.reserve(buffer.pixel_count());

    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            let (r, g, b) = buffer.rgb(x, y);
            let closest = nearest_centroid(centroids, (r as i32, g as i32, b as i32));

            if let Some(index) = closest {
                centroids[index].add_member((x, y));
            }

            owners.push(closest);
        }
    }
}
