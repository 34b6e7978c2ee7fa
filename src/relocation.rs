use crate::{
    buffer::PixelBuffer,
    centroid::{Centroid, Color},
};
use tracing::trace;

/// Mean color of the given pixels, truncated per channel. `None` if there are no pixels.
pub fn mean_color<B>(buffer: &B, members: &[(u32, u32)]) -> Option<Color>
where
    B: PixelBuffer + ?Sized,
{
    if members.is_empty() {
        return None;
    }

    let (red_sum, green_sum, blue_sum) =
        members
            .iter()
            .fold((0u64, 0u64, 0u64), |(red_sum, green_sum, blue_sum), &(x, y)| {
                let (r, g, b) = buffer.rgb(x, y);
                (red_sum + r as u64, green_sum + g as u64, blue_sum + b as u64)
            });

    let n = members.len() as u64;
    Some(((red_sum / n) as i32, (green_sum / n) as i32, (blue_sum / n) as i32))
}

/// Move every centroid to the mean color of its members. Centroids without members keep their color.
pub fn relocate<B>(buffer: &B, centroids: &mut [Centroid])
where
    B: PixelBuffer + ?Sized,
{
    for (index, centroid) in centroids.iter_mut().enumerate() {
        match mean_color(buffer, centroid.members()) {
            Some(mean) => centroid.set_color(mean),
            None => trace!(index, color = ?centroid.color(), "empty cluster left in place"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn mean_truncates_per_channel() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([10, 20, 30]));
        image.put_pixel(1, 0, Rgb([20, 30, 40]));

        let mut centroids = vec![Centroid::new((0, 0, 0))];
        centroids[0].add_member((0, 0));
        centroids[0].add_member((1, 0));

        relocate(&image, &mut centroids);
        assert_eq!(centroids[0].color(), (15, 25, 35));
    }

    #[test]
    fn mean_rounds_down() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([0, 1, 254]));
        image.put_pixel(1, 0, Rgb([1, 2, 255]));

        assert_eq!(mean_color(&image, &[(0, 0), (1, 0)]), Some((0, 1, 254)));
    }

    #[test]
    fn empty_cluster_keeps_color() {
        let image = RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]));
        let mut centroids = vec![Centroid::new((100, 100, 100)), Centroid::new((3, 200, 7))];
        for y in 0..2 {
            for x in 0..2 {
                centroids[0].add_member((x, y));
            }
        }

        relocate(&image, &mut centroids);

        assert_eq!(centroids[0].color(), (100, 100, 100));
        assert_eq!(centroids[1].color(), (3, 200, 7));
        assert_eq!(mean_color(&image, &[]), None);
    }
}
