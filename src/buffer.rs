use image::{ImageBuffer, Rgb, Rgba};

/// A dense grid of 8-bit RGB pixels that can be read and repainted in place.
///
/// The clustering engine only ever addresses coordinates within `[0, width) × [0, height)`. Implementations for
/// [`image::RgbImage`] and [`image::RgbaImage`] are provided; the alpha channel of the latter is left untouched when
/// repainting.
pub trait PixelBuffer {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Return the color of the pixel at `(x, y)`.
    fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8);

    /// Overwrite the color of the pixel at `(x, y)`.
    fn set_rgb(&mut self, x: u32, y: u32, rgb: (u8, u8, u8));

    fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

impl PixelBuffer for ImageBuffer<Rgb<u8>, Vec<u8>> {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let Rgb([r, g, b]) = *self.get_pixel(x, y);
        (r, g, b)
    }

    fn set_rgb(&mut self, x: u32, y: u32, (r, g, b): (u8, u8, u8)) {
        self.put_pixel(x, y, Rgb([r, g, b]));
    }
}

impl PixelBuffer for ImageBuffer<Rgba<u8>, Vec<u8>> {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let Rgba([r, g, b, _]) = *self.get_pixel(x, y);
        (r, g, b)
    }

    fn set_rgb(&mut self, x: u32, y: u32, (r, g, b): (u8, u8, u8)) {
        let pixel = self.get_pixel_mut(x, y);
        pixel.0[0] = r;
        pixel.0[1] = g;
        pixel.0[2] = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{RgbImage, RgbaImage};

    #[test]
    fn rgb_image_reads_and_writes() {
        let mut image = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        assert_eq!(PixelBuffer::width(&image), 3);
        assert_eq!(PixelBuffer::height(&image), 2);
        assert_eq!(image.pixel_count(), 6);

        image.set_rgb(2, 1, (200, 100, 50));
        assert_eq!(image.rgb(2, 1), (200, 100, 50));
        assert_eq!(image.rgb(0, 0), (1, 2, 3));
    }

    #[test]
    fn rgba_image_keeps_alpha() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 77]));
        image.set_rgb(0, 0, (90, 80, 70));

        assert_eq!(image.rgb(0, 0), (90, 80, 70));
        assert_eq!(image.get_pixel(0, 0).0[3], 77);
    }
}
