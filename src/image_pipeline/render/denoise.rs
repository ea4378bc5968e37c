use crate::image_pipeline::debayer::RgbImageData;

/// 3x3 median filter applied to each channel, edges replicated.
pub fn median3x3(image: &RgbImageData) -> RgbImageData {
    let (width, height) = (image.width, image.height);
    let mut data = vec![0u16; image.data.len()];
    let mut window = [0u16; 9];

    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                let mut n = 0;
                for dy in [-1isize, 0, 1] {
                    for dx in [-1isize, 0, 1] {
                        let sy = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                        let sx = (x as isize + dx).clamp(0, width as isize - 1) as usize;
                        window[n] = image.data[(sy * width + sx) * 3 + c];
                        n += 1;
                    }
                }
                window.sort_unstable();
                data[(y * width + x) * 3 + c] = window[4];
            }
        }
    }

    RgbImageData {
        width,
        height,
        data,
        bits_per_sample: image.bits_per_sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_single_hot_pixel() {
        let mut data = vec![100u16; 3 * 3 * 3];
        data[(3 + 1) * 3] = 60000;
        let image = RgbImageData { width: 3, height: 3, data, bits_per_sample: 16 };

        let filtered = median3x3(&image);
        assert_eq!(filtered.pixel(1, 1), [100, 100, 100]);
    }

    #[test]
    fn flat_image_is_unchanged() {
        let image = RgbImageData { width: 4, height: 2, data: vec![7; 24], bits_per_sample: 12 };
        assert_eq!(median3x3(&image), image);
    }
}
