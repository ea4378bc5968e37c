//! Embedded JPEG preview lookup.
//!
//! Most RAW containers carry one or more JPEG previews. They are located by
//! walking the JPEG marker structure from every start-of-image marker; the
//! largest complete stream wins.

const SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const TEM: u8 = 0x01;

fn is_standalone(marker: u8) -> bool {
    marker == TEM || (0xD0..=0xD7).contains(&marker)
}

/// Returns the largest complete JPEG stream embedded in `data`.
pub fn find_embedded_jpeg(data: &[u8]) -> Option<&[u8]> {
    let mut best: Option<&[u8]> = None;
    let mut pos = 0;

    while let Some(offset) = data[pos..].windows(SOI.len()).position(|w| w == SOI) {
        let start = pos + offset;
        match jpeg_len(&data[start..]) {
            Some(len) => {
                let candidate = &data[start..start + len];
                if best.is_none_or(|b| candidate.len() > b.len()) {
                    best = Some(candidate);
                }
                pos = start + len;
            }
            None => pos = start + 1,
        }
    }

    best
}

/// Length of the JPEG stream starting at `data[0]`, if it is complete.
fn jpeg_len(data: &[u8]) -> Option<usize> {
    let mut pos = 2;

    loop {
        if pos + 1 >= data.len() || data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == EOI {
            return Some(pos + 2);
        }
        if is_standalone(marker) {
            pos += 2;
            continue;
        }

        let len_bytes = data.get(pos + 2..pos + 4)?;
        let seg_len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        if seg_len < 2 {
            return None;
        }
        pos += 2 + seg_len;

        if marker == SOS {
            // Entropy coded data runs until the next marker that is neither
            // a stuffed 0xFF00 nor a restart marker.
            loop {
                if pos + 1 >= data.len() {
                    return None;
                }
                if data[pos] == 0xFF {
                    let next = data[pos + 1];
                    if next != 0x00 && !(0xD0..=0xD7).contains(&next) {
                        break;
                    }
                }
                pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_jpeg(payload: &[u8]) -> Vec<u8> {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0xAA, 0xBB];
        jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
        jpeg.extend_from_slice(payload);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn finds_jpeg_inside_container_bytes() {
        let jpeg = tiny_jpeg(&[0x01, 0x02, 0xFF, 0x00, 0x03]);
        let mut container = b"HEADER....".to_vec();
        container.extend_from_slice(&jpeg);
        container.extend_from_slice(b"....SENSOR DATA");

        assert_eq!(find_embedded_jpeg(&container), Some(jpeg.as_slice()));
    }

    #[test]
    fn restart_markers_do_not_end_the_scan() {
        let jpeg = tiny_jpeg(&[0x10, 0xFF, 0xD0, 0x20, 0xFF, 0xD1, 0x30]);
        assert_eq!(find_embedded_jpeg(&jpeg), Some(jpeg.as_slice()));
    }

    #[test]
    fn picks_the_largest_preview() {
        let thumb = tiny_jpeg(&[0x01]);
        let preview = tiny_jpeg(&[0x05; 64]);
        let mut container = Vec::new();
        container.extend_from_slice(&thumb);
        container.extend_from_slice(b"gap");
        container.extend_from_slice(&preview);

        assert_eq!(find_embedded_jpeg(&container), Some(preview.as_slice()));
    }

    #[test]
    fn truncated_stream_is_ignored() {
        let mut jpeg = tiny_jpeg(&[0x01, 0x02]);
        jpeg.truncate(jpeg.len() - 2);

        assert_eq!(find_embedded_jpeg(&jpeg), None);
        assert_eq!(find_embedded_jpeg(b"no preview here"), None);
    }
}
