//! Color space conversion helpers

pub type Matrix3 = [[f32; 3]; 3];

const SRGB_TO_XYZ: Matrix3 = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

const ADOBE_RGB_TO_XYZ: Matrix3 = [
    [0.5767309, 0.1855540, 0.1881852],
    [0.2973769, 0.6273491, 0.0752741],
    [0.0270343, 0.0706872, 0.9911085],
];

const PROPHOTO_RGB_TO_XYZ: Matrix3 = [
    [0.7976749, 0.1351917, 0.0313534],
    [0.2880402, 0.7118741, 0.0000857],
    [0.0000000, 0.0000000, 0.8252100],
];

/// D65 white point in XYZ
const D65_WHITE: [f32; 3] = [0.95047, 1.0, 1.08883];

/// RGB spaces the renderer can encode to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSpace {
    Srgb,
    AdobeRgb,
    ProPhotoRgb,
}

impl OutputSpace {
    fn to_xyz(self) -> Matrix3 {
        match self {
            OutputSpace::Srgb => SRGB_TO_XYZ,
            OutputSpace::AdobeRgb => ADOBE_RGB_TO_XYZ,
            OutputSpace::ProPhotoRgb => PROPHOTO_RGB_TO_XYZ,
        }
    }

    /// Transfer curve of the space, linear 0..1 in, encoded 0..1 out.
    pub fn encode(self, v: f32) -> f32 {
        let v = v.clamp(0.0, 1.0);
        match self {
            OutputSpace::Srgb => {
                if v <= 0.003_130_8 {
                    12.92 * v
                } else {
                    1.055 * v.powf(1.0 / 2.4) - 0.055
                }
            }
            OutputSpace::AdobeRgb => v.powf(256.0 / 563.0),
            OutputSpace::ProPhotoRgb => {
                if v < 1.0 / 512.0 {
                    16.0 * v
                } else {
                    v.powf(1.0 / 1.8)
                }
            }
        }
    }
}

pub fn multiply(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0f32; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[r][k] * b[k][c]).sum();
        }
    }
    out
}

pub fn apply(m: &Matrix3, v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

pub fn invert(m: &Matrix3) -> Option<Matrix3> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if det.abs() < f32::EPSILON || !det.is_finite() {
        return None;
    }
    let inv = 1.0 / det;
    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv,
        ],
    ])
}

fn camera_rows(xyz_to_cam: &[[f32; 3]; 4]) -> Matrix3 {
    [xyz_to_cam[0], xyz_to_cam[1], xyz_to_cam[2]]
}

/// Matrix from white-balanced camera RGB to linear `space` RGB.
///
/// Rows of camera-from-space are normalized to sum to one so that a neutral
/// camera value maps to a neutral output value. `None` when the camera has
/// no usable matrix.
pub fn camera_to_output(xyz_to_cam: &[[f32; 3]; 4], space: OutputSpace) -> Option<Matrix3> {
    let mut cam_rgb = multiply(&camera_rows(xyz_to_cam), &space.to_xyz());
    for row in cam_rgb.iter_mut() {
        let sum: f32 = row.iter().sum();
        if sum.abs() < f32::EPSILON || !sum.is_finite() {
            return None;
        }
        row.iter_mut().for_each(|v| *v /= sum);
    }
    invert(&cam_rgb)
}

/// White balance multipliers that neutralize a D65 illuminant.
pub fn daylight_multipliers(xyz_to_cam: &[[f32; 3]; 4]) -> Option<[f32; 3]> {
    let cam = apply(&camera_rows(xyz_to_cam), D65_WHITE);
    if cam.iter().any(|&v| v <= 0.0 || !v.is_finite()) {
        return None;
    }
    Some([cam[1] / cam[0], 1.0, cam[1] / cam[2]])
}
