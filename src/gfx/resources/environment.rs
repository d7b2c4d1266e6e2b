//! Procedural environment cube maps
//!
//! Each preset is a radiance function evaluated per texel of the six cube
//! faces. The result is stored as sRGB encoded RGBA8 with a box-filtered
//! mip chain, ready for upload with
//! [`TextureResource::create_environment_cube`](super::texture_resource::TextureResource::create_environment_cube).

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::error::{Error, Result};

/// Cube faces in wgpu layer order
pub const CUBE_FACES: usize = 6;

/// Built-in lighting environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvironmentPreset {
    /// Overcast sky over a skyline with lit windows
    #[default]
    City,
    Sunset,
    /// Neutral gray backdrop with softbox panels
    Studio,
}

impl EnvironmentPreset {
    pub const ALL: [Self; 3] = [Self::City, Self::Sunset, Self::Studio];

    /// Preset with the given [`name`](Self::name), ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Sunset => "sunset",
            Self::Studio => "studio",
        }
    }

    fn palette(&self) -> Palette {
        match self {
            Self::City => Palette {
                zenith: [0.32, 0.42, 0.58],
                horizon: [0.78, 0.80, 0.82],
                ground: [0.16, 0.15, 0.14],
                sun_direction: [0.45, 0.55, 0.35],
                sun_color: [1.6, 1.5, 1.35],
                skyline: true,
                softboxes: false,
            },
            Self::Sunset => Palette {
                zenith: [0.14, 0.12, 0.32],
                horizon: [1.25, 0.55, 0.24],
                ground: [0.08, 0.05, 0.06],
                sun_direction: [-0.7, 0.08, -0.7],
                sun_color: [2.0, 1.1, 0.5],
                skyline: false,
                softboxes: false,
            },
            Self::Studio => Palette {
                zenith: [0.42, 0.42, 0.44],
                horizon: [0.30, 0.30, 0.31],
                ground: [0.12, 0.12, 0.12],
                sun_direction: [0.0, 1.0, 0.0],
                sun_color: [0.0, 0.0, 0.0],
                skyline: false,
                softboxes: true,
            },
        }
    }

    /// Linear RGB radiance arriving from `direction`
    pub fn radiance(&self, direction: Vector3<f32>) -> [f32; 3] {
        self.palette().radiance(direction.normalize())
    }
}

impl std::fmt::Display for EnvironmentPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

struct Palette {
    zenith: [f32; 3],
    horizon: [f32; 3],
    ground: [f32; 3],
    sun_direction: [f32; 3],
    sun_color: [f32; 3],
    skyline: bool,
    softboxes: bool,
}

impl Palette {
    fn radiance(&self, dir: Vector3<f32>) -> [f32; 3] {
        let up = dir.y;
        let mut color = if up >= 0.0 {
            lerp3(self.horizon, self.zenith, smoothstep(0.0, 0.6, up))
        } else {
            lerp3(self.horizon, self.ground, smoothstep(0.0, -0.25, up))
        };

        if self.skyline {
            if let Some(building) = skyline(dir) {
                color = building;
            }
        }

        if self.softboxes {
            color = add3(color, softboxes(dir));
        }

        let sun = Vector3::from(self.sun_direction).normalize();
        let facing = dir.dot(sun).max(0.0);
        let disc = smoothstep(0.996, 0.999, facing);
        let glow = 0.35 * facing.powi(48);
        add3(color, self.sun_color.map(|c| c * (disc + glow)))
    }
}

/// Dark building silhouettes along the horizon with a grid of windows
fn skyline(dir: Vector3<f32>) -> Option<[f32; 3]> {
    const BLOCKS: f32 = 56.0;
    const WALL: [f32; 3] = [0.05, 0.055, 0.07];
    const WINDOW: [f32; 3] = [1.1, 0.85, 0.5];

    let azimuth = (dir.z.atan2(dir.x) + PI) / (2.0 * PI);
    let block = (azimuth * BLOCKS).floor() as u32;
    let height = 0.05 + 0.22 * hash(block);
    if dir.y < -0.05 || dir.y > height {
        return None;
    }

    let column = (azimuth * BLOCKS * 6.0).floor() as u32;
    let row = (dir.y * 90.0).floor() as i32;
    let inside_cell = (azimuth * BLOCKS * 6.0).fract() < 0.55 && (dir.y * 90.0).fract() < 0.5;
    if dir.y > 0.0 && inside_cell && hash(column.wrapping_mul(977) ^ row as u32) > 0.62 {
        Some(WINDOW)
    } else {
        Some(WALL)
    }
}

/// Overhead key panel and a weaker side fill
fn softboxes(dir: Vector3<f32>) -> [f32; 3] {
    let key = if dir.y > 0.85 && dir.x.abs() < 0.3 && dir.z.abs() < 0.2 {
        2.2
    } else {
        0.0
    };
    let fill = if dir.x > 0.9 && dir.y.abs() < 0.25 && dir.z.abs() < 0.3 {
        1.2
    } else {
        0.0
    };
    let strip = if dir.z < -0.9 && dir.y.abs() < 0.4 && dir.x.abs() < 0.05 {
        1.5
    } else {
        0.0
    };
    let v = key + fill + strip;
    [v, v, v]
}

/// Cheap integer hash mapped to [0, 1)
fn hash(mut x: u32) -> f32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    (x >> 8) as f32 / (1u32 << 24) as f32
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

fn add3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// World direction through texel coordinates `(u, v)` in [-1, 1] of `face`
///
/// `v` grows downward, matching the row order of the uploaded data.
pub fn face_direction(face: usize, u: f32, v: f32) -> Vector3<f32> {
    let dir = match face {
        0 => Vector3::new(1.0, -v, -u),
        1 => Vector3::new(-1.0, -v, u),
        2 => Vector3::new(u, 1.0, v),
        3 => Vector3::new(u, -1.0, -v),
        4 => Vector3::new(u, -v, 1.0),
        _ => Vector3::new(-u, -v, -1.0),
    };
    dir.normalize()
}

fn linear_to_srgb(c: f32) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let encoded = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round() as u8
}

/// One level of the mip chain, six faces of `size * size` RGBA8 texels
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub size: u32,
    pub faces: [Vec<u8>; CUBE_FACES],
}

impl MipLevel {
    pub fn bytes_per_row(&self) -> u32 {
        4 * self.size
    }
}

/// CPU side cube map with a full mip chain
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    label: String,
    levels: Vec<MipLevel>,
}

impl EnvironmentMap {
    /// Smallest accepted face size
    pub const MIN_FACE_SIZE: u32 = 4;
    /// Largest accepted face size, well inside the device's 2D texture limit
    pub const MAX_FACE_SIZE: u32 = 1024;

    /// Render `preset` into six faces of `face_size` texels and build its mips
    ///
    /// `face_size` must be a power of two in
    /// [`MIN_FACE_SIZE`](Self::MIN_FACE_SIZE)..=[`MAX_FACE_SIZE`](Self::MAX_FACE_SIZE).
    pub fn generate(preset: EnvironmentPreset, face_size: u32) -> Result<Self> {
        if !(Self::MIN_FACE_SIZE..=Self::MAX_FACE_SIZE).contains(&face_size)
            || !face_size.is_power_of_two()
        {
            return Err(Error::InvalidEnvironmentSize(face_size));
        }

        let palette = preset.palette();
        let base: [Vec<[f32; 3]>; CUBE_FACES] = std::array::from_fn(|face| {
            let mut texels = Vec::with_capacity(texel_count(face_size));
            for y in 0..face_size {
                for x in 0..face_size {
                    let u = 2.0 * (x as f32 + 0.5) / face_size as f32 - 1.0;
                    let v = 2.0 * (y as f32 + 0.5) / face_size as f32 - 1.0;
                    texels.push(palette.radiance(face_direction(face, u, v)));
                }
            }
            texels
        });

        let map = Self::from_linear_faces(preset.name(), face_size, base);
        log::debug!(
            "Generated '{}' environment: {}px faces, {} mip levels",
            preset,
            face_size,
            map.mip_level_count()
        );
        Ok(map)
    }

    /// Flat environment of a single color, used when generation fails
    ///
    /// `face_size` is rounded up to a power of two and clamped to the
    /// accepted range, so any value yields a valid map.
    pub fn neutral(face_size: u32) -> Self {
        let face_size = face_size
            .clamp(Self::MIN_FACE_SIZE, Self::MAX_FACE_SIZE)
            .next_power_of_two();
        let gray = linear_to_srgb(0.5);
        let texel = [gray, gray, gray, 255];

        // Every mip of a flat map is the same color
        let mut levels = Vec::new();
        let mut size = face_size;
        loop {
            let face = texel.repeat(texel_count(size));
            levels.push(MipLevel {
                size,
                faces: std::array::from_fn(|_| face.clone()),
            });
            if size == 1 {
                break;
            }
            size /= 2;
        }

        Self {
            label: "neutral".to_string(),
            levels,
        }
    }

    fn from_linear_faces(
        label: &str,
        face_size: u32,
        mut faces: [Vec<[f32; 3]>; CUBE_FACES],
    ) -> Self {
        let mut levels = Vec::new();
        let mut size = face_size;
        loop {
            levels.push(MipLevel {
                size,
                faces: std::array::from_fn(|face| encode(&faces[face])),
            });
            if size == 1 {
                break;
            }
            faces = std::array::from_fn(|face| downsample(&faces[face], size));
            size /= 2;
        }

        Self {
            label: label.to_string(),
            levels,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn face_size(&self) -> u32 {
        self.levels[0].size
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    /// Highest level of detail, used by shaders to pick a mip from roughness
    pub fn max_lod(&self) -> f32 {
        (self.levels.len() - 1) as f32
    }
}

fn texel_count(size: u32) -> usize {
    size as usize * size as usize
}

fn encode(texels: &[[f32; 3]]) -> Vec<u8> {
    texels
        .iter()
        .flat_map(|c| {
            [
                linear_to_srgb(c[0]),
                linear_to_srgb(c[1]),
                linear_to_srgb(c[2]),
                255,
            ]
        })
        .collect()
}

/// 2x2 box filter in linear space
fn downsample(texels: &[[f32; 3]], size: u32) -> Vec<[f32; 3]> {
    let half = size / 2;
    let at = |x: u32, y: u32| texels[y as usize * size as usize + x as usize];
    let mut out = Vec::with_capacity(texel_count(half));
    for y in 0..half {
        for x in 0..half {
            let samples = [
                at(2 * x, 2 * y),
                at(2 * x + 1, 2 * y),
                at(2 * x, 2 * y + 1),
                at(2 * x + 1, 2 * y + 1),
            ];
            let mut sum = [0.0; 3];
            for s in samples {
                sum = add3(sum, s);
            }
            out.push(sum.map(|c| c * 0.25));
        }
    }
    out
}
