use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

// A smooth function of three coordinates with values in [-1, 1].
pub trait NoiseSource {
    fn noise(&self, x: f32, y: f32, z: f32) -> f32;
}

impl<F> NoiseSource for F
where
    F: Fn(f32, f32, f32) -> f32,
{
    fn noise(&self, x: f32, y: f32, z: f32) -> f32 {
        self(x, y, z)
    }
}

// Improved Perlin gradient noise over a shuffled permutation table.
#[derive(Clone)]
pub struct Perlin {
    // 256 entries repeated twice so lookups never need to wrap.
    perm: Vec<u8>,
}

impl Perlin {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table: Vec<u8> = (0..=255u8).collect();
        table.shuffle(rng);
        let mut perm = Vec::with_capacity(512);
        perm.extend_from_slice(&table);
        perm.extend_from_slice(&table);
        Perlin { perm }
    }

    pub fn with_seed(seed: u64) -> Self {
        Perlin::new(&mut rand::rngs::StdRng::seed_from_u64(seed))
    }

    // A pinned seed wins; otherwise the table is shuffled from `rng`.
    pub fn seeded_or<R: Rng + ?Sized>(seed: Option<u64>, rng: &mut R) -> Self {
        match seed {
            Some(seed) => Perlin::with_seed(seed),
            None => Perlin::new(rng),
        }
    }

    fn hash(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    fn fade(t: f32) -> f32 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    fn lerp(t: f32, a: f32, b: f32) -> f32 {
        a + t * (b - a)
    }

    fn grad(hash: usize, x: f32, y: f32, z: f32) -> f32 {
        let h = hash & 15;
        let u = if h < 8 { x } else { y };
        let v = if h < 4 {
            y
        } else if h == 12 || h == 14 {
            x
        } else {
            z
        };
        let sign_u = if (h & 1) == 0 { u } else { -u };
        let sign_v = if (h & 2) == 0 { v } else { -v };
        sign_u + sign_v
    }

    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let (xf, yf, zf) = (x.floor(), y.floor(), z.floor());
        let xi = (xf as i64 & 255) as usize;
        let yi = (yf as i64 & 255) as usize;
        let zi = (zf as i64 & 255) as usize;
        let (x, y, z) = (x - xf, y - yf, z - zf);

        let u = Self::fade(x);
        let v = Self::fade(y);
        let w = Self::fade(z);

        let a = self.hash(xi) + yi;
        let aa = self.hash(a) + zi;
        let ab = self.hash(a + 1) + zi;
        let b = self.hash(xi + 1) + yi;
        let ba = self.hash(b) + zi;
        let bb = self.hash(b + 1) + zi;

        let value = Self::lerp(
            w,
            Self::lerp(
                v,
                Self::lerp(
                    u,
                    Self::grad(self.hash(aa), x, y, z),
                    Self::grad(self.hash(ba), x - 1.0, y, z),
                ),
                Self::lerp(
                    u,
                    Self::grad(self.hash(ab), x, y - 1.0, z),
                    Self::grad(self.hash(bb), x - 1.0, y - 1.0, z),
                ),
            ),
            Self::lerp(
                v,
                Self::lerp(
                    u,
                    Self::grad(self.hash(aa + 1), x, y, z - 1.0),
                    Self::grad(self.hash(ba + 1), x - 1.0, y, z - 1.0),
                ),
                Self::lerp(
                    u,
                    Self::grad(self.hash(ab + 1), x, y - 1.0, z - 1.0),
                    Self::grad(self.hash(bb + 1), x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        );
        value.max(-1.0).min(1.0)
    }
}

impl NoiseSource for Perlin {
    fn noise(&self, x: f32, y: f32, z: f32) -> f32 {
        self.sample(x, y, z)
    }
}
