// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Complex discrete Fourier transform of any length.
//!
//! Power-of-two lengths use an iterative radix-2 Cooley-Tukey transform.
//! Other lengths are reduced to a power-of-two circular convolution with
//! Bluestein's chirp-z algorithm.
//!
//! Conventions: `forward` computes `X_k = sum_j x_j e^(-2 pi i jk/n)`, and
//! `inverse` is normalized so that `inverse(forward(x)) == x`.

use std::f64::consts::PI;

use num_complex::Complex64;

#[derive(Debug, Clone)]
enum Kind {
    Trivial,
    Radix2,
    Bluestein {
        /// `e^(-pi i j^2 / n)` for `j` in `0..n`.
        chirp: Vec<Complex64>,
        /// Radix-2 transform of the conjugate chirp, wrapped to length `m`.
        filter: Vec<Complex64>,
        inner: Box<FftPlan>,
    },
}

/// Precomputed transform of a fixed length.
#[derive(Debug, Clone)]
pub struct FftPlan {
    len: usize,
    kind: Kind,
}

impl FftPlan {
    pub fn new(len: usize) -> Self {
        let kind = if len <= 1 {
            Kind::Trivial
        } else if len.is_power_of_two() {
            Kind::Radix2
        } else {
            let m = (2 * len - 1).next_power_of_two();
            let two_n = 2 * len as u128;
            let chirp: Vec<Complex64> = (0..len)
                .map(|j| {
                    let phase = (j as u128 * j as u128) % two_n;
                    Complex64::from_polar(1.0, -PI * phase as f64 / len as f64)
                })
                .collect();
            let mut b = vec![Complex64::new(0.0, 0.0); m];
            b[0] = chirp[0].conj();
            for j in 1..len {
                b[j] = chirp[j].conj();
                b[m - j] = chirp[j].conj();
            }
            let inner = FftPlan {
                len: m,
                kind: Kind::Radix2,
            };
            let filter = inner.forward(&b);
            Kind::Bluestein {
                chirp,
                filter,
                inner: Box::new(inner),
            }
        };
        Self { len, kind }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn forward(&self, input: &[Complex64]) -> Vec<Complex64> {
        debug_assert_eq!(input.len(), self.len);
        match &self.kind {
            Kind::Trivial => input.to_vec(),
            Kind::Radix2 => {
                let mut buf = input.to_vec();
                radix2_in_place(&mut buf);
                buf
            }
            Kind::Bluestein {
                chirp,
                filter,
                inner,
            } => {
                let m = inner.len;
                let mut a = vec![Complex64::new(0.0, 0.0); m];
                for (j, (x, c)) in input.iter().zip(chirp).enumerate() {
                    a[j] = x * c;
                }
                let mut conv = inner.forward(&a);
                for (x, f) in conv.iter_mut().zip(filter) {
                    *x *= f;
                }
                let conv = inner.inverse(&conv);
                chirp.iter().zip(conv).map(|(c, x)| c * x).collect()
            }
        }
    }

    /// Normalized inverse transform.
    pub fn inverse(&self, input: &[Complex64]) -> Vec<Complex64> {
        let conjugated: Vec<Complex64> = input.iter().map(|x| x.conj()).collect();
        let scale = 1.0 / self.len.max(1) as f64;
        self.forward(&conjugated)
            .into_iter()
            .map(|x| x.conj() * scale)
            .collect()
    }

    pub fn forward_real(&self, input: &[f64]) -> Vec<Complex64> {
        let complex: Vec<Complex64> = input.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        self.forward(&complex)
    }
}

fn radix2_in_place(buf: &mut [Complex64]) {
    let n = buf.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if i < j {
            buf.swap(i, j);
        }
    }
    let mut len = 2;
    while len <= n {
        let step = Complex64::from_polar(1.0, -2.0 * PI / len as f64);
        for chunk in buf.chunks_mut(len) {
            let mut w = Complex64::new(1.0, 0.0);
            let (lo, hi) = chunk.split_at_mut(len / 2);
            for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                let t = *b * w;
                *b = *a - t;
                *a += t;
                w *= step;
            }
        }
        len <<= 1;
    }
}

/// Forward transform of `input`.
pub fn fft(input: &[Complex64]) -> Vec<Complex64> {
    FftPlan::new(input.len()).forward(input)
}

/// Normalized inverse transform of `input`.
pub fn ifft(input: &[Complex64]) -> Vec<Complex64> {
    FftPlan::new(input.len()).inverse(input)
}
