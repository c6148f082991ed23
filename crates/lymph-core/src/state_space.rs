//! Enumeration of the `k^L` hidden states over `L` LNLs.
//!
//! A state is a base-`k` digit vector, one digit per LNL, encoded as a single
//! `usize` index with the first LNL as the most significant digit. `StateSpace`
//! precomputes the digit decomposition and the non-decreasing reachability
//! mask once per `(k, num_lnls)` pair so the rest of the engine only ever
//! pays for a slice lookup.

pub struct StateSpace {
    k: usize,
    num_lnls: usize,
    digits: Vec<Vec<usize>>,
    /// `reachable[i]` lists every `j` with `digits[j] >= digits[i]` componentwise.
    reachable: Vec<Vec<usize>>,
}

impl StateSpace {
    pub fn new(k: usize, num_lnls: usize) -> Self {
        let num_states = k.pow(num_lnls as u32);
        let digits: Vec<Vec<usize>> = (0..num_states).map(|i| decode(i, k, num_lnls)).collect();

        let reachable = (0..num_states)
            .map(|i| {
                (0..num_states)
                    .filter(|&j| {
                        digits[i]
                            .iter()
                            .zip(digits[j].iter())
                            .all(|(&a, &b)| b >= a)
                    })
                    .collect()
            })
            .collect();

        Self {
            k,
            num_lnls,
            digits,
            reachable,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_lnls(&self) -> usize {
        self.num_lnls
    }

    pub fn num_states(&self) -> usize {
        self.digits.len()
    }

    /// The per-LNL digit vector for state `i`, most significant (LNL 0) first.
    pub fn digits_of(&self, i: usize) -> &[usize] {
        &self.digits[i]
    }

    pub fn encode(&self, digits: &[usize]) -> usize {
        encode(digits, self.k)
    }

    /// Every state reachable from `i` under the non-decreasing (growth-only)
    /// partial order, including `i` itself.
    pub fn reachable_from(&self, i: usize) -> &[usize] {
        &self.reachable[i]
    }
}

fn decode(mut index: usize, k: usize, num_lnls: usize) -> Vec<usize> {
    let mut digits = vec![0usize; num_lnls];
    for slot in (0..num_lnls).rev() {
        digits[slot] = index % k;
        index /= k;
    }
    digits
}

fn encode(digits: &[usize], k: usize) -> usize {
    digits.iter().fold(0usize, |acc, &d| acc * k + d)
}
