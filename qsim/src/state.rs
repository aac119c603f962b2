use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;
use protocol::specs::quantum::GateKind;
use rand::Rng;

use crate::circuit::Gate;

/// Dense state-vector of an `n`-qubit register.
///
/// Qubit `k` (0-based) maps to bit `k` of an amplitude index; `bitstring`
/// renders qubit 0 as the leftmost character, matching the 1-based wire
/// numbering read left to right.
pub struct StateVector {
    n_qubits: usize,
    amps: Vec<Complex64>,
}

impl StateVector {
    /// Initializes the register to `|0...0>`.
    pub fn new(n_qubits: usize) -> Self {
        let mut amps = vec![Complex64::ZERO; 1 << n_qubits];
        amps[0] = Complex64::ONE;
        Self { n_qubits, amps }
    }

    /// Applies one validated gate to the register.
    pub fn apply(&mut self, gate: &Gate) {
        match gate.kind {
            GateKind::Cnot => self.apply_cnot(gate.qubits[0], gate.qubits[1]),
            kind => self.apply_single(gate.qubits[0], matrix(kind)),
        }
    }

    fn apply_single(&mut self, qubit: usize, m: [[Complex64; 2]; 2]) {
        let mask = 1 << qubit;
        for i in 0..self.amps.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a0 = self.amps[i];
                let a1 = self.amps[j];
                self.amps[i] = m[0][0] * a0 + m[0][1] * a1;
                self.amps[j] = m[1][0] * a0 + m[1][1] * a1;
            }
        }
    }

    fn apply_cnot(&mut self, control: usize, target: usize) {
        let cmask = 1 << control;
        let tmask = 1 << target;
        for i in 0..self.amps.len() {
            if i & cmask != 0 && i & tmask == 0 {
                self.amps.swap(i, i | tmask);
            }
        }
    }

    /// Measurement probability per basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Samples one measurement outcome index.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        // Cumulative distribution walk; the total absorbs rounding drift.
        let probs = self.probabilities();
        let total: f64 = probs.iter().sum();
        let mut r = rng.random::<f64>() * total;

        for (i, p) in probs.iter().enumerate() {
            r -= p;
            if r <= 0.0 {
                return i;
            }
        }
        probs.len() - 1
    }

    /// Renders a basis-state index as a bitstring, qubit 0 leftmost.
    pub fn bitstring(&self, index: usize) -> String {
        (0..self.n_qubits)
            .map(|q| if index >> q & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

fn matrix(kind: GateKind) -> [[Complex64; 2]; 2] {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    let zero = Complex64::ZERO;
    let one = Complex64::ONE;
    let i = Complex64::I;

    match kind {
        GateKind::H => [[h, h], [h, -h]],
        GateKind::X => [[zero, one], [one, zero]],
        GateKind::Y => [[zero, -i], [i, zero]],
        GateKind::Z => [[one, zero], [zero, -one]],
        GateKind::S => [[one, zero], [zero, i]],
        GateKind::T => [
            [one, zero],
            [zero, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)],
        ],
        GateKind::Cnot => unreachable!("cnot is applied as a two-qubit permutation"),
    }
}
