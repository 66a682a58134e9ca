use crate::prelude_crate::*;

pub(crate) fn density(f: &[Float]) -> Float {
    f.iter().sum::<Float>()
}

pub(crate) fn velocity(f: &[Float], density: Float) -> [Float; D] {
    velocity_set::d3q19::velocity_computation(density, f)
}

pub(crate) fn equilibrium(density: Float, velocity: &[Float; D]) -> [Float; Q] {
    let u_dot_u = velocity.iter().map(|u_x| u_x * u_x).sum::<Float>();
    let mut f_eq = [0.0; Q];
    f_eq.iter_mut().enumerate().for_each(|(i, f_eq_i)| {
        let u_dot_c = velocity
            .iter()
            .zip(C[i].iter())
            .map(|(u_x, c_x)| u_x * (*c_x as Float))
            .sum::<Float>();
        *f_eq_i = W[i]
            * density
            * (1.0 + u_dot_c * CS_2_INV + 0.5 * u_dot_c * u_dot_c * CS_4_INV
                - 0.5 * u_dot_u * CS_2_INV);
    });
    f_eq
}

pub(crate) fn bgk_collision(f: &mut [Float], f_eq: &[Float; Q], omega: Float) {
    f.iter_mut()
        .zip(f_eq.iter())
        .for_each(|(f_i, f_eq_i)| *f_i -= omega * DELTA_T * (*f_i - f_eq_i));
}

pub(crate) fn bounce_back(f: &mut [Float]) {
    (0..Q)
        .filter(|&i| i < Q_BAR[i])
        .for_each(|i| f.swap(i, Q_BAR[i]));
}

pub(crate) fn kinetic_energy(density: Float, velocity: &[Float; D]) -> Float {
    0.5 * density * velocity.iter().map(|u_x| u_x * u_x).sum::<Float>()
}
