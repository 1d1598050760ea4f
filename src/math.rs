use nalgebra as na;
use num_traits::Float;

/// Least squares fit of `x(t)` and `y(t)` as `a*t^2 + b*t + c` sharing one
/// normal matrix. Column 0 holds `[a, b, c]` for `x`, column 1 for `y`.
///
/// The moment matrix is factored once by QR and both right hand sides are
/// solved against it. `None` when the system is singular, which needs fewer
/// than 3 distinct `t` values, or when the inputs differ in length.
pub fn quadratic_ls<T: na::ComplexField + Float>(
    t: &na::DVector<T>,
    x: &na::DVector<T>,
    y: &na::DVector<T>,
) -> Option<na::Matrix3x2<T>> {
    if t.len() != x.len() || t.len() != y.len() {
        return None;
    }

    // moments[k] = sum of t^k
    let mut moments = [T::zero(); 5];
    let mut rhs = na::Matrix3x2::<T>::zeros();

    for ((&ti, &xi), &yi) in t.iter().zip(x.iter()).zip(y.iter()) {
        let mut power = T::one();
        for m in moments.iter_mut() {
            *m += power;
            power *= ti;
        }

        let basis = [ti * ti, ti, T::one()];
        for (row, &b) in basis.iter().enumerate() {
            rhs[(row, 0)] += b * xi;
            rhs[(row, 1)] += b * yi;
        }
    }

    let m = moments;
    let normal = na::Matrix3::new(
        m[4], m[3], m[2], //
        m[3], m[2], m[1], //
        m[2], m[1], m[0],
    );

    let qr = normal.qr();
    let qty = qr.q().transpose() * rhs;

    qr.r().solve_upper_triangular(&qty)
}

/// Evaluates `[a, b, c]` at `x` (Horner form).
#[inline]
pub fn polyval<T: na::ComplexField + Float>(coeffs: &na::Matrix3x1<T>, x: T) -> T {
    (coeffs[0] * x + coeffs[1]) * x + coeffs[2]
}
