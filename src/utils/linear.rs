//! Dense linear solver for small square systems
use crate::error::SingularMatrixError;

/// Pivot magnitudes at or below this are treated as zero
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
///
/// Works on copies; the caller's matrix and vector are left untouched.
#[allow(clippy::needless_range_loop)]
pub fn solve<const N: usize>(
    a: &[[f64; N]; N],
    b: &[f64; N],
) -> Result<[f64; N], SingularMatrixError> {
    let mut a = *a;
    let mut b = *b;

    // Forward elimination
    for i in 0..N {
        // Largest magnitude in column i at or below the diagonal
        let mut max_val = a[i][i].abs();
        let mut max_row = i;
        for k in (i + 1)..N {
            if a[k][i].abs() > max_val {
                max_val = a[k][i].abs();
                max_row = k;
            }
        }

        if max_val.is_nan() || max_val <= PIVOT_EPSILON {
            return Err(SingularMatrixError {
                column: i,
                epsilon: PIVOT_EPSILON,
            });
        }

        if max_row != i {
            a.swap(i, max_row);
            b.swap(i, max_row);
        }

        for k in (i + 1)..N {
            let factor = a[k][i] / a[i][i];
            if factor == 0.0 {
                continue;
            }
            b[k] -= factor * b[i];
            a[k][i] = 0.0;
            for j in (i + 1)..N {
                a[k][j] -= factor * a[i][j];
            }
        }
    }

    // Back substitution
    let mut x = [0.0f64; N];
    for i in (0..N).rev() {
        let mut sum = b[i];
        for j in (i + 1)..N {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    Ok(x)
}
