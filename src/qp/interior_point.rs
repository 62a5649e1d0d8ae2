use log::debug;
use ndarray::{Array1, Array2};

use super::{QpError, QpSolution, QpSolver, QpStatus, QuadraticProgram};

/// Settings for [`InteriorPointSolver`].
#[derive(Debug, Clone)]
pub struct InteriorPointConfig {
    /// Maximum number of Newton iterations
    pub max_iterations: usize,
    /// Scaled primal / dual residual required for an optimal solution
    pub feasibility_tolerance: f64,
    /// Average complementarity required for an optimal solution
    pub gap_tolerance: f64,
    /// Residual and gap accepted as near-optimal when the iteration limit is hit
    pub acceptable_tolerance: f64,
    /// Fraction of the distance to the boundary taken per step
    pub step_fraction: f64,
    /// Iterate magnitude treated as divergence
    pub divergence_limit: f64,
}

impl Default for InteriorPointConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            feasibility_tolerance: 1e-10,
            gap_tolerance: 1e-12,
            acceptable_tolerance: 1e-6,
            step_fraction: 0.995,
            divergence_limit: 1e12,
        }
    }
}

/// Dense Mehrotra predictor-corrector interior-point method.
///
/// Pinned variables are removed up front. Inequalities receive slack
/// variables so every remaining variable is simply non-negative, and the
/// Newton systems are reduced to the normal equations `A Θ A^T dy = r`,
/// factored once per iteration by Cholesky and reused for the predictor and
/// the corrector.
#[derive(Debug, Clone, Default)]
pub struct InteriorPointSolver {
    config: InteriorPointConfig,
}

impl InteriorPointSolver {
    pub fn new(config: InteriorPointConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InteriorPointConfig {
        &self.config
    }
}

impl QpSolver for InteriorPointSolver {
    fn name(&self) -> &'static str {
        "interior-point"
    }

    fn solve(&self, problem: &QuadraticProgram<'_>) -> Result<QpSolution, QpError> {
        problem.validate()?;
        let standard = StandardForm::new(problem);
        let (z, status, iterations) = self.solve_standard(&standard)?;
        let x = standard.expand(&z, problem.n_vars());
        debug!(
            "{} finished in {iterations} iterations ({status:?})",
            self.name()
        );
        Ok(QpSolution {
            objective: problem.objective(x.view()),
            x,
            status,
            iterations,
        })
    }
}

/// `min 1/2 z^T D z + q^T z  s.t.  A z = b, z >= 0` with `D` diagonal.
struct StandardForm {
    a: Array2<f64>,
    b: Array1<f64>,
    d: Array1<f64>,
    q: Array1<f64>,
    /// Original index of each leading structural variable.
    free: Vec<usize>,
}

impl StandardForm {
    fn new(problem: &QuadraticProgram<'_>) -> Self {
        let n = problem.n_vars();
        let mut is_pinned = vec![false; n];
        for &k in problem.pinned {
            is_pinned[k] = true;
        }
        let free: Vec<usize> = (0..n).filter(|&k| !is_pinned[k]).collect();

        let n_free = free.len();
        let n_eq = problem.eq_matrix.nrows();
        let n_ineq = problem.ineq_matrix.nrows();
        let n_vars = n_free + n_ineq;

        let mut a = Array2::zeros((n_eq + n_ineq, n_vars));
        for (j, &k) in free.iter().enumerate() {
            for i in 0..n_eq {
                a[[i, j]] = problem.eq_matrix[[i, k]];
            }
            for r in 0..n_ineq {
                a[[n_eq + r, j]] = problem.ineq_matrix[[r, k]];
            }
        }
        for r in 0..n_ineq {
            a[[n_eq + r, n_free + r]] = 1.0;
        }

        let b = problem
            .eq_rhs
            .iter()
            .chain(problem.ineq_rhs.iter())
            .copied()
            .collect();
        let mut d = Array1::zeros(n_vars);
        let mut q = Array1::zeros(n_vars);
        for (j, &k) in free.iter().enumerate() {
            d[j] = problem.hessian_diag[k];
            q[j] = problem.linear[k];
        }

        Self { a, b, d, q, free }
    }

    fn n_vars(&self) -> usize {
        self.a.ncols()
    }

    /// Maps structural variables back to the original space; pinned entries
    /// and slacks are dropped.
    fn expand(&self, z: &Array1<f64>, n: usize) -> Array1<f64> {
        let mut x = Array1::zeros(n);
        for (j, &k) in self.free.iter().enumerate() {
            x[k] = z[j].max(0.0);
        }
        x
    }

    /// Scaled primal residual, scaled dual residual and average
    /// complementarity, with the raw residual vectors.
    fn residuals(
        &self,
        z: &Array1<f64>,
        w: &Array1<f64>,
        y: &Array1<f64>,
    ) -> (Array1<f64>, Array1<f64>, [f64; 3]) {
        let r_p = self.a.dot(z) - &self.b;
        let r_d = &self.d * z + &self.q - self.a.t().dot(y) - w;
        let mu = z.dot(w) / self.n_vars() as f64;
        let scaled = [
            inf_norm(&r_p) / (1.0 + inf_norm(&self.b)),
            inf_norm(&r_d) / (1.0 + inf_norm(&self.q)),
            mu,
        ];
        (r_p, r_d, scaled)
    }
}

impl InteriorPointSolver {
    fn solve_standard(
        &self,
        form: &StandardForm,
    ) -> Result<(Array1<f64>, QpStatus, usize), QpError> {
        let cfg = &self.config;
        let n = form.n_vars();
        if n == 0 {
            // Everything pinned: feasible only when the right-hand side is zero.
            let residual = inf_norm(&form.b);
            return if residual <= cfg.feasibility_tolerance {
                Ok((Array1::zeros(0), QpStatus::Optimal, 0))
            } else {
                Err(QpError::Infeasible { residual })
            };
        }

        let mut z = Array1::<f64>::ones(n);
        let mut w = Array1::<f64>::ones(n);
        let mut y = Array1::<f64>::zeros(form.a.nrows());

        // A breakdown while the primal residual is still large is how an
        // infeasible problem usually ends.
        let mut last_primal = f64::INFINITY;
        let breakdown = |last_primal: f64, what: &'static str| {
            if last_primal > cfg.acceptable_tolerance {
                QpError::Infeasible {
                    residual: last_primal,
                }
            } else {
                QpError::Numerical(what)
            }
        };

        for iteration in 0..cfg.max_iterations {
            let (r_p, r_d, [p_res, d_res, mu]) = form.residuals(&z, &w, &y);
            if !(p_res.is_finite() && d_res.is_finite() && mu.is_finite()) {
                return Err(breakdown(last_primal, "non-finite residual"));
            }
            last_primal = p_res;
            if p_res <= cfg.feasibility_tolerance
                && d_res <= cfg.feasibility_tolerance
                && mu <= cfg.gap_tolerance
            {
                return Ok((z, QpStatus::Optimal, iteration));
            }
            if inf_norm(&z).max(inf_norm(&w)).max(inf_norm(&y)) > cfg.divergence_limit {
                return Err(if p_res > cfg.acceptable_tolerance {
                    QpError::Infeasible { residual: p_res }
                } else {
                    QpError::Unbounded
                });
            }

            let theta = 1.0 / (&form.d + &(&w / &z));
            let normal = normal_matrix(&form.a, &theta);
            let factor =
                Cholesky::factor(&normal).map_err(|_| breakdown(p_res, "normal equations"))?;

            // Predictor: pure Newton step towards complementarity zero.
            let r_c = &z * &w;
            let affine = newton_direction(form, &theta, &factor, &r_p, &r_d, &r_c, &z, &w);
            let alpha_aff = max_step(&z, &affine.dz)
                .min(max_step(&w, &affine.dw))
                .min(1.0);
            let mu_aff = (&z + &(alpha_aff * &affine.dz)).dot(&(&w + &(alpha_aff * &affine.dw)))
                / n as f64;
            let sigma = (mu_aff / mu).clamp(0.0, 1.0).powi(3);

            // Corrector: second-order term plus centering.
            let r_c = &z * &w + &(&affine.dz * &affine.dw) - sigma * mu;
            let step = newton_direction(form, &theta, &factor, &r_p, &r_d, &r_c, &z, &w);
            let alpha = (cfg.step_fraction * max_step(&z, &step.dz).min(max_step(&w, &step.dw)))
                .min(1.0);

            z.scaled_add(alpha, &step.dz);
            w.scaled_add(alpha, &step.dw);
            y.scaled_add(alpha, &step.dy);
        }

        let (_, _, [p_res, d_res, mu]) = form.residuals(&z, &w, &y);
        let acceptable = cfg.acceptable_tolerance;
        if p_res <= acceptable && d_res <= acceptable && mu <= acceptable {
            Ok((z, QpStatus::NearOptimal, cfg.max_iterations))
        } else if p_res > acceptable {
            Err(QpError::Infeasible { residual: p_res })
        } else {
            Err(QpError::IterationLimit(cfg.max_iterations))
        }
    }
}

struct Direction {
    dz: Array1<f64>,
    dw: Array1<f64>,
    dy: Array1<f64>,
}

/// Solves the Newton system
///
/// ```text
/// D dz - A^T dy - dw = -r_d
/// A dz               = -r_p
/// W dz + Z dw        = -r_c
/// ```
///
/// by eliminating `dw` and `dz` into the normal equations.
#[allow(clippy::too_many_arguments)]
fn newton_direction(
    form: &StandardForm,
    theta: &Array1<f64>,
    factor: &Cholesky,
    r_p: &Array1<f64>,
    r_d: &Array1<f64>,
    r_c: &Array1<f64>,
    z: &Array1<f64>,
    w: &Array1<f64>,
) -> Direction {
    let rhs_d = r_d + &(r_c / z);
    let rhs = form.a.dot(&(theta * &rhs_d)) - r_p;
    let dy = factor.solve(&rhs);
    let dz = theta * &(form.a.t().dot(&dy) - &rhs_d);
    let dw = -(r_c + &(w * &dz)) / z;
    Direction { dz, dw, dy }
}

/// `A diag(theta) A^T`.
fn normal_matrix(a: &Array2<f64>, theta: &Array1<f64>) -> Array2<f64> {
    let scaled = a * theta;
    scaled.dot(&a.t())
}

/// Largest `alpha` with `v + alpha * dv >= 0`.
fn max_step(v: &Array1<f64>, dv: &Array1<f64>) -> f64 {
    v.iter()
        .zip(dv.iter())
        .filter(|(_, &d)| d < 0.0)
        .map(|(&x, &d)| -x / d)
        .fold(f64::INFINITY, f64::min)
}

fn inf_norm(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

/// Lower-triangular Cholesky factor of a symmetric positive semidefinite
/// matrix, with a small relative diagonal shift for rank-deficient rows.
struct Cholesky {
    l: Array2<f64>,
}

impl Cholesky {
    const REGULARIZATION: f64 = 1e-14;

    fn factor(matrix: &Array2<f64>) -> Result<Self, QpError> {
        let n = matrix.nrows();
        let scale = matrix.diag().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let floor = Self::REGULARIZATION * (1.0 + scale);

        let mut l = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let mut sum = matrix[[i, j]];
                for k in 0..j {
                    sum -= l[[i, k]] * l[[j, k]];
                }
                if i == j {
                    let pivot = sum + Self::REGULARIZATION * (1.0 + matrix[[i, i]].abs());
                    if !pivot.is_finite() {
                        return Err(QpError::Numerical("non-finite pivot in normal equations"));
                    }
                    l[[i, i]] = pivot.max(floor).sqrt();
                } else {
                    l[[i, j]] = sum / l[[j, j]];
                }
            }
        }
        Ok(Self { l })
    }

    fn solve(&self, rhs: &Array1<f64>) -> Array1<f64> {
        let n = self.l.nrows();

        // L u = rhs
        let mut u = Array1::<f64>::zeros(n);
        for i in 0..n {
            let mut sum = rhs[i];
            for j in 0..i {
                sum -= self.l[[i, j]] * u[j];
            }
            u[i] = sum / self.l[[i, i]];
        }

        // L^T v = u
        let mut v = Array1::<f64>::zeros(n);
        for i in (0..n).rev() {
            let mut sum = u[i];
            for j in (i + 1)..n {
                sum -= self.l[[j, i]] * v[j];
            }
            v[i] = sum / self.l[[i, i]];
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn solver() -> InteriorPointSolver {
        InteriorPointSolver::default()
    }

    #[test]
    fn test_projection_onto_simplex() {
        // Project (0.8, 0.6, -0.2) onto {x >= 0, x1 + x2 + x3 = 1}:
        // the answer is (0.6, 0.4, 0).
        let a = array![[1.0, 1.0, 1.0]];
        let b = array![1.0];
        let point = array![0.8, 0.6, -0.2];
        let qp = QuadraticProgram::projection(point.view(), a.view(), b.view(), &[]);

        let solution = solver().solve(&qp).unwrap();
        assert_eq!(solution.status, QpStatus::Optimal);
        assert_abs_diff_eq!(solution.x[0], 0.6, epsilon = 1e-8);
        assert_abs_diff_eq!(solution.x[1], 0.4, epsilon = 1e-8);
        assert_abs_diff_eq!(solution.x[2], 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_pinned_variables_stay_zero() {
        let a = array![[1.0, 1.0, 1.0]];
        let b = array![1.0];
        let point = array![0.8, 0.6, 0.2];
        let pinned = [0];
        let qp = QuadraticProgram::projection(point.view(), a.view(), b.view(), &pinned);

        let solution = solver().solve(&qp).unwrap();
        assert_eq!(solution.x[0], 0.0);
        assert_abs_diff_eq!(solution.x[1], 0.7, epsilon = 1e-8);
        assert_abs_diff_eq!(solution.x[2], 0.3, epsilon = 1e-8);
    }

    #[test]
    fn test_inequality_constrained_qp() {
        // min 1/2 (x^2 + y^2) - 2x - 2y  s.t.  x + y <= 1
        // Unconstrained optimum (2, 2); constrained optimum (0.5, 0.5).
        let a = Array2::zeros((0, 2));
        let b = Array1::zeros(0);
        let qp = QuadraticProgram {
            hessian_diag: array![1.0, 1.0],
            linear: array![-2.0, -2.0],
            eq_matrix: a.view(),
            eq_rhs: b.view(),
            ineq_matrix: Array2::zeros((0, 2)),
            ineq_rhs: Array1::zeros(0),
            pinned: &[],
        }
        .with_inequality(array![1.0, 1.0].view(), 1.0);

        let solution = solver().solve(&qp).unwrap();
        assert_abs_diff_eq!(solution.x[0], 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(solution.x[1], 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(solution.objective, 0.25 - 2.0, epsilon = 1e-7);
    }

    #[test]
    fn test_linear_program() {
        // min x + 2y  s.t.  x + y = 1: all mass on x.
        let a = array![[1.0, 1.0]];
        let b = array![1.0];
        let qp = QuadraticProgram {
            hessian_diag: array![0.0, 0.0],
            linear: array![1.0, 2.0],
            eq_matrix: a.view(),
            eq_rhs: b.view(),
            ineq_matrix: Array2::zeros((0, 2)),
            ineq_rhs: Array1::zeros(0),
            pinned: &[],
        };

        let solution = solver().solve(&qp).unwrap();
        assert_abs_diff_eq!(solution.x[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.x[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_reports_infeasible() {
        // x + y = 1 and x + y <= 0.5 cannot both hold.
        let a = array![[1.0, 1.0]];
        let b = array![1.0];
        let point = array![0.0, 0.0];
        let qp = QuadraticProgram::projection(point.view(), a.view(), b.view(), &[])
            .with_inequality(array![1.0, 1.0].view(), 0.5);

        let err = solver().solve(&qp).unwrap_err();
        assert!(matches!(err, QpError::Infeasible { .. }), "got {err:?}");
    }

    #[test]
    fn test_negative_rhs_is_infeasible() {
        let a = array![[1.0, 1.0]];
        let b = array![-1.0];
        let point = array![0.0, 0.0];
        let qp = QuadraticProgram::projection(point.view(), a.view(), b.view(), &[]);
        assert!(matches!(
            solver().solve(&qp),
            Err(QpError::Infeasible { .. })
        ));
    }

    #[test]
    fn test_all_pinned() {
        let a = array![[1.0, 1.0]];
        let zero = array![0.0];
        let one = array![1.0];
        let point = array![3.0, 3.0];
        let pinned = [0, 1];

        let qp = QuadraticProgram::projection(point.view(), a.view(), zero.view(), &pinned);
        let solution = solver().solve(&qp).unwrap();
        assert_eq!(solution.x, array![0.0, 0.0]);

        let qp = QuadraticProgram::projection(point.view(), a.view(), one.view(), &pinned);
        assert!(solver().solve(&qp).is_err());
    }

    #[test]
    fn test_cholesky_solves_spd_system() {
        let m = array![[4.0, 2.0], [2.0, 3.0]];
        let factor = Cholesky::factor(&m).unwrap();
        let x = factor.solve(&array![2.0, 1.0]);
        let back = m.dot(&x);
        assert_abs_diff_eq!(back[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(back[1], 1.0, epsilon = 1e-10);
    }
}
