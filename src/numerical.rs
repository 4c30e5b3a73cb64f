/// Newton-Raphson solver for square systems of nonlinear equations, single start or multistart
pub mod NR;
/// zeros of the gradient and the second-derivative test
pub mod critical_points;
/// extrema under an equality constraint
pub mod lagrange;
/// nested Gauss-Legendre quadrature for integrals up to triple
pub mod quadrature;
