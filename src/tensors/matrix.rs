//! Dense matrices over a [Ring].
//!
//! Exact linear algebra, such as [Matrix::solve] and [Matrix::rank], is available over any [Field].
//! Matrices over the [RealBallField] additionally support a rigorous Cholesky factorization
//! [Matrix::cho] and a symmetric positive-definite solver [Matrix::spd_solve]. A rational
//! system can be solved with automatic precision control using [Matrix::spd_solve_adaptive]:
//!
//! ```
//! use ballistica::adaptive::AdaptivePrecision;
//! use ballistica::domains::rational::{Rational, Q};
//! use ballistica::tensors::matrix::Matrix;
//!
//! let a = Matrix::from_linear(vec![4.into(), 2.into(), 2.into(), 3.into()], 2, 2, Q).unwrap();
//! let b = Matrix::new_vec(vec![2.into(), 1.into()], Q);
//!
//! let (x, _prec) = a.spd_solve_adaptive(&b, &AdaptivePrecision::default()).unwrap();
//! let exact = Matrix::new_vec(vec![Rational::from((1, 2)), 0.into()], Q);
//! assert!(x.contains_rational(&exact));
//! ```

use std::{
    fmt::{Display, Write},
    ops::{Add, Index, IndexMut, Mul, Neg, Sub},
    slice::Chunks,
};

use tracing::{debug, instrument};

use crate::{
    adaptive::{AdaptivePrecision, Attempt, PrecisionError},
    domains::{
        ball::{Ball, RealBallField},
        rational::RationalField,
        Field, Ring,
    },
};

/// A matrix with entries that are elements of a ring `F`, stored in row-major order.
#[derive(Clone, Hash, PartialEq, Eq, Debug)]
pub struct Matrix<F: Ring> {
    pub(crate) data: Vec<F::Element>,
    pub(crate) nrows: u32,
    pub(crate) ncols: u32,
    pub(crate) field: F,
}

impl<F: Ring> Matrix<F> {
    /// Create a new zeroed matrix with `nrows` rows and `ncols` columns.
    pub fn new(nrows: u32, ncols: u32, field: F) -> Matrix<F> {
        Matrix {
            data: vec![field.zero(); nrows as usize * ncols as usize],
            nrows,
            ncols,
            field,
        }
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: u32, field: F) -> Matrix<F> {
        let mut m = Matrix::new(n, n, field);
        for i in 0..n {
            m[(i, i)] = m.field.one();
        }
        m
    }

    /// Create a new column vector from a list of scalars.
    pub fn new_vec(data: Vec<F::Element>, field: F) -> Matrix<F> {
        Matrix {
            nrows: data.len() as u32,
            ncols: 1,
            data,
            field,
        }
    }

    /// Create a matrix from its entries in row-major order.
    pub fn from_linear(
        data: Vec<F::Element>,
        nrows: u32,
        ncols: u32,
        field: F,
    ) -> Result<Matrix<F>, String> {
        if data.len() != nrows as usize * ncols as usize {
            return Err(format!(
                "Data length does not match matrix dimensions: {} vs ({},{})",
                data.len(),
                nrows,
                ncols
            ));
        }

        Ok(Matrix {
            data,
            nrows,
            ncols,
            field,
        })
    }

    /// Create a matrix from a list of rows.
    pub fn from_nested_vec(rows: Vec<Vec<F::Element>>, field: F) -> Result<Matrix<F>, String> {
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
        let nrows = rows.len();

        let mut data = Vec::with_capacity(nrows * ncols);
        for r in rows {
            if r.len() != ncols {
                return Err("Matrix is not rectangular".to_owned());
            }
            data.extend(r);
        }

        Matrix::from_linear(data, nrows as u32, ncols as u32, field)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows as usize
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols as usize
    }

    #[inline]
    pub fn field(&self) -> &F {
        &self.field
    }

    /// The entries in row-major order.
    #[inline]
    pub fn data(&self) -> &[F::Element] {
        &self.data
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Return an iterator over the rows of the matrix.
    pub fn row_iter(&self) -> Chunks<'_, F::Element> {
        self.data.chunks(self.ncols.max(1) as usize)
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|e| F::is_zero(e))
    }

    /// Return true iff the matrix is square and equal to its transpose.
    pub fn is_symmetric(&self) -> bool {
        self.is_square() && (0..self.nrows).all(|i| (0..i).all(|j| self[(i, j)] == self[(j, i)]))
    }

    pub fn transpose(&self) -> Matrix<F> {
        let mut m = Matrix::new(self.ncols, self.nrows, self.field.clone());
        for i in 0..self.nrows {
            for j in 0..self.ncols {
                m[(j, i)] = self[(i, j)].clone();
            }
        }
        m
    }

    /// Multiply every entry by the scalar `e`.
    pub fn mul_scalar(&self, e: &F::Element) -> Matrix<F> {
        self.map(|x| self.field.mul(x, e), self.field.clone())
    }

    /// Apply `f` to every entry, yielding a matrix over `field`.
    pub fn map<G: Ring>(&self, f: impl Fn(&F::Element) -> G::Element, field: G) -> Matrix<G> {
        Matrix {
            data: self.data.iter().map(f).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
            field,
        }
    }

    fn assert_same_shape(&self, other: &Matrix<F>, op: &str) {
        if self.nrows != other.nrows || self.ncols != other.ncols {
            panic!(
                "Cannot {} matrices of different dimensions: ({},{}) vs ({},{})",
                op, self.nrows, self.ncols, other.nrows, other.ncols
            );
        }
    }
}

impl<F: Ring> Index<u32> for Matrix<F> {
    type Output = [F::Element];

    /// Get row `index`.
    #[inline]
    fn index(&self, index: u32) -> &Self::Output {
        let n = self.ncols as usize;
        &self.data[index as usize * n..(index as usize + 1) * n]
    }
}

impl<F: Ring> Index<(u32, u32)> for Matrix<F> {
    type Output = F::Element;

    /// Get the entry in row `i` and column `j`, where `index=(i,j)`.
    #[inline]
    fn index(&self, index: (u32, u32)) -> &Self::Output {
        &self.data[index.0 as usize * self.ncols as usize + index.1 as usize]
    }
}

impl<F: Ring> IndexMut<(u32, u32)> for Matrix<F> {
    #[inline]
    fn index_mut(&mut self, index: (u32, u32)) -> &mut F::Element {
        &mut self.data[index.0 as usize * self.ncols as usize + index.1 as usize]
    }
}

impl<F: Ring> Display for Matrix<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char('{')?;
        for (i, row) in self.row_iter().enumerate() {
            if i > 0 {
                f.write_char(',')?;
            }
            f.write_char('{')?;
            for (j, e) in row.iter().enumerate() {
                if j > 0 {
                    f.write_char(',')?;
                }
                self.field.format(e, f)?;
            }
            f.write_char('}')?;
        }
        f.write_char('}')
    }
}

impl<F: Ring> Add<&Matrix<F>> for &Matrix<F> {
    type Output = Matrix<F>;

    fn add(self, rhs: &Matrix<F>) -> Self::Output {
        self.assert_same_shape(rhs, "add");
        Matrix {
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(a, b)| self.field.add(a, b))
                .collect(),
            nrows: self.nrows,
            ncols: self.ncols,
            field: self.field.clone(),
        }
    }
}

impl<F: Ring> Sub<&Matrix<F>> for &Matrix<F> {
    type Output = Matrix<F>;

    fn sub(self, rhs: &Matrix<F>) -> Self::Output {
        self.assert_same_shape(rhs, "subtract");
        Matrix {
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(a, b)| self.field.sub(a, b))
                .collect(),
            nrows: self.nrows,
            ncols: self.ncols,
            field: self.field.clone(),
        }
    }
}

impl<F: Ring> Mul<&Matrix<F>> for &Matrix<F> {
    type Output = Matrix<F>;

    fn mul(self, rhs: &Matrix<F>) -> Self::Output {
        if self.ncols != rhs.nrows {
            panic!(
                "Cannot multiply matrices because of a dimension mismatch: ({},{}) vs ({},{})",
                self.nrows, self.ncols, rhs.nrows, rhs.ncols
            );
        }

        let mut m = Matrix::new(self.nrows, rhs.ncols, self.field.clone());
        for i in 0..self.nrows {
            for j in 0..rhs.ncols {
                let mut sum = self.field.zero();
                for k in 0..self.ncols {
                    self.field.add_mul_assign(&mut sum, &self[(i, k)], &rhs[(k, j)]);
                }
                m[(i, j)] = sum;
            }
        }
        m
    }
}

impl<F: Ring> Neg for Matrix<F> {
    type Output = Matrix<F>;

    fn neg(mut self) -> Self::Output {
        for e in &mut self.data {
            *e = self.field.neg(e);
        }
        self
    }
}

/// Errors that can occur when performing matrix operations.
#[derive(Debug)]
pub enum MatrixError<F: Ring> {
    Underdetermined {
        min_rank: u32,
        max_rank: u32,
        row_reduced_matrix: Option<Matrix<F>>,
    },
    Inconsistent,
    NotSquare,
    Singular,
    ShapeMismatch,
    /// A pivot of a Cholesky factorization could not be proven to be positive.
    NotPositiveDefinite { pivot: u32 },
}

impl<F: Ring> Display for MatrixError<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixError::Underdetermined {
                min_rank,
                max_rank,
                row_reduced_matrix,
            } => {
                write!(
                    f,
                    "The system is underdetermined. The rank of the matrix is between {} and {}",
                    min_rank, max_rank
                )?;
                if let Some(m) = row_reduced_matrix {
                    write!(f, "\nRow reduced matrix:\n{}", m)?;
                }
                Ok(())
            }
            MatrixError::Inconsistent => write!(f, "The system is inconsistent"),
            MatrixError::NotSquare => write!(f, "The matrix is not square"),
            MatrixError::Singular => write!(f, "The matrix is singular"),
            MatrixError::ShapeMismatch => write!(f, "The shape of the matrix is not compatible"),
            MatrixError::NotPositiveDefinite { pivot } => write!(
                f,
                "The matrix could not be shown to be positive definite at pivot {}",
                pivot
            ),
        }
    }
}

impl<F: Field> Matrix<F> {
    /// Bring the first `max_col` columns into echelon form using row swaps.
    /// Returns the rank and whether an odd number of rows swaps was performed.
    fn echelon(&mut self, max_col: u32) -> (u32, bool) {
        let zero = self.field.zero();
        let mut odd = false;
        let mut i = 0;
        for j in 0..max_col {
            if i == self.nrows {
                break;
            }

            let Some(p) = (i..self.nrows).find(|&k| !F::is_zero(&self[(k, j)])) else {
                continue;
            };
            if p != i {
                for l in j..self.ncols {
                    self.data.swap(
                        (self.ncols * i + l) as usize,
                        (self.ncols * p + l) as usize,
                    );
                }
                odd = !odd;
            }

            let inv_pivot = self.field.inv(&self[(i, j)]);
            for k in i + 1..self.nrows {
                if F::is_zero(&self[(k, j)]) {
                    continue;
                }

                let s = self.field.mul(&self[(k, j)], &inv_pivot);
                self[(k, j)] = zero.clone();
                for l in j + 1..self.ncols {
                    let mut e = std::mem::replace(&mut self[(k, l)], zero.clone());
                    self.field.sub_mul_assign(&mut e, &self[(i, l)], &s);
                    self[(k, l)] = e;
                }
            }

            i += 1;
        }

        (i, odd)
    }

    /// Turn an echelon form into a reduced echelon form with unit pivots.
    fn back_substitution(&mut self, max_col: u32) {
        let field = self.field.clone();
        let pivots: Vec<(u32, u32)> = (0..self.nrows)
            .filter_map(|r| {
                (0..max_col)
                    .find(|&c| !F::is_zero(&self[(r, c)]))
                    .map(|c| (r, c))
            })
            .collect();

        // bottom-up, so that the rows above still have their pivot left of `c`
        for &(r, c) in pivots.iter().rev() {
            let scale = field.inv(&self[(r, c)]);
            let pivot_row: Vec<F::Element> = (c..self.ncols)
                .map(|l| field.mul(&self[(r, l)], &scale))
                .collect();
            for (l, e) in (c..self.ncols).zip(&pivot_row) {
                self[(r, l)] = e.clone();
            }

            for above in 0..r {
                let factor = self[(above, c)].clone();
                if F::is_zero(&factor) {
                    continue;
                }
                for (l, e) in (c..self.ncols).zip(&pivot_row) {
                    field.sub_mul_assign(&mut self[(above, l)], e, &factor);
                }
            }
        }
    }

    /// Row-reduce the matrix in place and return its rank.
    pub fn row_reduce(&mut self) -> usize {
        let (rank, _) = self.echelon(self.ncols);
        self.back_substitution(self.ncols);
        rank as usize
    }

    pub fn rank(&self) -> usize {
        self.clone().echelon(self.ncols).0 as usize
    }

    pub fn det(&self) -> Result<F::Element, MatrixError<F>> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare);
        }

        let mut m = self.clone();
        let (rank, odd) = m.echelon(m.ncols);
        if rank < m.nrows {
            return Ok(m.field.zero());
        }

        let mut det = m.field.one();
        for i in 0..m.nrows {
            m.field.mul_assign(&mut det, &m[(i, i)]);
        }

        if odd {
            Ok(m.field.neg(&det))
        } else {
            Ok(det)
        }
    }

    /// Solve `A * X = B` for `X`, where `A` is `self`. `B` may have several columns.
    pub fn solve(&self, b: &Matrix<F>) -> Result<Matrix<F>, MatrixError<F>> {
        if self.nrows != b.nrows {
            return Err(MatrixError::ShapeMismatch);
        }

        let (neqs, nvars, nrhs) = (self.nrows, self.ncols, b.ncols);

        let mut m = Matrix::new(neqs, nvars + nrhs, self.field.clone());
        for r in 0..neqs {
            for c in 0..nvars {
                m[(r, c)] = self[(r, c)].clone();
            }
            for c in 0..nrhs {
                m[(r, nvars + c)] = b[(r, c)].clone();
            }
        }

        let (rank, _) = m.echelon(nvars);

        for r in rank..neqs {
            if (0..nrhs).any(|c| !F::is_zero(&m[(r, nvars + c)])) {
                return Err(MatrixError::Inconsistent);
            }
        }

        if rank < nvars {
            return Err(MatrixError::Underdetermined {
                min_rank: rank,
                max_rank: rank,
                row_reduced_matrix: Some(m),
            });
        }

        m.back_substitution(nvars);

        let mut x = Matrix::new(nvars, nrhs, self.field.clone());
        for r in 0..nvars {
            for c in 0..nrhs {
                x[(r, c)] = std::mem::replace(&mut m[(r, nvars + c)], self.field.zero());
            }
        }
        Ok(x)
    }

    /// Compute the inverse of a square matrix.
    pub fn inv(&self) -> Result<Matrix<F>, MatrixError<F>> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare);
        }

        match self.solve(&Matrix::identity(self.nrows, self.field.clone())) {
            Err(MatrixError::Underdetermined { .. }) => Err(MatrixError::Singular),
            r => r,
        }
    }
}

impl Matrix<RationalField> {
    /// Return true iff the matrix is symmetric and all leading principal minors are positive.
    pub fn is_positive_definite(&self) -> bool {
        if !self.is_symmetric() {
            return false;
        }

        // elimination without pivoting yields the LDL^T pivots
        let mut m = self.clone();
        for j in 0..m.nrows {
            if m[(j, j)] <= 0 {
                return false;
            }

            let inv_pivot = m.field.inv(&m[(j, j)]);
            for k in j + 1..m.nrows {
                let s = m.field.mul(&m[(k, j)], &inv_pivot);
                for l in j..m.ncols {
                    let mut e = std::mem::take(&mut m[(k, l)]);
                    m.field.sub_mul_assign(&mut e, &m[(j, l)], &s);
                    m[(k, l)] = e;
                }
            }
        }
        true
    }

    /// Solve `A * X = B` for a rational symmetric positive-definite matrix `A`, where `A` is `self`,
    /// and return an enclosure of `X` together with the precision at which it was obtained.
    ///
    /// Singular or indefinite systems are detected exactly before any ball arithmetic
    /// is done and are reported as [PrecisionError::Singular].
    #[instrument(level = "debug", skip_all, fields(n = self.nrows, nrhs = b.ncols))]
    pub fn spd_solve_adaptive(
        &self,
        b: &Matrix<RationalField>,
        config: &AdaptivePrecision,
    ) -> Result<(Matrix<RealBallField>, u32), PrecisionError> {
        config.evaluate_checked(
            || {
                if !self.is_square() {
                    return Err("The matrix is not square".to_owned());
                }
                if self.nrows != b.nrows {
                    return Err("The right-hand side has the wrong number of rows".to_owned());
                }
                if !self.is_symmetric() {
                    return Err("The matrix is not symmetric".to_owned());
                }
                if self.rank() < self.nrows() {
                    return Err("The matrix is singular".to_owned());
                }
                if !self.is_positive_definite() {
                    return Err("The matrix is not positive definite".to_owned());
                }
                Ok(())
            },
            |prec| {
                let a = Matrix::from_rational(self, prec);
                let rhs = Matrix::from_rational(b, prec);
                match a.spd_solve(&rhs) {
                    Ok(x) if x.is_finite() => Attempt::Done(x),
                    Ok(_) | Err(MatrixError::NotPositiveDefinite { .. }) => Attempt::Retry,
                    Err(e) => Attempt::Singular(e.to_string()),
                }
            },
        )
    }
}

impl Matrix<RealBallField> {
    /// Enclose a rational matrix at precision `prec`.
    pub fn from_rational(m: &Matrix<RationalField>, prec: u32) -> Matrix<RealBallField> {
        m.map(|x| Ball::from_rational(x, prec), RealBallField::new(prec))
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Return true iff every entry of `m` is contained in the corresponding entry of `self`.
    pub fn contains_rational(&self, m: &Matrix<RationalField>) -> bool {
        self.nrows == m.nrows
            && self.ncols == m.ncols
            && self
                .data
                .iter()
                .zip(&m.data)
                .all(|(x, q)| x.contains_rational(q))
    }

    /// Return true iff every pair of corresponding entries overlaps.
    pub fn overlaps(&self, other: &Matrix<RealBallField>) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self.data.iter().zip(&other.data).all(|(x, y)| x.overlaps(y))
    }

    /// Compute the lower-triangular `L` with `L * L^T = self` for a symmetric
    /// positive-definite matrix. Only the lower triangle of `self` is read.
    ///
    /// Fails if a pivot cannot be proven to be positive, which happens for matrices
    /// that are not positive definite and for positive-definite matrices when the
    /// precision is too low.
    pub fn cho(&self) -> Result<Matrix<RealBallField>, MatrixError<RealBallField>> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare);
        }

        let n = self.nrows;
        let prec = self.field.get_precision();
        let mut l = Matrix::new(n, n, self.field);

        for j in 0..n {
            let mut d = self[(j, j)].clone();
            for k in 0..j {
                d.sub_assign(&l[(j, k)].sqr(prec), prec);
            }

            if !d.is_positive() {
                debug!("Pivot {} is not provably positive: {}", j, d);
                return Err(MatrixError::NotPositiveDefinite { pivot: j });
            }

            let djj = d.sqrt(prec);
            for i in j + 1..n {
                let mut s = self[(i, j)].clone();
                for k in 0..j {
                    s.sub_mul_assign(&l[(i, k)], &l[(j, k)], prec);
                }
                l[(i, j)] = s.div(&djj, prec);
            }
            l[(j, j)] = djj;
        }

        Ok(l)
    }

    /// Solve `L * L^T * X = B` for `X`, where `L` is `self` as computed by [Matrix::cho].
    pub fn solve_cho_precomp(&self, b: &Matrix<RealBallField>) -> Matrix<RealBallField> {
        let mut x = b.clone();
        self.solve_cho_precomp_assign(&mut x);
        x
    }

    /// Like [Matrix::solve_cho_precomp], but overwrite `b` with the solution.
    pub fn solve_cho_precomp_assign(&self, x: &mut Matrix<RealBallField>) {
        assert!(self.is_square(), "The factor is not square");
        assert_eq!(self.nrows, x.nrows, "The right-hand side has the wrong number of rows");

        let n = self.nrows;
        let prec = self.field.get_precision();

        for c in 0..x.ncols {
            for i in 0..n {
                let mut s = x[(i, c)].clone();
                for k in 0..i {
                    s.sub_mul_assign(&self[(i, k)], &x[(k, c)], prec);
                }
                x[(i, c)] = s.div(&self[(i, i)], prec);
            }

            for i in (0..n).rev() {
                let mut s = x[(i, c)].clone();
                for k in i + 1..n {
                    s.sub_mul_assign(&self[(k, i)], &x[(k, c)], prec);
                }
                x[(i, c)] = s.div(&self[(i, i)], prec);
            }
        }
    }

    /// Solve `A * X = B` for a symmetric positive-definite `A`, where `A` is `self`.
    #[instrument(level = "debug", skip_all, fields(n = self.nrows, prec = self.field.get_precision()))]
    pub fn spd_solve(
        &self,
        b: &Matrix<RealBallField>,
    ) -> Result<Matrix<RealBallField>, MatrixError<RealBallField>> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare);
        }
        if self.nrows != b.nrows {
            return Err(MatrixError::ShapeMismatch);
        }

        let l = self.cho()?;
        Ok(l.solve_cho_precomp(b))
    }
}
