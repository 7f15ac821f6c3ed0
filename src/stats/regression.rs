//! Regression analysis for one response variable.
//!
//! Linear regression `y = alpha + beta * x` and quadratic regression of the
//! best-fit parabola `y = alpha + beta * x + gamma * x^2`, including the
//! coefficient of determination and standard errors of the estimates.

use tracing::warn;

use super::Spot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegressionType {
    Linear,
    Quadratic,
}

#[derive(Debug, Clone)]
pub struct SingleResponseRegression {
    n: usize,
    xx: Vec<f64>,
    yy: Vec<f64>,
    /// square(xx), only populated for quadratic regression
    zz: Vec<f64>,
    xbar: f64,
    ybar: f64,
    zbar: f64,
    xxbar: f64,
    yybar: f64,
    xybar: f64,
    zzbar: f64,
    zxbar: f64,
    zybar: f64,
}

impl SingleResponseRegression {
    /// `points` hold the independent variable `x` and the response `y`.
    pub fn new(points: &[Spot<f64>], kind: RegressionType) -> Self {
        assert!(!points.is_empty(), "empty points");

        let mut regression = Self {
            n: points.len(),
            xx: Vec::with_capacity(points.len()),
            yy: Vec::with_capacity(points.len()),
            zz: Vec::new(),
            xbar: 0.,
            ybar: 0.,
            zbar: 0.,
            xxbar: 0.,
            yybar: 0.,
            xybar: 0.,
            zzbar: 0.,
            zxbar: 0.,
            zybar: 0.,
        };

        let mut sumx = 0.;
        let mut sumy = 0.;
        let mut sumz = 0.;
        for point in points {
            regression.xx.push(point.x);
            regression.yy.push(point.y);
            sumx += point.x;
            sumy += point.y;
            if kind == RegressionType::Quadratic {
                regression.zz.push(point.x * point.x);
                sumz += point.x * point.x;
            }
        }
        regression.xbar = sumx / regression.n as f64;
        regression.ybar = sumy / regression.n as f64;
        regression.zbar = sumz / regression.n as f64;

        for i in 0..regression.n {
            regression.xxbar += (regression.xx[i] - regression.xbar) * (regression.xx[i] - regression.xbar);
            regression.yybar += (regression.yy[i] - regression.ybar) * (regression.yy[i] - regression.ybar);
            regression.xybar += (regression.xx[i] - regression.xbar) * (regression.yy[i] - regression.ybar);
        }
        if regression.is_quadratic() {
            for i in 0..regression.n {
                regression.zzbar += (regression.zz[i] - regression.zbar) * (regression.zz[i] - regression.zbar);
                regression.zxbar += (regression.zz[i] - regression.zbar) * (regression.xx[i] - regression.xbar);
                regression.zybar += (regression.zz[i] - regression.zbar) * (regression.yy[i] - regression.ybar);
            }
        }
        regression
    }

    fn is_quadratic(&self) -> bool {
        !self.zz.is_empty()
    }

    /// The residual and regression sums of squares.
    fn error_sums(&self) -> (f64, f64) {
        let mut rss = 0.;
        let mut ssr = 0.;
        if self.n >= 2 {
            for i in 0..self.n {
                let fit = self.response(self.xx[i]);
                rss += (fit - self.yy[i]) * (fit - self.yy[i]);
                ssr += (fit - self.ybar) * (fit - self.ybar);
            }
        }
        (rss, ssr)
    }

    /// The y-intercept alpha of the best-fit line.
    pub fn intercept(&self) -> f64 {
        self.ybar - self.slope() * self.xbar
    }

    /// The slope beta of the best-fit line.
    pub fn slope(&self) -> f64 {
        if self.n < 2 {
            0.
        } else {
            self.xybar / self.xxbar
        }
    }

    /// The coefficient of determination R^2, a real number between 0 and 1.
    pub fn r2(&self) -> f64 {
        if self.n < 2 {
            0.
        } else {
            let (rss, _) = self.error_sums();
            1. - rss / self.yybar
        }
    }

    /// The standard error of the estimate for the intercept.
    pub fn intercept_std_err(&self) -> f64 {
        if self.n <= 2 {
            0.
        } else {
            let (rss, _) = self.error_sums();
            let svar = rss / (self.n - 2) as f64;
            let svar1 = svar / self.xxbar;
            (svar / self.n as f64 + self.xbar * self.xbar * svar1).sqrt()
        }
    }

    /// The standard error of the estimate for the slope.
    pub fn slope_std_err(&self) -> f64 {
        if self.n <= 2 {
            0.
        } else {
            let (rss, _) = self.error_sums();
            let svar = rss / (self.n - 2) as f64;
            (svar / self.xxbar).sqrt()
        }
    }

    /// The y-curvature gamma of the best-fit parabola.
    pub fn gamma(&self) -> f64 {
        assert!(self.is_quadratic(), "gamma requires a quadratic regression");
        if self.n <= 2 {
            return 0.;
        }
        let numerator = self.zybar * self.xxbar - self.xybar * self.zxbar;
        if numerator == 0. {
            return 0.;
        }
        let denominator = self.zzbar * self.xxbar - self.zxbar * self.zxbar;
        if denominator == 0. {
            warn!(numerator, denominator, "degenerate parabola denominator");
            0.
        } else {
            numerator / denominator
        }
    }

    /// The y-slope beta of the best-fit parabola.
    pub fn beta(&self) -> f64 {
        assert!(self.is_quadratic(), "beta requires a quadratic regression");
        if self.n <= 1 {
            return 0.;
        }
        let numerator = self.xybar - self.gamma() * self.zxbar;
        let denominator = self.xxbar;
        if denominator == 0. {
            warn!(numerator, denominator, "degenerate parabola denominator");
            0.
        } else {
            numerator / denominator
        }
    }

    /// The y-intercept alpha of the best-fit parabola.
    pub fn alpha(&self) -> f64 {
        assert!(self.is_quadratic(), "alpha requires a quadratic regression");
        self.ybar - self.gamma() * self.zbar - self.beta() * self.xbar
    }

    /// The expected response for all input values of the independent variable.
    pub fn responses(&self) -> Vec<Spot<f64>> {
        self.xx.iter().map(|&x| Spot::new(x, self.response(x))).collect()
    }

    /// The expected response given the value of the independent variable.
    pub fn response(&self, x_value: f64) -> f64 {
        if self.is_quadratic() && self.gamma() != 0. {
            self.alpha() + self.beta() * x_value + self.gamma() * x_value * x_value
        } else {
            self.slope() * x_value + self.intercept()
        }
    }

    /// The first independent value.
    pub fn first_regressor(&self) -> f64 {
        self.xx[0]
    }

    /// The delta of the x bounds values.
    pub fn regressor_delta(&self) -> f64 {
        self.xx[self.xx.len() - 1] - self.xx[0]
    }

    /// The delta of the y bounds values.
    pub fn delta(&self) -> f64 {
        self.yy[self.yy.len() - 1] - self.yy[0]
    }

    /// The value of the independent variable for the parabola extremum.
    /// The caller is responsible that an extremum actually exists.
    pub fn parabola_extremum(&self) -> f64 {
        assert!(self.is_quadratic(), "extremum requires a quadratic regression");
        self.beta() / self.gamma() / -2.
    }

    /// The average of the y values.
    pub fn avg(&self) -> f64 {
        self.ybar
    }

    /// The sample standard deviation of the y values.
    pub fn sigma(&self) -> f64 {
        if self.n < 2 {
            0.
        } else {
            (self.yybar / (self.n - 1) as f64).sqrt()
        }
    }

    pub fn real_size(&self) -> usize {
        self.n
    }
}
