//! Statistics primitives shared by the team and alliance reports.
//!
//! Everything here is a pure function of its arguments. The only source of
//! randomness in the crate is [`random_normal_value`], which draws from a
//! caller-supplied RNG so simulations can be seeded and reproduced.

use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Round a value to the given number of decimal places, half away from zero.
pub fn round(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Sum of a slice of samples.
pub fn sum(dataset: &[f64]) -> f64 {
    dataset.iter().sum()
}

/// Arithmetic mean of a slice of samples; 0.0 for an empty slice.
pub fn mean(dataset: &[f64]) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    sum(dataset) / dataset.len() as f64
}

/// Unbiased sample standard deviation (n - 1 denominator).
///
/// Returns 0.0 for fewer than two samples; a single match tells us nothing
/// about spread, and downstream variance propagation treats it as exact.
pub fn sample_std_dev(dataset: &[f64]) -> f64 {
    if dataset.len() < 2 {
        return 0.0;
    }

    let average = mean(dataset);
    let sum_square_dev: f64 = dataset.iter().map(|x| (x - average).powi(2)).sum();

    (sum_square_dev / (dataset.len() - 1) as f64).sqrt()
}

/// Sample standard deviation of an attempt-success proportion, from the
/// attempt and success counts alone. 0.0 for fewer than two attempts.
pub fn attempt_std_dev(attempts: u32, successes: u32) -> f64 {
    if attempts < 2 {
        return 0.0;
    }

    let attempts = f64::from(attempts);
    let successes = f64::from(successes);

    ((successes * (1.0 - successes / attempts)) / (attempts - 1.0)).sqrt()
}

/// Variance of a random variable scaled by a constant: Var(c·X) = (c·sd)².
pub fn scaled_variance(constant: f64, std_dev: f64) -> f64 {
    constant.powi(2) * std_dev.powi(2)
}

/// Standard deviation of a sum of mutually independent random variables,
/// √(Σ sdᵢ²). Independence is assumed, never verified.
pub fn sum_std_dev(std_devs: &[f64]) -> f64 {
    std_devs.iter().map(|sd| sd.powi(2)).sum::<f64>().sqrt()
}

/// Standard error of a sample mean, sd/√n. Degrades to 0.0 when the sample
/// size is non-positive rather than producing a NaN.
pub fn standard_error(std_dev: f64, sample_size: f64) -> f64 {
    if sample_size <= 0.0 {
        return 0.0;
    }
    std_dev / sample_size.sqrt()
}

/// t statistic for the difference of two independent sample means.
pub fn two_sample_t_score(
    mean_one: f64,
    standard_error_one: f64,
    mean_two: f64,
    standard_error_two: f64,
) -> f64 {
    (mean_one - mean_two) / sum_std_dev(&[standard_error_one, standard_error_two])
}

/// Degrees of freedom of a two-sample t-test with unequal variances, from
/// the Welch-Satterthwaite equation.
pub fn two_sample_degrees_of_freedom(
    standard_error_one: f64,
    sample_size_one: f64,
    standard_error_two: f64,
    sample_size_two: f64,
) -> f64 {
    let numerator = (standard_error_one.powi(2) + standard_error_two.powi(2)).powi(2);
    let denominator = standard_error_one.powi(4) / (sample_size_one - 1.0)
        + standard_error_two.powi(4) / (sample_size_two - 1.0);
    numerator / denominator
}

/// Cumulative probability below `t_score` for a Student-t distribution with
/// the given degrees of freedom.
///
/// Returns 0.5 (no information either way) when the degrees of freedom are
/// non-finite or non-positive, which happens when a team has too few
/// observations to estimate spread.
pub fn t_cumulative_distribution(degrees_of_freedom: f64, t_score: f64) -> f64 {
    if !degrees_of_freedom.is_finite() || degrees_of_freedom <= 0.0 || !t_score.is_finite() {
        return 0.5;
    }

    match StudentsT::new(0.0, 1.0, degrees_of_freedom) {
        Ok(dist) => dist.cdf(t_score),
        Err(_) => 0.5,
    }
}

/// t score at which the CDF of a t distribution with the given degrees of
/// freedom reaches `area`.
pub fn inverse_t_score(area: f64, degrees_of_freedom: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, degrees_of_freedom) {
        Ok(dist) => dist.inverse_cdf(area),
        Err(_) => 0.0,
    }
}

/// Value at the given percentile of a t distribution centered on `mean`,
/// with spread derived from `std_dev` and the degrees of freedom.
///
/// With a percentile above 0.5 this is the upper endpoint of a one-sided
/// confidence interval on the mean.
pub fn inverse_t_value(percentile: f64, degrees_of_freedom: f64, mean: f64, std_dev: f64) -> f64 {
    let t_score = inverse_t_score(percentile, degrees_of_freedom);
    let standard_error = standard_error(std_dev, degrees_of_freedom.floor() + 1.0);
    t_score * standard_error + mean
}

/// One draw from Normal(mean, sd²), clamped at zero.
///
/// Every sampled metric is a non-negative quantity (game pieces, success
/// rates), so the left tail below zero is truncated. A non-positive standard
/// deviation degenerates to the mean itself.
pub fn random_normal_value<R: Rng + ?Sized>(mean: f64, std_dev: f64, rng: &mut R) -> f64 {
    if std_dev <= 0.0 {
        return mean.max(0.0);
    }

    match Normal::new(mean, std_dev) {
        Ok(dist) => dist.sample(rng).max(0.0),
        Err(_) => mean.max(0.0),
    }
}
