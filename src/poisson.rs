use crate::error::EngineError;
use crate::rng::RandomSource;

/// Above this the multiplicative method loses precision (e^-lambda underflows toward 0).
pub const MAX_LAMBDA: f64 = 50.0;
pub const MAX_DRAWS: u32 = 1000;

/// Knuth's multiplicative Poisson sampler.
///
/// Multiplies uniform draws until the running product falls to `e^-lambda` or below and
/// returns the number of draws minus one.
pub fn sample_goal_count(lambda: f64, rng: &mut impl RandomSource) -> Result<u32, EngineError> {
    if !lambda.is_finite() || lambda < 0.0 || lambda > MAX_LAMBDA {
        return Err(EngineError::UnsupportedRate { lambda });
    }

    let limit = (-lambda).exp();
    let mut draws = 0u32;
    let mut product = 1.0;
    loop {
        draws += 1;
        product *= rng.next_f64();
        if product <= limit {
            return Ok(draws - 1);
        }
        if draws >= MAX_DRAWS {
            return Err(EngineError::SamplerNonTermination { lambda, draws });
        }
    }
}

pub fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let mut out = vec![0.0; max_k + 1];
    let lambda = lambda.max(0.0);

    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }

    let sum: f64 = out.iter().sum();
    if sum < 1.0 {
        out[max_k] += 1.0 - sum;
    }
    out
}

/// Home/draw/away probabilities of a regulation result given both rates.
pub fn outcome_probs(lambda_home: f64, lambda_away: f64, max_goals: u32) -> (f64, f64, f64) {
    let pmf_h = poisson_pmf(lambda_home, max_goals);
    let pmf_a = poisson_pmf(lambda_away, max_goals);

    let mut p_home = 0.0;
    let mut p_draw = 0.0;
    let mut p_away = 0.0;
    for (i, p_i) in pmf_h.iter().enumerate() {
        for (j, p_j) in pmf_a.iter().enumerate() {
            let p = p_i * p_j;
            if i > j {
                p_home += p;
            } else if i < j {
                p_away += p;
            } else {
                p_draw += p;
            }
        }
    }

    let sum = p_home + p_draw + p_away;
    if sum > 0.0 {
        (p_home / sum, p_draw / sum, p_away / sum)
    } else {
        (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
    }
}
