//! Recovery indices (0–100) for health metrics as a function of days
//! since smoking cessation. Closed-form curves; each function clamps a
//! non-positive day count to 0 and saturates at 100.

/// Negative day counts (quit date in the future) mean recovery has not
/// started yet.
fn effective_days(days_since_quit: i64) -> f64 {
    days_since_quit.max(0) as f64
}

fn linear_index(days_since_quit: i64, full_recovery_days: f64) -> u32 {
    let d = effective_days(days_since_quit);
    if d == 0.0 {
        return 0;
    }
    (d / full_recovery_days * 100.0).min(100.0).round() as u32
}

/// Exponential saturation `100 * (1 - e^(-d/tau))`.
fn exponential_index(days_since_quit: i64, tau_days: f64) -> u32 {
    let d = effective_days(days_since_quit);
    if d == 0.0 {
        return 0;
    }
    (100.0 * (1.0 - (-d / tau_days).exp())).min(100.0).round() as u32
}

/// Relative-risk decay toward a floor `rr_inf` with time constant
/// `tau_months`, rescaled to a 0–100 recovery index.
fn risk_decay_index(days_since_quit: i64, rr_inf: f64, tau_months: f64) -> u32 {
    let d = effective_days(days_since_quit);
    if d == 0.0 {
        return 0;
    }
    let t_months = d / 30.0;
    let rr_t = (1.0 - rr_inf) * (-t_months / tau_months).exp() + rr_inf;
    ((1.0 - rr_t) / (1.0 - rr_inf) * 100.0).min(100.0).round() as u32
}

/// Nicotine elimination (plasma half-life ~2 h).
pub fn nicotine_expelled(days_since_quit: i64) -> u32 {
    let tau_days = (2.0 / std::f64::consts::LN_2) / 24.0;
    exponential_index(days_since_quit, tau_days)
}

/// Blood carboxyhemoglobin normalization (half-life ~5 h).
pub fn carbon_monoxide_level(days_since_quit: i64) -> u32 {
    let tau_days = (5.0 * 60.0) / std::f64::consts::LN_2 / 1440.0;
    exponential_index(days_since_quit, tau_days)
}

/// Pulse rate improvement (normalizes within ~1 day).
pub fn pulse_rate(days_since_quit: i64) -> u32 {
    linear_index(days_since_quit, 1.0)
}

/// Blood oxygen levels (normalize within ~3 days).
pub fn oxygen_levels(days_since_quit: i64) -> u32 {
    linear_index(days_since_quit, 3.0)
}

/// Taste and smell sensitivity (~60 days).
pub fn taste_and_smell(days_since_quit: i64) -> u32 {
    linear_index(days_since_quit, 60.0)
}

/// Pulmonary function (~3 months).
pub fn breathing(days_since_quit: i64) -> u32 {
    linear_index(days_since_quit, 90.0)
}

/// Energy levels (~3 months).
pub fn energy_levels(days_since_quit: i64) -> u32 {
    linear_index(days_since_quit, 90.0)
}

/// Peripheral circulation (~3 months).
pub fn circulation(days_since_quit: i64) -> u32 {
    linear_index(days_since_quit, 90.0)
}

/// Gum health (~6 months).
pub fn gum_texture(days_since_quit: i64) -> u32 {
    linear_index(days_since_quit, 180.0)
}

/// Immune markers and lung defense (~14 days).
pub fn immunity_and_lung_function(days_since_quit: i64) -> u32 {
    linear_index(days_since_quit, 14.0)
}

/// Coronary heart disease risk (halved by ~12 months).
pub fn reduced_risk_of_heart_disease(days_since_quit: i64) -> u32 {
    risk_decay_index(days_since_quit, 0.5, 12.0 / std::f64::consts::LN_2)
}

/// Lung cancer risk (rr floor 0.03, tau 162 months).
pub fn decreased_risk_of_lung_cancer(days_since_quit: i64) -> u32 {
    risk_decay_index(days_since_quit, 0.03, 162.0)
}

/// Acute MI risk follows the same curve as heart disease.
pub fn decreased_risk_of_heart_attack(days_since_quit: i64) -> u32 {
    reduced_risk_of_heart_disease(days_since_quit)
}

/// Money saved since the quit date, in the user's local currency.
pub fn money_saved(days_since_quit: i64, cigarettes_per_day: u32, price_per_cigarette: f64) -> f64 {
    effective_days(days_since_quit) * cigarettes_per_day as f64 * price_per_cigarette
}

/// Estimated life expectancy regained, in hours, assuming ~10
/// cigarettes/day and ~20 minutes of life lost per cigarette.
pub fn life_regained_in_hours(days_since_quit: i64) -> u64 {
    let d = effective_days(days_since_quit);
    if d == 0.0 {
        return 0;
    }
    let minutes_per_cigarette = 20.0;
    let cigarettes_per_day = 10.0;
    let hours_per_day = cigarettes_per_day * minutes_per_cigarette / 60.0;
    (d * hours_per_day).round() as u64
}
