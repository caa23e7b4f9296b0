//! Material and time efficiency formulas
//!
//! Efficiency is always applied to the whole batch (`base * runs`), never per
//! run. That is what makes large batches cheaper per unit.

/// Time can never drop below 10% of the baseline
pub const MAX_TIME_REDUCTION: f64 = 0.9;

/// Round to two decimal places, halves away from zero.
///
/// The rounding happens on the binary value scaled by 100, so a literal like
/// `1.005` (stored as `1.00499..`) rounds down. Its job is to remove float
/// noise such as `90.00000000000001` before the ceiling is taken.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Combined material efficiency as a fraction
pub fn material_efficiency(
    blueprint_me: u32,
    structure_bonus: f64,
    rig_bonus: f64,
    security_multiplier: f64,
) -> f64 {
    f64::from(blueprint_me) / 100.0 + structure_bonus + rig_bonus * security_multiplier
}

/// Combined time efficiency as a fraction, capped at [`MAX_TIME_REDUCTION`]
pub fn time_efficiency(
    blueprint_te: u32,
    structure_bonus: f64,
    rig_bonus: f64,
    security_multiplier: f64,
) -> f64 {
    let total = f64::from(blueprint_te) / 100.0 + structure_bonus + rig_bonus * security_multiplier;
    total.min(MAX_TIME_REDUCTION)
}

/// Units of a material consumed by `runs` runs after efficiency.
///
/// Never less than one unit per run.
pub fn calculate_material_quantity(
    base_quantity_per_run: u64,
    runs: u64,
    blueprint_me: u32,
    structure_bonus: f64,
    rig_bonus: f64,
    security_multiplier: f64,
) -> u64 {
    let efficiency = material_efficiency(blueprint_me, structure_bonus, rig_bonus, security_multiplier);
    let raw = base_quantity_per_run as f64 * runs as f64 * (1.0 - efficiency);
    let ceiled = round_to_hundredths(raw).ceil();

    if ceiled <= runs as f64 {
        runs
    } else {
        ceiled as u64
    }
}

/// Job duration in seconds for `runs` runs after efficiency
pub fn calculate_job_time(
    base_time_seconds: u64,
    runs: u64,
    blueprint_te: u32,
    structure_bonus: f64,
    rig_bonus: f64,
    security_multiplier: f64,
) -> u64 {
    let efficiency = time_efficiency(blueprint_te, structure_bonus, rig_bonus, security_multiplier);
    let time = base_time_seconds as f64 * runs as f64 * (1.0 - efficiency);
    time.ceil().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_of_one_unit_per_run() {
        // 10 * (1 - 0.148) = 8.52 -> 9, floored to 10
        assert_eq!(calculate_material_quantity(1, 10, 10, 0.01, 0.02, 1.9), 10);
        assert_eq!(calculate_material_quantity(1, 1, 10, 0.01, 0.02, 2.1), 1);
    }

    #[test]
    fn no_efficiency_is_exact() {
        assert_eq!(calculate_material_quantity(10, 4, 0, 0.0, 0.0, 1.0), 40);
        assert_eq!(calculate_material_quantity(3, 10, 0, 0.0, 0.0, 1.0), 30);
    }

    #[test]
    fn efficiency_applies_to_whole_batch() {
        // Per run: 100 * 0.9 = 90. Batch of 20: 2000 * 0.9 = 1800.
        assert_eq!(calculate_material_quantity(100, 1, 10, 0.0, 0.0, 1.0), 90);
        assert_eq!(calculate_material_quantity(100, 20, 10, 0.0, 0.0, 1.0), 1800);

        // 5 * 0.9 = 4.5 -> 5 per run, but 10 runs need only 45, not 50
        assert_eq!(calculate_material_quantity(5, 1, 10, 0.0, 0.0, 1.0), 5);
        assert_eq!(calculate_material_quantity(5, 10, 10, 0.0, 0.0, 1.0), 45);
    }

    #[test]
    fn stacked_bonuses() {
        // 1 - (0.10 + 0.01 + 0.02 * 1.9) = 0.852; 1000 * 0.852 = 852
        assert_eq!(calculate_material_quantity(1000, 1, 10, 0.01, 0.02, 1.9), 852);
        // 1 - (0.10 + 0.01 + 0.024 * 2.1) = 0.8396; 250 * 0.8396 = 209.9 -> 210
        assert_eq!(calculate_material_quantity(250, 1, 10, 0.01, 0.024, 2.1), 210);
    }

    #[test]
    fn rounding_to_hundredths_halves_away_from_zero() {
        assert_eq!(round_to_hundredths(2.125), 2.13);
        assert_eq!(round_to_hundredths(-2.125), -2.13);
        assert_eq!(round_to_hundredths(90.00000000000001), 90.0);
        assert_eq!(round_to_hundredths(1.00390625), 1.0);
    }

    #[test]
    fn hundredths_rounding_decides_the_ceiling() {
        // 1/256 over an integer is dropped by the rounding step, 1/128 is not
        assert_eq!(round_to_hundredths(9.00390625).ceil(), 9.0);
        assert_eq!(round_to_hundredths(9.0078125).ceil(), 10.0);
    }

    #[test]
    fn time_without_bonuses() {
        assert_eq!(calculate_job_time(600, 3, 0, 0.0, 0.0, 1.0), 1800);
    }

    #[test]
    fn time_with_bonuses() {
        assert_eq!(calculate_job_time(1000, 1, 20, 0.0, 0.0, 1.0), 800);
        assert_eq!(calculate_job_time(6000, 1, 0, 0.25, 0.0, 1.0), 4500);
        // 0.25 structure + 0.125 rig doubled by security = 0.5
        assert_eq!(calculate_job_time(6000, 2, 0, 0.25, 0.125, 2.0), 6000);
    }

    #[test]
    fn time_reduction_is_capped() {
        // 0.20 + 0.30 + 0.24 * 2.1 = 1.004, capped to 0.9
        assert_eq!(calculate_job_time(3600, 10, 20, 0.30, 0.24, 2.1), 3600);
        assert_eq!(time_efficiency(20, 0.30, 0.24, 2.1), MAX_TIME_REDUCTION);
    }
}
