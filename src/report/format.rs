//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the loading/extraction code stays clean and testable
//! - output changes are localized

use crate::config::{Configuration, ResolvedConfiguration};
use crate::extract::ExtractionResult;
use crate::instrument::WavelengthBins;
use crate::units::{ASTRONOMICAL_UNIT, MILLIARCSEC, PARSEC};
use crate::target::TargetSystem;

/// Configuration as written, with SI values and derived counts.
pub fn format_config_summary(config: &Configuration, resolved: &ResolvedConfiguration) -> String {
    let s = &config.settings;
    let m = &config.mission;
    let o = &config.observatory;
    let i = &o.instrument_parameters;
    let (rs, rm, ro) = (&resolved.settings, &resolved.mission, &resolved.observatory);

    let mut out = String::new();
    out.push_str("=== sygn - configuration ===\n");

    out.push_str("Settings:\n");
    out.push_str(&format!("- grid size: {0}x{0}\n", s.grid_size));
    out.push_str(&format!(
        "- time step: {} ({:.6e} s) -> {} steps\n",
        s.time_step_size, rs.time_step_size_s, rs.time_step_count
    ));
    out.push_str(&format!(
        "- leakage: stellar={} local-zodi={} exozodi={}\n",
        yes_no(s.stellar_leakage),
        yes_no(s.local_zodi_leakage),
        yes_no(s.exozodi_leakage)
    ));
    out.push_str(&format!(
        "- fiber injection variability: {}\n",
        yes_no(s.fiber_injection_variability)
    ));
    let opd = &s.optical_path_difference_variability;
    out.push_str(&format!(
        "- OPD variability: {} (exponent={}, rms={} = {:.6e} m)\n",
        yes_no(opd.apply),
        opd.power_law_exponent,
        opd.rms,
        rs.opd_variability_rms_m
    ));

    out.push_str("Mission:\n");
    out.push_str(&format!(
        "- integration time: {} ({:.6e} s)\n",
        m.integration_time, rm.integration_time_s
    ));
    out.push_str(&format!(
        "- modulation period: {} ({:.6e} s)\n",
        m.modulation_period, rm.modulation_period_s
    ));
    out.push_str(&format!(
        "- baselines: ratio={} min={} max={} ({:.3} m .. {:.3} m)\n",
        m.baseline_ratio, m.baseline_minimum, m.baseline_maximum, rm.baseline_minimum_m, rm.baseline_maximum_m
    ));
    out.push_str(&format!(
        "- optimized for: {} at {} ({:.6e} m)\n",
        m.optimized_star_separation.as_str(),
        m.optimized_wavelength,
        rm.optimized_wavelength_m
    ));

    out.push_str("Observatory:\n");
    out.push_str(&format!(
        "- array: {} ({} apertures{})\n",
        o.array_configuration.as_str(),
        ro.aperture_count,
        if o.array_configuration.is_rotating() { ", rotating" } else { "" }
    ));
    out.push_str(&format!(
        "- beam combination: {} ({} differential output{})\n",
        o.beam_combination_scheme.as_str(),
        ro.differential_output_count,
        if ro.differential_output_count == 1 { "" } else { "s" }
    ));
    out.push_str(&format!(
        "- aperture diameter: {} ({:.3} m)\n",
        i.aperture_diameter, ro.aperture_diameter_m
    ));
    out.push_str(&format!(
        "- wavelengths: {} .. {} at R={} -> {} bins\n",
        i.wavelength_range_lower_limit, i.wavelength_range_upper_limit, i.spectral_resolving_power, ro.wavelength_bin_count
    ));
    out.push_str(&format!("- throughput: {}\n", i.unperturbed_instrument_throughput));

    out
}

/// Wavelength bin table in micrometres.
pub fn format_bins_table(bins: &WavelengthBins) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>4} {:>12} {:>12} {:>12} {:>12}\n", "#", "center_um", "width_um", "lower_um", "upper_um"));
    out.push_str(&format!("{:-<4} {:-<12} {:-<12} {:-<12} {:-<12}\n", "", "", "", "", ""));
    for (k, (center, width)) in bins.iter().enumerate() {
        out.push_str(&format!(
            "{:>4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}\n",
            k,
            center * 1e6,
            width * 1e6,
            (center - width / 2.0) * 1e6,
            (center + width / 2.0) * 1e6
        ));
    }
    out.push_str(&format!("{} bins\n", bins.len()));
    out
}

/// Star and planets as seen from the observer.
pub fn format_target_summary(target: &TargetSystem, grid_size: usize) -> String {
    let star = &target.star;
    let d = star.distance_m();

    let mut out = String::new();
    out.push_str(&format!("=== sygn - target system: {} ===\n", star.name));
    out.push_str(&format!(
        "Star: T={} R={} M={} L={}\n",
        star.temperature, star.radius, star.mass, star.luminosity
    ));
    out.push_str(&format!(
        "- distance: {} ({:.3} pc), RA={} Dec={}\n",
        star.distance,
        d / PARSEC,
        star.right_ascension,
        star.declination
    ));
    out.push_str(&format!("- angular radius: {:.4} mas\n", star.angular_radius() / MILLIARCSEC));
    out.push_str(&format!(
        "- habitable zone centre: {:.4} au ({:.3} mas)\n",
        star.habitable_zone_central_radius() / ASTRONOMICAL_UNIT,
        star.habitable_zone_central_angular_radius() / MILLIARCSEC
    ));

    if target.planets.is_empty() {
        out.push_str("Planets: none\n");
        return out;
    }

    out.push_str("Planets:\n");
    out.push_str(&format!(
        "{:<16} {:>10} {:>12} {:>12} {:>12} {:>10}\n",
        "name", "T_K", "sep_x_mas", "sep_y_mas", "sep_mas", "cell"
    ));
    for p in &target.planets {
        let cell = p
            .grid_cell(d, grid_size)
            .map(|c| format!("({},{})", c.row, c.col))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<16} {:>10.1} {:>12.3} {:>12.3} {:>12.3} {:>10}\n",
            truncate(&p.name, 16),
            p.temperature.to_si(),
            p.angular_separation_x(d) / MILLIARCSEC,
            p.angular_separation_y(d) / MILLIARCSEC,
            p.angular_separation(d) / MILLIARCSEC,
            cell
        ));
    }

    out
}

/// Most likely planet cell per differential output.
pub fn format_extraction_summary(result: &ExtractionResult) -> String {
    let mut out = String::new();
    out.push_str("=== sygn - ML extraction ===\n");
    out.push_str(&format!(
        "Grid: {0}x{0} | outputs: {1} | templates: {2}\n",
        result.grid_size,
        result.cost_maps.len(),
        result.flux.len()
    ));
    if !result.skipped_channels.is_empty() {
        out.push_str(&format!(
            "Skipped {} channel(s) without variance\n",
            result.skipped_channels.len()
        ));
    }

    for best in &result.best {
        out.push_str(&format!(
            "Output {}: cell ({},{}) template #{} cost={:.6e}\n",
            best.output, best.row, best.col, best.template, best.cost
        ));
        if let Some(p) = best.position {
            out.push_str(&format!(
                "- position: x={:.3} mas y={:.3} mas\n",
                p.x / MILLIARCSEC,
                p.y / MILLIARCSEC
            ));
        }
        out.push_str(&format!("- flux: {}\n", fmt_vec(&best.flux)));
    }

    out
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4e}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SkyPosition;
    use crate::extract::Detection;
    use nalgebra::DMatrix;

    #[test]
    fn config_summary_shows_si_and_derived_counts() {
        let config = crate::config::tests::example();
        let resolved = config.resolve().unwrap();
        let txt = format_config_summary(&config, &resolved);

        assert!(txt.contains("- grid size: 50x50\n"), "{txt}");
        assert!(txt.contains("-> 100 steps"), "{txt}");
        assert!(txt.contains("emma-x-circular-rotation (4 apertures, rotating)"), "{txt}");
        assert!(txt.contains("double-bracewell (1 differential output)"), "{txt}");
        assert!(txt.contains("-> 32 bins"), "{txt}");
        assert!(txt.contains("(9.000 m .. 600.000 m)"), "{txt}");
    }

    #[test]
    fn bins_table_lists_every_bin() {
        let bins = WavelengthBins::from_range(4e-6, 6e-6, 2.0).unwrap();
        let txt = format_bins_table(&bins);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 2 + bins.len() + 1);
        assert!(lines[2].trim_start().starts_with("0 "));
        assert_eq!(lines.last().copied(), Some(format!("{} bins", bins.len()).as_str()));
    }

    #[test]
    fn target_summary_uses_milliarcseconds() {
        let target = crate::target::tests::example();
        let txt = format_target_summary(&target, 5);

        assert!(txt.contains("(10.000 pc)"), "{txt}");
        assert!(txt.contains("angular radius: 0.4650 mas"), "{txt}");
        assert!(txt.contains("habitable zone centre: 1.25"), "{txt}");
        let earth = txt.lines().find(|l| l.starts_with("Earth")).unwrap();
        assert!(earth.contains("100.000"), "{earth}");
        assert!(earth.ends_with("(2,4)"), "{earth}");
    }

    #[test]
    fn extraction_summary_lists_best_cell_per_output() {
        let result = ExtractionResult {
            grid_size: 2,
            cost_maps: vec![DMatrix::zeros(2, 2), DMatrix::zeros(2, 2)],
            flux: vec![Vec::new(); 4],
            positions: vec![None; 4],
            best: vec![
                Detection {
                    output: 0,
                    template: 3,
                    row: 1,
                    col: 1,
                    cost: 12.5,
                    flux: vec![1.0, 2.0],
                    position: Some(SkyPosition {
                        x: 50.0 * MILLIARCSEC,
                        y: -25.0 * MILLIARCSEC,
                    }),
                },
                Detection {
                    output: 1,
                    template: 0,
                    row: 0,
                    col: 0,
                    cost: 0.0,
                    flux: vec![0.0, 0.0],
                    position: None,
                },
            ],
            skipped_channels: vec![(1, 0)],
        };

        let txt = format_extraction_summary(&result);
        assert!(txt.contains("Grid: 2x2 | outputs: 2 | templates: 4"), "{txt}");
        assert!(txt.contains("Skipped 1 channel(s)"), "{txt}");
        assert!(txt.contains("Output 0: cell (1,1) template #3 cost=1.250000e1"), "{txt}");
        assert!(txt.contains("x=50.000 mas y=-25.000 mas"), "{txt}");
        assert!(txt.contains("- flux: [1.0000e0, 2.0000e0]"), "{txt}");
        assert!(txt.contains("Output 1: cell (0,0)"), "{txt}");
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Earth", 16), "Earth");
        assert_eq!(truncate("abcdefgh", 4), "abc.");
    }
}
