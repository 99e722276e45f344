use textplots::{Chart, Plot};

use crate::waveform::Waveform;

/// Determine the best scale and unit prefix for a given maximum value
fn determine_scale(max_value: f64) -> (f64, &'static str) {
    if max_value >= 1.0 {
        (1.0, "")
    } else if max_value >= 1e-3 {
        (1e3, "m")
    } else if max_value >= 1e-6 {
        (1e6, "μ")
    } else if max_value >= 1e-9 {
        (1e9, "n")
    } else {
        (1e12, "p")
    }
}

/// Render a capture as a terminal line plot with auto-scaled axes.
///
/// Both axes pick an SI prefix from the data range, so a microsecond sweep
/// of millivolt samples reads as μs over mV instead of raw exponents.
///
/// # Examples
/// ```
/// use tekscope::plotting::plot_waveform;
/// use tekscope::Waveform;
///
/// let waveform = Waveform {
///     times: vec![0.0, 1e-6, 2e-6],
///     voltages: vec![0.0, 0.5, -0.5],
/// };
/// plot_waveform(&waveform, Some("CH1 capture"), None, None).unwrap();
/// ```
pub fn plot_waveform(
    waveform: &Waveform,
    title: Option<&str>,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    if waveform.is_empty() {
        return Err("Cannot plot empty waveform".into());
    }

    let width = width.unwrap_or(140);
    let height = height.unwrap_or(60);

    let min_voltage = waveform.voltages.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max_voltage = waveform
        .voltages
        .iter()
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let max_abs_voltage = max_voltage.abs().max(min_voltage.abs());
    let max_abs_time = waveform
        .times
        .iter()
        .fold(0.0f64, |a, &b| a.max(b.abs()));

    let (voltage_scale, voltage_unit) = determine_scale(max_abs_voltage);
    let (time_scale, time_unit) = determine_scale(max_abs_time);

    let frame: Vec<(f32, f32)> = waveform
        .times
        .iter()
        .zip(&waveform.voltages)
        .map(|(&t, &v)| ((t * time_scale) as f32, (v * voltage_scale) as f32))
        .collect();

    if let Some(title) = title {
        println!("{}", title);
    } else {
        println!("Waveform");
    }
    println!("X-axis: {}s | Y-axis: {}V", time_unit, voltage_unit);
    println!(
        "Range: {} samples | Voltage: {:.3} to {:.3} {}V",
        waveform.len(),
        min_voltage * voltage_scale,
        max_voltage * voltage_scale,
        voltage_unit
    );
    println!("{}", "─".repeat(width));

    let x_min = frame.first().map(|p| p.0).unwrap_or(0.0);
    let mut x_max = frame.last().map(|p| p.0).unwrap_or(1.0);
    if x_max <= x_min {
        // a degenerate x range (single sample) would panic inside textplots
        x_max = x_min + 1.0;
    }
    Chart::new(width as u32, height as u32, x_min, x_max)
        .lineplot(&textplots::Shape::Lines(&frame))
        .nice();

    println!("Time ({}s) →", time_unit);

    Ok(())
}
