//! Palette functions mapping a scalar in [0, 1] to RGB.

use std::f32::consts::PI;

use crate::schema::{Palette, RenderSettings};

pub type Rgb = [f32; 3];

/// Tint drawn over obstacle cells when obstacles are shown.
pub const OBSTACLE_TINT: Rgb = [0.15, 0.15, 0.2];

#[inline]
fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    [
        a[0] * (1.0 - t) + b[0] * t,
        a[1] * (1.0 - t) + b[1] * t,
        a[2] * (1.0 - t) + b[2] * t,
    ]
}

#[inline]
fn mix1(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Four-stop gradient with breakpoints at 0.33 and 0.66.
fn four_stop(stops: [Rgb; 4], t: f32) -> Rgb {
    if t < 0.33 {
        mix(stops[0], stops[1], t / 0.33)
    } else if t < 0.66 {
        mix(stops[1], stops[2], (t - 0.33) / 0.33)
    } else {
        mix(stops[2], stops[3], (t - 0.66) / 0.34)
    }
}

pub fn heatmap(t: f32) -> Rgb {
    four_stop(
        [[0.0, 0.0, 0.3], [0.0, 0.3, 0.8], [1.0, 0.3, 0.0], [1.0, 1.0, 0.2]],
        t,
    )
}

pub fn neon(t: f32) -> Rgb {
    let phase = 2.0 * PI * t;
    let r = 0.5 + 0.5 * phase.sin();
    let g = 0.5 + 0.5 * (phase + 2.094).sin();
    let b = 0.5 + 0.5 * (phase + 4.189).sin();
    [r * 0.8 + 0.2, g * 0.5, b * 0.9 + 0.1]
}

pub fn ocean(t: f32) -> Rgb {
    four_stop(
        [[0.0, 0.05, 0.15], [0.0, 0.3, 0.5], [0.2, 0.7, 0.8], [0.85, 0.95, 1.0]],
        t,
    )
}

pub fn forest(t: f32) -> Rgb {
    four_stop(
        [[0.05, 0.1, 0.02], [0.1, 0.35, 0.05], [0.3, 0.6, 0.1], [0.7, 0.85, 0.2]],
        t,
    )
}

pub fn sunset(t: f32) -> Rgb {
    four_stop(
        [[0.1, 0.0, 0.2], [0.4, 0.1, 0.5], [0.9, 0.4, 0.1], [1.0, 0.8, 0.3]],
        t,
    )
}

pub fn plasma(t: f32) -> Rgb {
    [
        mix1(0.05, 0.95, t.powf(0.7)),
        mix1(0.0, 0.9, (t * PI).sin()),
        mix1(0.53, 0.15, t),
    ]
}

/// Piecewise-linear gradient through evenly spaced stops.
pub fn custom_gradient(stops: &[Rgb], t: f32) -> Rgb {
    match stops.len() {
        0 => [0.0; 3],
        1 => stops[0],
        n => {
            let step = 1.0 / (n - 1) as f32;
            for i in 0..n - 1 {
                let lo = i as f32 * step;
                let hi = (i + 1) as f32 * step;
                if t >= lo && t <= hi {
                    return mix(stops[i], stops[i + 1], (t - lo) / (hi - lo));
                }
            }
            stops[n - 1]
        }
    }
}

/// Color of one cell given its inhibitor value and obstacle flag.
pub fn color_of(settings: &RenderSettings, v: f32, obstacle: f32) -> Rgb {
    if settings.show_obstacles && obstacle > 0.5 {
        return OBSTACLE_TINT;
    }

    let t = ((v - 0.5) * settings.contrast + 0.5 + settings.brightness).clamp(0.0, 1.0);
    let color = match settings.palette {
        Palette::HeatMap => heatmap(t),
        Palette::Neon => neon(t),
        Palette::Grayscale => [t; 3],
        Palette::Inverted => [1.0 - t; 3],
        Palette::Ocean => ocean(t),
        Palette::Forest => forest(t),
        Palette::Sunset => sunset(t),
        Palette::Plasma => plasma(t),
        Palette::Custom => custom_gradient(settings.color_stops(), t),
    };

    let gray = 0.299 * color[0] + 0.587 * color[1] + 0.114 * color[2];
    let s = settings.saturation;
    [
        mix1(gray, color[0], s).clamp(0.0, 1.0),
        mix1(gray, color[1], s).clamp(0.0, 1.0),
        mix1(gray, color[2], s).clamp(0.0, 1.0),
    ]
}
