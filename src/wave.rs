use crate::engine::Mode;

/// Phase units added per animation frame
pub const PHASE_STEP: u32 = 2;
/// Phase wraps back to zero at this value
pub const PHASE_PERIOD: u32 = 200;
/// Animation frame interval in milliseconds (20 frames per timer tick)
pub const FRAME_INTERVAL_MS: u64 = 50;

/// Width and height of the reference drawing surface, in surface units
pub const SURFACE_SIZE: f64 = 320.0;
pub const AMPLITUDE: f64 = 15.0;
/// Radians per surface unit
pub const FREQUENCY: f64 = 0.02;
/// Horizontal distance between samples, in surface units
pub const SAMPLE_STEP: usize = 5;

/// One of the superimposed wave layers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveLayer {
    /// Added to the animation phase for this layer
    pub phase_offset: u32,
    pub opacity: f64,
}

pub const LAYERS: [WaveLayer; 2] = [
    WaveLayer {
        phase_offset: 0,
        opacity: 0.8,
    },
    WaveLayer {
        phase_offset: 50,
        opacity: 0.6,
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linear blend towards `other`, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(
            mix(self.0, other.0),
            mix(self.1, other.1),
            mix(self.2, other.2),
        )
    }

    /// Scale every channel by `factor` (0 = black)
    pub fn scale(self, factor: f64) -> Rgb {
        let factor = factor.clamp(0.0, 1.0);
        let ch = |c: u8| (c as f64 * factor).round() as u8;
        Rgb(ch(self.0), ch(self.1), ch(self.2))
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Gradient and accent colours for one mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorPair {
    /// Top of the liquid
    pub start: Rgb,
    /// Bottom of the liquid
    pub end: Rgb,
    pub glow: Rgb,
    pub background: Rgb,
}

const FOCUS_COLORS: ColorPair = ColorPair {
    start: Rgb(0xff, 0x6b, 0x6b),
    end: Rgb(0xd9, 0x46, 0xef),
    glow: Rgb(255, 107, 107),
    background: Rgb(0x0a, 0x0a, 0x0a),
};

const BREAK_COLORS: ColorPair = ColorPair {
    start: Rgb(0x22, 0xd3, 0xee),
    end: Rgb(0x4a, 0xde, 0x80),
    glow: Rgb(34, 211, 238),
    background: Rgb(0x08, 0x13, 0x1a),
};

const FLOW_COLORS: ColorPair = ColorPair {
    start: Rgb(0xfb, 0xbf, 0x24),
    end: Rgb(0xf5, 0x9e, 0x0b),
    glow: Rgb(251, 191, 36),
    background: Rgb(0x1a, 0x11, 0x06),
};

impl ColorPair {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Focus => FOCUS_COLORS,
            Mode::Break => BREAK_COLORS,
            Mode::Flow => FLOW_COLORS,
        }
    }

    /// Gradient colour at `depth` (0 = top, 1 = bottom)
    pub fn at(&self, depth: f64) -> Rgb {
        self.start.lerp(self.end, depth)
    }
}

/// How full the liquid is. Flow is always full; a zero total reads as empty.
pub fn fill_fraction(remaining: u32, total: u32, mode: Mode) -> f64 {
    if mode == Mode::Flow {
        return 1.0;
    }
    if total == 0 {
        return 0.0;
    }
    (remaining as f64 / total as f64).clamp(0.0, 1.0)
}

/// Derived render parameters for a single frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveParams {
    pub fill_fraction: f64,
    pub phase: u32,
    pub colors: ColorPair,
}

pub fn render(remaining: u32, total: u32, mode: Mode, phase: u32) -> WaveParams {
    WaveParams {
        fill_fraction: fill_fraction(remaining, total, mode),
        phase,
        colors: ColorPair::for_mode(mode),
    }
}

impl WaveParams {
    /// Resting height of the liquid surface, measured down from the top
    pub fn surface_level(&self) -> f64 {
        SURFACE_SIZE * (1.0 - self.fill_fraction)
    }

    /// Surface height at horizontal position `x` for `layer`
    pub fn surface_at(&self, layer: &WaveLayer, x: f64) -> f64 {
        let shift = (self.phase + layer.phase_offset) as f64;
        self.surface_level() + ((x + shift) * FREQUENCY).sin() * AMPLITUDE
    }

    /// Samples `layer` every [`SAMPLE_STEP`] units across the surface
    pub fn sample(&self, layer: &WaveLayer) -> Vec<(f64, f64)> {
        (0..=SURFACE_SIZE as usize)
            .step_by(SAMPLE_STEP)
            .map(|x| {
                let x = x as f64;
                (x, self.surface_at(layer, x))
            })
            .collect()
    }
}

/// Cosmetic phase driver, advanced on the animation schedule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveAnimator {
    phase: u32,
}

impl WaveAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn advance(&mut self) -> u32 {
        self.phase = (self.phase + PHASE_STEP) % PHASE_PERIOD;
        self.phase
    }
}
