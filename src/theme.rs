/// Colour roles the core asks a renderer to draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorToken {
    Path,
    Coin,
    BigCoin,
    PowerUp,
    Ripple,
    Chaser,
    Catch,
    Trap,
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue: hue.rem_euclid(360.0),
            saturation,
            lightness,
        }
    }

    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h = self.hue / 60.0;
        let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

/// Per-floor palette derived from a single hue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub hue: f32,
}

impl Theme {
    pub fn for_floor(floor: u32) -> Self {
        Self {
            hue: ((floor * 47) % 360) as f32,
        }
    }

    pub fn color(&self, token: ColorToken) -> Hsl {
        let hue = self.hue;
        match token {
            ColorToken::Path => Hsl::new(hue, 30.0, 38.0),
            ColorToken::Coin => Hsl::new(hue + 50.0, 90.0, 60.0),
            ColorToken::BigCoin => Hsl::new(hue + 40.0, 100.0, 85.0),
            ColorToken::PowerUp => Hsl::new(hue + 120.0, 90.0, 65.0),
            ColorToken::Ripple => Hsl::new(hue + 180.0, 100.0, 50.0),
            ColorToken::Chaser => Hsl::new(345.0, 100.0, 67.0),
            ColorToken::Catch => Hsl::new(0.0, 100.0, 63.0),
            ColorToken::Trap => Hsl::new(0.0, 100.0, 67.0),
        }
    }
}
