/// 8-bit RGBA colour. Constants follow the classic pixel-engine palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREY: Color = Color::rgb(192, 192, 192);
    pub const DARK_GREY: Color = Color::rgb(128, 128, 128);
    pub const VERY_DARK_GREY: Color = Color::rgb(64, 64, 64);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const VERY_DARK_BLUE: Color = Color::rgb(0, 0, 64);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const DARK_CYAN: Color = Color::rgb(0, 128, 128);
    pub const VERY_DARK_CYAN: Color = Color::rgb(0, 64, 64);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const BLANK: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from unit floats, clamping each channel.
    pub fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(channel(r), channel(g), channel(b), channel(a))
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Alpha from a unit float, clamped.
    pub fn with_alpha_f32(self, alpha: f32) -> Self {
        self.with_alpha((alpha.clamp(0.0, 1.0) * 255.0) as u8)
    }

    /// Scale the colour channels, leaving alpha untouched.
    pub fn scaled(self, factor: f32) -> Self {
        let channel = |v: u8| (v as f32 * factor).clamp(0.0, 255.0) as u8;
        Self::rgba(channel(self.r), channel(self.g), channel(self.b), self.a)
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t).clamp(0.0, 255.0) as u8;
        Self::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64 / 255.0,
            g: self.g as f64 / 255.0,
            b: self.b as f64 / 255.0,
            a: self.a as f64 / 255.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::MAGENTA
    }
}
