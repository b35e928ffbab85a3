use serde::Serialize;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }

    pub const RED: Color = Color::from_hex(0xFF0000);
}

/// Default annotation palette.
pub const PALETTE: [Color; 21] = [
    Color::from_hex(0xA351FB),
    Color::from_hex(0xFF4040),
    Color::from_hex(0xFFA1A0),
    Color::from_hex(0xFF7633),
    Color::from_hex(0xFFB633),
    Color::from_hex(0xD1D435),
    Color::from_hex(0x4CFB12),
    Color::from_hex(0x94CF1A),
    Color::from_hex(0x40DE8A),
    Color::from_hex(0x1B9640),
    Color::from_hex(0x00D6C1),
    Color::from_hex(0x2E9CAA),
    Color::from_hex(0x00C4FF),
    Color::from_hex(0x364797),
    Color::from_hex(0x6675FF),
    Color::from_hex(0x0019EF),
    Color::from_hex(0x863AFF),
    Color::from_hex(0x530087),
    Color::from_hex(0xCD3AFF),
    Color::from_hex(0xFF97FF),
    Color::from_hex(0xFF39C9),
];

/// Palette entry for an index, wrapping around.
pub fn by_index(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}
