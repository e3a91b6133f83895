#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new_rgb(0xFF, 0xFF, 0xFF);
    pub const LIGHT_GRAY: Color = Color::new_rgb(0xC0, 0xC0, 0xC0);
    pub const DARK_GRAY: Color = Color::new_rgb(0x60, 0x60, 0x60);

    /// The four DMG shades indexed by a 2-bit palette value.
    pub const DMG_SHADES: [Color; 4] = [
        Color::WHITE,
        Color::LIGHT_GRAY,
        Color::DARK_GRAY,
        Color::BLACK,
    ];

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    #[inline]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Pack as `0xAARRGGBB`.
    #[inline]
    pub const fn to_argb(&self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    /// Unpack a `0xAARRGGBB` pixel.
    #[inline]
    pub const fn from_argb(argb: u32) -> Color {
        let [a, r, g, b] = argb.to_be_bytes();
        Color { r, g, b, a }
    }
}
