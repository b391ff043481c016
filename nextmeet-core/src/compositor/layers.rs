//! Named display layers

use heapless::String;

use super::layout::Rotation;

/// Bytes of text a layer can hold (40 characters of up to 4 bytes)
pub const TEXT_CAPACITY: usize = 160;

/// Full-screen background image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Background {
    /// Boot screen shown until the first frame
    Splash,
    MoonA,
    MoonB,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BackgroundLayer {
    pub image: Background,
    pub x: i32,
    pub y: i32,
}

/// One line of text; `x` is the left edge, `y` the vertical centre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayer {
    pub text: String<TEXT_CAPACITY>,
    pub x: i32,
    pub y: i32,
    pub color: u32,
    pub visible: bool,
}

impl TextLayer {
    pub const fn hidden() -> Self {
        Self {
            text: String::new(),
            x: 0,
            y: 0,
            color: 0,
            visible: false,
        }
    }

    /// Replace text and position; text past the capacity is dropped
    pub fn set(&mut self, text: &str, x: i32, y: i32) {
        self.text.clear();
        for c in text.chars() {
            if self.text.push(c).is_err() {
                break;
            }
        }
        self.x = x;
        self.y = y;
    }
}

/// Everything drawn in one frame, back to front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layers {
    pub rotation: Rotation,
    pub background: BackgroundLayer,
    pub now_date: TextLayer,
    pub now_time: TextLayer,
    pub countdown: TextLayer,
    pub title: TextLayer,
}

impl Layers {
    /// Boot screen: splash image, no text
    pub const fn splash(rotation: Rotation) -> Self {
        Self {
            rotation,
            background: BackgroundLayer {
                image: Background::Splash,
                x: 0,
                y: 0,
            },
            now_date: TextLayer::hidden(),
            now_time: TextLayer::hidden(),
            countdown: TextLayer::hidden(),
            title: TextLayer::hidden(),
        }
    }

    /// Text layers in drawing order
    pub fn texts(&self) -> [&TextLayer; 4] {
        [&self.now_date, &self.now_time, &self.countdown, &self.title]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_truncates_on_char_boundary() {
        let mut layer = TextLayer::hidden();
        let long: std::string::String = core::iter::repeat('\u{e9}').take(100).collect();
        layer.set(&long, 3, 4);
        assert_eq!(layer.text.len(), TEXT_CAPACITY);
        assert_eq!(layer.text.chars().count(), TEXT_CAPACITY / 2);
        assert_eq!((layer.x, layer.y), (3, 4));
    }

    #[test]
    fn test_texts_order() {
        let mut layers = Layers::splash(Rotation::Deg0);
        layers.title.set("t", 0, 0);
        assert_eq!(layers.texts()[3].text.as_str(), "t");
    }
}
