//! NeoPixel-style strip facade
//!
//! Mirrors the method set of the Adafruit NeoPixel client so existing
//! lighting code can drive a networked strip with few changes. Colors are
//! packed as 0xWWRRGGBB.

use crate::array::MirroredArray;
use crate::error::{Error, Result};
use crate::record::LedColor;
use crate::transport::{Endpoint, TcpTransport, Transport};

/// Pack color components into a strip color
///
/// Each component is 0-255, where 0 is off and 255 is full intensity.
pub const fn color(red: u8, green: u8, blue: u8, white: u8) -> LedColor {
    ((white as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32
}

/// Networked LED strip
///
/// The connection is released by [`NeoPixel::cleanup`] or on drop.
pub struct NeoPixel<T: Transport = TcpTransport> {
    leds: Option<MirroredArray<LedColor, T>>,
    count: usize,
}

impl NeoPixel<TcpTransport> {
    /// Connect to a strip of `num` LEDs at `host:port`, all off
    pub fn new(num: usize, host: &str, port: u16) -> Result<Self> {
        let leds = MirroredArray::connect(host, port, num)?;
        Ok(Self::from_array(leds))
    }
}

impl<T: Transport> NeoPixel<T> {
    /// Strip over an already constructed array
    pub fn from_array(leds: MirroredArray<LedColor, T>) -> Self {
        Self {
            count: leds.len(),
            leds: Some(leds),
        }
    }

    /// Strip over any transport
    pub fn with_transport(transport: T, endpoint: Endpoint, num: usize) -> Result<Self> {
        let leds = MirroredArray::with_transport(transport, endpoint, num, 0)?;
        Ok(Self::from_array(leds))
    }

    /// Kept for API compatibility; the connection is opened on construction
    pub fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Push the current colors to the strip
    pub fn show(&mut self) -> Result<()> {
        self.leds_mut()?.flush(false)
    }

    /// Set LED `n` to a packed color
    pub fn set_pixel_color(&mut self, n: usize, color: LedColor) -> Result<()> {
        self.leds_mut()?.set(n, color)
    }

    /// Set LED `n` from components
    pub fn set_pixel_color_rgb(
        &mut self,
        n: usize,
        red: u8,
        green: u8,
        blue: u8,
        white: u8,
    ) -> Result<()> {
        self.set_pixel_color(n, color(red, green, blue, white))
    }

    /// Packed color of LED `n`
    pub fn get_pixel_color(&self, n: usize) -> Result<LedColor> {
        self.leds()?.get(n)
    }

    /// Read-only view of all LED colors
    pub fn get_pixels(&self) -> Result<&[LedColor]> {
        Ok(self.leds()?.as_slice())
    }

    /// Number of LEDs
    pub fn num_pixels(&self) -> usize {
        self.count
    }

    /// Close the connection; safe to call more than once
    pub fn cleanup(&mut self) {
        if let Some(mut leds) = self.leds.take() {
            leds.close();
        }
    }

    fn leds(&self) -> Result<&MirroredArray<LedColor, T>> {
        self.leds.as_ref().ok_or(Error::Closed)
    }

    fn leds_mut(&mut self) -> Result<&mut MirroredArray<LedColor, T>> {
        self.leds.as_mut().ok_or(Error::Closed)
    }
}

impl<T: Transport> Drop for NeoPixel<T> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame;
    use crate::transport::MockTransport;

    fn strip(num: usize) -> (MockTransport, NeoPixel<MockTransport>) {
        let mock = MockTransport::new();
        let strip =
            NeoPixel::with_transport(mock.clone(), Endpoint::new("127.0.0.1", 9999), num).unwrap();
        (mock, strip)
    }

    #[test]
    fn test_color_packing() {
        assert_eq!(color(255, 0, 0, 0), 0x00FF0000);
        assert_eq!(color(0, 255, 0, 0), 0x0000FF00);
        assert_eq!(color(0, 0, 255, 0), 0x000000FF);
        assert_eq!(color(1, 2, 3, 4), 0x04010203);
    }

    #[test]
    fn test_set_and_show() {
        let (mock, mut strip) = strip(8);
        strip.begin().unwrap();
        assert_eq!(strip.num_pixels(), 8);

        strip.set_pixel_color(0, 0x123456).unwrap();
        strip.set_pixel_color_rgb(7, 255, 128, 0, 0).unwrap();
        assert_eq!(strip.get_pixel_color(7).unwrap(), 0x00FF8000);
        assert_eq!(mock.sent().len(), 1);

        strip.show().unwrap();
        let sent = mock.sent();
        let (_, records) = frame::decode::<LedColor>(&sent[1]).unwrap();
        assert_eq!(records[0], 0x123456);
        assert_eq!(records[7], 0x00FF8000);
        assert_eq!(strip.get_pixels().unwrap(), records.as_slice());
    }

    #[test]
    fn test_out_of_range_pixel() {
        let (_mock, mut strip) = strip(2);
        assert!(matches!(
            strip.set_pixel_color(2, 1),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_cleanup_idempotent() {
        let (mock, mut strip) = strip(3);
        strip.cleanup();
        strip.cleanup();
        assert_eq!(mock.close_count(), 1);
        assert!(matches!(strip.show(), Err(Error::Closed)));
        assert_eq!(strip.num_pixels(), 3);
        drop(strip);
        assert_eq!(mock.close_count(), 1);
    }
}
