//! SH1106 OLED page sink
//!
//! Driver for 128x64 SH1106-based OLED displays via 4-wire SPI. The
//! controller's RAM is 132 columns wide, so output is shifted by a small
//! configurable column offset.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use pageflip_core::config::{
    PanelGeometry, DEFAULT_COLUMN_OFFSET, DEFAULT_CONTRAST, ROWS_PER_BYTE,
};
use pageflip_core::traits::{PageSink, SinkError};

/// Columns of SH1106 display RAM
const RAM_COLUMNS: usize = 132;

/// SH1106 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_NORMAL: u8 = 0xA0;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_INC: u8 = 0xC0;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// D/C line level
#[derive(Clone, Copy)]
enum Mode {
    Command,
    Data,
}

/// SH1106 sink over an SPI bus with D/C and CS lines
pub struct Sh1106Sink<SPI, DC, CS> {
    spi: SPI,
    dc: DC,
    cs: CS,
    /// Panel width in columns
    width: usize,
    /// Bytes per full frame
    frame_size: usize,
    column_offset: u8,
    contrast: u8,
    flip180: bool,
    initialized: bool,
}

impl<SPI, DC, CS> Sh1106Sink<SPI, DC, CS>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
{
    /// Create a sink for a panel of the given geometry
    pub fn new(spi: SPI, dc: DC, cs: CS, geometry: PanelGeometry) -> Self {
        Self {
            spi,
            dc,
            cs,
            width: geometry.width as usize,
            frame_size: geometry.frame_size(),
            column_offset: DEFAULT_COLUMN_OFFSET,
            contrast: DEFAULT_CONTRAST,
            flip180: false,
            initialized: false,
        }
    }

    /// Release the bus and pins
    pub fn release(self) -> (SPI, DC, CS) {
        (self.spi, self.dc, self.cs)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// One chip-select framed write
    fn write(&mut self, mode: Mode, bytes: &[u8]) -> Result<(), SinkError> {
        match mode {
            Mode::Command => self.dc.set_low(),
            Mode::Data => self.dc.set_high(),
        }
        .map_err(|_| SinkError::Communication)?;

        self.cs.set_low().map_err(|_| SinkError::Communication)?;
        let result = self.spi.write(bytes).and_then(|()| self.spi.flush());
        self.cs.set_high().map_err(|_| SinkError::Communication)?;

        result.map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("SH1106 SPI write failed");
            SinkError::Communication
        })
    }

    fn command(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.write(Mode::Command, bytes)
    }

    /// Point the RAM cursor at `page`, `column` (panel coordinates)
    fn set_cursor(&mut self, page: usize, column: usize) -> Result<(), SinkError> {
        let column = column + self.column_offset as usize;
        self.command(&[
            cmd::SET_PAGE_ADDR | (page as u8 & 0x0F),
            cmd::SET_LOW_COLUMN | (column as u8 & 0x0F),
            cmd::SET_HIGH_COLUMN | ((column >> 4) as u8 & 0x0F),
        ])
    }

    fn orientation_commands(&self) -> [u8; 2] {
        if self.flip180 {
            [cmd::SET_SEG_NORMAL, cmd::SET_COM_SCAN_INC]
        } else {
            [cmd::SET_SEG_REMAP, cmd::SET_COM_SCAN_DEC]
        }
    }

    /// Zero all of display RAM, offset columns included
    fn clear_ram(&mut self) -> Result<(), SinkError> {
        let zeros = [0u8; 33];
        for page in 0..self.frame_size / self.width {
            self.command(&[
                cmd::SET_PAGE_ADDR | (page as u8 & 0x0F),
                cmd::SET_LOW_COLUMN,
                cmd::SET_HIGH_COLUMN,
            ])?;
            for _ in 0..RAM_COLUMNS / zeros.len() {
                self.write(Mode::Data, &zeros)?;
            }
        }
        Ok(())
    }
}

impl<SPI, DC, CS> PageSink for Sh1106Sink<SPI, DC, CS>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
{
    fn init(&mut self) -> Result<(), SinkError> {
        self.cs.set_high().map_err(|_| SinkError::Communication)?;

        let [seg, com] = self.orientation_commands();
        let mux = (self.frame_size / self.width * ROWS_PER_BYTE as usize - 1) as u8;
        self.command(&[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80,
            cmd::SET_MUX_RATIO,
            mux,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14,
            seg,
            com,
            cmd::SET_COM_PINS,
            0x12,
            cmd::SET_CONTRAST,
            self.contrast,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::SET_NORMAL,
        ])?;
        self.clear_ram()?;
        self.command(&[cmd::DISPLAY_ON])?;

        self.initialized = true;
        #[cfg(feature = "defmt")]
        defmt::debug!("SH1106 initialized, offset={}", self.column_offset);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), SinkError> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;
        self.command(&[cmd::DISPLAY_OFF])
    }

    /// Write one transfer page
    ///
    /// Transfer pages need not line up with the controller's 8-row pages; the
    /// bytes are split at RAM page boundaries.
    fn send_page(&mut self, page: usize, data: &[u8]) -> Result<(), SinkError> {
        if !self.initialized {
            return Err(SinkError::NotInitialized);
        }
        let start = page * data.len();
        if data.is_empty() || start + data.len() > self.frame_size {
            return Err(SinkError::InvalidPage);
        }

        let mut offset = start;
        let mut rest = data;
        while !rest.is_empty() {
            let ram_page = offset / self.width;
            let column = offset % self.width;
            let run = rest.len().min(self.width - column);

            self.set_cursor(ram_page, column)?;
            self.write(Mode::Data, &rest[..run])?;

            offset += run;
            rest = &rest[run..];
        }
        Ok(())
    }

    fn set_flip_mode(&mut self, flip180: bool) -> Result<(), SinkError> {
        self.flip180 = flip180;
        if self.initialized {
            let commands = self.orientation_commands();
            self.command(&commands)?;
        }
        Ok(())
    }

    fn set_contrast(&mut self, contrast: u8) -> Result<(), SinkError> {
        self.contrast = contrast;
        if self.initialized {
            self.command(&[cmd::SET_CONTRAST, contrast])?;
        }
        Ok(())
    }

    fn adjust_offset(&mut self, offset: u8) -> Result<(), SinkError> {
        self.column_offset = offset;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::spi::ErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Bytes written per chip-select window, tagged with the D/C level
    #[derive(Default)]
    struct Bus {
        dc_high: bool,
        cs_low: bool,
        writes: Vec<(bool, Vec<u8>)>,
        fail: bool,
    }

    type Shared = Rc<RefCell<Bus>>;

    struct MockSpi(Shared);
    struct DcPin(Shared);
    struct CsPin(Shared);

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = ErrorKind;
    }

    impl SpiBus for MockSpi {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            let mut bus = self.0.borrow_mut();
            if bus.fail {
                return Err(ErrorKind::Other);
            }
            assert!(bus.cs_low, "write outside chip select");
            let dc = bus.dc_high;
            bus.writes.push((dc, words.to_vec()));
            Ok(())
        }

        fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for DcPin {
        type Error = Infallible;
    }

    impl OutputPin for DcPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().dc_high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().dc_high = true;
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for CsPin {
        type Error = Infallible;
    }

    impl OutputPin for CsPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().cs_low = true;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().cs_low = false;
            Ok(())
        }
    }

    fn sink() -> (Sh1106Sink<MockSpi, DcPin, CsPin>, Shared) {
        let bus = Shared::default();
        let sink = Sh1106Sink::new(
            MockSpi(bus.clone()),
            DcPin(bus.clone()),
            CsPin(bus.clone()),
            PanelGeometry::MONO_128X64,
        );
        (sink, bus)
    }

    fn initialized() -> (Sh1106Sink<MockSpi, DcPin, CsPin>, Shared) {
        let (mut sink, bus) = sink();
        sink.init().unwrap();
        bus.borrow_mut().writes.clear();
        (sink, bus)
    }

    #[test]
    fn test_send_before_init() {
        let (mut sink, _) = sink();
        assert_eq!(
            sink.send_page(0, &[0; 128]),
            Err(SinkError::NotInitialized)
        );
    }

    #[test]
    fn test_init_sequence() {
        let (mut sink, bus) = sink();
        sink.init().unwrap();

        let bus = bus.borrow();
        let (dc, first) = &bus.writes[0];
        assert!(!dc);
        assert_eq!(first[0], cmd::DISPLAY_OFF);
        assert!(first.contains(&cmd::SET_SEG_REMAP));
        assert_eq!(
            bus.writes.last(),
            Some(&(false, vec![cmd::DISPLAY_ON]))
        );
        let cleared: usize = bus
            .writes
            .iter()
            .filter(|(dc, _)| *dc)
            .map(|(_, bytes)| bytes.len())
            .sum();
        assert_eq!(cleared, 8 * RAM_COLUMNS);
    }

    #[test]
    fn test_native_page_write() {
        let (mut sink, bus) = initialized();
        let data = [0x5Au8; 128];
        sink.send_page(3, &data).unwrap();

        let bus = bus.borrow();
        assert_eq!(bus.writes.len(), 2);
        // page 3, column 2 (default offset)
        assert_eq!(bus.writes[0], (false, vec![0xB3, 0x02, 0x10]));
        assert_eq!(bus.writes[1], (true, data.to_vec()));
    }

    #[test]
    fn test_large_page_split_at_ram_pages() {
        let (mut sink, bus) = initialized();
        sink.send_page(1, &[0xFF; 256]).unwrap();

        let bus = bus.borrow();
        let commands: Vec<_> = bus.writes.iter().filter(|(dc, _)| !dc).collect();
        assert_eq!(commands[0].1[0], 0xB2);
        assert_eq!(commands[1].1[0], 0xB3);
    }

    #[test]
    fn test_half_page_sets_column() {
        let (mut sink, bus) = initialized();
        sink.adjust_offset(0).unwrap();
        sink.send_page(1, &[0x01; 64]).unwrap();

        let bus = bus.borrow();
        assert_eq!(bus.writes[0], (false, vec![0xB0, 0x00, 0x14]));
    }

    #[test]
    fn test_page_out_of_range() {
        let (mut sink, _) = initialized();
        assert_eq!(sink.send_page(8, &[0; 128]), Err(SinkError::InvalidPage));
    }

    #[test]
    fn test_bus_error_is_communication() {
        let (mut sink, bus) = initialized();
        bus.borrow_mut().fail = true;
        assert_eq!(
            sink.send_page(0, &[0; 128]),
            Err(SinkError::Communication)
        );
        assert!(!bus.borrow().cs_low, "chip select left asserted");
    }

    #[test]
    fn test_flip_and_contrast_after_init() {
        let (mut sink, bus) = initialized();
        sink.set_flip_mode(true).unwrap();
        sink.set_contrast(0x20).unwrap();

        let bus = bus.borrow();
        assert_eq!(
            bus.writes[0],
            (false, vec![cmd::SET_SEG_NORMAL, cmd::SET_COM_SCAN_INC])
        );
        assert_eq!(bus.writes[1], (false, vec![cmd::SET_CONTRAST, 0x20]));
    }

    #[test]
    fn test_shutdown_turns_display_off() {
        let (mut sink, bus) = initialized();
        sink.shutdown().unwrap();
        assert!(!sink.is_initialized());
        assert_eq!(bus.borrow().writes, vec![(false, vec![cmd::DISPLAY_OFF])]);
    }
}
