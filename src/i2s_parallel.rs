//! ESP32 I2S LCD mode backend.
//!
//! The I2S peripheral is put in LCD mode with 32 bit words so that every
//! [`Sample`](crate::framebuffer::Sample) is clocked out on 24 parallel
//! outputs. A single DMA descriptor pointing at itself makes the peripheral
//! replay the [`DmaFrameBuffer`] forever.
//!
//! | Sample bit | Parallel output | Signal |
//! |---|---|---|
//! | 8 | `DATA_OUT0` | latch (RCK) |
//! | 9 | `DATA_OUT1` | shift clock (SCK) |
//! | `10 + n` | `DATA_OUT(n + 2)` | data of display `n` |
//!
//! # Example
//! ```ignore
//! let mut lines: LinePins<AnyPin> = Default::default();
//! lines[0] = Some(peripherals.GPIO16.degrade());
//!
//! let output = I2sParallelOutput::new(
//!     I2sPort::I2s0(peripherals.I2S0),
//!     peripherals.GPIO26.degrade(),
//!     peripherals.GPIO27.degrade(),
//!     lines,
//!     descriptor,
//! )?;
//! let mut display = I2sDisplayDriver::new(output, fb);
//! display.display_text(0, "HELLO");
//! display.configure()?;
//! display.start();
//! ```
//!
//! # Safety
//! `descriptor` and the frame buffer must live in internal SRAM; the
//! peripheral keeps reading both until the output is stopped.

use esp_hal::dma::DmaDescriptor;
use esp_hal::dma::Owner;
use esp_hal::gpio::AnyPin;
use esp_hal::gpio::Level;
use esp_hal::gpio::Output;
use esp_hal::gpio::OutputConfig;
use esp_hal::gpio::Pin;
use esp_hal::peripherals::GPIO;
use esp_hal::peripherals::I2S0;
use esp_hal::peripherals::I2S1;
use esp_hal::peripherals::SYSTEM;

use crate::check_pins;
use crate::framebuffer::DmaFrameBuffer;
use crate::output::ParallelOutput;
use crate::DisplayError;
use crate::LinePins;
use crate::MAX_LINES;

/// GPIO matrix index of `I2S0O_DATA_OUT0`.
const I2S0_DATA_OUT0: u16 = 140;
/// GPIO matrix index of `I2S1O_DATA_OUT0`.
const I2S1_DATA_OUT0: u16 = 166;

/// Internal SRAM reachable by the I2S DMA engine.
const DMA_CAPABLE_RAM: core::ops::Range<usize> = 0x3FFA_E000..0x4000_0000;

/// 80 MHz APB clock / 200 = 400 kHz samples, 200 kHz shift clock.
const CLKM_DIV_NUM: u8 = 200;

/// Parallel outputs in 32 bit LCD mode: latch, clock and one per line.
const OUTPUTS: usize = MAX_LINES + 2;

/// The I2S unit to drive the displays with.
pub enum I2sPort<'d> {
    /// `I2S0`, outputs from signal 140.
    I2s0(I2S0<'d>),
    /// `I2S1`, outputs from signal 166.
    I2s1(I2S1<'d>),
}

impl I2sPort<'_> {
    fn data_out0(&self) -> u16 {
        match self {
            Self::I2s0(_) => I2S0_DATA_OUT0,
            Self::I2s1(_) => I2S1_DATA_OUT0,
        }
    }

    fn enable_clock(&self) {
        let system = SYSTEM::regs();
        match self {
            Self::I2s0(_) => {
                system
                    .perip_clk_en()
                    .modify(|_, w| w.i2s0_clk_en().set_bit());
                system.perip_rst_en().modify(|_, w| w.i2s0_rst().clear_bit());
            }
            Self::I2s1(_) => {
                system
                    .perip_clk_en()
                    .modify(|_, w| w.i2s1_clk_en().set_bit());
                system.perip_rst_en().modify(|_, w| w.i2s1_rst().clear_bit());
            }
        }
    }
}

// Both units share one register block layout.
macro_rules! regs {
    ($port:expr) => {
        match $port {
            I2sPort::I2s0(_) => I2S0::regs(),
            I2sPort::I2s1(_) => I2S1::regs(),
        }
    };
}

/// [`ParallelOutput`] on one of the ESP32 I2S units.
pub struct I2sParallelOutput<'d> {
    port: I2sPort<'d>,
    // keep the pads configured as outputs
    _pins: [Option<Output<'d>>; OUTPUTS],
    // GPIO of each parallel output
    routes: [Option<u8>; OUTPUTS],
    descriptor: &'d mut DmaDescriptor,
}

impl<'d> I2sParallelOutput<'d> {
    /// Takes ownership of the I2S unit and the pins.
    ///
    /// `lines[n]` is the data pin of display `n`, `None` leaves that
    /// parallel output unrouted.
    ///
    /// # Errors
    /// Returns an error if a pin is input only or used more than once, see
    /// [`check_pins`].
    pub fn new(
        port: I2sPort<'d>,
        latch: AnyPin<'d>,
        clock: AnyPin<'d>,
        lines: LinePins<AnyPin<'d>>,
        descriptor: &'d mut DmaDescriptor,
    ) -> Result<Self, DisplayError> {
        let mut signals: [Option<AnyPin<'d>>; OUTPUTS] = Default::default();
        signals[0] = Some(latch);
        signals[1] = Some(clock);
        for (slot, pin) in signals[2..].iter_mut().zip(lines) {
            *slot = pin;
        }

        let routes = signals
            .each_ref()
            .map(|pin| pin.as_ref().map(|pin| pin.number()));
        check_pins(&routes)?;

        let pins = signals.map(|pin| {
            pin.map(|pin| Output::new(pin, Level::High, OutputConfig::default()))
        });
        debug!(
            "i2s parallel output: {} pins",
            routes.iter().flatten().count()
        );
        Ok(Self {
            port,
            _pins: pins,
            routes,
            descriptor,
        })
    }

    fn reset(&self) {
        let regs = regs!(&self.port);
        regs.lc_conf().modify(|_, w| {
            w.in_rst().set_bit();
            w.out_rst().set_bit();
            w.ahbm_rst().set_bit();
            w.ahbm_fifo_rst().set_bit()
        });
        regs.lc_conf().modify(|_, w| {
            w.in_rst().clear_bit();
            w.out_rst().clear_bit();
            w.ahbm_rst().clear_bit();
            w.ahbm_fifo_rst().clear_bit()
        });
        regs.conf().modify(|_, w| {
            w.rx_reset().set_bit();
            w.rx_fifo_reset().set_bit();
            w.tx_reset().set_bit();
            w.tx_fifo_reset().set_bit()
        });
        regs.conf().modify(|_, w| {
            w.rx_reset().clear_bit();
            w.rx_fifo_reset().clear_bit();
            w.tx_reset().clear_bit();
            w.tx_fifo_reset().clear_bit()
        });
    }

    fn route_pins(&self) {
        let base = self.port.data_out0();
        let gpio = GPIO::regs();
        for (index, pin) in self.routes.iter().enumerate() {
            let Some(pin) = *pin else {
                continue;
            };
            let signal = base + index as u16;
            gpio.func_out_sel_cfg(usize::from(pin))
                .modify(|_, w| unsafe { w.out_sel().bits(signal) });
        }
    }

    fn link_descriptor(&mut self, samples: &DmaFrameBuffer) {
        let len = DmaFrameBuffer::dma_buffer_size_bytes();
        let descriptor: *mut DmaDescriptor = &mut *self.descriptor;
        self.descriptor.set_size(len);
        self.descriptor.set_length(len);
        self.descriptor.set_suc_eof(false);
        self.descriptor.set_owner(Owner::Dma);
        self.descriptor.buffer = samples.as_ptr().cast_mut();
        self.descriptor.next = descriptor;
    }
}

impl ParallelOutput for I2sParallelOutput<'_> {
    fn configure(&mut self, samples: &DmaFrameBuffer) -> Result<(), DisplayError> {
        let start = samples.as_ptr() as usize;
        let end = start + DmaFrameBuffer::dma_buffer_size_bytes();
        if !DMA_CAPABLE_RAM.contains(&start) || end > DMA_CAPABLE_RAM.end {
            return Err(DisplayError::BufferNotDmaCapable);
        }

        self.port.enable_clock();
        self.reset();

        let regs = regs!(&self.port);
        regs.conf().modify(|_, w| {
            w.tx_slave_mod().clear_bit();
            w.tx_right_first().set_bit();
            w.tx_msb_right().set_bit();
            w.tx_msb_shift().clear_bit();
            w.tx_mono().clear_bit();
            w.tx_short_sync().clear_bit()
        });
        // everything below conf is written from 0
        regs.conf2().write(|w| unsafe {
            w.bits(0);
            w.lcd_en().set_bit();
            // 32 parallel outputs
            w.lcd_tx_wrx2_en().clear_bit();
            w.lcd_tx_sdx2_en().clear_bit()
        });
        regs.sample_rate_conf().write(|w| unsafe {
            w.bits(0);
            w.tx_bits_mod().bits(32);
            w.tx_bck_div_num().bits(1)
        });
        regs.clkm_conf().write(|w| unsafe {
            w.bits(0);
            w.clka_ena().clear_bit();
            w.clkm_div_a().bits(1);
            w.clkm_div_b().bits(0);
            w.clkm_div_num().bits(CLKM_DIV_NUM)
        });
        regs.fifo_conf().write(|w| unsafe {
            w.bits(0);
            w.tx_fifo_mod_force_en().set_bit();
            w.tx_fifo_mod().bits(3);
            w.tx_data_num().bits(32);
            w.dscr_en().set_bit()
        });
        regs.conf1().write(|w| unsafe {
            w.bits(0);
            w.tx_stop_en().clear_bit();
            w.tx_pcm_bypass().set_bit()
        });
        regs.conf_chan().write(|w| unsafe {
            w.bits(0);
            w.tx_chan_mod().bits(1)
        });
        regs.timing().write(|w| unsafe { w.bits(0) });

        self.route_pins();
        self.link_descriptor(samples);
        debug!("i2s parallel output configured, {} bytes", end - start);
        Ok(())
    }

    fn start(&mut self) {
        self.reset();
        let descriptor = core::ptr::addr_of!(*self.descriptor) as u32;
        let regs = regs!(&self.port);
        regs.lc_conf().write(|w| unsafe {
            w.bits(0);
            w.out_data_burst_en().set_bit();
            w.outdscr_burst_en().set_bit()
        });
        regs.out_link().modify(|_, w| unsafe {
            w.outlink_addr().bits(descriptor & 0xF_FFFF);
            w.outlink_start().set_bit()
        });
        let raw = regs.int_raw().read().bits();
        regs.int_clr().write(|w| unsafe { w.bits(raw) });
        regs.int_ena().write(|w| unsafe {
            w.bits(0);
            w.out_dscr_err().set_bit();
            w.out_eof().set_bit()
        });
        regs.conf().modify(|_, w| w.tx_start().set_bit());
        trace!("i2s parallel output started");
    }

    fn stop(&mut self) {
        self.reset();
        let regs = regs!(&self.port);
        regs.conf().modify(|_, w| {
            w.tx_start().clear_bit();
            w.rx_start().clear_bit()
        });
        trace!("i2s parallel output stopped");
    }
}
