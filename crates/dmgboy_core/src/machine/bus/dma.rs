use super::{IoRegister, MemoryBus};

/// Length of an OAM DMA transfer in bytes.
pub(crate) const DMA_LENGTH: usize = 0xA0;
/// Steps the transfer keeps the trigger locked.
pub(crate) const DMA_CYCLES: u32 = 160;

impl MemoryBus {
    /// Handle a write to 0xFF46.
    ///
    /// The copy itself happens immediately; the countdown only models the
    /// busy period during which further triggers are ignored.
    pub(super) fn start_dma(&mut self, value: u8) {
        if self.dma_cycles > 0 {
            log::debug!(
                "DMA trigger {value:02X} ignored, {} steps of transfer remaining",
                self.dma_cycles
            );
            return;
        }

        self.io[IoRegister::DMA.index()] = value;
        self.dma_cycles = DMA_CYCLES;

        let base = (value as u16) << 8;
        for i in 0..DMA_LENGTH {
            self.oam[i] = self.read(base.wrapping_add(i as u16));
        }
    }

    /// Advance the transfer countdown by one step.
    pub fn dma_clock(&mut self) {
        self.dma_cycles = self.dma_cycles.saturating_sub(1);
    }

    pub fn dma_active(&self) -> bool {
        self.dma_cycles > 0
    }
}
