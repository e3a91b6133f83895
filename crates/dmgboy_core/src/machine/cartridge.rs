use crate::error::CartridgeError;

/// Size of one switchable ROM bank.
pub const ROM_BANK_SIZE: usize = 0x4000;
/// Size of one external RAM bank.
pub const RAM_BANK_SIZE: usize = 0x2000;

/// Header occupies 0x0100..0x0150.
const HEADER_END: usize = 0x0150;
const TITLE: std::ops::Range<usize> = 0x0134..0x0144;
const CARTRIDGE_TYPE_ADDR: usize = 0x0147;
const ROM_SIZE_ADDR: usize = 0x0148;
const RAM_SIZE_ADDR: usize = 0x0149;
/// Largest ROM size code in the header table (8 MiB).
const MAX_ROM_SIZE_CODE: u8 = 0x08;

/// Magic low nibble that enables external RAM.
const RAM_ENABLE_VALUE: u8 = 0x0A;

/// Fields decoded from the cartridge header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    /// Controller type byte. Logged but not used to pick a controller: every
    /// cartridge goes through the same banking logic.
    pub cartridge_type: u8,
    pub rom_banks: usize,
    pub ram_banks: usize,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.is_empty() {
            return Err(CartridgeError::Empty);
        }
        if rom.len() < HEADER_END {
            return Err(CartridgeError::HeaderTooShort { len: rom.len() });
        }

        let title = rom[TITLE]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect::<String>();

        Ok(Self {
            title,
            cartridge_type: rom[CARTRIDGE_TYPE_ADDR],
            rom_banks: rom_banks_for(rom[ROM_SIZE_ADDR]),
            ram_banks: ram_banks_for(rom[RAM_SIZE_ADDR]),
        })
    }
}

/// ROM size code to bank count: 2 << code.
fn rom_banks_for(code: u8) -> usize {
    let code = if code > MAX_ROM_SIZE_CODE {
        log::warn!("unknown ROM size code {code:#04X}, assuming {MAX_ROM_SIZE_CODE:#04X}");
        MAX_ROM_SIZE_CODE
    } else {
        code
    };
    2 << code
}

fn ram_banks_for(code: u8) -> usize {
    match code {
        0x00 | 0x01 => 0,
        0x02 => 1,
        0x03 => 4,
        0x04 => 16,
        0x05 => 8,
        _ => {
            log::warn!("unknown RAM size code {code:#04X}, assuming no RAM");
            0
        }
    }
}

/// ROM/RAM storage plus the bank-controller registers that writes into the
/// ROM window program.
#[derive(Clone)]
pub struct Cartridge {
    header: CartridgeHeader,
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_bank: u16,
    /// Bank mapped at 0x0000..0x3FFF in mode 1.
    rom_bank0: u16,
    ram_bank: u8,
    ram_enabled: bool,
    /// 0 = simple, 1 = advanced.
    banking_mode: u8,
}

impl Cartridge {
    pub fn new(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        let header = CartridgeHeader::parse(&rom)?;

        let expected = header.rom_banks * ROM_BANK_SIZE;
        if rom.len() < expected {
            return Err(CartridgeError::Truncated {
                expected,
                actual: rom.len(),
            });
        }

        log::info!(
            "cartridge \"{}\": type={:#04X} rom_banks={} ram_banks={}",
            header.title,
            header.cartridge_type,
            header.rom_banks,
            header.ram_banks
        );

        // One bank is always backed so RAM-enabled accesses on RAM-less
        // cartridges stay in bounds.
        let ram = vec![0; header.ram_banks.max(1) * RAM_BANK_SIZE];

        Ok(Self {
            header,
            rom,
            ram,
            rom_bank: 1,
            rom_bank0: 0,
            ram_bank: 0,
            ram_enabled: false,
            banking_mode: 0,
        })
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    pub fn rom_bank(&self) -> u16 {
        self.rom_bank
    }

    pub fn ram_bank(&self) -> u8 {
        self.ram_bank
    }

    pub fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    pub fn banking_mode(&self) -> u8 {
        self.banking_mode
    }

    /// Read from 0x0000..0x7FFF.
    pub fn read_rom(&self, addr: u16) -> u8 {
        let addr = addr as usize;
        let offset = if addr < ROM_BANK_SIZE {
            if self.banking_mode == 0 {
                addr
            } else {
                self.rom_bank_offset(self.rom_bank0) + addr
            }
        } else {
            self.rom_bank_offset(self.rom_bank) + (addr - ROM_BANK_SIZE)
        };
        self.rom[offset]
    }

    /// Byte offset of `bank` in the image. A bank past the end of the image
    /// is not masked here; the slice index in `read_rom` panics on it.
    fn rom_bank_offset(&self, bank: u16) -> usize {
        bank as usize * ROM_BANK_SIZE
    }

    /// Read from 0xA000..0xBFFF. Disabled RAM reads as open bus.
    pub fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        self.ram[self.ram_offset(addr)]
    }

    pub fn write_ram(&mut self, addr: u16, value: u8) {
        if !self.ram_enabled {
            return;
        }
        let offset = self.ram_offset(addr);
        self.ram[offset] = value;
    }

    fn ram_offset(&self, addr: u16) -> usize {
        let offset = (addr as usize - 0xA000) & (RAM_BANK_SIZE - 1);
        if self.banking_mode == 0 {
            offset
        } else {
            self.ram_bank as usize * RAM_BANK_SIZE + offset
        }
    }

    /// A write into 0x0000..0x7FFF programs the bank controller.
    pub fn write_control(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == RAM_ENABLE_VALUE,
            0x2000..=0x3FFF => self.select_rom_bank(value),
            0x4000..=0x5FFF => {
                let bits = value & 0x03;
                if self.header.rom_banks >= 64 {
                    self.rom_bank = (self.rom_bank & 0x1F) | ((bits as u16) << 5);
                    self.rom_bank0 = (bits as u16) << 5;
                }
                if self.header.ram_banks >= 4 {
                    self.ram_bank = bits;
                }
            }
            0x6000..=0x7FFF => self.banking_mode = value & 0x01,
            _ => {}
        }
    }

    fn select_rom_bank(&mut self, value: u8) {
        let banks = self.header.rom_banks;
        match banks {
            2 => {}
            4..=32 => {
                // Bank counts are powers of two, so `banks - 1` is the mask.
                let bank = value as u16 & (banks as u16 - 1);
                self.rom_bank = if bank == 0 { 1 } else { bank };
            }
            _ => {
                let low = match value & 0x1F {
                    0 => 1,
                    low => low as u16,
                };
                self.rom_bank = (self.rom_bank & !0x1F) | low;
            }
        }
    }

    /// Battery-backed RAM as declared by the header; empty when there is none.
    pub fn external_ram(&self) -> &[u8] {
        &self.ram[..self.header.ram_banks * RAM_BANK_SIZE]
    }

    /// Copy a saved RAM image into the start of external RAM.
    pub fn load_external_ram(&mut self, data: &[u8]) -> Result<(), CartridgeError> {
        let capacity = self.header.ram_banks * RAM_BANK_SIZE;
        if data.len() > capacity {
            return Err(CartridgeError::SaveRamTooLarge {
                expected: capacity,
                actual: data.len(),
            });
        }
        self.ram[..data.len()].copy_from_slice(data);
        Ok(())
    }
}
