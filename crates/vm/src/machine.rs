use types::{save_area, CpuFault, Hardware, Word};

use crate::devices::Devices;
use crate::loader::ProgramRegistry;
use crate::memory::Ram;
use crate::mmu::SoftMmu;

/// The whole simulated computer: RAM, device bus, MMU and program images.
#[derive(Debug, Clone)]
pub struct Machine {
    pub ram: Ram,
    pub devices: Devices,
    pub mmu: SoftMmu,
    pub programs: ProgramRegistry,
}

impl Machine {
    pub fn new(memory_size: usize, page_size: usize, programs: ProgramRegistry) -> Self {
        let ram = Ram::new(memory_size);
        let mmu = SoftMmu::new(ram.clone(), page_size);
        Self {
            ram,
            devices: Devices::new(),
            mmu,
            programs,
        }
    }

    /// Collaborator handles for the kernel. The machine keeps its own
    /// handles to the same state.
    pub fn hardware(&self) -> Hardware {
        Hardware {
            memory: Box::new(self.ram.clone()),
            devices: Box::new(self.devices.clone()),
            mmu: Box::new(self.mmu.clone()),
            loader: Box::new(self.programs.clone()),
        }
    }

    pub fn saved(&self, slot: usize) -> Word {
        self.ram.load_word(slot).unwrap_or_default()
    }

    pub fn set_saved(&self, slot: usize, value: Word) {
        assert!(slot < save_area::END, "slot {} is outside the save area", slot);
        self.ram.store_word(slot, value);
    }

    pub fn set_fault(&self, fault: CpuFault, complement: Word) {
        self.set_saved(save_area::FAULT, fault.raw());
        self.set_saved(save_area::COMPLEMENT, complement);
    }
}
