//! Cache identification and maintenance (SPEC_FULL §4.6): walks
//! `CLIDR_EL1`/`CSSELR_EL1`/`CCSIDR_EL1` to learn the cache topology, then
//! issues `dc cisw`/`ic ialluis` through the [`Dpm`] opcode pump to flush
//! it. Treated as just another opcode stream, the same as register and APB
//! memory access (§4.3's "one function per instruction class").

use crate::architecture::arm::core::dpm::Dpm;
use crate::architecture::arm::ArmError;

mod opcodes {
    //! AArch64 system-register and cache-maintenance instruction words.

    /// `mrs x0, clidr_el1`
    pub const MRS_CLIDR_EL1: u32 = 0xd538_d040;
    /// `msr csselr_el1, x0`
    pub const MSR_CSSELR_EL1: u32 = 0xd518_d040;
    /// `mrs x0, csselr_el1`
    pub const MRS_CSSELR_EL1: u32 = 0xd538_d040 | (2 << 5);
    /// `mrs x0, ccsidr_el1`
    pub const MRS_CCSIDR_EL1: u32 = 0xd538_d000;
    /// `ic ialluis`
    pub const IC_IALLUIS: u32 = 0xd508_7500;
    /// `dsb sy`
    pub const DSB_SY: u32 = 0xd503_3f9f;

    /// `dc cisw, x0`
    pub const DC_CISW: u32 = 0xd508_7a20;
}

/// One cache level's geometry, as decoded from `CCSIDR_EL1`.
#[derive(Debug, Clone, Copy)]
pub struct CacheLevel {
    pub level: u8,
    pub line_size: u32,
    pub ways: u32,
    pub sets: u32,
}

/// Cache topology for a single core, read once per attach.
#[derive(Debug, Clone, Default)]
pub struct CacheInfo {
    /// Level of Coherency: levels above this are architecturally
    /// guaranteed coherent and need no software maintenance.
    pub level_of_coherency: u8,
    /// Level of Unification (Uniprocessor).
    pub level_of_unification_uniprocessor: u8,
    /// Level of Unification, Inner Shareable.
    pub level_of_unification_inner_shareable: u8,
    /// Levels with a data or unified cache (`Ctype >= 2`).
    pub data_levels: Vec<CacheLevel>,
}

fn ctype(clidr: u64, level: u8) -> u8 {
    ((clidr >> (level as u64 * 3)) & 0b111) as u8
}

/// Reads `CLIDR_EL1` and, for every level with a data or unified cache,
/// `CCSIDR_EL1`, returning the decoded topology.
pub fn identify(dpm: &mut Dpm<'_>) -> Result<CacheInfo, ArmError> {
    let clidr = dpm.instr_read_data_x0(opcodes::MRS_CLIDR_EL1)?;

    let loc = ((clidr >> 24) & 0b111) as u8;
    let louis = ((clidr >> 21) & 0b111) as u8;
    let louu = ((clidr >> 27) & 0b111) as u8;

    let mut data_levels = Vec::new();
    for level in 0..loc.max(1) {
        if ctype(clidr, level) < 2 {
            continue;
        }

        // CSSELR_EL1: Level[3:1], InD[0] = 0 (data/unified)
        let csselr = (level as u64) << 1;
        dpm.write_core_reg(0, csselr)?;
        dpm.exec_opcode(opcodes::MSR_CSSELR_EL1)?;

        let ccsidr = dpm.instr_read_data_x0(opcodes::MRS_CCSIDR_EL1)?;

        let line_size = 16u32 << (ccsidr & 0x7);
        let ways = (((ccsidr >> 3) & 0x3ff) + 1) as u32;
        let sets = (((ccsidr >> 13) & 0x7fff) + 1) as u32;

        data_levels.push(CacheLevel {
            level,
            line_size,
            ways,
            sets,
        });
    }

    Ok(CacheInfo {
        level_of_coherency: loc,
        level_of_unification_uniprocessor: louu,
        level_of_unification_inner_shareable: louis,
        data_levels,
    })
}

/// Flushes (clean+invalidate) the whole D-cache hierarchy, then invalidates
/// the I-cache, restoring `CSSELR_EL1` to its original value at the end.
pub fn flush_all(dpm: &mut Dpm<'_>, info: &CacheInfo) -> Result<(), ArmError> {
    let saved_csselr = dpm.instr_read_data_x0(opcodes::MRS_CSSELR_EL1)?;

    for level_info in &info.data_levels {
        let ways_shift = 32 - (level_info.ways as f64).log2().ceil() as u32;
        let sets_shift = (level_info.line_size as f64).log2() as u32 + 4;

        for way in 0..level_info.ways {
            for set in 0..level_info.sets {
                let setway = (way << ways_shift)
                    | (set << sets_shift)
                    | ((level_info.level as u32) << 1);
                dpm.instr_write_data_x0(opcodes::DC_CISW, setway as u64)?;
            }
        }
        dpm.exec_opcode(opcodes::DSB_SY)?;
    }

    dpm.write_core_reg(0, saved_csselr)?;
    dpm.exec_opcode(opcodes::MSR_CSSELR_EL1)?;

    dpm.exec_opcode(opcodes::IC_IALLUIS)?;
    dpm.exec_opcode(opcodes::DSB_SY)
}

#[cfg(test)]
mod tests {
    use super::ctype;

    #[test]
    fn ctype_extracts_three_bit_fields() {
        // Level 0 = 0b010 (data cache), level 1 = 0b100 (unified).
        let clidr = 0b100_010u64;
        assert_eq!(ctype(clidr, 0), 0b010);
        assert_eq!(ctype(clidr, 1), 0b100);
    }
}
