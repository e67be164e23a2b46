//! The PrAcc (Processor Access) handshake (SPEC_FULL §4.7): a stalled EJTAG
//! target has no memory-mapped debug bus, so instead a small program is
//! "executed" one fetch/load/store at a time, with the host supplying or
//! consuming each access over JTAG as the target reaches it.
//!
//! This mirrors the queue-and-replay engine in `mips64_pracc.c`, simplified
//! to a single pass over a fixed code/param buffer rather than a growable
//! instruction queue: callers build the whole code sequence up front (see
//! [`asm`]) instead of appending to it interleaved with execution.

use crate::architecture::mips64::ejtag::EjtagInterface;
use crate::architecture::mips64::Mips64Error;

/// The fixed, abstract memory window the PrAcc engine serves. These
/// addresses only ever exist in the handshake; they are never real
/// target memory.
pub mod region {
    /// Base of the whole PrAcc window, sign-extended into the 64-bit address
    /// space the ADDRESS register's 32-bit value is placed in.
    pub const BASE_ADDR: u64 = 0xffff_ffff_ff20_0000;
    /// Where the uploaded code sequence is fetched from.
    pub const TEXT: u64 = 0xffff_ffff_ff20_0200;
    /// Input parameters the host makes available for the target to load.
    pub const PARAM_IN: u64 = 0xffff_ffff_ff20_1000;
    /// Size in bytes of the [`PARAM_IN`] window.
    pub const PARAM_IN_SIZE: u64 = 0x1000;
    /// Output parameters the target stores results into.
    pub const PARAM_OUT: u64 = PARAM_IN + PARAM_IN_SIZE;
    /// Size in bytes of the [`PARAM_OUT`] window.
    pub const PARAM_OUT_SIZE: u64 = 0x1000;
    /// A small scratch stack the uploaded code can push/pop through.
    pub const STACK: u64 = 0xffff_ffff_ff20_4000;
    /// Size in bytes of the fast-data bulk transfer handler.
    pub const FASTDATA_HANDLER_SIZE: u64 = 0x80;
    /// Doublewords moved per fast-data handshake.
    pub const FASTDATA_SIZE: usize = 16;
}

const MAX_POLLS: usize = 10_000;
const MAX_STEPS: usize = 10_000;

/// Tracks the state of one `exec` run: the code being fetched, the
/// parameters being exchanged, and the scratch stack.
struct PraccContext<'a> {
    code: &'a [u32],
    iparam: &'a [u64],
    oparam: Vec<u64>,
    stack: Vec<u64>,
}

impl PraccContext<'_> {
    /// Serves a code fetch: always a single 32-bit instruction word (PSZ=2),
    /// addressed word-granular rather than through the 8-byte alignment the
    /// doubleword regions use.
    fn fetch_code(&mut self, address: u64) -> Result<u32, Mips64Error> {
        let word = ((address - region::TEXT) / 4) as usize;
        Ok(self.code.get(word).copied().unwrap_or(0))
    }

    /// Serves a 64-bit (PSZ=3) load from the param-in/param-out/stack
    /// regions, which this driver only ever addresses with `ld`/`sd`.
    fn load64(&mut self, address: u64) -> Result<u64, Mips64Error> {
        if address >= region::PARAM_IN && address < region::PARAM_IN + region::PARAM_IN_SIZE {
            let offset = ((address - region::PARAM_IN) / 8) as usize;
            return self
                .iparam
                .get(offset)
                .copied()
                .ok_or(Mips64Error::AddressOutOfRange(address));
        }
        if address >= region::PARAM_OUT && address < region::PARAM_OUT + region::PARAM_OUT_SIZE {
            let offset = ((address - region::PARAM_OUT) / 8) as usize;
            return Ok(self.oparam.get(offset).copied().unwrap_or(0));
        }
        if address == region::STACK {
            return self
                .stack
                .pop()
                .ok_or_else(|| Mips64Error::Other("pracc stack underflow".into()));
        }
        Err(Mips64Error::AddressOutOfRange(address))
    }

    fn store64(&mut self, address: u64, data: u64) -> Result<(), Mips64Error> {
        if address >= region::PARAM_OUT && address < region::PARAM_OUT + region::PARAM_OUT_SIZE {
            let offset = ((address - region::PARAM_OUT) / 8) as usize;
            if self.oparam.len() <= offset {
                self.oparam.resize(offset + 1, 0);
            }
            self.oparam[offset] = data;
            return Ok(());
        }
        if address == region::STACK {
            self.stack.push(data);
            return Ok(());
        }
        Err(Mips64Error::AddressOutOfRange(address))
    }
}

/// Runs `code` to completion against a stalled EJTAG target, serving every
/// fetch/load/store it issues and returning the doublewords it stored into
/// the `PARAM_OUT` window.
///
/// `code` must begin by fetching from [`region::TEXT`] (the PrAcc
/// exception handler always resumes execution there) and end by looping
/// back to fetch `TEXT` a second time, which this function treats as "the
/// program is done" and returns without servicing.
pub fn exec(
    ejtag: &mut EjtagInterface<'_>,
    code: &[u32],
    iparam: &[u64],
) -> Result<Vec<u64>, Mips64Error> {
    let mut ctx = PraccContext {
        code,
        iparam,
        oparam: Vec::new(),
        stack: Vec::new(),
    };

    let mut first_step = true;
    let mut text_fetches_at_start = 0u32;

    for _ in 0..MAX_STEPS {
        let ctrl = ejtag.wait_for_pracc(MAX_POLLS)?;
        let address32 = ejtag.read_address()?;
        let address = region::BASE_ADDR | (address32 as u64 & 0xffff_ffff);

        let psz = ctrl.psz();
        let offset3 = address & 0x7;
        let is_code_fetch = !ctrl.prnw()
            && address >= region::TEXT
            && address < region::TEXT + (code.len() as u64) * 4;

        if is_code_fetch {
            // Instruction fetches are always a single 32-bit word (PSZ=2),
            // addressed at whichever 4-byte half of the doubleword block the
            // PC currently sits in.
            if psz != 2 || (offset3 != 0 && offset3 != 4) {
                return Err(Mips64Error::UnsupportedAccessSize {
                    psz,
                    offset: offset3 as u8,
                });
            }

            if first_step && address != region::TEXT {
                return Err(Mips64Error::ProgramDidNotStart);
            }
            first_step = false;

            if address == region::TEXT {
                text_fetches_at_start += 1;
                if text_fetches_at_start > 1 {
                    ejtag.ack_pracc(ctrl)?;
                    break;
                }
            }

            let data = ctx.fetch_code(address)?;
            ejtag.write_data(data)?;
            ejtag.ack_pracc(ctrl)?;
            continue;
        }

        // Every other access this driver's code generators issue (loads and
        // stores against PARAM_IN/PARAM_OUT/STACK) is a doubleword `ld`/`sd`
        // (PSZ=3), aligned to offset 7 of its 8-byte block.
        if psz != 3 || offset3 != 7 {
            return Err(Mips64Error::UnsupportedAccessSize {
                psz,
                offset: offset3 as u8,
            });
        }
        let aligned = address & !7;
        first_step = false;

        if ctrl.prnw() {
            let data = ejtag.read_data64()?;
            ctx.store64(aligned, data)?;
            ejtag.ack_pracc(ctrl)?;
        } else {
            let data = ctx.load64(aligned)?;
            ejtag.write_data64(data)?;
            ejtag.ack_pracc(ctrl)?;
        }
    }

    if !ctx.stack.is_empty() {
        return Err(Mips64Error::Other("pracc stack not empty at exit".into()));
    }

    Ok(ctx.oparam)
}

/// MIPS32/MIPS64 instruction encodings for the small code sequences
/// `exec` is handed. Only the handful of instructions the register and
/// memory-access helpers need are implemented.
pub mod asm {
    const fn itype(opcode: u32, rs: u8, rt: u8, imm: u16) -> u32 {
        (opcode << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | imm as u32
    }

    /// `lui rt, imm`
    pub const fn lui(rt: u8, imm: u16) -> u32 {
        itype(0x0f, 0, rt, imm)
    }

    /// `ori rt, rs, imm`
    pub const fn ori(rt: u8, rs: u8, imm: u16) -> u32 {
        itype(0x0d, rs, rt, imm)
    }

    /// `addiu rt, rs, imm`
    pub const fn addiu(rt: u8, rs: u8, imm: u16) -> u32 {
        itype(0x09, rs, rt, imm)
    }

    /// `lw rt, imm(rs)`
    pub const fn lw(rt: u8, imm: u16, rs: u8) -> u32 {
        itype(0x23, rs, rt, imm)
    }

    /// `sw rt, imm(rs)`
    pub const fn sw(rt: u8, imm: u16, rs: u8) -> u32 {
        itype(0x2b, rs, rt, imm)
    }

    /// `ld rt, imm(rs)` (MIPS64)
    pub const fn ld(rt: u8, imm: u16, rs: u8) -> u32 {
        itype(0x37, rs, rt, imm)
    }

    /// `sd rt, imm(rs)` (MIPS64)
    pub const fn sd(rt: u8, imm: u16, rs: u8) -> u32 {
        itype(0x3f, rs, rt, imm)
    }

    /// `jr rs`
    pub const fn jr(rs: u8) -> u32 {
        ((rs as u32) << 21) | 0x08
    }

    /// `nop`
    pub const fn nop() -> u32 {
        0
    }

    const fn rtype(rs: u8, rt: u8, rd: u8, sa: u8, funct: u32) -> u32 {
        ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | ((sa as u32) << 6) | funct
    }

    /// `or rd, rs, rt`
    pub const fn or(rd: u8, rs: u8, rt: u8) -> u32 {
        rtype(rs, rt, rd, 0, 0x25)
    }

    /// `dsll rd, rt, sa` (doubleword shift left logical, `sa` in 0..32)
    pub const fn dsll(rd: u8, rt: u8, sa: u8) -> u32 {
        rtype(0, rt, rd, sa, 0x38)
    }

    /// `dsll32 rd, rt, sa` (doubleword shift left logical + 32, effective
    /// shift amount `sa + 32`)
    pub const fn dsll32(rd: u8, rt: u8, sa: u8) -> u32 {
        rtype(0, rt, rd, sa, 0x3c)
    }

    /// `mfhi rd`
    pub const fn mfhi(rd: u8) -> u32 {
        rtype(0, 0, rd, 0, 0x10)
    }

    /// `mflo rd`
    pub const fn mflo(rd: u8) -> u32 {
        rtype(0, 0, rd, 0, 0x12)
    }

    /// `mthi rs`
    pub const fn mthi(rs: u8) -> u32 {
        rtype(rs, 0, 0, 0, 0x11)
    }

    /// `mtlo rs`
    pub const fn mtlo(rs: u8) -> u32 {
        rtype(rs, 0, 0, 0, 0x13)
    }

    fn cop0(rs: u8, rt: u8, rd: u8, sel: u8) -> u32 {
        (0x10 << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | sel as u32
    }

    /// `mfc0 rt, rd, sel`
    pub fn mfc0(rt: u8, rd: u8, sel: u8) -> u32 {
        cop0(0x00, rt, rd, sel)
    }

    /// `mtc0 rt, rd, sel`
    pub fn mtc0(rt: u8, rd: u8, sel: u8) -> u32 {
        cop0(0x04, rt, rd, sel)
    }

    /// `dmfc0 rt, rd, sel` (MIPS64)
    pub fn dmfc0(rt: u8, rd: u8, sel: u8) -> u32 {
        cop0(0x01, rt, rd, sel)
    }

    /// `dmtc0 rt, rd, sel` (MIPS64)
    pub fn dmtc0(rt: u8, rd: u8, sel: u8) -> u32 {
        cop0(0x05, rt, rd, sel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::mips64::ejtag::instr;
    use crate::probe::{DebugProbeError, JtagAccess};
    use std::collections::VecDeque;

    #[test]
    fn lui_ori_build_a_32_bit_constant_load() {
        // lui $1, 0x1234 ; ori $1, $1, 0x5678
        assert_eq!(asm::lui(1, 0x1234), 0x3c01_1234);
        assert_eq!(asm::ori(1, 1, 0x5678), 0x3421_5678);
    }

    #[test]
    fn mfc0_encodes_rs_field_as_move_from() {
        // mfc0 $2, $12 (status), sel 0
        assert_eq!(asm::mfc0(2, 12, 0), 0x4002_6000);
    }

    #[test]
    fn jr_encodes_function_field() {
        assert_eq!(asm::jr(31), 0x03e0_0008);
    }

    /// One PrAcc handshake step the mock target will present to the host:
    /// the address/PSZ/R-or-W it reports, and (for a store) the 64-bit value
    /// the host should read back.
    #[derive(Clone)]
    struct Turn {
        address: u32,
        psz: u8,
        prnw: bool,
        store_value: u64,
        /// Whether this step ends the run without the host serving a fetch
        /// (the "repeat fetch at TEXT" termination case).
        terminal: bool,
    }

    fn fetch(address: u32) -> Turn {
        Turn {
            address,
            psz: 2,
            prnw: false,
            store_value: 0,
            terminal: false,
        }
    }

    fn terminal_fetch(address: u32) -> Turn {
        Turn {
            terminal: true,
            ..fetch(address)
        }
    }

    fn load64(address: u32) -> Turn {
        Turn {
            address,
            psz: 3,
            prnw: false,
            store_value: 0,
            terminal: false,
        }
    }

    fn store64(address: u32, value: u64) -> Turn {
        Turn {
            address,
            psz: 3,
            prnw: true,
            store_value: value,
            terminal: false,
        }
    }

    /// A scripted EJTAG TAP: replays a fixed sequence of PrAcc handshake
    /// steps and records every value the host wrote, without decoding any
    /// actual MIPS instructions (the same scripted-mock style as the ARM
    /// driver's `MockProbe`/`MockMemory`).
    #[derive(Debug)]
    struct MockEjtag {
        turns: VecDeque<Turn>,
        current: Option<Turn>,
        selected: u32,
        data_writes: Vec<u64>,
    }

    impl std::fmt::Debug for Turn {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Turn").field("address", &self.address).finish()
        }
    }

    impl MockEjtag {
        fn new(turns: Vec<Turn>) -> Self {
            Self {
                turns: turns.into(),
                current: None,
                selected: 0,
                data_writes: Vec::new(),
            }
        }
    }

    impl crate::probe::DebugProbe for MockEjtag {
        fn get_name(&self) -> &str {
            "mock-ejtag"
        }
        fn attach(&mut self) -> Result<(), DebugProbeError> {
            Ok(())
        }
        fn detach(&mut self) -> Result<(), DebugProbeError> {
            Ok(())
        }
        fn target_reset(&mut self) -> Result<(), DebugProbeError> {
            Ok(())
        }
    }

    impl JtagAccess for MockEjtag {
        fn jtag_shift_ir(
            &mut self,
            _tap_index: usize,
            instruction: u32,
            _ir_len: u8,
        ) -> Result<(), DebugProbeError> {
            self.selected = instruction;
            Ok(())
        }

        fn jtag_shift_dr(
            &mut self,
            _tap_index: usize,
            data: u64,
            bit_len: u8,
        ) -> Result<u64, DebugProbeError> {
            match self.selected {
                instr::CONTROL => {
                    let _ = data;
                    if self.current.is_none() {
                        // The host's first CONTROL read for a new handshake
                        // step: pop the next scripted turn and report it
                        // pending.
                        let turn = self.turns.pop_front().expect("mock ran out of scripted turns");
                        let mut ctrl = super::super::ejtag::EjtagControl::from(0);
                        ctrl.set_pracc(true);
                        let word =
                            u32::from(ctrl) | ((turn.psz as u32) << 29) | ((turn.prnw as u32) << 19);
                        self.current = Some(turn);
                        Ok(word as u64)
                    } else {
                        // Any later CONTROL access is the host acking this
                        // step by clearing PRACC.
                        self.current = None;
                        Ok(0)
                    }
                }
                instr::ADDRESS => Ok(self.current.as_ref().unwrap().address as u64),
                instr::DATA => {
                    let turn = self.current.as_ref().unwrap().clone();
                    if turn.prnw {
                        assert_eq!(bit_len, 64, "store handshake must use a 64-bit Data shift");
                        Ok(turn.store_value)
                    } else {
                        self.data_writes.push(data);
                        Ok(0)
                    }
                }
                other => panic!("unexpected IR selection {other:#x}"),
            }
        }

        fn jtag_idle(&mut self, _cycles: usize) -> Result<(), DebugProbeError> {
            Ok(())
        }
    }

    #[test]
    fn code_fetches_serve_one_32_bit_word_per_handshake() {
        let code = [asm::nop(), asm::jr(31)];
        let mut probe = MockEjtag::new(vec![
            fetch(region::TEXT as u32),
            fetch(region::TEXT as u32 + 4),
            terminal_fetch(region::TEXT as u32),
        ]);
        let mut ejtag = EjtagInterface::new(&mut probe, 0);

        let out = exec(&mut ejtag, &code, &[]).unwrap();

        assert!(out.is_empty());
        assert_eq!(probe.data_writes, vec![asm::nop() as u64, asm::jr(31) as u64]);
    }

    #[test]
    fn store_handshake_reads_a_64_bit_doubleword_into_param_out() {
        let code = [asm::nop()];
        let value = 0x1122_3344_5566_7788u64;
        let mut probe = MockEjtag::new(vec![
            fetch(region::TEXT as u32),
            store64(region::PARAM_OUT as u32 | 7, value),
            terminal_fetch(region::TEXT as u32),
        ]);
        let mut ejtag = EjtagInterface::new(&mut probe, 0);

        let out = exec(&mut ejtag, &code, &[]).unwrap();

        assert_eq!(out, vec![value]);
    }

    #[test]
    fn load_handshake_serves_input_parameters_as_doublewords() {
        let code = [asm::nop()];
        let mut probe = MockEjtag::new(vec![
            fetch(region::TEXT as u32),
            load64(region::PARAM_IN as u32 | 7),
            terminal_fetch(region::TEXT as u32),
        ]);
        let mut ejtag = EjtagInterface::new(&mut probe, 0);

        exec(&mut ejtag, &code, &[0xdead_beef_cafe_babe]).unwrap();
    }
}
