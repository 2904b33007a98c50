use super::{Cpu, FLAG_C, FLAG_N, FLAG_T, FLAG_V, FLAG_Z, PC, SIGN_BIT};
use crate::machine::AgbBus;

impl Cpu {
    /// Barrel-shifter evaluation of a shifted-register operand.
    ///
    /// `shift` is the raw shift field (bits 11..4 of a data-processing
    /// opcode): bit 0 selects register-specified amounts, bits 2..1 the
    /// type, bits 7..3 the immediate amount or 7..4 the amount register.
    /// `carry` receives the shifter carry-out; a zero immediate LSL (and a
    /// zero register amount) preserves the current C flag. Immediate
    /// shift-by-0 means 32 for LSR/ASR and RRX for ROR.
    ///
    /// When the operand register is the PC it reads as the instruction
    /// address + 8, or + 12 when the amount comes from a register (the
    /// shifter consumes a cycle before the ALU).
    pub(crate) fn shifted_reg(&self, r: usize, shift: u8, carry: &mut bool) -> u32 {
        let mut value = self.reg(r);

        // PC prefetch: the PC slot already points past the opcode.
        if r == PC {
            value = value.wrapping_add(if shift & 1 != 0 { 8 } else { 4 });
        }

        if shift == 0 {
            // LSL #0: operand and carry pass through.
            *carry = self.cpsr & FLAG_C != 0;
            return value;
        }

        let shift_type = (shift >> 1) & 3;
        let amount;
        if shift & 1 != 0 {
            amount = (self.reg((shift >> 4) as usize) & 0xFF) as u32;
            if amount == 0 {
                *carry = self.cpsr & FLAG_C != 0;
                return value;
            }
        } else {
            let imm = (shift >> 3) as u32;
            // LSR/ASR encode a shift of 32 as 0.
            amount = if imm == 0 { 32 } else { imm };
        }

        match shift_type {
            0 => {
                // LSL
                if amount >= 32 {
                    *carry = amount == 32 && value & 1 != 0;
                    0
                } else {
                    *carry = value & (1 << (32 - amount)) != 0;
                    value << amount
                }
            }
            1 => {
                // LSR
                if amount >= 32 {
                    *carry = amount == 32 && value & SIGN_BIT != 0;
                    0
                } else {
                    *carry = value & (1 << (amount - 1)) != 0;
                    value >> amount
                }
            }
            2 => {
                // ASR
                let sign = value & SIGN_BIT != 0;
                if amount >= 32 {
                    *carry = sign;
                    if sign {
                        0xFFFF_FFFF
                    } else {
                        0
                    }
                } else {
                    *carry = value & (1 << (amount - 1)) != 0;
                    ((value as i32) >> amount) as u32
                }
            }
            _ => {
                if shift & 1 == 0 && amount == 32 {
                    // ROR #0 is RRX: rotate right through carry.
                    let carry_in = self.cpsr & FLAG_C != 0;
                    *carry = value & 1 != 0;
                    (value >> 1) | if carry_in { SIGN_BIT } else { 0 }
                } else {
                    let rot = amount & 0x1F;
                    let result = value.rotate_right(rot);
                    *carry = result & SIGN_BIT != 0;
                    result
                }
            }
        }
    }

    /// Add with NZCV update. `c` is the carry-in (0 or 1).
    #[inline]
    pub(crate) fn add_with_flags(&mut self, a: u32, b: u32, c: u32) -> u32 {
        let result = a.wrapping_add(b).wrapping_add(c);
        let carry = result < a || (result == a && c != 0);
        let overflow = (a ^ b) & SIGN_BIT == 0 && (a ^ result) & SIGN_BIT != 0;

        self.cpsr = (self.cpsr & 0x0FFF_FFFF)
            | (result & SIGN_BIT)
            | if result == 0 { FLAG_Z } else { 0 }
            | if carry { FLAG_C } else { 0 }
            | if overflow { FLAG_V } else { 0 };
        result
    }

    /// Subtract with NZCV update. C is "no borrow": `c` is the carry-in
    /// (1 for plain SUB/CMP, the C flag for SBC).
    #[inline]
    pub(crate) fn sub_with_flags(&mut self, a: u32, b: u32, c: u32) -> u32 {
        let result = a.wrapping_sub(b).wrapping_add(c).wrapping_sub(1);
        let carry = !(b > a || (b == a && c == 0));
        let overflow = (a ^ b) & SIGN_BIT != 0 && (a ^ result) & SIGN_BIT != 0;

        self.cpsr = (self.cpsr & 0x0FFF_FFFF)
            | (result & SIGN_BIT)
            | if result == 0 { FLAG_Z } else { 0 }
            | if carry { FLAG_C } else { 0 }
            | if overflow { FLAG_V } else { 0 };
        result
    }

    /// N/Z from a logical result, C from the shifter carry-out, V preserved.
    #[inline]
    pub(crate) fn logical_flags_carry(&mut self, result: u32, carry: bool) {
        self.cpsr = (self.cpsr & !(FLAG_N | FLAG_Z | FLAG_C))
            | (result & SIGN_BIT)
            | if result == 0 { FLAG_Z } else { 0 }
            | if carry { FLAG_C } else { 0 };
    }

    /// N/Z only (THUMB ALU ops without a shifter carry).
    #[inline]
    pub(crate) fn logical_flags(&mut self, result: u32) {
        self.cpsr = (self.cpsr & !(FLAG_N | FLAG_Z))
            | (result & SIGN_BIT)
            | if result == 0 { FLAG_Z } else { 0 };
    }

    /// Data-processing op with condition codes (the S bit).
    ///
    /// With the PC as destination the flag-free variant runs instead and
    /// CPSR is restored from SPSR, switching mode and possibly state.
    pub(crate) fn alu_op(
        &mut self,
        bus: &AgbBus,
        op: u32,
        dest: usize,
        op1: u32,
        op2: u32,
        carry: bool,
    ) -> u32 {
        if dest == PC {
            let timing = self.alu_op_nocond(bus, op, dest, op1, op2);

            self.cpsr = self.spsr();
            self.mode_changed();
            if self.cpsr & FLAG_T != 0 {
                self.update_thumb_pc(bus);
            }
            return timing;
        }

        let carry_in = if self.cpsr & FLAG_C != 0 { 1 } else { 0 };

        match op {
            0x0 => {
                // AND
                let result = op1 & op2;
                self.set_reg(dest, result);
                self.logical_flags_carry(result, carry);
            }
            0x1 => {
                // EOR
                let result = op1 ^ op2;
                self.set_reg(dest, result);
                self.logical_flags_carry(result, carry);
            }
            0x2 => {
                // SUB
                let result = self.sub_with_flags(op1, op2, 1);
                self.set_reg(dest, result);
            }
            0x3 => {
                // RSB
                let result = self.sub_with_flags(op2, op1, 1);
                self.set_reg(dest, result);
            }
            0x4 => {
                // ADD
                let result = self.add_with_flags(op1, op2, 0);
                self.set_reg(dest, result);
            }
            0x5 => {
                // ADC
                let result = self.add_with_flags(op1, op2, carry_in);
                self.set_reg(dest, result);
            }
            0x6 => {
                // SBC
                let result = self.sub_with_flags(op1, op2, carry_in);
                self.set_reg(dest, result);
            }
            0x7 => {
                // RSC
                let result = self.sub_with_flags(op2, op1, carry_in);
                self.set_reg(dest, result);
            }
            0x8 => {
                // TST
                let result = op1 & op2;
                self.logical_flags_carry(result, carry);
            }
            0x9 => {
                // TEQ
                let result = op1 ^ op2;
                self.logical_flags_carry(result, carry);
            }
            0xA => {
                // CMP
                self.sub_with_flags(op1, op2, 1);
            }
            0xB => {
                // CMN
                self.add_with_flags(op1, op2, 0);
            }
            0xC => {
                // ORR
                let result = op1 | op2;
                self.set_reg(dest, result);
                self.logical_flags_carry(result, carry);
            }
            0xD => {
                // MOV
                self.set_reg(dest, op2);
                self.logical_flags_carry(op2, carry);
            }
            0xE => {
                // BIC
                let result = op1 & !op2;
                self.set_reg(dest, result);
                self.logical_flags_carry(result, carry);
            }
            _ => {
                // MVN
                let result = !op2;
                self.set_reg(dest, result);
                self.logical_flags_carry(result, carry);
            }
        }

        self.pc_s_cycles
    }

    /// Data-processing op without condition-code update (S clear).
    pub(crate) fn alu_op_nocond(
        &mut self,
        bus: &AgbBus,
        op: u32,
        dest: usize,
        op1: u32,
        op2: u32,
    ) -> u32 {
        let carry_in = if self.cpsr & FLAG_C != 0 { 1u32 } else { 0 };

        let result = match op {
            0x0 => op1 & op2,
            0x1 => op1 ^ op2,
            0x2 => op1.wrapping_sub(op2),
            0x3 => op2.wrapping_sub(op1),
            0x4 => op1.wrapping_add(op2),
            0x5 => op1.wrapping_add(op2).wrapping_add(carry_in),
            0x6 => op1.wrapping_sub(op2).wrapping_add(carry_in).wrapping_sub(1),
            0x7 => op2.wrapping_sub(op1).wrapping_add(carry_in).wrapping_sub(1),
            // TST..CMN without S are PSR transfers, decoded elsewhere.
            0x8..=0xB => return self.pc_s_cycles,
            0xC => op1 | op2,
            0xD => op2,
            0xE => op1 & !op2,
            _ => !op2,
        };

        self.set_reg(dest, result);

        if dest == PC {
            self.update_arm_pc(bus);
        }

        self.pc_s_cycles
    }

    /// Internal cycles of a multiply: one per significant byte of the
    /// operand, counting leading 0 (or 1 for signed) bytes as free.
    pub(crate) fn multiply_cycles(op2: u32, signed: bool, accumulate: bool) -> u32 {
        let prefix = if signed && op2 & SIGN_BIT != 0 {
            (!op2).leading_zeros()
        } else {
            op2.leading_zeros()
        };

        if prefix == 32 {
            1 + if accumulate { 1 } else { 0 }
        } else {
            (4 - prefix / 8) + if accumulate { 1 } else { 0 }
        }
    }
}
