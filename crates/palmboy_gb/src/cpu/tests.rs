use super::*;

struct TestBus {
    memory: [u8; 0x10000],
    speed_switch_armed: bool,
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
            speed_switch_armed: false,
        }
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    fn take_speed_switch(&mut self) -> bool {
        let armed = self.speed_switch_armed;
        self.speed_switch_armed = false;
        armed
    }
}

/// Place `program` at 0x0200 and point the CPU at it.
fn setup(program: &[u8]) -> (Cpu, TestBus) {
    let mut bus = TestBus::default();
    bus.memory[0x0200..0x0200 + program.len()].copy_from_slice(program);

    let mut cpu = Cpu::new();
    cpu.regs.pc = 0x0200;
    (cpu, bus)
}

#[test]
fn nop_takes_four_cycles() {
    let (mut cpu, mut bus) = setup(&[0x00]);
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0201);
}

#[test]
fn ld_immediate_pairs() {
    let (mut cpu, mut bus) = setup(&[
        0x01, 0x34, 0x12, // LD BC,0x1234
        0x11, 0x78, 0x56, // LD DE,0x5678
        0x21, 0xBC, 0x9A, // LD HL,0x9ABC
        0x31, 0xF0, 0xDE, // LD SP,0xDEF0
    ]);

    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.regs.bc(), 0x1234);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.de(), 0x5678);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.hl(), 0x9ABC);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.sp, 0xDEF0);
}

#[test]
fn ld_r_r_block_and_hl_forms() {
    let (mut cpu, mut bus) = setup(&[
        0x41, // LD B,C
        0x77, // LD (HL),A
        0x6E, // LD L,(HL)
    ]);
    cpu.regs.c = 0x42;
    cpu.regs.a = 0x99;
    cpu.regs.set_hl(0x8000);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.b, 0x42);

    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(bus.memory[0x8000], 0x99);

    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.regs.l, 0x99);
}

#[test]
fn add_sets_half_and_full_carry() {
    // H = carry out of bit 3, C = carry out of bit 7.
    let (mut cpu, mut bus) = setup(&[0x80, 0x80]);
    cpu.regs.a = 0x0F;
    cpu.regs.b = 0x01;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x10);
    assert_eq!(cpu.regs.f, FLAG_H);

    cpu.regs.a = 0xFF;
    cpu.regs.b = 0x01;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.regs.f, FLAG_Z | FLAG_H | FLAG_C);
}

#[test]
fn adc_includes_carry_in_half_carry() {
    let (mut cpu, mut bus) = setup(&[0x88]);
    cpu.regs.a = 0x0F;
    cpu.regs.b = 0x00;
    cpu.regs.f = FLAG_C;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x10);
    assert_eq!(cpu.regs.f, FLAG_H);
}

#[test]
fn sub_sets_borrow_flags() {
    let (mut cpu, mut bus) = setup(&[0x90, 0x90]);
    cpu.regs.a = 0x10;
    cpu.regs.b = 0x01;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x0F);
    assert_eq!(cpu.regs.f, FLAG_N | FLAG_H);

    cpu.regs.a = 0x00;
    cpu.regs.b = 0x01;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0xFF);
    assert_eq!(cpu.regs.f, FLAG_N | FLAG_H | FLAG_C);
}

#[test]
fn sbc_chains_borrow() {
    let (mut cpu, mut bus) = setup(&[0x98]);
    cpu.regs.a = 0x10;
    cpu.regs.b = 0x0F;
    cpu.regs.f = FLAG_C;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.regs.f, FLAG_Z | FLAG_N | FLAG_H);
}

#[test]
fn and_or_xor_flags() {
    let (mut cpu, mut bus) = setup(&[0xA0, 0xB0, 0xA8]);
    cpu.regs.a = 0xF0;
    cpu.regs.b = 0x0F;
    cpu.step(&mut bus);
    // AND always sets H.
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.regs.f, FLAG_Z | FLAG_H);

    cpu.regs.a = 0xF0;
    cpu.regs.b = 0x0F;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0xFF);
    assert_eq!(cpu.regs.f, 0);

    cpu.regs.b = 0xFF;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.regs.f, FLAG_Z);
}

#[test]
fn cp_compares_without_writing_a() {
    let (mut cpu, mut bus) = setup(&[0xB8]);
    cpu.regs.a = 0x3C;
    cpu.regs.b = 0x40;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x3C);
    assert!(cpu.regs.f & FLAG_C != 0);
    assert!(cpu.regs.f & FLAG_N != 0);
}

#[test]
fn inc_dec_preserve_carry() {
    let (mut cpu, mut bus) = setup(&[0x04, 0x05]);
    cpu.regs.b = 0x0F;
    cpu.regs.f = FLAG_C;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b, 0x10);
    assert_eq!(cpu.regs.f, FLAG_H | FLAG_C);

    cpu.regs.b = 0x10;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b, 0x0F);
    assert_eq!(cpu.regs.f, FLAG_N | FLAG_H | FLAG_C);
}

#[test]
fn inc_hl_memory_form() {
    let (mut cpu, mut bus) = setup(&[0x34]);
    cpu.regs.set_hl(0x8100);
    bus.memory[0x8100] = 0xFF;
    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(bus.memory[0x8100], 0x00);
    assert!(cpu.regs.f & FLAG_Z != 0);
}

#[test]
fn add_hl_rr_flags_from_bits_11_and_15() {
    let (mut cpu, mut bus) = setup(&[0x09, 0x09]);
    cpu.regs.set_hl(0x0FFF);
    cpu.regs.set_bc(0x0001);
    cpu.regs.f = FLAG_Z;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.hl(), 0x1000);
    // Z preserved, N cleared, H from bit 11.
    assert_eq!(cpu.regs.f, FLAG_Z | FLAG_H);

    cpu.regs.set_hl(0xFFFF);
    cpu.regs.set_bc(0x0001);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.hl(), 0x0000);
    assert!(cpu.regs.f & FLAG_C != 0);
}

#[test]
fn add_sp_signed_flags_from_low_byte() {
    let (mut cpu, mut bus) = setup(&[0xE8, 0x01, 0xE8, 0xFF]);
    cpu.regs.sp = 0xFFFF;
    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.regs.sp, 0x0000);
    // Flags as an 8-bit add of 0xFF + 0x01; Z is always cleared.
    assert_eq!(cpu.regs.f, FLAG_H | FLAG_C);

    cpu.regs.sp = 0x0001;
    cpu.step(&mut bus);
    // 0x0001 + (-1): low-byte add 0x01 + 0xFF carries.
    assert_eq!(cpu.regs.sp, 0x0000);
    assert_eq!(cpu.regs.f, FLAG_H | FLAG_C);
}

#[test]
fn ldhl_sp_signed() {
    let (mut cpu, mut bus) = setup(&[0xF8, 0x02]);
    cpu.regs.sp = 0xFFFE;
    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.regs.hl(), 0x0000);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.f, FLAG_H | FLAG_C);
}

#[test]
fn rotate_a_clears_z_but_cb_rotate_sets_it() {
    // RLCA on zero leaves Z clear...
    let (mut cpu, mut bus) = setup(&[0x07, 0xCB, 0x00]);
    cpu.regs.a = 0x00;
    cpu.regs.f = 0xF0;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.f, 0);

    // ...while CB RLC B on zero sets it.
    cpu.regs.b = 0x00;
    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.regs.f, FLAG_Z);
}

#[test]
fn rla_rra_rotate_through_carry() {
    let (mut cpu, mut bus) = setup(&[0x17, 0x1F]);
    cpu.regs.a = 0x80;
    cpu.regs.f = 0;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.regs.f, FLAG_C);

    cpu.regs.a = 0x00;
    cpu.step(&mut bus);
    // Carry rotates into bit 7.
    assert_eq!(cpu.regs.a, 0x80);
    assert_eq!(cpu.regs.f, 0);
}

#[test]
fn cb_shift_family() {
    let (mut cpu, mut bus) = setup(&[
        0xCB, 0x20, // SLA B
        0xCB, 0x28, // SRA B
        0xCB, 0x38, // SRL B
        0xCB, 0x30, // SWAP B
    ]);

    cpu.regs.b = 0xC1;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b, 0x82);
    assert_eq!(cpu.regs.f, FLAG_C);

    cpu.regs.b = 0x81;
    cpu.step(&mut bus);
    // SRA keeps the sign bit.
    assert_eq!(cpu.regs.b, 0xC0);
    assert_eq!(cpu.regs.f, FLAG_C);

    cpu.regs.b = 0x01;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b, 0x00);
    assert_eq!(cpu.regs.f, FLAG_Z | FLAG_C);

    cpu.regs.b = 0xAB;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b, 0xBA);
    assert_eq!(cpu.regs.f, 0);
}

#[test]
fn cb_bit_res_set() {
    let (mut cpu, mut bus) = setup(&[
        0xCB, 0x40, // BIT 0,B
        0xCB, 0x78, // BIT 7,B
        0xCB, 0x80, // RES 0,B
        0xCB, 0xF8, // SET 7,B
        0xCB, 0x46, // BIT 0,(HL)
    ]);
    cpu.regs.b = 0x01;
    cpu.regs.f = FLAG_C;

    cpu.step(&mut bus);
    // Bit set: Z clear; C preserved, H set.
    assert_eq!(cpu.regs.f, FLAG_H | FLAG_C);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.f, FLAG_Z | FLAG_H | FLAG_C);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b, 0x00);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b, 0x80);

    cpu.regs.set_hl(0x8200);
    bus.memory[0x8200] = 0x00;
    assert_eq!(cpu.step(&mut bus), 12);
    assert!(cpu.regs.f & FLAG_Z != 0);
}

#[test]
fn daa_after_add_sequence() {
    // 0x15 + 0x15 = 0x2A, then DAA corrects to BCD 30.
    let (mut cpu, mut bus) = setup(&[0x87, 0x27]);
    cpu.regs.a = 0x15;
    cpu.regs.f = 0;

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x2A);
    assert_eq!(cpu.regs.f, 0);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x30);
    assert_eq!(cpu.regs.f, 0);
}

#[test]
fn daa_sets_carry_on_high_correction() {
    let (mut cpu, mut bus) = setup(&[0x87, 0x27]);
    cpu.regs.a = 0x99;
    cpu.step(&mut bus); // 0x99 + 0x99 = 0x32 with C set
    assert_eq!(cpu.regs.a, 0x32);
    assert!(cpu.regs.f & FLAG_C != 0);

    cpu.step(&mut bus);
    // 0x99 + 0x99 = 198: both corrections apply (C and H were set).
    assert_eq!(cpu.regs.a, 0x98);
    assert!(cpu.regs.f & FLAG_C != 0);
}

#[test]
fn daa_after_sub() {
    // 0x42 - 0x13 = 0x2F with H set; DAA subtracts 0x06.
    let (mut cpu, mut bus) = setup(&[0xD6, 0x13, 0x27]);
    cpu.regs.a = 0x42;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x2F);
    assert!(cpu.regs.f & FLAG_H != 0);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x29);
    assert!(cpu.regs.f & FLAG_N != 0);
}

#[test]
fn pop_af_masks_low_nibble() {
    let (mut cpu, mut bus) = setup(&[0xF1]);
    cpu.regs.sp = 0x8000;
    bus.memory[0x8000] = 0xFF;
    bus.memory[0x8001] = 0xFF;

    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.regs.a, 0xFF);
    assert_eq!(cpu.regs.f, 0xF0);
    assert_eq!(cpu.regs.sp, 0x8002);
}

#[test]
fn push_pop_round_trip() {
    let (mut cpu, mut bus) = setup(&[0xC5, 0xD1]);
    cpu.regs.sp = 0x9000;
    cpu.regs.set_bc(0xBEEF);

    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.regs.sp, 0x8FFE);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.de(), 0xBEEF);
    assert_eq!(cpu.regs.sp, 0x9000);
}

#[test]
fn conditional_jumps_and_cycles() {
    let (mut cpu, mut bus) = setup(&[
        0x20, 0x02, // JR NZ,+2 (taken)
        0x00, 0x00, 0x28, 0x10, // JR Z,+16 (not taken)
    ]);
    cpu.regs.f = 0;
    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.regs.pc, 0x0204);

    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.regs.pc, 0x0206);
}

#[test]
fn jr_backwards() {
    let (mut cpu, mut bus) = setup(&[0x18, 0xFE]); // JR -2: tight loop
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0200);
}

#[test]
fn jp_and_jp_hl() {
    let (mut cpu, mut bus) = setup(&[0xC3, 0x00, 0x90]);
    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x9000);

    cpu.regs.set_hl(0xA500);
    bus.memory[0x9000] = 0xE9; // JP (HL)
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0xA500);
}

#[test]
fn call_ret_round_trip() {
    let (mut cpu, mut bus) = setup(&[0xCD, 0x00, 0x90]);
    cpu.regs.sp = 0xFFFE;
    bus.memory[0x9000] = 0xC9; // RET

    assert_eq!(cpu.step(&mut bus), 24);
    assert_eq!(cpu.regs.pc, 0x9000);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    // Return address is the byte after the CALL.
    assert_eq!(bus.memory[0xFFFC], 0x03);
    assert_eq!(bus.memory[0xFFFD], 0x02);

    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x0203);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn conditional_ret_cycles() {
    let (mut cpu, mut bus) = setup(&[0xC0, 0xC0]);
    cpu.regs.sp = 0x9000;
    bus.memory[0x9000] = 0x34;
    bus.memory[0x9001] = 0x12;

    cpu.regs.f = FLAG_Z;
    assert_eq!(cpu.step(&mut bus), 8); // RET NZ not taken

    cpu.regs.f = 0;
    assert_eq!(cpu.step(&mut bus), 20); // taken
    assert_eq!(cpu.regs.pc, 0x1234);
}

#[test]
fn rst_vectors() {
    let (mut cpu, mut bus) = setup(&[0xEF]); // RST 28
    cpu.regs.sp = 0xFFFE;
    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x0028);
    assert_eq!(cpu.regs.sp, 0xFFFC);
}

#[test]
fn ld_nn_sp_stores_both_bytes() {
    let (mut cpu, mut bus) = setup(&[0x08, 0x00, 0x82]);
    cpu.regs.sp = 0xBEEF;
    assert_eq!(cpu.step(&mut bus), 20);
    assert_eq!(bus.memory[0x8200], 0xEF);
    assert_eq!(bus.memory[0x8201], 0xBE);
}

#[test]
fn ldh_forms_use_high_page() {
    let (mut cpu, mut bus) = setup(&[0xE0, 0x80, 0xF0, 0x80, 0xE2]);
    cpu.regs.a = 0x5A;
    cpu.step(&mut bus);
    assert_eq!(bus.memory[0xFF80], 0x5A);

    cpu.regs.a = 0;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x5A);

    cpu.regs.c = 0x81;
    cpu.step(&mut bus);
    assert_eq!(bus.memory[0xFF81], 0x5A);
}

#[test]
fn scf_ccf_cpl() {
    let (mut cpu, mut bus) = setup(&[0x37, 0x3F, 0x2F]);
    cpu.regs.f = FLAG_Z | FLAG_N | FLAG_H;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.f, FLAG_Z | FLAG_C);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.f, FLAG_Z);

    cpu.regs.a = 0x5A;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0xA5);
    assert_eq!(cpu.regs.f, FLAG_Z | FLAG_N | FLAG_H);
}

#[test]
fn halt_wakes_without_vectoring_when_ime_off() {
    let (mut cpu, mut bus) = setup(&[0x76]);
    cpu.ime = false;
    cpu.step(&mut bus);
    assert!(cpu.halted);

    // A serviceable interrupt un-halts but does not vector.
    bus.memory[0xFF0F] = 0x01;
    bus.memory[0xFFFF] = 0x01;
    let pc = cpu.regs.pc;
    assert_eq!(cpu.service_interrupts(&mut bus), 0);
    assert!(!cpu.halted);
    assert_eq!(cpu.regs.pc, pc);
    // The interrupt stays pending.
    assert_eq!(bus.memory[0xFF0F], 0x01);
}

#[test]
fn interrupt_service_vectors_and_costs_20_cycles() {
    let (mut cpu, mut bus) = setup(&[0x00]);
    cpu.ime = true;
    cpu.regs.sp = 0xFFFE;
    cpu.regs.pc = 0x1234;
    bus.memory[0xFF0F] = 0x05; // VBlank + Timer pending
    bus.memory[0xFFFF] = 0x04; // only Timer enabled

    assert_eq!(cpu.service_interrupts(&mut bus), 20);
    assert_eq!(cpu.regs.pc, 0x0050);
    assert!(!cpu.ime);
    // Timer bit cleared, VBlank still pending.
    assert_eq!(bus.memory[0xFF0F], 0x01);
    assert_eq!(bus.memory[0xFFFC], 0x34);
    assert_eq!(bus.memory[0xFFFD], 0x12);
}

#[test]
fn interrupt_priority_is_lowest_bit_first() {
    let (mut cpu, mut bus) = setup(&[0x00]);
    cpu.ime = true;
    cpu.regs.sp = 0xFFFE;
    bus.memory[0xFF0F] = 0x1F;
    bus.memory[0xFFFF] = 0x1F;

    cpu.service_interrupts(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0040); // VBlank wins
}

#[test]
fn ei_takes_effect_immediately() {
    // The core deliberately skips the hardware's one-instruction EI delay;
    // an interrupt pending at EI is serviced before the next instruction.
    let (mut cpu, mut bus) = setup(&[0xFB]);
    cpu.regs.sp = 0xFFFE;
    bus.memory[0xFF0F] = 0x01;
    bus.memory[0xFFFF] = 0x01;

    cpu.step(&mut bus);
    assert!(cpu.ime);
    assert_eq!(cpu.service_interrupts(&mut bus), 20);
    assert_eq!(cpu.regs.pc, 0x0040);
}

#[test]
fn di_takes_effect_immediately() {
    let (mut cpu, mut bus) = setup(&[0xF3]);
    cpu.ime = true;
    bus.memory[0xFF0F] = 0x01;
    bus.memory[0xFFFF] = 0x01;

    cpu.step(&mut bus);
    assert!(!cpu.ime);
    assert_eq!(cpu.service_interrupts(&mut bus), 0);
}

#[test]
fn reti_returns_and_enables() {
    let (mut cpu, mut bus) = setup(&[0xD9]);
    cpu.regs.sp = 0x9000;
    bus.memory[0x9000] = 0x34;
    bus.memory[0x9001] = 0x12;

    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x1234);
    assert!(cpu.ime);
}

#[test]
fn stop_without_armed_switch_stops() {
    let (mut cpu, mut bus) = setup(&[0x10, 0x00]);
    cpu.step(&mut bus);
    assert!(cpu.stopped);
}

#[test]
fn stop_with_armed_switch_does_not_stop() {
    let (mut cpu, mut bus) = setup(&[0x10, 0x00]);
    bus.speed_switch_armed = true;
    cpu.step(&mut bus);
    assert!(!cpu.stopped);
}

#[test]
fn undefined_opcode_locks_with_fault() {
    let (mut cpu, mut bus) = setup(&[0xDD]);
    assert_eq!(cpu.step(&mut bus), 0);
    let fault = cpu.fault().expect("fault recorded");
    assert_eq!(fault.opcode, 0xDD);
    assert_eq!(fault.pc, 0x0200);

    // Locked: further steps are no-ops.
    assert_eq!(cpu.step(&mut bus), 0);
}

#[test]
fn reset_is_idempotent() {
    let (mut cpu, mut bus) = setup(&[0x3E, 0x77]);
    cpu.step(&mut bus);

    cpu.reset(false);
    let first = format!("{:?}", cpu);
    cpu.reset(false);
    let second = format!("{:?}", cpu);
    assert_eq!(first, second);

    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x01D4);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);
}

#[test]
fn f_low_nibble_stays_zero_across_instruction_sample() {
    // Drive a spread of flag-writing instructions and check the
    // architectural mask after each.
    let program = [
        0x87, 0x97, 0xA7, 0xB7, 0xAF, 0x3C, 0x3D, 0x07, 0x17, 0x27, 0x37, 0x3F, 0xE8, 0x01,
        0xCB, 0x11, 0xCB, 0x40, 0xF1,
    ];
    let (mut cpu, mut bus) = setup(&program);
    cpu.regs.sp = 0x8000;
    bus.memory[0x8000] = 0xFF;
    bus.memory[0x8001] = 0xFF;

    for _ in 0..16 {
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.f & 0x0F, 0, "low nibble of F must stay zero");
    }
}
