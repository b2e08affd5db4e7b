use rand::Rng;

use crate::config::Quirks;
use crate::constants::{GLYPH_HEIGHT, GLYPH_START, LAST_INSTRUCTION};
use crate::error::Fault;
use crate::state::State;

// Every operation runs after the fetch, so `state.pc` already points at the next
// instruction. Skips add another 2; jumps, calls and returns overwrite it.

/// clear
pub fn clr(state: &mut State) {
    state.frame_buffer.clear();
}

/// PC = STACK.pop()
pub fn rts(state: &mut State) -> Result<(), Fault> {
    state.pc = state.stack.pop()?;
    Ok(())
}

/// PC = addr
pub fn jump(state: &mut State, addr: u16) -> Result<(), Fault> {
    state.pc = target(addr)?;
    Ok(())
}

/// STACK.push(PC); PC = addr
pub fn call(state: &mut State, addr: u16) -> Result<(), Fault> {
    let addr = target(addr)?;
    state.stack.push(state.pc)?;
    state.pc = addr;
    Ok(())
}

/// if Vx == nn then pc += 2
pub fn ske(state: &mut State, x: u8, nn: u8) {
    let condition = state.reg(x) == nn;
    skip_if(state, condition);
}

/// if Vx != nn then pc += 2
pub fn skne(state: &mut State, x: u8, nn: u8) {
    let condition = state.reg(x) != nn;
    skip_if(state, condition);
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &mut State, x: u8, y: u8) {
    let condition = state.reg(x) == state.reg(y);
    skip_if(state, condition);
}

/// if Vx != Vy then pc += 2
pub fn skrne(state: &mut State, x: u8, y: u8) {
    let condition = state.reg(x) != state.reg(y);
    skip_if(state, condition);
}

/// Vx = nn
pub fn load(state: &mut State, x: u8, nn: u8) {
    state.set_reg(x, nn);
}

/// Vx += nn
/// Overflow wraps and VF is left alone
pub fn add(state: &mut State, x: u8, nn: u8) {
    state.set_reg(x, state.reg(x).wrapping_add(nn));
}

/// Vx = Vy
pub fn mv(state: &mut State, x: u8, y: u8) {
    state.set_reg(x, state.reg(y));
}

/// Vx |= Vy
pub fn or(state: &mut State, x: u8, y: u8) {
    state.set_reg(x, state.reg(x) | state.reg(y));
}

/// Vx &= Vy
pub fn and(state: &mut State, x: u8, y: u8) {
    state.set_reg(x, state.reg(x) & state.reg(y));
}

/// Vx ^= Vy
pub fn xor(state: &mut State, x: u8, y: u8) {
    state.set_reg(x, state.reg(x) ^ state.reg(y));
}

// The ALU operations below write VF after Vx, so when x is F the flag wins.

/// Vx += Vy; VF = overflow
pub fn addr(state: &mut State, x: u8, y: u8) {
    let (res, over) = state.reg(x).overflowing_add(state.reg(y));
    state.set_reg(x, res);
    state.set_flag(over);
}

/// Vx -= Vy; VF = !underflow
pub fn sub(state: &mut State, x: u8, y: u8) {
    let (res, under) = state.reg(x).overflowing_sub(state.reg(y));
    state.set_reg(x, res);
    state.set_flag(!under);
}

/// Vx = Vy - Vx; VF = !underflow
pub fn subn(state: &mut State, x: u8, y: u8) {
    let (res, under) = state.reg(y).overflowing_sub(state.reg(x));
    state.set_reg(x, res);
    state.set_flag(!under);
}

/// Vx >>= 1; VF = shifted out bit
pub fn shr(state: &mut State, x: u8, y: u8, quirks: Quirks) {
    let value = shift_source(state, x, y, quirks);
    state.set_reg(x, value >> 1);
    state.set_flag(value & 0x01 != 0);
}

/// Vx <<= 1; VF = shifted out bit
pub fn shl(state: &mut State, x: u8, y: u8, quirks: Quirks) {
    let value = shift_source(state, x, y, quirks);
    state.set_reg(x, value << 1);
    state.set_flag(value & 0x80 != 0);
}

/// I = addr
pub fn loadi(state: &mut State, addr: u16) {
    state.i = addr;
}

/// PC = V0 + addr
pub fn jumpi(state: &mut State, addr: u16) -> Result<(), Fault> {
    state.pc = target(addr + u16::from(state.reg(0x0)))?;
    Ok(())
}

/// Vx = rand_byte & nn
pub fn rnd<R: Rng>(state: &mut State, x: u8, nn: u8, rng: &mut R) {
    let rand_byte: u8 = rng.gen();
    state.set_reg(x, rand_byte & nn);
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the n byte sprite at memory I onto the FrameBuffer at (Vx, Vy) with wrapping.
/// Sets VF if any lit pixel was turned off.
pub fn draw(state: &mut State, x: u8, y: u8, n: u8) -> Result<(), Fault> {
    let origin_x = state.reg(x) as usize;
    let origin_y = state.reg(y) as usize;

    // VF is only written once the whole sprite is known to be in memory
    let sprite = state.memory.slice(state.i, n as usize)?;
    let mut collision = false;
    for (row, bits) in sprite.iter().enumerate() {
        for col in 0..8 {
            if bits & (0x80 >> col) != 0 {
                collision |= state.frame_buffer.toggle(origin_x + col, origin_y + row);
            }
        }
    }
    state.frame_buffer.mark_dirty();

    state.set_flag(collision);
    Ok(())
}

/// if key == Vx then pc += 2
pub fn skpr(state: &mut State, x: u8, key: Option<u8>) {
    let condition = key == Some(state.reg(x));
    skip_if(state, condition);
}

/// if key != Vx then pc += 2
pub fn skup(state: &mut State, x: u8, key: Option<u8>) {
    let condition = key != Some(state.reg(x));
    skip_if(state, condition);
}

/// Vx = DT
pub fn moved(state: &mut State, x: u8) {
    state.set_reg(x, state.timers.delay);
}

/// DT = Vx
pub fn setd(state: &mut State, x: u8) {
    state.timers.delay = state.reg(x);
}

/// ST = Vx
pub fn sets(state: &mut State, x: u8) {
    state.timers.sound = state.reg(x);
}

/// I += Vx
pub fn addi(state: &mut State, x: u8) {
    state.i = state.i.wrapping_add(u16::from(state.reg(x)));
}

/// I = Vx * 5
/// Points I at the glyph for Vx; see constants::SPRITE_SHEET
pub fn ldspr(state: &mut State, x: u8) {
    state.i = GLYPH_START + u16::from(state.reg(x)) * GLYPH_HEIGHT;
}

/// mem[I..I+3] = bcd(Vx)
/// Hundreds, tens and units of Vx
pub fn bcd(state: &mut State, x: u8) -> Result<(), Fault> {
    let value = state.reg(x);
    let digits = [value / 100, value / 10 % 10, value % 10];
    state.memory.slice_mut(state.i, 3)?.copy_from_slice(&digits);
    Ok(())
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(state: &mut State, x: u8) -> Result<(), Fault> {
    let count = x as usize + 1;
    let registers = state.v;
    state
        .memory
        .slice_mut(state.i, count)?
        .copy_from_slice(&registers[..count]);
    Ok(())
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(state: &mut State, x: u8) -> Result<(), Fault> {
    let count = x as usize + 1;
    let bytes = state.memory.slice(state.i, count)?;
    state.v[..count].copy_from_slice(bytes);
    Ok(())
}

fn skip_if(state: &mut State, condition: bool) {
    if condition {
        state.pc += 0x2;
    }
}

fn shift_source(state: &State, x: u8, y: u8, quirks: Quirks) -> u8 {
    if quirks.shift_from_vy {
        state.reg(y)
    } else {
        state.reg(x)
    }
}

/// A jump target must leave room to fetch a whole instruction.
fn target(addr: u16) -> Result<u16, Fault> {
    if addr > LAST_INSTRUCTION {
        Err(Fault::OutOfRangeJumpTarget { target: addr })
    } else {
        Ok(addr)
    }
}
